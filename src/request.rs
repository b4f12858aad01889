//! Framework-neutral view of an inbound HTTP request.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// The three pieces of a request the strategy reads: query parameters, body parameters, and
/// the raw URL handed verbatim to the assertion verifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
	url: String,
	query: BTreeMap<String, String>,
	body: BTreeMap<String, String>,
}
impl AuthRequest {
	/// Creates a request from its raw URL (absolute or origin-form), parsing the query string.
	///
	/// When a query key repeats, the first value wins.
	pub fn new(url: impl Into<String>) -> Self {
		let url = url.into();
		let mut query = BTreeMap::new();

		if let Some((_, rest)) = url.split_once('?') {
			let rest = rest.split_once('#').map_or(rest, |(q, _)| q);

			for (key, value) in form_urlencoded::parse(rest.as_bytes()) {
				query.entry(key.into_owned()).or_insert_with(|| value.into_owned());
			}
		}

		Self { url, query, body: BTreeMap::new() }
	}

	/// Adds a decoded body parameter (typically from a submitted form).
	pub fn with_body_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.body.insert(key.into(), value.into());

		self
	}

	/// Replaces the body parameters.
	pub fn with_body<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.body = params.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

		self
	}

	/// Parses an `application/x-www-form-urlencoded` body.
	pub fn with_form_body(self, body: &[u8]) -> Self {
		self.with_body(form_urlencoded::parse(body).into_owned())
	}

	/// Raw request URL.
	pub fn raw_url(&self) -> &str {
		&self.url
	}

	/// Looks up a query parameter.
	pub fn query(&self, key: &str) -> Option<&str> {
		self.query.get(key).map(String::as_str)
	}

	/// Looks up a body parameter.
	pub fn body(&self, key: &str) -> Option<&str> {
		self.body.get(key).map(String::as_str)
	}

	/// Iterates over the query parameters.
	pub fn query_params(&self) -> impl Iterator<Item = (&str, &str)> {
		self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}
