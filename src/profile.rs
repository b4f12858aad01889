//! Provider extension attributes and the canonical [`Profile`] built from them.
//!
//! Providers return profile data through two independent vocabularies: Simple Registration
//! (`openid.sreg.*`) and Attribute Exchange (`openid.ax.*`). [`Profile::normalize`] merges both
//! into one record; it is total and never fails on missing attributes.

// self
use crate::_prelude::*;

const SREG_PREFIX: &str = "openid.sreg.";
const AX_TYPE_PREFIX: &str = "openid.ax.type.";
const AX_VALUE_PREFIX: &str = "openid.ax.value.";

/// Simple Registration attributes requested when profiles are enabled.
pub const SREG_ATTRIBUTES: [&str; 3] = ["fullname", "nickname", "email"];
/// Attribute Exchange aliases and type URIs requested when profiles are enabled.
pub const AX_ATTRIBUTES: [(&str, &str); 3] = [
	("email", "http://axschema.org/contact/email"),
	("firstname", "http://axschema.org/namePerson/first"),
	("lastname", "http://axschema.org/namePerson/last"),
];

/// Raw extension attributes returned alongside an assertion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionFields {
	/// Simple Registration attributes keyed by field name (`fullname`, `email`, ...).
	pub simple_registration: BTreeMap<String, String>,
	/// Attribute Exchange values keyed by canonical alias (`firstname`, `lastname`, `email`).
	pub attribute_exchange: BTreeMap<String, String>,
}
impl ExtensionFields {
	/// Adds a Simple Registration attribute.
	pub fn with_sreg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.simple_registration.insert(key.into(), value.into());

		self
	}

	/// Adds an Attribute Exchange value.
	pub fn with_ax(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.attribute_exchange.insert(key.into(), value.into());

		self
	}

	/// Parses OpenID wire parameters into the two extension vocabularies.
	///
	/// Attribute Exchange values are keyed by the canonical alias of their declared type URI
	/// when the type is known, otherwise by the provider-chosen alias.
	pub fn from_openid_params<'a, I>(params: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let mut fields = Self::default();
		let mut ax_types = HashMap::new();
		let mut ax_values = Vec::new();

		for (key, value) in params {
			if let Some(name) = key.strip_prefix(SREG_PREFIX) {
				fields.simple_registration.insert(name.to_owned(), value.to_owned());
			} else if let Some(alias) = key.strip_prefix(AX_TYPE_PREFIX) {
				ax_types.insert(alias.to_owned(), value.to_owned());
			} else if let Some(alias) = key.strip_prefix(AX_VALUE_PREFIX) {
				ax_values.push((alias.to_owned(), value.to_owned()));
			}
		}

		for (alias, value) in ax_values {
			let canonical = ax_types
				.get(&alias)
				.and_then(|type_uri| {
					AX_ATTRIBUTES
						.iter()
						.find(|(_, uri)| *uri == type_uri.as_str())
						.map(|(name, _)| *name)
				})
				.map(str::to_owned)
				.unwrap_or(alias);

			fields.attribute_exchange.insert(canonical, value);
		}

		fields
	}

	fn sreg(&self, key: &str) -> Option<&str> {
		self.simple_registration.get(key).map(String::as_str).filter(|v| !v.is_empty())
	}

	fn ax(&self, key: &str) -> Option<&str> {
		self.attribute_exchange.get(key).map(String::as_str).filter(|v| !v.is_empty())
	}
}

/// Extension attributes the relying party should request from the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionRequest {
	/// Simple Registration fields requested as optional.
	pub simple_registration: Vec<&'static str>,
	/// Attribute Exchange `(alias, type URI)` pairs requested as required.
	pub attribute_exchange: Vec<(&'static str, &'static str)>,
}
impl Default for ExtensionRequest {
	fn default() -> Self {
		Self {
			simple_registration: SREG_ATTRIBUTES.to_vec(),
			attribute_exchange: AX_ATTRIBUTES.to_vec(),
		}
	}
}

/// One email address of a [`Profile`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEmail {
	/// Address as reported by the provider.
	pub value: String,
}

/// Structured name of a [`Profile`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
	/// Last name.
	pub family_name: Option<String>,
	/// First name.
	pub given_name: Option<String>,
}

/// Canonical user profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	/// Display name; whitespace-only means unknown.
	pub display_name: String,
	/// At most one address, first source wins.
	pub emails: Vec<ProfileEmail>,
	/// Structured name from Attribute Exchange.
	pub name: ProfileName,
}
impl Profile {
	/// Builds a profile from raw extension attributes.
	pub fn normalize(fields: &ExtensionFields) -> Self {
		let first = fields.ax("firstname");
		let last = fields.ax("lastname");
		let display_name = match fields.sreg("fullname") {
			Some(fullname) => fullname.to_owned(),
			None => format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default()),
		};
		let emails = fields
			.sreg("email")
			.or_else(|| fields.ax("email"))
			.map(|value| vec![ProfileEmail { value: value.to_owned() }])
			.unwrap_or_default();
		let name = ProfileName {
			family_name: last.map(str::to_owned),
			given_name: first.map(str::to_owned),
		};

		Self { display_name, emails, name }
	}

	/// Returns `true` when the display name carries more than whitespace.
	pub fn has_display_name(&self) -> bool {
		!self.display_name.trim().is_empty()
	}

	/// Returns the primary email address, if any.
	pub fn email(&self) -> Option<&str> {
		self.emails.first().map(|email| email.value.as_str())
	}
}
