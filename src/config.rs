//! Immutable strategy configuration.
//!
//! Options can be assembled in code with [`StrategyConfig::builder`] or loaded from a JSON
//! object using the option names hosts already know (`returnURL`, `identifierField`,
//! `passReqToCallback`, ...). Unknown keys are ignored.

// self
use crate::{_prelude::*, error::ConfigError};

/// Request parameter carrying the user-supplied identifier unless overridden.
pub const DEFAULT_IDENTIFIER_FIELD: &str = "openid_identifier";

/// Strategy settings, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyConfig {
	/// Absolute callback URL registered with providers.
	pub return_url: Url,
	/// Optional trust root.
	pub realm: Option<Url>,
	/// Disable default association persistence.
	pub stateless: bool,
	/// Require encrypted transport for provider responses.
	pub secure: bool,
	/// Request parameter carrying the user identifier.
	pub identifier_field: String,
	/// Fixed provider used instead of a user-supplied identifier.
	pub provider_url: Option<Url>,
	/// Request profile attributes through provider extensions.
	pub profile: bool,
	/// Pass the inbound request to the validator.
	pub pass_request_to_callback: bool,
}
impl StrategyConfig {
	/// Starts a builder for the provided return URL.
	pub fn builder(return_url: Url) -> StrategyConfigBuilder {
		StrategyConfigBuilder::new(return_url)
	}

	/// Parses options from a JSON object.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(json);
		let raw: RawOptions =
			serde_path_to_error::deserialize(de).map_err(|source| ConfigError::Parse { source })?;

		raw.into_config()
	}
}

/// Builder for [`StrategyConfig`] values.
#[derive(Debug)]
pub struct StrategyConfigBuilder {
	config: StrategyConfig,
}
impl StrategyConfigBuilder {
	/// Creates a builder with default options for the provided return URL.
	pub fn new(return_url: Url) -> Self {
		Self {
			config: StrategyConfig {
				return_url,
				realm: None,
				stateless: false,
				secure: false,
				identifier_field: DEFAULT_IDENTIFIER_FIELD.into(),
				provider_url: None,
				profile: false,
				pass_request_to_callback: false,
			},
		}
	}

	/// Sets the trust root.
	pub fn realm(mut self, realm: Url) -> Self {
		self.config.realm = Some(realm);

		self
	}

	/// Toggles stateless mode.
	pub fn stateless(mut self, stateless: bool) -> Self {
		self.config.stateless = stateless;

		self
	}

	/// Toggles secure mode.
	pub fn secure(mut self, secure: bool) -> Self {
		self.config.secure = secure;

		self
	}

	/// Overrides the identifier parameter name.
	pub fn identifier_field(mut self, field: impl Into<String>) -> Self {
		self.config.identifier_field = field.into();

		self
	}

	/// Targets a fixed provider.
	pub fn provider_url(mut self, url: Url) -> Self {
		self.config.provider_url = Some(url);

		self
	}

	/// Toggles extension-based profile retrieval.
	pub fn profile(mut self, profile: bool) -> Self {
		self.config.profile = profile;

		self
	}

	/// Toggles passing the request to the validator.
	pub fn pass_request_to_callback(mut self, pass: bool) -> Self {
		self.config.pass_request_to_callback = pass;

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		let config = self.config;

		if config.identifier_field.is_empty() {
			return Err(ConfigError::EmptyIdentifierField);
		}

		Ok(config)
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOptions {
	#[serde(rename = "returnURL", alias = "returnUrl")]
	return_url: Option<String>,
	realm: Option<String>,
	stateless: bool,
	#[serde(alias = "strict")]
	secure: bool,
	#[serde(rename = "identifierField")]
	identifier_field: Option<String>,
	#[serde(rename = "providerURL", alias = "providerUrl")]
	provider_url: Option<String>,
	profile: bool,
	#[serde(rename = "passReqToCallback", alias = "passRequestToCallback")]
	pass_request_to_callback: bool,
}
impl RawOptions {
	fn into_config(self) -> Result<StrategyConfig, ConfigError> {
		let return_url = self.return_url.ok_or(ConfigError::MissingReturnUrl)?;
		let mut builder = StrategyConfig::builder(parse_url("returnURL", &return_url)?)
			.stateless(self.stateless)
			.secure(self.secure)
			.profile(self.profile)
			.pass_request_to_callback(self.pass_request_to_callback);

		if let Some(realm) = self.realm {
			builder = builder.realm(parse_url("realm", &realm)?);
		}
		if let Some(provider_url) = self.provider_url {
			builder = builder.provider_url(parse_url("providerURL", &provider_url)?);
		}
		if let Some(field) = self.identifier_field {
			builder = builder.identifier_field(field);
		}

		builder.build()
	}
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })
}
