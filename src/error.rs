//! Strategy-level error types shared across the router, collaborator, and stores.

// self
use crate::{_prelude::*, relying_party::RelyingPartyError, validator::ValidatorShape};

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for host-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs and carried by
/// [`AuthenticationOutcome::Error`](crate::strategy::AuthenticationOutcome::Error).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),

	/// Relying party could not resolve the identifier to a provider endpoint.
	#[error("Failed to discover OP endpoint URL.")]
	Discovery {
		/// Collaborator failure.
		#[source]
		source: RelyingPartyError,
	},
	/// Discovery succeeded without yielding a provider endpoint.
	#[error("No OpenID provider was discovered for the identifier.")]
	NoProviderDiscovered,
	/// Relying party failed to verify the provider assertion.
	#[error("Failed to verify assertion.")]
	Verification {
		/// Collaborator failure.
		#[source]
		source: RelyingPartyError,
	},
	/// Verification finished, but the assertion is not authenticated.
	#[error("OpenID authentication error.")]
	NotAuthenticated,
	/// Host validator reported an internal failure.
	#[error("Validator reported an error.")]
	Validator {
		/// Error returned by the validator.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a validator failure.
	pub fn validator(src: impl Into<BoxError>) -> Self {
		Self::Validator { source: src.into() }
	}
}

/// Construction-time failures; these abort strategy creation.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// `returnURL` was not supplied.
	#[error("OpenID authentication requires a returnURL option.")]
	MissingReturnUrl,
	/// A URL option could not be parsed.
	#[error("The {field} option is not a valid URL.")]
	InvalidUrl {
		/// Option name.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The identifier field name is empty.
	#[error("The identifierField option cannot be empty.")]
	EmptyIdentifierField,
	/// No validator was supplied.
	#[error("OpenID authentication strategy requires a validate function.")]
	MissingValidator,
	/// No relying party collaborator was supplied.
	#[error("OpenID authentication strategy requires a relying party.")]
	MissingRelyingParty,
	/// The validator's shape disagrees with `passReqToCallback`.
	#[error("Validator shape {actual} does not match the configured shape {expected}.")]
	ValidatorShapeMismatch {
		/// Shape implied by the configuration.
		expected: ValidatorShape,
		/// Shape declared by the validator.
		actual: ValidatorShape,
	},
	/// JSON options could not be parsed.
	#[error("Strategy options are malformed at `{}`.", .source.path())]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Typed failure info reported when the client sent no identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("{message}")]
pub struct BadRequestError {
	/// Human-readable explanation.
	pub message: String,
}
impl BadRequestError {
	/// Creates a new bad-request error with the provided message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}

	pub(crate) fn missing_identifier() -> Self {
		Self::new("Missing OpenID identifier.")
	}
}
