//! Contract for the OpenID 2.0 relying-party engine the strategy delegates to.
//!
//! The engine owns discovery, association negotiation, and signature checks. The strategy
//! only asks it for a provider redirect on initiate and for a verified [`Assertion`] on
//! completion, and it hands the engine one [`RelyingPartySetup`] at construction time so the
//! engine can persist associations through the host's [`StoreHooks`].

// self
use crate::{
	_prelude::*,
	profile::{ExtensionFields, ExtensionRequest},
	store::StoreHooks,
};

/// Boxed future returned by [`RelyingParty`] operations.
pub type RelyingPartyFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, RelyingPartyError>> + 'a + Send>>;

/// OpenID relying-party engine used by the strategy.
///
/// Implementations must be `Send + Sync`; the strategy shares one engine across every
/// request and never calls it concurrently for the same request.
pub trait RelyingParty
where
	Self: Send + Sync,
{
	/// Receives the engine settings and store hooks exactly once, before the first request.
	fn install(&mut self, setup: RelyingPartySetup);

	/// Resolves `identifier` and returns the provider URL the user agent should visit.
	///
	/// `Ok(None)` means discovery completed without finding a usable provider.
	fn authenticate<'a>(
		&'a self,
		identifier: &'a str,
		immediate: bool,
	) -> RelyingPartyFuture<'a, Option<Url>>;

	/// Verifies the provider's response carried by the full request URL.
	fn verify_assertion<'a>(&'a self, raw_url: &'a str) -> RelyingPartyFuture<'a, Assertion>;
}

/// Settings derived from [`StrategyConfig`](crate::config::StrategyConfig) for the engine.
#[derive(Clone, Debug)]
pub struct RelyingPartySetup {
	/// Callback URL registered with providers.
	pub return_url: Url,
	/// Optional trust root.
	pub realm: Option<Url>,
	/// Skip association persistence and verify assertions directly with the provider.
	pub stateless: bool,
	/// Require encrypted transport for provider responses.
	pub secure: bool,
	/// Extension attributes to request alongside the authentication request.
	pub extensions: Option<ExtensionRequest>,
	/// Persistence hooks for associations and discovered information.
	pub stores: StoreHooks,
}

/// Verified provider response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
	/// Whether the provider positively asserted the identity.
	pub authenticated: bool,
	/// Identifier claimed by the end user.
	pub claimed_identifier: Option<String>,
	/// Extension attributes returned with the assertion.
	pub extensions: ExtensionFields,
}
impl Assertion {
	/// Creates a positive assertion for the provided claimed identifier.
	pub fn authenticated(claimed_identifier: impl Into<String>) -> Self {
		Self {
			authenticated: true,
			claimed_identifier: Some(claimed_identifier.into()),
			extensions: ExtensionFields::default(),
		}
	}

	/// Creates an assertion the provider did not authenticate.
	pub fn unauthenticated() -> Self {
		Self::default()
	}

	/// Attaches extension attributes.
	pub fn with_extensions(mut self, extensions: ExtensionFields) -> Self {
		self.extensions = extensions;

		self
	}
}

/// Failures reported by the relying-party engine.
#[derive(Debug, ThisError)]
pub enum RelyingPartyError {
	/// Identifier could not be resolved to a provider.
	#[error("Discovery failed: {message}.")]
	Discovery {
		/// Engine-supplied message.
		message: String,
	},
	/// Association negotiation failed.
	#[error("Association failed: {message}.")]
	Association {
		/// Engine-supplied message.
		message: String,
	},
	/// Provider response was invalid (bad signature, nonce replay, return URL mismatch).
	#[error("Invalid assertion: {message}.")]
	Assertion {
		/// Engine-supplied message.
		message: String,
	},
	/// Storage hook failure surfaced by the engine.
	#[error(transparent)]
	Store(#[from] crate::store::StoreError),
	/// Network failure talking to the provider.
	#[error("Network error occurred while contacting the OpenID provider.")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
}
impl RelyingPartyError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn assertion_constructors_set_authentication_flag() {
		let positive = Assertion::authenticated("http://example.com/u");

		assert!(positive.authenticated);
		assert_eq!(positive.claimed_identifier.as_deref(), Some("http://example.com/u"));

		let negative = Assertion::unauthenticated();

		assert!(!negative.authenticated);
		assert!(negative.claimed_identifier.is_none());
	}

	#[test]
	fn transport_error_exposes_source() {
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
		let err = RelyingPartyError::transport(io);

		assert_eq!(
			std::error::Error::source(&err).map(ToString::to_string).as_deref(),
			Some("timed out")
		);
	}
}
