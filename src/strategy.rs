//! OpenID phase router.
//!
//! Each inbound request is either initiating authentication (the user submitted an
//! identifier) or completing it (the provider redirected back with `openid.mode`). The
//! strategy drives the [`RelyingParty`] for that phase and translates every collaborator and
//! validator result into exactly one [`AuthenticationOutcome`]. Nothing escapes as a panic or
//! an `Err`; construction is the only fallible step.

pub mod outcome;

pub use outcome::*;

// self
use crate::{
	_prelude::*,
	config::StrategyConfig,
	error::{BadRequestError, ConfigError},
	obs::{self, Phase, PhaseSpan},
	profile::{ExtensionRequest, Profile},
	relying_party::{RelyingParty, RelyingPartySetup},
	request::AuthRequest,
	store::{OpenIdStore, StoreHooks},
	validator::{Validator, ValidatorShape, Verdict},
};

/// Query parameter marking a provider response.
pub const MODE_PARAM: &str = "openid.mode";
/// Mode value sent when the user cancels at the provider.
pub const CANCEL_MODE: &str = "cancel";

/// OpenID 2.0 authentication strategy bound to one relying-party engine.
pub struct Strategy<U> {
	config: StrategyConfig,
	validator: Validator<U>,
	relying_party: Arc<dyn RelyingParty>,
	profile_enabled: bool,
}
impl<U> Strategy<U> {
	/// Strategy name used for registration with the host framework.
	pub const NAME: &'static str = "openid";

	/// Starts a builder for the provided configuration.
	pub fn builder(config: StrategyConfig) -> StrategyBuilder<U> {
		StrategyBuilder::new(config)
	}

	/// Strategy name used for registration with the host framework.
	pub fn name(&self) -> &'static str {
		Self::NAME
	}

	/// Immutable configuration.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Calling convention of the registered validator.
	pub fn validator_shape(&self) -> ValidatorShape {
		self.validator.shape()
	}

	/// Whether provider extensions are requested and profiles normalized.
	pub fn profile_enabled(&self) -> bool {
		self.profile_enabled
	}

	/// Classifies the request; the mode marker is checked before anything else.
	pub fn phase(request: &AuthRequest) -> Phase {
		match request.query(MODE_PARAM).filter(|mode| !mode.is_empty()) {
			Some(_) => Phase::Complete,
			None => Phase::Initiate,
		}
	}

	/// Runs one authentication attempt.
	pub async fn authenticate(&self, request: &AuthRequest) -> AuthenticationOutcome<U> {
		let phase = Self::phase(request);
		let span = PhaseSpan::new(phase);
		let outcome = span
			.instrument(async {
				match phase {
					Phase::Complete => self.complete(request, &span).await,
					Phase::Initiate => self.initiate(request, &span).await,
				}
			})
			.await;
		let kind = outcome.kind();

		span.outcome(kind);
		obs::record_outcome(phase, kind);

		outcome
	}

	/// Runs one authentication attempt and reports it through exactly one host action.
	pub async fn authenticate_with<A>(&self, request: &AuthRequest, actions: &mut A)
	where
		A: ?Sized + AuthenticationActions<U>,
	{
		self.authenticate(request).await.dispatch(actions);
	}

	async fn complete(&self, request: &AuthRequest, span: &PhaseSpan) -> AuthenticationOutcome<U> {
		// Treat a cancel response as a normal failure instead of letting the engine error.
		if request.query(MODE_PARAM) == Some(CANCEL_MODE) {
			return AuthenticationOutcome::Failure { info: FailureInfo::Canceled };
		}

		let assertion = match self.relying_party.verify_assertion(request.raw_url()).await {
			Ok(assertion) => assertion,
			Err(e) => {
				span.failure("verify_assertion", &e);

				return AuthenticationOutcome::error(Error::Verification { source: e });
			},
		};

		if !assertion.authenticated {
			return AuthenticationOutcome::error(Error::NotAuthenticated);
		}

		let Some(identifier) = assertion.claimed_identifier else {
			return AuthenticationOutcome::error(Error::NotAuthenticated);
		};
		let profile = self
			.validator
			.shape()
			.takes_profile()
			.then(|| Profile::normalize(&assertion.extensions));

		match self.validator.invoke(request, identifier, profile).await {
			Ok(Verdict::Accept { user, info }) => AuthenticationOutcome::Success { user, info },
			Ok(Verdict::Reject { info }) => AuthenticationOutcome::Failure { info: info.into() },
			Err(e) => {
				span.failure("validate", &e);

				AuthenticationOutcome::error(e)
			},
		}
	}

	async fn initiate(&self, request: &AuthRequest, span: &PhaseSpan) -> AuthenticationOutcome<U> {
		let Some(identifier) = self.resolve_identifier(request) else {
			return AuthenticationOutcome::Failure {
				info: FailureInfo::BadRequest(BadRequestError::missing_identifier()),
			};
		};

		match self.relying_party.authenticate(identifier, false).await {
			Ok(Some(url)) => AuthenticationOutcome::Redirect { url },
			Ok(None) => AuthenticationOutcome::error(Error::NoProviderDiscovered),
			Err(e) => {
				span.failure("discovery", &e);

				AuthenticationOutcome::error(Error::Discovery { source: e })
			},
		}
	}

	/// Fixed provider first, then the body field, then the query field; empty values count as
	/// missing.
	fn resolve_identifier<'a>(&'a self, request: &'a AuthRequest) -> Option<&'a str> {
		if let Some(provider_url) = &self.config.provider_url {
			return Some(provider_url.as_str());
		}

		let field = self.config.identifier_field.as_str();

		request
			.body(field)
			.filter(|v| !v.is_empty())
			.or_else(|| request.query(field).filter(|v| !v.is_empty()))
	}
}
impl<U> Debug for Strategy<U> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Strategy")
			.field("config", &self.config)
			.field("validator", &self.validator)
			.field("profile_enabled", &self.profile_enabled)
			.finish()
	}
}

/// Builder for [`Strategy`] values.
pub struct StrategyBuilder<U> {
	config: StrategyConfig,
	validator: Option<Validator<U>>,
	relying_party: Option<Box<dyn RelyingParty>>,
	stores: StoreHooks,
}
impl<U> StrategyBuilder<U> {
	/// Creates a builder for the provided configuration.
	pub fn new(config: StrategyConfig) -> Self {
		Self { config, validator: None, relying_party: None, stores: StoreHooks::default() }
	}

	/// Sets the validation callback.
	pub fn validator(mut self, validator: Validator<U>) -> Self {
		self.validator = Some(validator);

		self
	}

	/// Sets the relying-party engine.
	pub fn relying_party(mut self, relying_party: impl 'static + RelyingParty) -> Self {
		self.relying_party = Some(Box::new(relying_party));

		self
	}

	/// Replaces the store hooks handed to the engine.
	pub fn stores(mut self, stores: StoreHooks) -> Self {
		self.stores = stores;

		self
	}

	/// Replaces the default store behind unregistered hooks, keeping registered ones.
	pub fn default_store(mut self, store: Arc<dyn OpenIdStore>) -> Self {
		self.stores.set_fallback(store);

		self
	}

	/// Registers store hooks in place.
	pub fn configure_stores(mut self, f: impl FnOnce(&mut StoreHooks)) -> Self {
		f(&mut self.stores);

		self
	}

	/// Validates the options and wires the engine.
	pub fn build(self) -> Result<Strategy<U>, ConfigError> {
		let validator = self.validator.ok_or(ConfigError::MissingValidator)?;
		let mut relying_party = self.relying_party.ok_or(ConfigError::MissingRelyingParty)?;
		let shape = validator.shape();

		if shape.takes_request() != self.config.pass_request_to_callback {
			return Err(ConfigError::ValidatorShapeMismatch {
				expected: ValidatorShape::from_flags(
					self.config.pass_request_to_callback,
					shape.takes_profile(),
				),
				actual: shape,
			});
		}

		let profile_enabled = self.config.profile || shape.takes_profile();

		relying_party.install(RelyingPartySetup {
			return_url: self.config.return_url.clone(),
			realm: self.config.realm.clone(),
			stateless: self.config.stateless,
			secure: self.config.secure,
			extensions: profile_enabled.then(ExtensionRequest::default),
			stores: self.stores,
		});

		Ok(Strategy {
			config: self.config,
			validator,
			relying_party: Arc::from(relying_party),
			profile_enabled,
		})
	}
}
impl<U> Debug for StrategyBuilder<U> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyBuilder")
			.field("config", &self.config)
			.field("validator", &self.validator)
			.field("relying_party_set", &self.relying_party.is_some())
			.field("stores", &self.stores)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::relying_party::{Assertion, RelyingPartyError, RelyingPartyFuture};

	#[derive(Default)]
	struct UnreachableRelyingParty;
	impl RelyingParty for UnreachableRelyingParty {
		fn install(&mut self, _: RelyingPartySetup) {}

		fn authenticate<'a>(&'a self, _: &'a str, _: bool) -> RelyingPartyFuture<'a, Option<Url>> {
			Box::pin(async {
				Err::<Option<Url>, _>(RelyingPartyError::Discovery { message: "unexpected".into() })
			})
		}

		fn verify_assertion<'a>(&'a self, _: &'a str) -> RelyingPartyFuture<'a, Assertion> {
			Box::pin(async {
				Err::<Assertion, _>(RelyingPartyError::Assertion { message: "unexpected".into() })
			})
		}
	}

	fn config() -> StrategyConfig {
		StrategyConfig::builder(
			Url::parse("https://www.example.com/auth/openid/return")
				.expect("Return URL fixture should parse."),
		)
		.build()
		.expect("Config fixture should build.")
	}

	fn strategy(config: StrategyConfig) -> Strategy<String> {
		Strategy::builder(config)
			.validator(Validator::identifier(|id| async move { Ok(Verdict::accept(id)) }))
			.relying_party(UnreachableRelyingParty)
			.build()
			.expect("Strategy fixture should build.")
	}

	#[test]
	fn strategy_is_named_openid() {
		assert_eq!(strategy(config()).name(), "openid");
	}

	#[test]
	fn phase_depends_only_on_mode_marker() {
		assert_eq!(
			Strategy::<String>::phase(&AuthRequest::new("/return?openid.mode=id_res")),
			Phase::Complete
		);
		assert_eq!(
			Strategy::<String>::phase(
				&AuthRequest::new("/login?openid_identifier=x").with_body_param("openid.mode", "x")
			),
			Phase::Initiate
		);
		assert_eq!(
			Strategy::<String>::phase(&AuthRequest::new(
				"/login?openid.mode=&openid_identifier=http%3A%2F%2Fme.example.com%2F"
			)),
			Phase::Initiate
		);
	}

	#[test]
	fn identifier_prefers_provider_then_body_then_query() {
		let plain = strategy(config());
		let request = AuthRequest::new("/login?openid_identifier=from-query")
			.with_body_param("openid_identifier", "from-body");

		assert_eq!(plain.resolve_identifier(&request), Some("from-body"));

		let request = AuthRequest::new("/login?openid_identifier=from-query")
			.with_body_param("openid_identifier", "");

		assert_eq!(plain.resolve_identifier(&request), Some("from-query"));
		assert_eq!(plain.resolve_identifier(&AuthRequest::new("/login?openid_identifier=")), None);

		let mut fixed = config();

		fixed.provider_url =
			Some(Url::parse("https://www.google.com/accounts/o8/id").expect("URL should parse."));

		assert_eq!(
			strategy(fixed).resolve_identifier(&request),
			Some("https://www.google.com/accounts/o8/id")
		);
	}

	#[tokio::test]
	async fn cancel_and_missing_identifier_never_reach_the_engine() {
		let strategy = strategy(config());
		let outcome = strategy.authenticate(&AuthRequest::new("/return?openid.mode=cancel")).await;

		assert!(matches!(outcome, AuthenticationOutcome::Failure { info: FailureInfo::Canceled }));

		let outcome = strategy.authenticate(&AuthRequest::new("/login")).await;

		assert!(matches!(
			outcome,
			AuthenticationOutcome::Failure { info: FailureInfo::BadRequest(_) }
		));
	}

	#[test]
	fn build_rejects_missing_pieces_and_shape_mismatch() {
		let err = Strategy::<String>::builder(config())
			.relying_party(UnreachableRelyingParty)
			.build()
			.expect_err("Missing validator should be rejected.");

		assert!(matches!(err, ConfigError::MissingValidator));

		let err = Strategy::<String>::builder(config())
			.validator(Validator::identifier(|id| async move { Ok(Verdict::accept(id)) }))
			.build()
			.expect_err("Missing relying party should be rejected.");

		assert!(matches!(err, ConfigError::MissingRelyingParty));

		let mut pass_request = config();

		pass_request.pass_request_to_callback = true;

		let err = Strategy::<String>::builder(pass_request)
			.validator(Validator::identifier_profile(|id, _| async move {
				Ok(Verdict::accept(id))
			}))
			.relying_party(UnreachableRelyingParty)
			.build()
			.expect_err("Shape mismatch should be rejected.");

		assert!(matches!(
			err,
			ConfigError::ValidatorShapeMismatch {
				expected: ValidatorShape::RequestIdentifierProfile,
				actual: ValidatorShape::IdentifierProfile,
			}
		));
	}

	#[test]
	fn profile_validator_enables_extensions() {
		let strategy = Strategy::<String>::builder(config())
			.validator(Validator::identifier_profile(|id, _| async move {
				Ok(Verdict::accept(id))
			}))
			.relying_party(UnreachableRelyingParty)
			.build()
			.expect("Profile-shaped validator should build.");

		assert!(strategy.profile_enabled());
		assert_eq!(strategy.validator_shape(), ValidatorShape::IdentifierProfile);
	}
}
