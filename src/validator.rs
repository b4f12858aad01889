//! Host validation callbacks and the adapter that invokes them.
//!
//! A [`Validator`] declares its calling convention through the constructor used to build it,
//! so the strategy knows at construction time whether to hand it the inbound request and a
//! normalized [`Profile`]. The validator answers with a [`Verdict`] (accept or reject) or an
//! error; returning a value replaces the `done(err, user, info)` completion callback, so it
//! resolves exactly once.

// self
use crate::{_prelude::*, profile::Profile, request::AuthRequest};

/// Boxed future returned by validators.
pub type ValidatorFuture<U> = Pin<Box<dyn Future<Output = Result<Verdict<U>, BoxError>> + Send>>;

type IdentifierFn<U> = dyn Fn(String) -> ValidatorFuture<U> + Send + Sync;
type IdentifierProfileFn<U> = dyn Fn(String, Profile) -> ValidatorFuture<U> + Send + Sync;
type RequestIdentifierFn<U> = dyn Fn(AuthRequest, String) -> ValidatorFuture<U> + Send + Sync;
type RequestIdentifierProfileFn<U> =
	dyn Fn(AuthRequest, String, Profile) -> ValidatorFuture<U> + Send + Sync;

/// Calling convention of a [`Validator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidatorShape {
	/// `(identifier)`.
	Identifier,
	/// `(identifier, profile)`.
	IdentifierProfile,
	/// `(request, identifier)`.
	RequestIdentifier,
	/// `(request, identifier, profile)`.
	RequestIdentifierProfile,
}
impl ValidatorShape {
	/// Picks the shape for the provided flags.
	pub const fn from_flags(pass_request: bool, profile: bool) -> Self {
		match (pass_request, profile) {
			(false, false) => Self::Identifier,
			(false, true) => Self::IdentifierProfile,
			(true, false) => Self::RequestIdentifier,
			(true, true) => Self::RequestIdentifierProfile,
		}
	}

	/// Whether the inbound request is passed first.
	pub const fn takes_request(self) -> bool {
		matches!(self, Self::RequestIdentifier | Self::RequestIdentifierProfile)
	}

	/// Whether a normalized profile is passed after the identifier.
	pub const fn takes_profile(self) -> bool {
		matches!(self, Self::IdentifierProfile | Self::RequestIdentifierProfile)
	}

	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Identifier => "(identifier)",
			Self::IdentifierProfile => "(identifier, profile)",
			Self::RequestIdentifier => "(request, identifier)",
			Self::RequestIdentifierProfile => "(request, identifier, profile)",
		}
	}
}
impl Display for ValidatorShape {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Validator decision for a verified identifier.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict<U> {
	/// The identifier maps to a user.
	Accept {
		/// Authenticated user.
		user: U,
		/// Optional info forwarded to the host.
		info: Option<JsonValue>,
	},
	/// The identifier is not acceptable.
	Reject {
		/// Optional info forwarded to the host.
		info: Option<JsonValue>,
	},
}
impl<U> Verdict<U> {
	/// Accepts with no extra info.
	pub fn accept(user: U) -> Self {
		Self::Accept { user, info: None }
	}

	/// Accepts and attaches info.
	pub fn accept_with_info(user: U, info: JsonValue) -> Self {
		Self::Accept { user, info: Some(info) }
	}

	/// Rejects with no extra info.
	pub fn reject() -> Self {
		Self::Reject { info: None }
	}

	/// Rejects and attaches info (for example a flash message).
	pub fn reject_with_info(info: JsonValue) -> Self {
		Self::Reject { info: Some(info) }
	}
}
impl<U> From<Option<U>> for Verdict<U> {
	fn from(user: Option<U>) -> Self {
		match user {
			Some(user) => Self::accept(user),
			None => Self::reject(),
		}
	}
}

/// Host-supplied validation callback.
pub enum Validator<U> {
	/// See [`Validator::identifier`].
	Identifier(Arc<IdentifierFn<U>>),
	/// See [`Validator::identifier_profile`].
	IdentifierProfile(Arc<IdentifierProfileFn<U>>),
	/// See [`Validator::request_identifier`].
	RequestIdentifier(Arc<RequestIdentifierFn<U>>),
	/// See [`Validator::request_identifier_profile`].
	RequestIdentifierProfile(Arc<RequestIdentifierProfileFn<U>>),
}
impl<U> Validator<U>
where
	U: 'static,
{
	/// Validator called with the claimed identifier only.
	pub fn identifier<F, Fut>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(String) -> Fut,
		Fut: 'static + Send + Future<Output = Result<Verdict<U>, BoxError>>,
	{
		Self::Identifier(Arc::new(move |identifier| -> ValidatorFuture<U> {
			Box::pin(f(identifier))
		}))
	}

	/// Validator called with the claimed identifier and the normalized profile.
	pub fn identifier_profile<F, Fut>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(String, Profile) -> Fut,
		Fut: 'static + Send + Future<Output = Result<Verdict<U>, BoxError>>,
	{
		Self::IdentifierProfile(Arc::new(move |identifier, profile| -> ValidatorFuture<U> {
			Box::pin(f(identifier, profile))
		}))
	}

	/// Validator called with the inbound request and the claimed identifier.
	pub fn request_identifier<F, Fut>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(AuthRequest, String) -> Fut,
		Fut: 'static + Send + Future<Output = Result<Verdict<U>, BoxError>>,
	{
		Self::RequestIdentifier(Arc::new(move |request, identifier| -> ValidatorFuture<U> {
			Box::pin(f(request, identifier))
		}))
	}

	/// Validator called with the inbound request, the claimed identifier, and the profile.
	pub fn request_identifier_profile<F, Fut>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(AuthRequest, String, Profile) -> Fut,
		Fut: 'static + Send + Future<Output = Result<Verdict<U>, BoxError>>,
	{
		Self::RequestIdentifierProfile(Arc::new(
			move |request, identifier, profile| -> ValidatorFuture<U> {
				Box::pin(f(request, identifier, profile))
			},
		))
	}
}
impl<U> Validator<U> {
	/// Declared calling convention.
	pub fn shape(&self) -> ValidatorShape {
		match self {
			Self::Identifier(_) => ValidatorShape::Identifier,
			Self::IdentifierProfile(_) => ValidatorShape::IdentifierProfile,
			Self::RequestIdentifier(_) => ValidatorShape::RequestIdentifier,
			Self::RequestIdentifierProfile(_) => ValidatorShape::RequestIdentifierProfile,
		}
	}

	/// Calls the validator once with the arguments its shape expects.
	///
	/// `profile` is ignored by shapes that do not take one; shapes that do receive an empty
	/// profile if none was produced.
	pub(crate) async fn invoke(
		&self,
		request: &AuthRequest,
		identifier: String,
		profile: Option<Profile>,
	) -> Result<Verdict<U>> {
		let fut = match self {
			Self::Identifier(f) => f(identifier),
			Self::IdentifierProfile(f) => f(identifier, profile.unwrap_or_default()),
			Self::RequestIdentifier(f) => f(request.clone(), identifier),
			Self::RequestIdentifierProfile(f) =>
				f(request.clone(), identifier, profile.unwrap_or_default()),
		};

		fut.await.map_err(Error::validator)
	}
}
impl<U> Clone for Validator<U> {
	fn clone(&self) -> Self {
		match self {
			Self::Identifier(f) => Self::Identifier(f.clone()),
			Self::IdentifierProfile(f) => Self::IdentifierProfile(f.clone()),
			Self::RequestIdentifier(f) => Self::RequestIdentifier(f.clone()),
			Self::RequestIdentifierProfile(f) => Self::RequestIdentifierProfile(f.clone()),
		}
	}
}
impl<U> Debug for Validator<U> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Validator{}", self.shape())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::profile::ExtensionFields;

	#[test]
	fn shape_follows_flags() {
		assert_eq!(ValidatorShape::from_flags(false, false), ValidatorShape::Identifier);
		assert_eq!(ValidatorShape::from_flags(false, true), ValidatorShape::IdentifierProfile);
		assert_eq!(ValidatorShape::from_flags(true, false), ValidatorShape::RequestIdentifier);
		assert_eq!(
			ValidatorShape::from_flags(true, true),
			ValidatorShape::RequestIdentifierProfile
		);
		assert!(ValidatorShape::RequestIdentifier.takes_request());
		assert!(!ValidatorShape::RequestIdentifier.takes_profile());
	}

	#[test]
	fn constructors_declare_their_shape() {
		let v = Validator::<String>::identifier(|id| async move { Ok(Verdict::accept(id)) });

		assert_eq!(v.shape(), ValidatorShape::Identifier);

		let v = Validator::<String>::request_identifier_profile(|_, id, _| async move {
			Ok(Verdict::accept(id))
		});

		assert_eq!(v.shape(), ValidatorShape::RequestIdentifierProfile);
		assert_eq!(format!("{v:?}"), "Validator(request, identifier, profile)");
	}

	#[tokio::test]
	async fn invoke_passes_request_and_profile() {
		let request = AuthRequest::new("/return?openid.mode=id_res&tenant=acme");
		let profile = Profile::normalize(&ExtensionFields::default().with_sreg("fullname", "Jo"));
		let validator = Validator::request_identifier_profile(|req, id, profile| async move {
			Ok(Verdict::accept(format!(
				"{}:{id}:{}",
				req.query("tenant").unwrap_or_default(),
				profile.display_name
			)))
		});
		let verdict = validator
			.invoke(&request, "http://example.com/u".into(), Some(profile))
			.await
			.expect("Validator should succeed.");

		assert_eq!(verdict, Verdict::accept("acme:http://example.com/u:Jo".to_owned()));
	}

	#[tokio::test]
	async fn invoke_wraps_validator_errors() {
		let request = AuthRequest::new("/return");
		let validator = Validator::<String>::identifier(|_| async { Err("lookup failed".into()) });
		let err = validator
			.invoke(&request, "id".into(), None)
			.await
			.expect_err("Validator errors should propagate.");

		assert!(matches!(err, Error::Validator { .. }));
	}

	#[test]
	fn optional_user_converts_into_verdict() {
		assert_eq!(Verdict::from(Some(7)), Verdict::accept(7));
		assert_eq!(Verdict::<u8>::from(None), Verdict::reject());
	}
}
