//! Terminal results of one authentication attempt and the host-framework dispatch contract.

// std
use std::borrow::Cow;
// self
use crate::{_prelude::*, error::BadRequestError, obs::OutcomeKind};

/// Message reported when the user cancels at the provider.
pub const CANCELED_MESSAGE: &str = "authentication canceled";

/// Info attached to a [`AuthenticationOutcome::Failure`].
#[derive(Clone, Debug, PartialEq)]
pub enum FailureInfo {
	/// No info.
	None,
	/// The user canceled at the provider.
	Canceled,
	/// The request carried no identifier.
	BadRequest(BadRequestError),
	/// Info supplied by the validator when it rejected the identifier.
	Validator(JsonValue),
}
impl FailureInfo {
	/// Human-readable message, when one is available.
	pub fn message(&self) -> Option<Cow<'_, str>> {
		match self {
			Self::None => None,
			Self::Canceled => Some(Cow::Borrowed(CANCELED_MESSAGE)),
			Self::BadRequest(err) => Some(Cow::Borrowed(err.message.as_str())),
			Self::Validator(JsonValue::String(message)) => Some(Cow::Borrowed(message.as_str())),
			Self::Validator(info) =>
				info.get("message").and_then(JsonValue::as_str).map(Cow::Borrowed),
		}
	}

	/// Returns the typed bad-request payload, if this failure is one.
	pub fn as_bad_request(&self) -> Option<&BadRequestError> {
		match self {
			Self::BadRequest(err) => Some(err),
			_ => None,
		}
	}
}
impl From<Option<JsonValue>> for FailureInfo {
	fn from(info: Option<JsonValue>) -> Self {
		info.map_or(Self::None, Self::Validator)
	}
}

/// Exactly one result per authentication attempt.
#[derive(Debug)]
pub enum AuthenticationOutcome<U> {
	/// Send the user agent to the provider.
	Redirect {
		/// Provider URL returned by the relying party.
		url: Url,
	},
	/// The validator accepted the identifier.
	Success {
		/// Authenticated user.
		user: U,
		/// Optional validator info.
		info: Option<JsonValue>,
	},
	/// Expected, user-facing failure.
	Failure {
		/// Failure details.
		info: FailureInfo,
	},
	/// Unexpected, operator-facing error.
	Error {
		/// Underlying cause.
		cause: Error,
	},
}
impl<U> AuthenticationOutcome<U> {
	/// Returns the outcome label.
	pub fn kind(&self) -> OutcomeKind {
		match self {
			Self::Redirect { .. } => OutcomeKind::Redirect,
			Self::Success { .. } => OutcomeKind::Success,
			Self::Failure { .. } => OutcomeKind::Failure,
			Self::Error { .. } => OutcomeKind::Error,
		}
	}

	/// Forwards the outcome to the matching host action.
	pub fn dispatch<A>(self, actions: &mut A)
	where
		A: ?Sized + AuthenticationActions<U>,
	{
		match self {
			Self::Redirect { url } => actions.redirect(url),
			Self::Success { user, info } => actions.success(user, info),
			Self::Failure { info } => actions.fail(info),
			Self::Error { cause } => actions.error(cause),
		}
	}

	pub(crate) fn error(cause: impl Into<Error>) -> Self {
		Self::Error { cause: cause.into() }
	}
}

/// Host-framework actions; the strategy calls exactly one per attempt.
pub trait AuthenticationActions<U> {
	/// Authentication succeeded.
	fn success(&mut self, user: U, info: Option<JsonValue>);

	/// Authentication failed for an expected reason.
	fn fail(&mut self, info: FailureInfo);

	/// Authentication hit an unexpected error.
	fn error(&mut self, cause: Error);

	/// The user agent must be redirected.
	fn redirect(&mut self, url: Url);
}
