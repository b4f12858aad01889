//! Optional observability helpers for the strategy.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run each authentication attempt inside a span named
//!   `openid_strategy.phase` with a `phase` field, and to log collaborator failures and final
//!   outcomes as events within it.
//! - Enable `metrics` to increment the `openid_strategy_outcome_total` counter once per
//!   attempt, labeled by `phase` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Protocol phase of an inbound request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
	/// The user agent submits an identifier; the strategy redirects to the provider.
	Initiate,
	/// The provider redirects back with a positive or negative assertion.
	Complete,
}
impl Phase {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Phase::Initiate => "initiate",
			Phase::Complete => "complete",
		}
	}
}
impl Display for Phase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
	/// User agent sent to the provider.
	Redirect,
	/// Validator accepted the identifier.
	Success,
	/// Expected, user-facing rejection.
	Failure,
	/// Unexpected, operator-facing error.
	Error,
}
impl OutcomeKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OutcomeKind::Redirect => "redirect",
			OutcomeKind::Success => "success",
			OutcomeKind::Failure => "failure",
			OutcomeKind::Error => "error",
		}
	}
}
impl Display for OutcomeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
