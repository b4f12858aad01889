//! Scripted relying-party engine shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use openid_strategy::{
	relying_party::{
		Assertion, RelyingParty, RelyingPartyError, RelyingPartyFuture, RelyingPartySetup,
	},
	url::Url,
};
use parking_lot::Mutex;

/// Calls observed by [`MockRelyingParty`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
	Authenticate { identifier: String, immediate: bool },
	VerifyAssertion { raw_url: String },
}

/// Shared view of what the engine saw, kept after the engine moves into the strategy.
#[derive(Clone, Debug, Default)]
pub struct Journal {
	calls: Arc<Mutex<Vec<Call>>>,
	setup: Arc<Mutex<Option<RelyingPartySetup>>>,
}
impl Journal {
	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub fn setup(&self) -> RelyingPartySetup {
		self.setup
			.lock()
			.clone()
			.expect("Strategy should install the relying party before use.")
	}

	fn record(&self, call: Call) {
		self.calls.lock().push(call);
	}
}

enum Discovery {
	Redirect(Url),
	NoProvider,
	Fail(String),
}

enum Verification {
	Assert(Assertion),
	Fail(String),
}

/// Engine that replays one scripted discovery and one scripted verification result.
pub struct MockRelyingParty {
	discovery: Discovery,
	verification: Verification,
	journal: Journal,
}
impl MockRelyingParty {
	pub fn new() -> Self {
		Self {
			discovery: Discovery::NoProvider,
			verification: Verification::Assert(Assertion::unauthenticated()),
			journal: Journal::default(),
		}
	}

	/// Handle that stays valid after the engine moves into a strategy.
	pub fn journal(&self) -> Journal {
		self.journal.clone()
	}

	pub fn redirect_to(mut self, url: &str) -> Self {
		self.discovery =
			Discovery::Redirect(Url::parse(url).expect("Provider URL fixture should parse."));

		self
	}

	pub fn discovery_fails(mut self, message: &str) -> Self {
		self.discovery = Discovery::Fail(message.into());

		self
	}

	pub fn asserts(mut self, assertion: Assertion) -> Self {
		self.verification = Verification::Assert(assertion);

		self
	}

	pub fn verification_fails(mut self, message: &str) -> Self {
		self.verification = Verification::Fail(message.into());

		self
	}
}
impl RelyingParty for MockRelyingParty {
	fn install(&mut self, setup: RelyingPartySetup) {
		*self.journal.setup.lock() = Some(setup);
	}

	fn authenticate<'a>(
		&'a self,
		identifier: &'a str,
		immediate: bool,
	) -> RelyingPartyFuture<'a, Option<Url>> {
		Box::pin(async move {
			self.journal.record(Call::Authenticate { identifier: identifier.into(), immediate });

			match &self.discovery {
				Discovery::Redirect(url) => Ok(Some(url.clone())),
				Discovery::NoProvider => Ok(None),
				Discovery::Fail(message) =>
					Err(RelyingPartyError::Discovery { message: message.clone() }),
			}
		})
	}

	fn verify_assertion<'a>(&'a self, raw_url: &'a str) -> RelyingPartyFuture<'a, Assertion> {
		Box::pin(async move {
			self.journal.record(Call::VerifyAssertion { raw_url: raw_url.into() });

			match &self.verification {
				Verification::Assert(assertion) => Ok(assertion.clone()),
				Verification::Fail(message) =>
					Err(RelyingPartyError::Assertion { message: message.clone() }),
			}
		})
	}
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("URL fixture should parse.")
}
