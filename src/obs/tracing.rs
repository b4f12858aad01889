// self
use crate::{
	_prelude::*,
	obs::{OutcomeKind, Phase},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedPhase<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedPhase<F> = F;

/// Span wrapping one authentication attempt.
#[derive(Clone, Debug)]
pub struct PhaseSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl PhaseSpan {
	/// Creates a new span tagged with the provided phase.
	pub fn new(phase: Phase) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("openid_strategy.phase", phase = phase.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = phase;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedPhase<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Logs the terminal outcome inside the span.
	pub fn outcome(&self, outcome: OutcomeKind) {
		#[cfg(feature = "tracing")]
		{
			let _entered = self.span.enter();

			tracing::debug!(outcome = outcome.as_str(), "authentication attempt finished");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = outcome;
		}
	}

	/// Logs a collaborator or validator failure inside the span.
	pub fn failure(&self, stage: &'static str, error: &dyn StdError) {
		#[cfg(feature = "tracing")]
		{
			let _entered = self.span.enter();

			tracing::warn!(stage, error = %error, "authentication step failed");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, error);
		}
	}
}
