// self
use crate::obs::{OutcomeKind, Phase};

/// Records an authentication outcome via the global metrics recorder (when enabled).
pub fn record_outcome(phase: Phase, outcome: OutcomeKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"openid_strategy_outcome_total",
			"phase" => phase.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (phase, outcome);
	}
}
