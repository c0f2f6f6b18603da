// self
use crate::obs::{OutcomeKind, RefreshResult};

/// Records an acquisition outcome via the global metrics recorder (when enabled).
pub fn record_acquire_outcome(kind: OutcomeKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("spec_broker_acquire_total", "outcome" => kind.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

/// Records a refresh cycle result via the global metrics recorder (when enabled).
pub fn record_refresh_result(result: RefreshResult) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("spec_broker_refresh_total", "result" => result.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = result;
	}
}
