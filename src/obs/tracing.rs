// std
use std::path::Path;
// self
use crate::{_prelude::*, document::SpecDocument};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by acquisition and refresh cycles.
#[derive(Clone, Debug)]
pub struct AcquireSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AcquireSpan {
	/// Creates a span for a caller-facing acquisition at `stage`, tagged with the cache `state`
	/// observed on entry.
	pub fn acquire(stage: &'static str, state: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("spec_broker.acquire", stage, state) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, state);

			Self {}
		}
	}

	/// Creates a span for a refresh cycle at `stage`.
	pub fn refresh(stage: &'static str, generation: u64) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("spec_broker.refresh", stage, generation) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, generation);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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
}

/// Logs a cache hit within the TTL.
pub fn log_fresh_hit(location: &Path, age: Duration) {
	#[cfg(feature = "tracing")]
	tracing::debug!(location = %location.display(), age = %age, "Serving fresh cached document.");
	#[cfg(not(feature = "tracing"))]
	let _ = (location, age);
}

/// Logs a committed refresh.
pub fn log_refresh_committed(generation: u64, document: &SpecDocument) {
	#[cfg(feature = "tracing")]
	tracing::info!(
		generation,
		bytes = document.len(),
		digest = %document.digest(),
		"Cached specification document replaced."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (generation, document);
}

/// Logs a write discarded because a newer generation already landed.
pub fn log_refresh_superseded(generation: u64, committed: u64) {
	#[cfg(feature = "tracing")]
	tracing::debug!(generation, committed, "Discarded write from an older refresh generation.");
	#[cfg(not(feature = "tracing"))]
	let _ = (generation, committed);
}

/// Logs a stale request that found a refresh already in flight.
pub fn log_refresh_skipped() {
	#[cfg(feature = "tracing")]
	tracing::debug!("Refresh already in flight; serving stale document.");
}

/// Logs a background refresh failure; the stale record stays authoritative.
pub fn log_background_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %error, source = ?StdError::source(error), "Background refresh failed; keeping cached document.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs a network-tier failure that triggered the bundled fallback.
pub fn log_fallback_used(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %error, "Provider unavailable; seeding cache from bundled document.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs the terminal failure returned to the caller.
pub fn log_acquire_failed(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::error!(error = %error, source = ?StdError::source(error), "No specification document could be produced.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs credentials that were only partially configured.
pub fn log_partial_credentials(present: &[&'static str]) {
	#[cfg(feature = "tracing")]
	tracing::warn!(?present, "Partial app credentials configured; fetching anonymously.");
	#[cfg(not(feature = "tracing"))]
	let _ = present;
}
