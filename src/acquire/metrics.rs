// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{OutcomeKind, RefreshResult};

/// Thread-safe counters for acquisitions and refresh cycles.
#[derive(Debug, Default)]
pub struct AcquisitionMetrics {
	fresh: AtomicU64,
	stale: AtomicU64,
	refreshed: AtomicU64,
	fallback: AtomicU64,
	failed: AtomicU64,
	refresh_started: AtomicU64,
	refresh_succeeded: AtomicU64,
	refresh_failed: AtomicU64,
	refresh_skipped: AtomicU64,
}
impl AcquisitionMetrics {
	/// Requests answered from a record within the TTL.
	pub fn fresh(&self) -> u64 {
		self.fresh.load(Ordering::Relaxed)
	}

	/// Requests answered from an expired record.
	pub fn stale(&self) -> u64 {
		self.stale.load(Ordering::Relaxed)
	}

	/// Requests that blocked on a successful network fetch.
	pub fn refreshed(&self) -> u64 {
		self.refreshed.load(Ordering::Relaxed)
	}

	/// Requests answered from the bundled document.
	pub fn fallback(&self) -> u64 {
		self.fallback.load(Ordering::Relaxed)
	}

	/// Requests that produced no document.
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	/// Refresh cycles started (background and forced).
	pub fn refresh_started(&self) -> u64 {
		self.refresh_started.load(Ordering::Relaxed)
	}

	/// Refresh cycles that fetched a document and reached the store, committed or superseded.
	pub fn refresh_succeeded(&self) -> u64 {
		self.refresh_succeeded.load(Ordering::Relaxed)
	}

	/// Refresh cycles that failed.
	pub fn refresh_failed(&self) -> u64 {
		self.refresh_failed.load(Ordering::Relaxed)
	}

	/// Stale requests that found a refresh already in flight.
	pub fn refresh_skipped(&self) -> u64 {
		self.refresh_skipped.load(Ordering::Relaxed)
	}

	pub(crate) fn record_outcome(&self, kind: OutcomeKind) {
		let counter = match kind {
			OutcomeKind::Fresh => &self.fresh,
			OutcomeKind::StaleServed => &self.stale,
			OutcomeKind::Refreshed => &self.refreshed,
			OutcomeKind::FallbackUsed => &self.fallback,
			OutcomeKind::Failed => &self.failed,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self, result: RefreshResult) {
		let counter = match result {
			RefreshResult::Started => &self.refresh_started,
			RefreshResult::Committed | RefreshResult::Superseded => &self.refresh_succeeded,
			RefreshResult::Failed => &self.refresh_failed,
			RefreshResult::Skipped => &self.refresh_skipped,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
