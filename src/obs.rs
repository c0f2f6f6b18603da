//! Optional observability helpers for acquisition cycles.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `spec_broker.acquire` (with
//!   `stage` and `state`) and `spec_broker.refresh` (with `stage` and `generation`), plus log
//!   events for refresh commits, background failures, and fallback use.
//! - Enable `metrics` to increment `spec_broker_acquire_total` (labeled by `outcome`) and
//!   `spec_broker_refresh_total` (labeled by `result`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels for one acquisition request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
	/// Cached record was within its TTL.
	Fresh,
	/// Cached record was past its TTL and served while a refresh runs.
	StaleServed,
	/// A foreground fetch produced a new record.
	Refreshed,
	/// The bundled document was served and seeded into the cache.
	FallbackUsed,
	/// No tier produced a document.
	Failed,
}
impl OutcomeKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OutcomeKind::Fresh => "fresh",
			OutcomeKind::StaleServed => "stale_served",
			OutcomeKind::Refreshed => "refreshed",
			OutcomeKind::FallbackUsed => "fallback_used",
			OutcomeKind::Failed => "failed",
		}
	}
}
impl Display for OutcomeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result labels for refresh cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshResult {
	/// A refresh cycle began.
	Started,
	/// The fetched document replaced the cached record.
	Committed,
	/// A newer write had already landed, so this one was discarded.
	Superseded,
	/// Credential, fetch, or write failure.
	Failed,
	/// Another refresh was already in flight.
	Skipped,
}
impl RefreshResult {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshResult::Started => "started",
			RefreshResult::Committed => "committed",
			RefreshResult::Superseded => "superseded",
			RefreshResult::Failed => "failed",
			RefreshResult::Skipped => "skipped",
		}
	}
}
impl Display for RefreshResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
