//! Cache storage contract and the file-backed implementation.

pub mod file;

pub use file::FileCache;

// std
use std::path::Path;
// self
use crate::{_prelude::*, document::SpecDocument};

/// Boxed future returned by [`CacheStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable storage for the last known-good document.
///
/// Metadata queries are synchronous; reads and writes return boxed futures so backends may
/// perform I/O. `write` is the only mutation and must be atomic: a concurrent reader sees the
/// previous complete document or the new one, never a mix.
pub trait CacheStore
where
	Self: Send + Sync,
{
	/// Stable handle to the cached document, valid whether or not a record exists.
	fn location(&self) -> &Path;

	/// Metadata of the committed record, if any.
	fn record(&self) -> Option<CacheRecord>;

	/// Returns `true` when any record exists, regardless of age.
	fn exists(&self) -> bool {
		self.record().is_some()
	}

	/// Returns `true` when a record exists and is younger than `ttl` at `now`.
	fn is_fresh(&self, ttl: Duration, now: OffsetDateTime) -> bool {
		self.record().is_some_and(|record| record.is_fresh(ttl, now))
	}

	/// Reads the committed document.
	fn read(&self) -> StoreFuture<'_, SpecDocument>;

	/// Atomically replaces the record unless a write from a newer generation already landed.
	fn write(&self, document: SpecDocument, generation: u64) -> StoreFuture<'_, WriteOutcome>;
}

/// Metadata describing the committed cache entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheRecord {
	/// Path of the cached document.
	pub location: PathBuf,
	/// Instant the document was committed.
	pub written_at: OffsetDateTime,
	/// Attempt generation that produced the document (0 for records adopted from disk).
	pub generation: u64,
}
impl CacheRecord {
	/// Age of the record at `now`.
	pub fn age_at(&self, now: OffsetDateTime) -> Duration {
		now - self.written_at
	}

	/// Freshness check; a non-positive `ttl` treats every record as stale.
	pub fn is_fresh(&self, ttl: Duration, now: OffsetDateTime) -> bool {
		ttl.is_positive() && self.age_at(now) < ttl
	}
}

/// Result of a generation-guarded write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
	/// The document replaced the record.
	Committed(CacheRecord),
	/// A write from a newer generation had already committed; this one was discarded.
	Superseded {
		/// Generation of the record that remains.
		committed: u64,
	},
}

/// Error type produced by [`CacheStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// No record exists at the location.
	#[error("No cached document at {location}.")]
	Missing {
		/// Display form of the probed location.
		location: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
