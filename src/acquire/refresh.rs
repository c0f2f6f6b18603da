//! Refresh cycles: issue a token, fetch, and commit under a generation guard.
//!
//! Background refreshes start from the stale path with the single-flight guard already held;
//! the guard travels into the spawned task, so a second refresh can only begin once the first
//! one has finished. Failures are logged and leave the committed record untouched.

// crates.io
use async_lock::MutexGuardArc;
// self
use crate::{
	_prelude::*,
	acquire::SpecManager,
	document::SpecDocument,
	error::FetchError,
	obs::{self, AcquireSpan, RefreshResult},
	store::{CacheRecord, WriteOutcome},
};

impl SpecManager {
	/// Issues a token and fetches the document, bounded by the refresh deadline.
	pub(crate) async fn fetch_within_deadline(&self) -> Result<SpecDocument> {
		let deadline = self.refresh_deadline.unsigned_abs();

		match tokio::time::timeout(deadline, self.fetch_remote()).await {
			Ok(result) => result,
			Err(_) => Err(FetchError::Timeout { deadline: self.refresh_deadline }.into()),
		}
	}

	async fn fetch_remote(&self) -> Result<SpecDocument> {
		let token = self.issuer.issue().await?;
		let document = self.fetcher.fetch(&self.locator, token.as_ref()).await?;

		Ok(document)
	}

	/// Runs one refresh cycle under `generation` and records its result.
	pub(crate) async fn refresh_cycle(&self, generation: u64) -> Result<WriteOutcome> {
		self.record_refresh(RefreshResult::Started);

		let result = async {
			let document = self.fetch_within_deadline().await?;
			let outcome = self.store.write(document.clone(), generation).await?;

			match &outcome {
				WriteOutcome::Committed(_) => obs::log_refresh_committed(generation, &document),
				WriteOutcome::Superseded { committed } =>
					obs::log_refresh_superseded(generation, *committed),
			}

			Ok::<_, Error>(outcome)
		}
		.await;

		match &result {
			Ok(WriteOutcome::Committed(_)) => self.record_refresh(RefreshResult::Committed),
			Ok(WriteOutcome::Superseded { .. }) => self.record_refresh(RefreshResult::Superseded),
			Err(_) => self.record_refresh(RefreshResult::Failed),
		}

		result
	}

	/// Spawns a background refresh that owns `guard` until it finishes.
	pub(crate) fn spawn_refresh(&self, guard: MutexGuardArc<()>) {
		let manager = self.clone();
		let generation = self.next_generation();

		tokio::spawn(async move {
			let _singleflight = guard;
			let span = AcquireSpan::refresh("background", generation);

			if let Err(error) = span.instrument(manager.refresh_cycle(generation)).await {
				obs::log_background_failure(&error);
			}
		});
	}

	/// Forces a foreground refresh regardless of freshness.
	///
	/// Waits for any in-flight refresh first. Failures are returned and leave the cache
	/// untouched; a write superseded by a newer generation still reports the cache location.
	pub async fn refresh_now(&self) -> Result<PathBuf> {
		let _singleflight = self.refresh_guard.lock_arc().await;
		let generation = self.next_generation();
		let span = AcquireSpan::refresh("refresh_now", generation);
		let outcome = span.instrument(self.refresh_cycle(generation)).await?;

		Ok(match outcome {
			WriteOutcome::Committed(CacheRecord { location, .. }) => location,
			WriteOutcome::Superseded { .. } => self.store.location().to_path_buf(),
		})
	}

	/// Waits until no refresh is in flight.
	pub async fn settle(&self) {
		drop(self.refresh_guard.lock().await);
	}

	pub(crate) fn record_refresh(&self, result: RefreshResult) {
		self.metrics.record_refresh(result);
		obs::record_refresh_result(result);
	}
}
