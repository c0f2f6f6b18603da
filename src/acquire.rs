//! Stale-while-revalidate orchestration over the credential, fetch, store, and fallback tiers.
//!
//! [`SpecManager::acquire`] classifies the cache ([`CacheState`]) and then:
//!
//! - `Fresh`: returns the cached location without touching the network.
//! - `Stale`: returns the cached location immediately and, unless one is already running,
//!   spawns a background refresh onto the Tokio runtime.
//! - `NoCache`: waits on the refresh guard, re-checks the store, and walks the
//!   [`Tier::ORDER`] chain, seeding the cache from whichever tier produced a document.
//!
//! Every attempt takes a generation from a monotonic counter when it starts; the store
//! discards writes from generations older than the committed one, so a slow refresh can
//! never overwrite a newer document.

mod metrics;
mod outcome;
mod refresh;
mod tier;

pub use metrics::AcquisitionMetrics;
pub use outcome::*;
pub use tier::{Tier, TierResult};

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	config::{DEFAULT_REFRESH_DEADLINE, DEFAULT_TTL, SpecSourceConfig},
	credential::CredentialIssuer,
	document::SpecDocument,
	fallback::FallbackProvider,
	fetch::{DocumentLocator, RemoteFetcher},
	http::ReqwestHttpClient,
	obs::{self, AcquireSpan, RefreshResult},
	store::{CacheStore, FileCache},
};

/// Owns the acquisition pipeline for one document source.
///
/// Clones share the cache, the generation counter, the refresh guard, and the metrics, so a
/// clone handed to another task coordinates with the original.
#[derive(Clone)]
pub struct SpecManager {
	locator: DocumentLocator,
	issuer: CredentialIssuer,
	fetcher: RemoteFetcher,
	store: Arc<dyn CacheStore>,
	fallback: FallbackProvider,
	ttl: Duration,
	refresh_deadline: Duration,
	generation: Arc<AtomicU64>,
	refresh_guard: Arc<AsyncMutex<()>>,
	metrics: Arc<AcquisitionMetrics>,
}
impl SpecManager {
	/// Creates a manager with the default TTL and refresh deadline.
	pub fn new(
		locator: DocumentLocator,
		issuer: CredentialIssuer,
		fetcher: RemoteFetcher,
		store: Arc<dyn CacheStore>,
		fallback: FallbackProvider,
	) -> Self {
		Self {
			locator,
			issuer,
			fetcher,
			store,
			fallback,
			ttl: DEFAULT_TTL,
			refresh_deadline: DEFAULT_REFRESH_DEADLINE,
			generation: Default::default(),
			refresh_guard: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Builds the reqwest transport, opens the file cache, and wires every tier from `config`.
	pub fn from_config(config: &SpecSourceConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::new(config.request_timeout)?;
		let issuer = CredentialIssuer::new(
			config.credentials.clone(),
			config.api_base.clone(),
			http_client.clone(),
		);
		let fetcher = RemoteFetcher::new(http_client);
		let store = FileCache::open(&config.cache_dir, &config.cache_file)?;

		Ok(Self::new(config.locator.clone(), issuer, fetcher, Arc::new(store), config.fallback.clone())
			.with_ttl(config.ttl)
			.with_refresh_deadline(config.refresh_deadline))
	}

	/// Sets the freshness window; a non-positive TTL treats every record as stale.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Sets the deadline for one token-plus-fetch cycle; a non-positive value keeps
	/// [`DEFAULT_REFRESH_DEADLINE`].
	pub fn with_refresh_deadline(mut self, deadline: Duration) -> Self {
		self.refresh_deadline = if deadline.is_positive() { deadline } else { DEFAULT_REFRESH_DEADLINE };

		self
	}

	/// Configured freshness window.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Where documents are fetched from.
	pub fn locator(&self) -> &DocumentLocator {
		&self.locator
	}

	/// Shared acquisition counters.
	pub fn metrics(&self) -> &AcquisitionMetrics {
		&self.metrics
	}

	/// Classifies the cache right now.
	pub fn state(&self) -> CacheState {
		self.state_at(OffsetDateTime::now_utc())
	}

	fn state_at(&self, now: OffsetDateTime) -> CacheState {
		match self.store.record() {
			None => CacheState::NoCache,
			Some(record) if record.is_fresh(self.ttl, now) => CacheState::Fresh,
			Some(_) => CacheState::Stale,
		}
	}

	/// Returns a location holding a complete document, or the terminal error.
	///
	/// Only the `NoCache` path waits on the network; fresh and stale records are served
	/// immediately.
	pub async fn acquire(&self) -> AcquisitionOutcome {
		let now = OffsetDateTime::now_utc();
		let state = self.state_at(now);
		let span = AcquireSpan::acquire("acquire", state.as_str());
		let outcome = span
			.instrument(async move {
				match state {
					CacheState::Fresh => {
						if let Some(record) = self.store.record() {
							obs::log_fresh_hit(&record.location, record.age_at(now));
						}

						AcquisitionOutcome::Fresh(self.store.location().to_path_buf())
					},
					CacheState::Stale => self.serve_stale(),
					CacheState::NoCache => self.acquire_blocking().await,
				}
			})
			.await;
		let kind = outcome.kind();

		if let AcquisitionOutcome::Failed(error) = &outcome {
			obs::log_acquire_failed(error);
		}

		self.metrics.record_outcome(kind);
		obs::record_acquire_outcome(kind);

		outcome
	}

	/// Acquires and reads back the served document.
	pub async fn acquire_document(&self) -> Result<SpecDocument> {
		self.acquire().await.into_result()?;

		Ok(self.store.read().await?)
	}

	fn serve_stale(&self) -> AcquisitionOutcome {
		match self.refresh_guard.try_lock_arc() {
			Some(guard) => self.spawn_refresh(guard),
			None => {
				obs::log_refresh_skipped();
				self.record_refresh(RefreshResult::Skipped);
			},
		}

		AcquisitionOutcome::StaleServed(self.store.location().to_path_buf())
	}

	async fn acquire_blocking(&self) -> AcquisitionOutcome {
		let _singleflight = self.refresh_guard.lock_arc().await;

		// Another caller may have seeded the cache while this one waited.
		match self.state() {
			CacheState::Fresh => return AcquisitionOutcome::Fresh(self.store.location().to_path_buf()),
			CacheState::Stale =>
				return AcquisitionOutcome::StaleServed(self.store.location().to_path_buf()),
			CacheState::NoCache => {},
		}

		let generation = self.next_generation();

		self.run_tiers(generation).await
	}

	fn next_generation(&self) -> u64 {
		self.generation.fetch_add(1, Ordering::SeqCst) + 1
	}
}
impl Debug for SpecManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SpecManager")
			.field("locator", &self.locator)
			.field("location", &self.store.location())
			.field("ttl", &self.ttl)
			.field("refresh_deadline", &self.refresh_deadline)
			.field("authenticated", &self.issuer.is_configured())
			.field("fallback", &self.fallback)
			.finish()
	}
}
