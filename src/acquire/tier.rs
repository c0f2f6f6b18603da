//! Ordered acquisition tiers used when no cached record can be served.
//!
//! The chain is `[Network, Bundled]`. Each attempt yields a [`TierResult`]; the first
//! document produced is written to the cache, and failures accumulate into a single
//! terminal error so the caller never sees a partial result.

// self
use crate::{
	_prelude::*,
	acquire::{AcquisitionOutcome, SpecManager},
	document::SpecDocument,
	fallback::FallbackError,
	obs,
	store::WriteOutcome,
};

/// A source consulted when the cache cannot answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
	/// Credential issuance followed by a remote fetch.
	Network,
	/// The document bundled with the deployment.
	Bundled,
}
impl Tier {
	/// Order in which tiers are consulted.
	pub const ORDER: [Tier; 2] = [Tier::Network, Tier::Bundled];

	/// Returns a stable label for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Network => "network",
			Self::Bundled => "bundled",
		}
	}

	fn served(self, location: PathBuf) -> AcquisitionOutcome {
		match self {
			Self::Network => AcquisitionOutcome::Refreshed(location),
			Self::Bundled => AcquisitionOutcome::FallbackUsed(location),
		}
	}
}

/// Result of consulting one tier.
#[derive(Debug)]
pub enum TierResult {
	/// The tier produced a document.
	Produced(SpecDocument),
	/// The tier failed; the chain moves on.
	Unavailable(Error),
}

/// Merges a tier failure into the running failure.
///
/// A bundled failure after a network failure becomes [`Error::Exhausted`] carrying both.
fn accumulate(previous: Option<Error>, error: Error) -> Error {
	match error {
		Error::Fallback(source) => Error::Exhausted { upstream: previous.map(Box::new), source },
		other => other,
	}
}

impl SpecManager {
	/// Consults one tier.
	pub(crate) async fn attempt(&self, tier: Tier) -> TierResult {
		let result = match tier {
			Tier::Network => self.fetch_within_deadline().await,
			Tier::Bundled => self.fallback.read().map_err(Error::from),
		};

		match result {
			Ok(document) => TierResult::Produced(document),
			Err(error) => TierResult::Unavailable(error),
		}
	}

	/// Walks [`Tier::ORDER`] and commits the first document produced under `generation`.
	pub(crate) async fn run_tiers(&self, generation: u64) -> AcquisitionOutcome {
		let mut failure = None;

		for tier in Tier::ORDER {
			match self.attempt(tier).await {
				TierResult::Produced(document) => {
					if let Some(upstream) = &failure {
						obs::log_fallback_used(upstream);
					}

					return match self.store.write(document, generation).await {
						Ok(WriteOutcome::Committed(record)) => tier.served(record.location),
						// A newer attempt already committed; its document is at the same location.
						Ok(WriteOutcome::Superseded { .. }) =>
							tier.served(self.store.location().to_path_buf()),
						Err(error) => AcquisitionOutcome::Failed(error.into()),
					};
				},
				TierResult::Unavailable(error) => failure = Some(accumulate(failure, error)),
			}
		}

		AcquisitionOutcome::Failed(failure.unwrap_or_else(|| Error::Exhausted {
			upstream: None,
			source: FallbackError::Unavailable {
				location: self.fallback.to_string(),
				reason: "no tier was consulted".into(),
			},
		}))
	}
}
