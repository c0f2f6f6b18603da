//! Caller-facing results and cache classification.

// std
use std::path::Path;
// self
use crate::{_prelude::*, obs::OutcomeKind};

/// Cache classification at the start of an acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheState {
	/// No record exists.
	NoCache,
	/// A record exists and is younger than the TTL.
	Fresh,
	/// A record exists but its age reached the TTL.
	Stale,
}
impl CacheState {
	/// Returns a stable label for spans.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::NoCache => "no_cache",
			Self::Fresh => "fresh",
			Self::Stale => "stale",
		}
	}
}
impl Display for CacheState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of one [`SpecManager::acquire`](crate::acquire::SpecManager::acquire) call.
#[derive(Debug)]
pub enum AcquisitionOutcome {
	/// Served from a record within the TTL; no network activity.
	Fresh(PathBuf),
	/// Served from an expired record; a background refresh may be running.
	StaleServed(PathBuf),
	/// No usable record existed; the caller waited for a successful fetch.
	Refreshed(PathBuf),
	/// The provider was unavailable; the cache was seeded from the bundled document.
	FallbackUsed(PathBuf),
	/// Nothing could be produced.
	Failed(Error),
}
impl AcquisitionOutcome {
	/// Location of the served document, if any.
	pub fn location(&self) -> Option<&Path> {
		match self {
			Self::Fresh(path)
			| Self::StaleServed(path)
			| Self::Refreshed(path)
			| Self::FallbackUsed(path) => Some(path),
			Self::Failed(_) => None,
		}
	}

	/// Label of this outcome.
	pub fn kind(&self) -> OutcomeKind {
		match self {
			Self::Fresh(_) => OutcomeKind::Fresh,
			Self::StaleServed(_) => OutcomeKind::StaleServed,
			Self::Refreshed(_) => OutcomeKind::Refreshed,
			Self::FallbackUsed(_) => OutcomeKind::FallbackUsed,
			Self::Failed(_) => OutcomeKind::Failed,
		}
	}

	/// Returns the location, or the terminal error.
	pub fn into_result(self) -> Result<PathBuf> {
		match self {
			Self::Fresh(path)
			| Self::StaleServed(path)
			| Self::Refreshed(path)
			| Self::FallbackUsed(path) => Ok(path),
			Self::Failed(error) => Err(error),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{error::FetchError, fallback::FallbackError};

	#[test]
	fn failed_outcome_has_no_location() {
		let outcome = AcquisitionOutcome::Failed(Error::Exhausted {
			upstream: Some(Box::new(FetchError::Empty.into())),
			source: FallbackError::Unavailable {
				location: "assets/openapi.yaml".into(),
				reason: "not found".into(),
			},
		});

		assert!(outcome.location().is_none());
		assert_eq!(outcome.kind(), OutcomeKind::Failed);
		assert!(matches!(outcome.into_result(), Err(Error::Exhausted { .. })));
	}

	#[test]
	fn served_outcomes_expose_location() {
		let path = PathBuf::from("/tmp/openapi.yaml");
		let outcome = AcquisitionOutcome::StaleServed(path.clone());

		assert_eq!(outcome.location(), Some(path.as_path()));
		assert_eq!(outcome.kind(), OutcomeKind::StaleServed);
		assert_eq!(outcome.into_result().expect("Stale outcome should carry a path."), path);
		assert_eq!(CacheState::NoCache.to_string(), "no_cache");
	}
}
