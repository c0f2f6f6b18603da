//! Bundled last-resort copy of the specification document.

// std
use std::{fs, path::Path};
// self
use crate::{_prelude::*, document::SpecDocument};

/// Relative path of the artifact shipped with the crate.
pub const DEFAULT_FALLBACK_PATH: &str = "assets/openapi.yaml";

/// Bundled artifact is missing or unusable. Indicates a packaging defect.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum FallbackError {
	/// The artifact cannot be read or is empty.
	#[error("Bundled document at {location} is unavailable: {reason}.")]
	Unavailable {
		/// Display form of the artifact location.
		location: String,
		/// Human-readable failure.
		reason: String,
	},
}

/// Source of the bundled document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackProvider {
	/// File shipped alongside the binary.
	File(PathBuf),
	/// Document compiled into the binary.
	Embedded(&'static str),
}
impl FallbackProvider {
	/// Reads the bundled document from `path` on every call.
	pub fn file(path: impl Into<PathBuf>) -> Self {
		Self::File(path.into())
	}

	/// Serves a compiled-in document.
	pub fn embedded(content: &'static str) -> Self {
		Self::Embedded(content)
	}

	/// Returns the bundled document.
	pub fn read(&self) -> Result<SpecDocument, FallbackError> {
		let document = match self {
			Self::File(path) => SpecDocument::from(fs::read_to_string(path).map_err(|e| {
				FallbackError::Unavailable { location: describe(path), reason: e.to_string() }
			})?),
			Self::Embedded(content) => SpecDocument::from(*content),
		};

		if document.is_empty() {
			return Err(FallbackError::Unavailable {
				location: self.to_string(),
				reason: "artifact is empty".into(),
			});
		}

		Ok(document)
	}
}
impl Default for FallbackProvider {
	fn default() -> Self {
		Self::file(DEFAULT_FALLBACK_PATH)
	}
}
impl Display for FallbackProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::File(path) => f.write_str(&describe(path)),
			Self::Embedded(_) => f.write_str("<embedded>"),
		}
	}
}

fn describe(path: &Path) -> String {
	path.display().to_string()
}
