//! Immutable specification document handed between tiers.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Raw textual content of the specification.
///
/// Cloning shares the underlying buffer; a new fetch always produces a new instance.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SpecDocument(Arc<str>);
impl SpecDocument {
	/// Wraps document text.
	pub fn new(content: impl Into<Arc<str>>) -> Self {
		Self(content.into())
	}

	/// Borrows the document text.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Byte length of the document.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the document has no content.
	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}

	/// Base64 (no padding) SHA-256 digest, used to tell whether a refresh changed anything.
	pub fn digest(&self) -> String {
		STANDARD_NO_PAD.encode(Sha256::digest(self.0.as_bytes()))
	}
}
impl AsRef<str> for SpecDocument {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
impl From<String> for SpecDocument {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl From<&str> for SpecDocument {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl Debug for SpecDocument {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SpecDocument")
			.field("len", &self.len())
			.field("digest", &self.digest())
			.finish()
	}
}
impl Display for SpecDocument {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn digest_tracks_content() {
		let a = SpecDocument::from("openapi: 3.1.0\n");
		let b = SpecDocument::from(String::from("openapi: 3.1.0\n"));
		let c = SpecDocument::from("openapi: 3.0.3\n");

		assert_eq!(a.digest(), b.digest());
		assert_ne!(a.digest(), c.digest());
		assert_eq!(a, b);
	}

	#[test]
	fn whitespace_only_documents_are_empty() {
		assert!(SpecDocument::from(" \n\t").is_empty());
		assert!(!SpecDocument::from("openapi: 3.1.0").is_empty());
	}
}
