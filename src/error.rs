//! Crate-level error types shared across the credential, fetch, storage, and fallback tiers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Installation token issuance failed.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Provider was reached but the document could not be retrieved.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// Cache read or write failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Bundled document is missing.
	#[error(transparent)]
	Fallback(#[from] crate::fallback::FallbackError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Every tier failed; carries the upstream cause and the bundled-document failure.
	#[error("No usable specification document is available.")]
	Exhausted {
		/// Failure of the network tier, when one was attempted.
		upstream: Option<Box<Error>>,
		/// Failure of the final (bundled) tier.
		#[source]
		source: crate::fallback::FallbackError,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured URL cannot be parsed.
	#[error("Configured value `{key}` is not a valid URL.")]
	InvalidUrl {
		/// Configuration key holding the value.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured number cannot be parsed.
	#[error("Configured value `{key}` is not a valid integer: {value}.")]
	InvalidNumber {
		/// Configuration key holding the value.
		key: &'static str,
		/// Raw value supplied.
		value: String,
	},
	/// A configured switch is neither truthy nor falsy.
	#[error("Configured value `{key}` is not a valid boolean: {value}.")]
	InvalidFlag {
		/// Configuration key holding the value.
		key: &'static str,
		/// Raw value supplied.
		value: String,
	},
	/// Identifier validation failed.
	#[error("Identifier is invalid.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Repository locator is incomplete.
	#[error("Repository locator requires {missing}.")]
	IncompleteLocator {
		/// Missing component label.
		missing: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Installation token issuance failures.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// Private key could not be parsed or used for signing.
	#[error("Private key cannot sign the app assertion.")]
	InvalidKey {
		/// Signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Provider rejected the signed assertion.
	#[error("Token endpoint returned {status}: {reason}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Provider- or transport-supplied reason string.
		reason: String,
	},
	/// Token endpoint returned a payload that could not be parsed.
	#[error("Token endpoint returned a malformed payload.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint returned an unparsable expiry.
	#[error("Token endpoint returned an invalid expiry `{value}`.")]
	InvalidExpiry {
		/// Raw expiry string.
		value: String,
		/// Parsing failure.
		#[source]
		source: time::error::Parse,
	},
	/// Network failure while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Document retrieval failures.
#[derive(Debug, ThisError)]
pub enum FetchError {
	/// Provider answered with a non-success status.
	#[error("Document endpoint returned {status}: {reason}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Provider- or transport-supplied reason string.
		reason: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Contents envelope is missing fields or carries an unexpected marker.
	#[error("Document envelope is malformed: {reason}.")]
	Envelope {
		/// Description of the defect.
		reason: String,
	},
	/// Envelope JSON could not be parsed.
	#[error("Document envelope is not valid JSON.")]
	EnvelopeParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Envelope content is not valid base64.
	#[error("Document content is not valid base64.")]
	Decode(#[from] base64::DecodeError),
	/// Document bytes are not UTF-8 text.
	#[error("Document content is not valid UTF-8.")]
	Utf8(#[from] std::string::FromUtf8Error),
	/// Provider returned an empty document.
	#[error("Document endpoint returned an empty body.")]
	Empty,
	/// Refresh cycle exceeded its deadline.
	#[error("Refresh did not finish within {deadline}.")]
	Timeout {
		/// Deadline that elapsed.
		deadline: Duration,
	},
	/// Network failure while calling the document endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
impl From<ReqwestError> for CredentialError {
	fn from(e: ReqwestError) -> Self {
		Self::Transport(e.into())
	}
}
impl From<ReqwestError> for FetchError {
	fn from(e: ReqwestError) -> Self {
		Self::Transport(e.into())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::fallback::FallbackError;

	#[test]
	fn exhausted_error_chains_fallback_cause() {
		let upstream = Error::from(FetchError::Status {
			status: 503,
			reason: "Service Unavailable".into(),
			retry_after: None,
		});
		let error = Error::Exhausted {
			upstream: Some(Box::new(upstream)),
			source: FallbackError::Unavailable {
				location: "assets/openapi.yaml".into(),
				reason: "not found".into(),
			},
		};
		let source = StdError::source(&error).expect("Exhausted error should expose its source.");

		assert!(source.to_string().contains("assets/openapi.yaml"));
		assert!(matches!(
			&error,
			Error::Exhausted { upstream: Some(inner), .. }
				if matches!(**inner, Error::Fetch(FetchError::Status { status: 503, .. }))
		));
	}
}
