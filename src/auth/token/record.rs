//! Short-lived installation access tokens.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Lifecycle status for an [`AccessToken`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Issued-at instant lies in the future (clock skew).
	Pending,
	/// Token is currently valid.
	Active,
	/// Token exceeded its expiry instant.
	Expired,
}

/// Bearer credential minted per acquisition attempt and consumed by a single fetch.
///
/// Tokens are never persisted; the issuer is cheap to call again, so each refresh cycle
/// mints its own.
#[derive(Clone)]
pub struct AccessToken {
	/// Opaque bearer value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Instant the provider issued the token.
	pub issued_at: OffsetDateTime,
	/// Instant the provider stops accepting the token.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token from its parts.
	pub fn new(
		value: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_at: OffsetDateTime,
	) -> Self {
		Self { value: TokenSecret::new(value), issued_at, expires_at }
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.issued_at {
			return TokenStatus::Pending;
		}
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn token() -> AccessToken {
		AccessToken::new(
			"ghs_fixture",
			macros::datetime!(2025-01-01 00:00 UTC),
			macros::datetime!(2025-01-01 01:00 UTC),
		)
	}

	#[test]
	fn status_transitions_cover_all_states() {
		let token = token();

		assert_eq!(token.status_at(macros::datetime!(2024-12-31 23:59 UTC)), TokenStatus::Pending);
		assert_eq!(token.status_at(macros::datetime!(2025-01-01 00:30 UTC)), TokenStatus::Active);
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
	}

	#[test]
	fn debug_output_redacts_value() {
		let rendered = format!("{:?}", token());

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("ghs_fixture"));
	}
}
