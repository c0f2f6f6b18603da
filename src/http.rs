//! Shared HTTP plumbing for the credential and document tiers.
//!
//! [`ReqwestHttpClient`] owns the single reqwest client both tiers use, so timeouts and
//! caching behavior are configured in one place. [`ResponseMetadata`] captures the status
//! and `Retry-After` hint of a response before the body is consumed, which lets callers
//! classify failures with consistent metadata.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{
	RequestBuilder, Response, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, HeaderMap, PRAGMA, RETRY_AFTER, USER_AGENT},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, config::DEFAULT_REQUEST_TIMEOUT, error::ConfigError};

/// Media type requested from the GitHub REST API.
pub const GITHUB_JSON: &str = "application/vnd.github+json";
/// Header carrying the pinned REST API version.
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
/// Pinned REST API version.
pub const API_VERSION: &str = "2022-11-28";

const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REASON_PREVIEW_LIMIT: usize = 256;

/// Captures metadata from an HTTP response for downstream error mapping.
///
/// Additional metadata fields may be added in future releases, so downstream code
/// should construct values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	/// Reads retry hints from a response without consuming its body.
	pub fn capture(response: &Response) -> Self {
		Self { retry_after: parse_retry_after(response.headers()) }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The wrapped client carries no response cache; every request made through
/// [`ReqwestHttpClient::get_uncached`] also asks intermediaries to revalidate.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client bounded by `timeout`; a non-positive value uses
	/// [`DEFAULT_REQUEST_TIMEOUT`].
	pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
		let timeout = effective_timeout(timeout);
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.connect_timeout(timeout.min(StdDuration::from_secs(5)))
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Starts a GET request that bypasses every cache layer.
	pub fn get_uncached(&self, url: Url) -> RequestBuilder {
		self.0
			.get(url)
			.header(CACHE_CONTROL, "no-cache, no-store")
			.header(PRAGMA, "no-cache")
			.header(USER_AGENT, CLIENT_USER_AGENT)
	}

	/// Starts a POST request with the client's user agent.
	pub fn post(&self, url: Url) -> RequestBuilder {
		self.0.post(url).header(USER_AGENT, CLIENT_USER_AGENT)
	}
}
/// Applies bearer auth plus the GitHub media-type and version headers.
pub fn with_github_auth(request: RequestBuilder, bearer: &TokenSecret) -> RequestBuilder {
	request
		.header(AUTHORIZATION, format!("Bearer {}", bearer.expose()))
		.header(ACCEPT, GITHUB_JSON)
		.header(API_VERSION_HEADER, API_VERSION)
}

/// Derives a short failure reason from a non-success response body.
///
/// Falls back to the canonical status text when the body is empty.
pub fn failure_reason(status: StatusCode, body: &str) -> String {
	let trimmed = body.trim();

	if trimmed.is_empty() {
		return status.canonical_reason().unwrap_or("unknown status").to_owned();
	}
	if let Some(message) = serde_json::from_str::<serde_json::Value>(trimmed)
		.ok()
		.and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_owned))
	{
		return message;
	}

	trimmed.chars().take(REASON_PREVIEW_LIMIT).collect()
}

fn effective_timeout(timeout: Duration) -> StdDuration {
	let timeout = if timeout.is_positive() { timeout } else { DEFAULT_REQUEST_TIMEOUT };

	timeout.unsigned_abs()
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(120)));
	}

	#[test]
	fn retry_after_rejects_out_of_range_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("18446744073709551615"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("9223372036854775807"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(i64::MAX)));
	}

	#[test]
	fn non_positive_timeouts_use_default() {
		assert_eq!(effective_timeout(Duration::ZERO), StdDuration::from_secs(10));
		assert_eq!(effective_timeout(Duration::seconds(-3)), StdDuration::from_secs(10));
		assert_eq!(effective_timeout(Duration::milliseconds(1_500)), StdDuration::from_millis(1_500));
	}

	#[test]
	fn retry_after_ignores_past_dates_and_garbage() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn failure_reason_prefers_provider_message() {
		assert_eq!(
			failure_reason(StatusCode::UNAUTHORIZED, "{\"message\":\"Bad credentials\"}"),
			"Bad credentials"
		);
		assert_eq!(failure_reason(StatusCode::NOT_FOUND, "  "), "Not Found");
		assert_eq!(failure_reason(StatusCode::BAD_GATEWAY, "x".repeat(400).as_str()).len(), 256);
	}
}
