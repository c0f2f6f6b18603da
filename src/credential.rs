//! GitHub App installation token issuance.
//!
//! [`CredentialIssuer::issue`] turns an app identity plus RSA private key into a
//! short-lived installation token: it signs an RS256 assertion (`iat` backdated for clock
//! skew, `exp` a few minutes out, `iss` = app id) and exchanges it at
//! `POST /app/installations/{id}/access_tokens`. Unconfigured issuers return `None` without
//! touching the network. Nothing here retries; tiering in the manager handles failures.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AppCredentials, TokenSecret},
	error::CredentialError,
	http::{self, ReqwestHttpClient},
};

/// Default provider API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Backdating applied to `iat` to tolerate provider clock drift.
pub const ASSERTION_SKEW: Duration = Duration::seconds(60);
/// Lifetime of the signed assertion measured from the real issue instant.
pub const ASSERTION_LIFETIME: Duration = Duration::minutes(9);

/// Registered claims carried by the app assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Issued-at, seconds since the epoch (backdated by [`ASSERTION_SKEW`]).
	pub iat: i64,
	/// Expiry, seconds since the epoch.
	pub exp: i64,
	/// App identifier.
	pub iss: String,
}
impl AssertionClaims {
	/// Builds the claim set for `app_id` relative to `now`.
	pub fn new(app_id: &str, now: OffsetDateTime) -> Self {
		Self {
			iat: (now - ASSERTION_SKEW).unix_timestamp(),
			exp: (now + ASSERTION_LIFETIME).unix_timestamp(),
			iss: app_id.to_owned(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct InstallationTokenResponse {
	token: String,
	expires_at: String,
}

/// Mints installation tokens for the configured app, or nothing when unconfigured.
#[derive(Clone, Debug)]
pub struct CredentialIssuer {
	credentials: Option<AppCredentials>,
	api_base: Url,
	http_client: ReqwestHttpClient,
}
impl CredentialIssuer {
	/// Creates an issuer that exchanges assertions at `api_base`.
	pub fn new(
		credentials: Option<AppCredentials>,
		api_base: Url,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self { credentials, api_base, http_client }
	}

	/// Returns `true` when app credentials are present.
	pub fn is_configured(&self) -> bool {
		self.credentials.is_some()
	}

	/// Signs the app assertion at `now`.
	pub fn sign_assertion(
		credentials: &AppCredentials,
		now: OffsetDateTime,
	) -> Result<TokenSecret, CredentialError> {
		let claims = AssertionClaims::new(&credentials.app_id, now);
		let key = EncodingKey::from_rsa_pem(credentials.private_key.expose().as_bytes())
			.map_err(|source| CredentialError::InvalidKey { source })?;
		let jwt = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
			.map_err(|source| CredentialError::InvalidKey { source })?;

		Ok(TokenSecret::new(jwt))
	}

	/// Issues a fresh installation token, or `None` when no credentials are configured.
	pub async fn issue(&self) -> Result<Option<AccessToken>, CredentialError> {
		let Some(credentials) = &self.credentials else {
			return Ok(None);
		};
		let issued_at = OffsetDateTime::now_utc();
		let assertion = Self::sign_assertion(credentials, issued_at)?;
		let endpoint = api_endpoint(
			&self.api_base,
			["app", "installations", &*credentials.installation_id, "access_tokens"],
		);
		let response =
			http::with_github_auth(self.http_client.post(endpoint), &assertion).send().await?;
		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(CredentialError::Rejected {
				status: status.as_u16(),
				reason: http::failure_reason(status, &body),
			});
		}

		let de = &mut serde_json::Deserializer::from_str(&body);
		let payload: InstallationTokenResponse = serde_path_to_error::deserialize(de)
			.map_err(|source| CredentialError::Malformed { source })?;
		let expires_at = OffsetDateTime::parse(&payload.expires_at, &Rfc3339).map_err(|source| {
			CredentialError::InvalidExpiry { value: payload.expires_at.clone(), source }
		})?;

		Ok(Some(AccessToken::new(payload.token, issued_at, expires_at)))
	}
}

/// Appends path segments to an API base, preserving any base path (e.g. `/api/v3`).
pub(crate) fn api_endpoint<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
	let mut url = base.clone();

	if let Ok(mut path) = url.path_segments_mut() {
		path.pop_if_empty().extend(segments);
	}

	url
}
