// std
use std::collections::HashMap;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use httpmock::prelude::*;
use time::macros;
// self
use spec_broker::{
	_preludet::*,
	acquire::{AcquisitionOutcome, SpecManager},
	auth::TokenStatus,
	config::SpecSourceConfig,
	credential::CredentialIssuer,
	error::CredentialError,
	fallback::FallbackProvider,
	fetch::DocumentLocator,
};

const DOCUMENT: &str = "openapi: 3.1.0\ninfo:\n  title: Private\n  version: 1.0.0\n";
const BUNDLED: &str = "openapi: 3.1.0\ninfo:\n  title: Bundled\n  version: 0.0.0\n";

fn repository_locator(server: &MockServer) -> DocumentLocator {
	DocumentLocator::Repository {
		api_base: Url::parse(&server.base_url()).expect("Mock API base should parse."),
		owner: "acme".into(),
		repo: "private-specs".into(),
		path: "openapi.yaml".into(),
		reference: Some("main".into()),
	}
}

fn issuer(server: &MockServer) -> CredentialIssuer {
	CredentialIssuer::new(
		Some(test_app_credentials()),
		Url::parse(&server.base_url()).expect("Mock API base should parse."),
		test_reqwest_http_client(),
	)
}

#[tokio::test]
async fn installation_token_authorizes_contents_fetch() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/app/installations/8080/access_tokens")
				.header_exists("authorization")
				.header("accept", "application/vnd.github+json")
				.header("x-github-api-version", "2022-11-28")
				.header_exists("user-agent");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"token\":\"ghs_installation\",\"expires_at\":\"2099-01-01T00:00:00Z\"}");
		})
		.await;
	let contents_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/repos/acme/private-specs/contents/openapi.yaml")
				.query_param("ref", "main")
				.header("authorization", "Bearer ghs_installation")
				.header("cache-control", "no-cache, no-store");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"type": "file",
					"encoding": "base64",
					"content": STANDARD.encode(DOCUMENT),
				}),
			);
		})
		.await;
	let dir = tempfile::tempdir().expect("Temporary cache directory should be created.");
	let manager = build_test_manager(
		repository_locator(&server),
		Some(test_app_credentials()),
		&server.base_url(),
		test_file_cache(dir.path()),
		FallbackProvider::embedded(BUNDLED),
		Duration::minutes(2),
	);
	let document = manager.acquire_document().await.expect("Authenticated fetch should succeed.");

	assert_eq!(document.as_str(), DOCUMENT);

	token_mock.assert_calls_async(1).await;
	contents_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn issued_token_carries_provider_expiry() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/app/installations/8080/access_tokens");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"token\":\"ghs_expiring\",\"expires_at\":\"2099-01-01T00:00:00Z\"}");
		})
		.await;
	let token = issuer(&server)
		.issue()
		.await
		.expect("Token exchange should succeed.")
		.expect("Configured issuer should return a token.");

	assert_eq!(token.value.expose(), "ghs_expiring");
	assert_eq!(token.expires_at, macros::datetime!(2099-01-01 00:00 UTC));
	assert_eq!(token.status_at(OffsetDateTime::now_utc()), TokenStatus::Active);
	assert!(!format!("{token:?}").contains("ghs_expiring"));
}

#[tokio::test]
async fn rejected_and_malformed_exchanges_are_classified() {
	let server = MockServer::start_async().await;
	let mut rejected = server
		.mock_async(|when, then| {
			when.method(POST).path("/app/installations/8080/access_tokens");
			then.status(401).body("{\"message\":\"A JSON web token could not be decoded\"}");
		})
		.await;
	let error = issuer(&server).issue().await.expect_err("Rejected exchange should fail.");

	assert!(matches!(
		error,
		CredentialError::Rejected { status: 401, ref reason } if reason.contains("could not be decoded")
	));

	rejected.delete_async().await;

	let _malformed = server
		.mock_async(|when, then| {
			when.method(POST).path("/app/installations/8080/access_tokens");
			then.status(201).header("content-type", "application/json").body("{\"token\":42}");
		})
		.await;
	let error = issuer(&server).issue().await.expect_err("Malformed exchange should fail.");

	assert!(matches!(error, CredentialError::Malformed { .. }));
}

#[tokio::test]
async fn rejected_credentials_fall_back_to_bundle() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/app/installations/8080/access_tokens");
			then.status(403).body("{\"message\":\"Forbidden\"}");
		})
		.await;
	let contents_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/repos/acme/private-specs/contents/openapi.yaml");
			then.status(200).body("{}");
		})
		.await;
	let dir = tempfile::tempdir().expect("Temporary cache directory should be created.");
	let manager = build_test_manager(
		repository_locator(&server),
		Some(test_app_credentials()),
		&server.base_url(),
		test_file_cache(dir.path()),
		FallbackProvider::embedded(BUNDLED),
		Duration::minutes(2),
	);

	assert!(matches!(manager.acquire().await, AcquisitionOutcome::FallbackUsed(_)));

	token_mock.assert_calls_async(1).await;
	contents_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn partial_credentials_fetch_anonymously() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/public.yaml").header_missing("authorization");
			then.status(200).body(DOCUMENT);
		})
		.await;
	let dir = tempfile::tempdir().expect("Temporary cache directory should be created.");
	let env = HashMap::from([
		("SPEC_URL", server.url("/public.yaml")),
		("SPEC_CACHE_DIR", dir.path().display().to_string()),
		("GITHUB_APP_ID", "4242".to_owned()),
		("GITHUB_APP_PRIVATE_KEY", TEST_PRIVATE_KEY.to_owned()),
	]);
	let config = SpecSourceConfig::from_lookup(|key| env.get(key).cloned())
		.expect("Partial credentials should not be a configuration error.");

	assert!(config.credentials.is_none());

	let manager = SpecManager::from_config(&config).expect("Manager should build from config.");
	let outcome = manager.acquire().await;

	assert!(matches!(outcome, AcquisitionOutcome::Refreshed(_)));

	mock.assert_calls_async(1).await;
}
