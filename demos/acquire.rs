//! Demonstrates acquiring a specification document from a mocked contents API, serving it
//! from the file cache on the next call, and refreshing it in the background once stale.

// std
use std::collections::HashMap;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use color_eyre::Result;
use httpmock::prelude::*;
// self
use spec_broker::{acquire::SpecManager, config::SpecSourceConfig};

const DOCUMENT: &str = "openapi: 3.1.0\ninfo:\n  title: Demo\n  version: 1.0.0\npaths: {}\n";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let contents_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/repos/acme/specs/contents/openapi.yaml").query_param("ref", "main");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"type": "file",
					"encoding": "base64",
					"content": STANDARD.encode(DOCUMENT),
				}),
			);
		})
		.await;
	let cache_dir = std::env::temp_dir().join("spec-broker-demo");
	let env = HashMap::from([
		("SPEC_CACHE_DIR", cache_dir.display().to_string()),
		("SPEC_CACHE_TTL_MS", "0".to_owned()),
		("SPEC_REPO_OWNER", "acme".to_owned()),
		("SPEC_REPO_NAME", "specs".to_owned()),
		("SPEC_REPO_PATH", "openapi.yaml".to_owned()),
		("SPEC_API_BASE_URL", server.base_url()),
	]);
	let config = SpecSourceConfig::from_lookup(|key| env.get(key).cloned())?;

	// Start from an empty cache so the first call has to block on the network.
	let _ = std::fs::remove_file(config.cache_path());

	let manager = SpecManager::from_config(&config)?;
	let first = manager.acquire().await;

	println!("First acquisition: {} at {:?}.", first.kind(), first.location());

	// A zero TTL makes the record stale at once: served immediately, refreshed behind.
	let second = manager.acquire().await;

	println!("Second acquisition: {} at {:?}.", second.kind(), second.location());

	manager.settle().await;

	let document = manager.acquire_document().await?;

	manager.settle().await;

	println!("Document digest: {} ({} bytes).", document.digest(), document.len());
	println!(
		"Refreshes started: {}, succeeded: {}.",
		manager.metrics().refresh_started(),
		manager.metrics().refresh_succeeded()
	);

	contents_mock.assert_calls_async(3).await;

	Ok(())
}
