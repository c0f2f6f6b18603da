//! Stale-while-revalidate acquisition of hosted specification documents: GitHub App
//! credentials, an atomic on-disk cache, and bundled fallbacks in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod acquire;
pub mod auth;
pub mod config;
pub mod credential;
pub mod document;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::path::Path;
	// self
	use crate::{
		acquire::SpecManager,
		auth::AppCredentials,
		credential::CredentialIssuer,
		fallback::FallbackProvider,
		fetch::{DocumentLocator, RemoteFetcher},
		http::ReqwestHttpClient,
		store::{CacheStore, FileCache},
	};

	/// PEM-encoded RSA private key used to sign test assertions.
	pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/app-key.pem");
	/// PEM-encoded public half of [`TEST_PRIVATE_KEY`].
	pub const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/app-key.pub.pem");
	/// Cache file name used by test managers.
	pub const TEST_CACHE_FILE: &str = "openapi.yaml";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(std::time::Duration::from_secs(5))
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Opens a [`FileCache`] inside `dir` using [`TEST_CACHE_FILE`].
	pub fn test_file_cache(dir: &Path) -> Arc<FileCache> {
		Arc::new(
			FileCache::open(dir, TEST_CACHE_FILE).expect("Failed to open file cache for tests."),
		)
	}

	/// Builds credentials signed with [`TEST_PRIVATE_KEY`].
	pub fn test_app_credentials() -> AppCredentials {
		AppCredentials::from_parts(Some("4242"), Some("8080"), Some(TEST_PRIVATE_KEY))
			.expect("Test credential fixture should validate.")
			.expect("Test credential fixture should be complete.")
	}

	/// Constructs a [`SpecManager`] wired to the provided locator, store, and fallback using the
	/// insecure test transport.
	pub fn build_test_manager(
		locator: DocumentLocator,
		credentials: Option<AppCredentials>,
		api_base: &str,
		store: Arc<dyn CacheStore>,
		fallback: FallbackProvider,
		ttl: Duration,
	) -> SpecManager {
		let http_client = test_reqwest_http_client();
		let api_base = Url::parse(api_base).expect("Test API base should parse.");
		let issuer = CredentialIssuer::new(credentials, api_base, http_client.clone());
		let fetcher = RemoteFetcher::new(http_client);

		SpecManager::new(locator, issuer, fetcher, store, fallback).with_ttl(ttl)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::PathBuf,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
