//! Single-attempt retrieval of the specification document.
//!
//! Two locators are supported: the GitHub contents API, whose JSON envelope carries the
//! file as base64, and a raw URL whose body is the document itself. Every request asks for
//! a true round trip (`Cache-Control: no-cache`), and any non-success status or envelope
//! defect becomes a [`FetchError`] so the manager can move on to the next tier.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	credential::api_endpoint,
	document::SpecDocument,
	error::FetchError,
	http::{self, ReqwestHttpClient, ResponseMetadata},
};

/// Where the specification document lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentLocator {
	/// File inside a repository, read through the contents API.
	Repository {
		/// API base, e.g. `https://api.github.com`.
		api_base: Url,
		/// Repository owner.
		owner: String,
		/// Repository name.
		repo: String,
		/// Path of the file within the repository.
		path: String,
		/// Branch, tag, or commit; the default branch when absent.
		reference: Option<String>,
	},
	/// Direct URL whose body is the document.
	Raw(Url),
}
impl DocumentLocator {
	/// Resolves the URL requested for this locator.
	pub fn request_url(&self) -> Url {
		match self {
			Self::Repository { api_base, owner, repo, path, reference } => {
				let segments = ["repos", owner.as_str(), repo.as_str(), "contents"]
					.into_iter()
					.chain(path.split('/').filter(|s| !s.is_empty()));
				let mut url = api_endpoint(api_base, segments);

				if let Some(reference) = reference {
					url.query_pairs_mut().append_pair("ref", reference);
				}

				url
			},
			Self::Raw(url) => url.clone(),
		}
	}
}
impl Display for DocumentLocator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Repository { owner, repo, path, reference, .. } => {
				write!(f, "{owner}/{repo}/{path}")?;

				if let Some(reference) = reference {
					write!(f, "@{reference}")?;
				}

				Ok(())
			},
			Self::Raw(url) => write!(f, "{url}"),
		}
	}
}

/// Contents API envelope. Every field is optional so defects surface as [`FetchError::Envelope`]
/// with a readable reason instead of a parse error.
#[derive(Debug, Deserialize)]
struct ContentsEnvelope {
	#[serde(rename = "type")]
	kind: Option<String>,
	encoding: Option<String>,
	content: Option<String>,
}
impl ContentsEnvelope {
	fn decode(self) -> Result<SpecDocument, FetchError> {
		if let Some(kind) = self.kind.as_deref().filter(|kind| *kind != "file") {
			return Err(FetchError::Envelope { reason: format!("expected a file, found `{kind}`") });
		}

		match self.encoding.as_deref() {
			Some("base64") => {},
			Some(other) =>
				return Err(FetchError::Envelope {
					reason: format!("unsupported encoding `{other}`"),
				}),
			None => return Err(FetchError::Envelope { reason: "missing encoding".into() }),
		}

		let content =
			self.content.ok_or_else(|| FetchError::Envelope { reason: "missing content".into() })?;
		// Contents responses wrap base64 at 60 columns.
		let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
		let bytes = STANDARD.decode(compact)?;

		Ok(SpecDocument::from(String::from_utf8(bytes)?))
	}
}

/// Performs exactly one retrieval per call.
#[derive(Clone, Debug)]
pub struct RemoteFetcher {
	http_client: ReqwestHttpClient,
}
impl RemoteFetcher {
	/// Creates a fetcher that shares `http_client`.
	pub fn new(http_client: ReqwestHttpClient) -> Self {
		Self { http_client }
	}

	/// Retrieves the document at `locator`, authenticating with `token` when present.
	pub async fn fetch(
		&self,
		locator: &DocumentLocator,
		token: Option<&AccessToken>,
	) -> Result<SpecDocument, FetchError> {
		let mut request = self.http_client.get_uncached(locator.request_url());

		if let Some(token) = token {
			request = http::with_github_auth(request, &token.value);
		} else if matches!(locator, DocumentLocator::Repository { .. }) {
			request = request
				.header(reqwest::header::ACCEPT, http::GITHUB_JSON)
				.header(http::API_VERSION_HEADER, http::API_VERSION);
		}

		let response = request.send().await?;
		let metadata = ResponseMetadata::capture(&response);
		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(FetchError::Status {
				status: status.as_u16(),
				reason: http::failure_reason(status, &body),
				retry_after: metadata.retry_after,
			});
		}

		let document = match locator {
			DocumentLocator::Repository { .. } => {
				let de = &mut serde_json::Deserializer::from_str(&body);
				let envelope: ContentsEnvelope = serde_path_to_error::deserialize(de)
					.map_err(|source| FetchError::EnvelopeParse { source })?;

				envelope.decode()?
			},
			DocumentLocator::Raw(_) => SpecDocument::from(body),
		};

		if document.is_empty() {
			return Err(FetchError::Empty);
		}

		Ok(document)
	}
}
