//! HTTP implementation of [`ModerationApi`].
//!
//! Built on the hyper-util connection-pooling client over plain TCP. JSON
//! bodies are encoded with `serde_json`; every request is bounded by
//! [`ClientConfig::timeout`].

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;

use algomarket_core::{Algorithm, AlgorithmId, DecisionRequest, ModeratedAlgorithm, NewAlgorithm};

use crate::api::{ModerationApi, Scope};
use crate::{ApiError, ClientConfig};

/// Algorithms awaiting moderation.
pub const PENDING_PATH: &str = "/api/algorithms/moderation/";
/// Every algorithm, and the submission endpoint.
pub const ALGORITHMS_PATH: &str = "/api/algorithms/";
/// Published catalog listings.
pub const CATALOG_PATH: &str = "/api/catalog/";

const SEGMENT_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path of the decision endpoint for `id`.
#[must_use]
pub fn moderate_path(id: &AlgorithmId) -> String {
    format!("{ALGORITHMS_PATH}{}/moderate/", utf8_percent_encode(id.as_str(), SEGMENT_ENCODE))
}

/// Marketplace API client over plain HTTP/1.1.
///
/// There is no TLS connector: `https://` base URLs are refused. Put a
/// TLS-terminating proxy in front of a remote marketplace API.
#[derive(Clone)]
pub struct HttpModerationApi {
    client: Client<HttpConnector, Full<Bytes>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HttpModerationApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpModerationApi")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpModerationApi {
    /// Create a client for the configured base URL.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] unless the base URL is an absolute `http://` URL.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let uri: Uri = config
            .base_url
            .parse()
            .map_err(|e| ApiError::InvalidConfig(format!("base URL '{}': {e}", config.base_url)))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(ApiError::InvalidConfig(format!(
                "base URL '{}' must be an absolute http:// URL (TLS is not supported)",
                config.base_url
            )));
        }
        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the published catalog.
    ///
    /// # Errors
    /// Same classes as [`ModerationApi::list`].
    pub async fn catalog(&self) -> Result<Vec<Algorithm>, ApiError> {
        self.get_json(CATALOG_PATH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes = self.send(Method::GET, path, None).await?;
        decode(path, &bytes)
    }

    /// Send one request and return the body of a success response.
    async fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<Bytes, ApiError> {
        let uri: Uri = format!("{}{path}", self.config.base_url)
            .parse()
            .map_err(|e| ApiError::InvalidConfig(format!("invalid request URI for {path}: {e}")))?;

        let body_bytes = body.map(Bytes::from).unwrap_or_default();

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(ACCEPT, "application/json");
        if !body_bytes.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(token) = &self.config.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = builder
            .body(Full::new(body_bytes))
            .map_err(|e| ApiError::Transport(format!("build request: {e}")))?;

        tracing::debug!(%method, path, "sending API request");

        let exchange = async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| ApiError::Transport(format!("send request: {e}")))?;
            let status = resp.status();
            let bytes = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| ApiError::Transport(format!("read response body: {e}")))?
                .to_bytes();
            if !status.is_success() {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    path: path.to_owned(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
            Ok(bytes)
        };

        match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout { path: path.to_owned(), timeout: self.config.timeout }),
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Decode { path: path.to_owned(), reason: e.to_string() })
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Transport(format!("encode request body: {e}")))
}

#[async_trait]
impl ModerationApi for HttpModerationApi {
    async fn list(&self, scope: Scope) -> Result<Vec<ModeratedAlgorithm>, ApiError> {
        let path = match scope {
            Scope::PendingOnly => PENDING_PATH,
            Scope::All => ALGORITHMS_PATH,
        };
        self.get_json(path).await
    }

    async fn moderate(&self, id: &AlgorithmId, request: &DecisionRequest) -> Result<(), ApiError> {
        let path = moderate_path(id);
        self.send(Method::POST, &path, Some(encode(request)?)).await?;
        Ok(())
    }

    async fn submit(&self, algorithm: &NewAlgorithm) -> Result<ModeratedAlgorithm, ApiError> {
        let bytes = self
            .send(Method::POST, ALGORITHMS_PATH, Some(encode(algorithm)?))
            .await?;
        decode(ALGORITHMS_PATH, &bytes)
    }
}
