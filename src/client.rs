use std::env;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::ndjson::process_ndjson;
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_TTFB,
};
use crate::types::{ChatChunk, ChatRequest, ModelListResponse};

/// Address of a default local Ollama install.
pub const DEFAULT_HOST: &str = "http://localhost:11434";
/// Environment variable consulted when no host is given explicitly.
pub const HOST_ENV_VAR: &str = "OLLAMA_HOST";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// A boxed stream of decoded chat chunks.
pub type ChatChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk>> + Send>>;

/// Client for the Ollama HTTP API.
#[derive(Clone)]
pub struct Ollama {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl std::fmt::Debug for Ollama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl Ollama {
    /// Create a new Ollama client.
    ///
    /// The host can be provided directly or read from the `OLLAMA_HOST`
    /// environment variable; it defaults to `http://localhost:11434`.
    pub fn new(host: Option<String>) -> Result<Self> {
        Self::with_options(host, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(host: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let host = match host {
            Some(host) => host,
            None => env::var(HOST_ENV_VAR).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        };
        let base_url = normalize_host(&host)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attaches a logger that sees every request and streamed chunk.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The server this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response, model: Option<&str>) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let error_message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or(error_body);

        match status_code {
            400 => Error::bad_request(error_message),
            404 => Error::not_found(error_message, model.map(String::from)),
            408 => Error::timeout(error_message, None),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message),
            _ => Error::api(status_code, error_message),
        }
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        model: Option<&str>,
    ) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            CLIENT_REQUEST_ERRORS.click();
            Error::from_reqwest(e, Some(self.timeout.as_secs_f64()))
        })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response, model).await);
        }
        Ok(response)
    }

    /// List the models installed on the server.
    pub async fn list(&self) -> Result<ModelListResponse> {
        let url = self.endpoint("api/tags")?;
        let request = self.client.get(url).headers(self.default_headers());
        let response = self.execute(request, None).await?;

        let models = response.json::<ModelListResponse>().await.map_err(|e| {
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })?;
        if let Some(logger) = &self.logger {
            logger.log_model_list(&models);
        }
        Ok(models)
    }

    /// Send a chat request and get a streaming response.
    ///
    /// Returns a stream of [`ChatChunk`] values decoded from the server's
    /// newline-delimited JSON body.
    pub async fn stream_chat(&self, mut request: ChatRequest) -> Result<ChatChunkStream> {
        request.stream = true;
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        let url = self.endpoint("api/chat")?;
        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/x-ndjson"),
        );

        let start = Instant::now();
        let builder = self.client.post(url).headers(headers).json(&request);
        let response = self.execute(builder, Some(&request.model)).await?;
        STREAM_TTFB.add(start.elapsed().as_secs_f64());

        let chunks = process_ndjson::<_, ChatChunk>(response.bytes_stream());
        let logger = self.logger.clone();
        let chunks = chunks.inspect(move |chunk| {
            if let (Some(logger), Ok(chunk)) = (&logger, chunk) {
                logger.log_stream_chunk(chunk);
            }
        });
        Ok(Box::pin(chunks))
    }
}

/// Turns a user-supplied host into a base URL ending in `/`.
///
/// Accepts bare `host:port` values the way `OLLAMA_HOST` is commonly set.
fn normalize_host(host: &str) -> Result<Url> {
    let host = host.trim();
    let mut with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };
    if !with_scheme.ends_with('/') {
        with_scheme.push('/');
    }
    Ok(Url::parse(&with_scheme)?)
}
