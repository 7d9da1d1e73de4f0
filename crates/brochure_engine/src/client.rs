use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::stream::{consume, StreamEnd, StreamError, StreamFailure, StreamMode, StreamSink};
use crate::{
    BrochureDocument, FailureKind, GenerationOutcome, Generator, SubmitError, SubmitOutcome,
    SubmitRequest, SummaryDocument,
};

const BROCHURE_PATH: &str = "/api/v1/brochures/public/brochure";
const BROCHURE_STREAM_PATH: &str = "/api/v1/brochures/public/brochure/stream";
const SUMMARIZE_PATH: &str = "/api/v1/websites/public/summarize";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Budget for single-shot requests. Streaming bodies are unbounded and
    /// only bounded by cancellation.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Protocol shape of the streaming endpoint.
    pub stream_mode: StreamMode,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            stream_mode: StreamMode::default(),
        }
    }
}

impl BackendSettings {
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Request body as the backend expects it. The summarizer endpoint takes the
/// URL alone, so the company name is omitted there.
#[derive(Serialize)]
struct WireRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<&'a str>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn submit(
        &self,
        request: &SubmitRequest,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, SubmitError>;
}

/// Transport initiator backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    settings: BackendSettings,
}

impl HttpBackendClient {
    pub fn new(settings: BackendSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(
                self.settings.redirect_limit,
            ))
            .build()
            .map_err(|err| SubmitError::new(FailureKind::Network, err.to_string()))
    }

    /// Endpoint path plus whether the response body is actually chunked.
    /// The summarizer endpoint is single-shot regardless of the flag.
    fn route(&self, request: &SubmitRequest) -> (&'static str, bool) {
        match request.generator {
            Generator::Brochure if request.streaming => (BROCHURE_STREAM_PATH, true),
            Generator::Brochure => (BROCHURE_PATH, false),
            Generator::Summary => (SUMMARIZE_PATH, false),
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpBackendClient {
    async fn submit(
        &self,
        request: &SubmitRequest,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, SubmitError> {
        let (path, streaming) = self.route(request);
        let endpoint = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        let endpoint = reqwest::Url::parse(&endpoint)
            .map_err(|err| SubmitError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let company_name = match request.generator {
            Generator::Brochure => Some(request.company_name.as_str()),
            Generator::Summary => None,
        };
        let body = WireRequest {
            url: &request.target_url,
            company_name,
        };

        let client = self.build_client()?;
        let mut builder = client.post(endpoint).json(&body);
        if !streaming {
            builder = builder.timeout(self.settings.request_timeout);
        }
        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_detail(response, request.generator).await;
            return Err(SubmitError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        if streaming {
            let end = consume(response.bytes_stream(), self.settings.stream_mode, sink, cancel)
                .await
                .map_err(map_stream_error)?;
            return Ok(match end {
                StreamEnd::Completed { text } => {
                    SubmitOutcome::Completed(GenerationOutcome::Streamed { text })
                }
                StreamEnd::Cancelled { .. } => SubmitOutcome::Cancelled,
            });
        }

        let outcome = match request.generator {
            Generator::Brochure => response
                .json::<BrochureDocument>()
                .await
                .map(GenerationOutcome::Brochure),
            Generator::Summary => response
                .json::<SummaryDocument>()
                .await
                .map(GenerationOutcome::Summary),
        }
        .map_err(|err| SubmitError::new(FailureKind::MalformedDocument, err.to_string()))?;

        Ok(SubmitOutcome::Completed(outcome))
    }
}

/// Best-effort read of the backend's JSON error body. A missing or
/// unparsable body falls back to a generic message instead of surfacing a
/// parse error to the caller.
async fn read_error_detail(response: reqwest::Response, generator: Generator) -> String {
    let fallback = match generator {
        Generator::Brochure => "Failed to generate brochure",
        Generator::Summary => "Failed to fetch summary. Please try again.",
    };
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            detail: Some(detail),
        }) => detail,
        _ => fallback.to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return SubmitError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    SubmitError::new(FailureKind::Network, err.to_string())
}

fn map_stream_error(err: StreamError) -> SubmitError {
    let kind = match err.failure {
        StreamFailure::MalformedUtf8 => FailureKind::MalformedUtf8,
        StreamFailure::TruncatedUtf8 => FailureKind::TruncatedUtf8,
        StreamFailure::Read => FailureKind::StreamRead,
    };
    SubmitError::new(kind, err.message).with_partial(err.partial_text)
}
