//! HTTP request handlers for the conversion service.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Url;
use serde_json::json;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::output::{
    chunk_failure, chunk_response, conversion_failure, conversion_response, ResponseSource,
};
use crate::pipeline::ConversionPipeline;
use crate::types::{
    ChunkConfig, ChunkRequest, ChunkResponse, ConvertResponse, ConvertUrlRequest, EndpointMap,
    HealthResponse, OutputFormat, ServiceConfig, ServiceInfo,
};

/// Application state shared across handlers.
pub struct AppState {
    pub pipeline: ConversionPipeline,
    pub config: ServiceConfig,
}

/// Request rejected before any conversion work.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let status = match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            detail: err.body_text(),
        }
    }
}

/// Parse a caller-supplied URL; only absolute http(s) URLs are accepted.
fn parse_source_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiError::unprocessable(format!("Invalid URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::unprocessable(format!(
            "Invalid URL '{}': unsupported scheme '{}'",
            raw, scheme
        ))),
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat, ApiError> {
    raw.parse::<OutputFormat>()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Service descriptor.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME").to_string(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: EndpointMap {
            convert_url: "/convert/url".to_string(),
            convert_file: "/convert/file".to_string(),
            chunk: "/chunk".to_string(),
            health: "/health".to_string(),
        },
    })
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Convert a document fetched from a URL.
pub async fn convert_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConvertUrlRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let Json(request) = payload?;
    let url = parse_source_url(&request.url)?;
    let format = parse_format(&request.output_format)?;

    let span = info_span!("convert_url", request_id = %Uuid::new_v4(), source = %url);
    async move {
        info!(format = %format, "Received conversion request");

        let response = match state.pipeline.convert_url(&url, format).await {
            Ok(conversion) => {
                conversion_response(conversion, ResponseSource::Url(request.url.clone()))
            }
            Err(err) => {
                error!(kind = err.kind(), error = %err, "Conversion failed");
                conversion_failure(err)
            }
        };

        Ok(Json(response))
    }
    .instrument(span)
    .await
}

/// Convert an uploaded document.
///
/// Multipart fields: `file` (required) and `output_format`.
pub async fn convert_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut output_format = OutputFormat::default().as_str().to_string();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or("document")
                    .to_string();
                let mimetype = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                upload = Some((filename, mimetype, bytes.to_vec()));
            }
            Some("output_format") => {
                output_format = field.text().await?;
            }
            _ => {}
        }
    }

    let format = parse_format(&output_format)?;
    let (filename, mimetype, bytes) =
        upload.ok_or_else(|| ApiError::unprocessable("Missing multipart field 'file'"))?;

    let span = info_span!("convert_file", request_id = %Uuid::new_v4(), filename = %filename);
    async move {
        info!(format = %format, bytes = bytes.len(), "Received upload");

        let response = match state
            .pipeline
            .convert_upload(&filename, mimetype, bytes, format)
            .await
        {
            Ok(conversion) => conversion_response(conversion, ResponseSource::Upload(filename)),
            Err(err) => {
                error!(kind = err.kind(), error = %err, "Conversion failed");
                conversion_failure(err)
            }
        };

        Ok(Json(response))
    }
    .instrument(span)
    .await
}

/// Convert a document and split it into token-bounded chunks.
pub async fn chunk(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChunkRequest>, JsonRejection>,
) -> Result<Json<ChunkResponse>, ApiError> {
    let Json(request) = payload?;
    let url = parse_source_url(&request.url)?;
    if request.max_tokens == 0 {
        return Err(ApiError::unprocessable("max_tokens must be a positive integer"));
    }

    let config = ChunkConfig {
        max_tokens: request.max_tokens,
        merge_peers: request.merge_peers,
    };

    let span = info_span!("chunk", request_id = %Uuid::new_v4(), source = %url);
    async move {
        info!(
            max_tokens = config.max_tokens,
            merge_peers = config.merge_peers,
            tokenizer = state.pipeline.tokenizer().model(),
            "Received chunk request"
        );

        let response = match state.pipeline.chunk_url(&url, config).await {
            Ok(chunks) => chunk_response(chunks),
            Err(err) => {
                error!(kind = err.kind(), error = %err, "Chunking failed");
                chunk_failure(err)
            }
        };

        Ok(Json(response))
    }
    .instrument(span)
    .await
}
