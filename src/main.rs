//! Document Converter Service - Main Entry Point

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use doc_converter::api::{self, AppState};
use doc_converter::types::LogFormat;
use doc_converter::{
    BuiltinConverter, ConversionPipeline, HttpFetcher, ServiceConfig, TokenizerProvider,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = ServiceConfig::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("doc_converter=info,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!("Starting Document Converter Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        tokenizer = %config.tokenizer_model,
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );

    // Tokenizer loads lazily on the first chunk request
    let pipeline = ConversionPipeline::new(
        Arc::new(HttpFetcher::new()?),
        Arc::new(BuiltinConverter::new()),
        TokenizerProvider::new(config.tokenizer_model.clone()),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = api::router(Arc::new(AppState { pipeline, config }));

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
