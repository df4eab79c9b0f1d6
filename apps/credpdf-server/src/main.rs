//! Credential PDF server
//!
//! Serves an upload form and personalizes a template PDF once per CSV row:
//!
//! - `GET /` upload form
//! - `POST /api/preview` parse the credential CSV without generating
//! - `POST /api/generate` produce a PDF (one row) or a zip (several rows)

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod form;

/// Command-line arguments for the credential PDF server
#[derive(Parser, Debug)]
#[command(name = "credpdf-server")]
#[command(about = "Personalize a template PDF with logins and passwords from a CSV")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "CREDPDF_PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "CREDPDF_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Maximum request body size in megabytes
    #[arg(long, env = "CREDPDF_MAX_UPLOAD_MB", default_value = "50")]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Routes of the server, without the listener.
pub fn build_router(max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::handle_index))
        .route("/health", get(api::handle_health))
        .route("/api/preview", post(api::handle_preview))
        .route("/api/generate", post(api::handle_generate))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present, before reading env-backed arguments
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting credpdf server on {}:{}", args.host, args.port);

    let app = build_router(args.max_upload_mb * 1024 * 1024);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(listener, app).await?;

    Ok(())
}
