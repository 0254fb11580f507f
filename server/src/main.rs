use anyhow::Result;
use axum::Router;
use clap::Parser;
use docseek_core::SearchConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use docseek_server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Record file to serve (search_index.js or .json); start empty if omitted
    #[arg(long)]
    index: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Hits per page
    #[arg(long, env = "DOCSEEK_PAGE_SIZE", default_value_t = docseek_core::config::DEFAULT_PAGE_SIZE)]
    page_size: usize,
    /// Maximum excerpt length in characters
    #[arg(long, env = "DOCSEEK_EXCERPT_CHARS", default_value_t = docseek_core::config::DEFAULT_EXCERPT_CHARS)]
    excerpt_chars: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = SearchConfig::default().with_page_size(args.page_size).with_excerpt_chars(args.excerpt_chars);
    let app: Router = build_app(args.index.as_deref(), config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
