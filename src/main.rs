use anyhow::Context;
use backup_warden::warehouse::HttpWarehouse;
use backup_warden::{
    warden_router, AppState, ManagementConfig, MemoryIndex, MemoryQueue, WatcherConfig,
};
use chrono::Duration;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "backup-warden", about = "Backup lifecycle and warehouse export service")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Project owning the destination warehouse tables.
    #[arg(long)]
    project: String,

    /// Destination dataset for backup loads.
    #[arg(long)]
    dataset: String,

    /// Warehouse load-job submission endpoint.
    #[arg(long)]
    warehouse_url: String,

    /// Backup bucket to accept change notifications from (empty = any).
    #[arg(long, default_value = "")]
    bucket: String,

    /// Kind accepted for warehouse import; repeatable.
    #[arg(long = "target-kind")]
    target_kinds: Vec<String>,

    /// Days a completed backup is retained before the sweep removes it.
    #[arg(long, default_value_t = 30)]
    retention_days: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let management = ManagementConfig::new().retention(Duration::days(args.retention_days));
    let watcher = WatcherConfig::new(&args.project, &args.dataset)
        .bucket(&args.bucket)
        .target_kinds(args.target_kinds.clone());
    watcher.validate().context("invalid watcher configuration")?;

    let state = Arc::new(AppState {
        index: Arc::new(MemoryIndex::new()),
        queue: Arc::new(MemoryQueue::new()),
        warehouse: Arc::new(HttpWarehouse::new(args.warehouse_url)),
        management,
        watcher,
    });

    let app = warden_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .context("bind listen address")?;
    info!(listen = %args.listen, "backup-warden listening");
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
