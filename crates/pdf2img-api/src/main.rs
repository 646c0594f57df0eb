use clap::Parser;
use pdf2img_api::routes::build_router;
use pdf2img_api::state::AppState;
use pdf2img_config::ServiceConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Service CLI flags, the highest-precedence configuration layer
/// (spec.md §1A), matching `riptide-api::main::Args`'s derive-style
/// `clap::Parser` struct.
#[derive(Parser)]
#[command(name = "pdf2img-server")]
#[command(about = "PDF-to-image conversion service")]
struct Args {
    #[arg(long)]
    config: Option<String>,

    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    #[arg(long)]
    max_inflight: Option<usize>,

    #[arg(long)]
    queue_limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(v) = args.max_inflight {
        config.max_inflight = v;
    }
    if let Some(v) = args.queue_limit {
        config.queue_limit = v;
    }

    tracing::info!(
        max_inflight = config.max_inflight,
        queue_limit = config.queue_limit,
        bind_address = %args.bind,
        "starting pdf2img service"
    );

    let state = AppState::new(config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    let addr: SocketAddr = args.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(bind_address = %addr, "pdf2img service listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("pdf2img service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
