use nutrition_ai_gateway::api;
use nutrition_ai_gateway::config::{CorsProfile, GatewayConfig};
use clap::Parser;
use dotenv::dotenv;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Keeps OpenAI and Nutritionix keys off the front-end", long_about = None)]
struct Args {
    /// Overrides the PORT environment variable
    #[arg(long)]
    port: Option<u16>,

    /// Accept requests from any origin
    #[arg(long)]
    permissive_cors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = GatewayConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.permissive_cors {
        config.cors = CorsProfile::Permissive;
    }

    for name in config.missing_credentials() {
        tracing::warn!("{} is not set; routes that need it will answer with an error", name);
    }
    match &config.cors {
        CorsProfile::Permissive => tracing::info!("CORS: accepting any origin"),
        CorsProfile::Strict { origins } => tracing::info!("CORS: allowing {}", origins.join(", ")),
    }

    let app = api::create_api(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
