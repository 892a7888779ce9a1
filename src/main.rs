use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tokio::net::TcpListener;

use anyhow::anyhow;

use telephony_bridge::{ServerConfig, create_app, state::AppState};

/// Telephony bridge - relays μ-law call audio to a voice-AI backend
#[derive(Parser, Debug)]
#[command(name = "telephony-bridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for outbound wss and inbound TLS
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        info!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    let address = config.address();
    let tls_config = config.tls.clone();
    info!(
        backend_url = %config.backend_url,
        assistant_id = %config.backend_assistant_id,
        max_sessions = ?config.max_sessions,
        "Starting telephony bridge on {address}"
    );

    let app_state = AppState::new(config);
    let app = create_app(app_state);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    // Start server with or without TLS
    if let Some(tls) = tls_config {
        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to load TLS certificates from {} and {}: {}",
                    tls.cert_path.display(),
                    tls.key_path.display(),
                    e
                )
            })?;

        info!("Server listening on https://{} (TLS enabled)", socket_addr);

        axum_server::bind_rustls(socket_addr, rustls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| anyhow!("TLS server error: {}", e))?;
    } else {
        info!("Server listening on http://{}", socket_addr);

        let listener = TcpListener::bind(&socket_addr).await?;
        axum::serve(listener, app).await?;
    }

    Ok(())
}
