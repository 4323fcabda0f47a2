//! Server builder and run_server function

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

/// Run the server with configuration loaded from the environment
pub async fn run_server() -> Result<()> {
    info!("🚀 Starting Neural Home Gateway");

    let config = Config::from_env();
    let server = HttpServer::new(&config).await?;

    info!(
        "🌐 Server starting at: http://{}:{}",
        config.server.host, config.server.port
    );
    info!("📋 API Endpoints:");
    info!("   POST /v1/chat/completions - Chat completions");
    info!("   GET  /v1/models - Model list");
    info!("   GET  /metrics - Prometheus exposition");

    server.start().await
}
