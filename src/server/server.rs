//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::core::judge::JudgeClient;
use crate::core::providers::GoogleClient;
use crate::core::state::StateLoader;
use crate::monitoring::Metrics;
use crate::server::middleware::MetricsMiddleware;
use crate::server::routes;
use crate::server::state::AppState;
use crate::storage::RedisPool;
use crate::utils::error::{GatewayError, Result};
use actix_cors::Cors;
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server, wiring all gateway components
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        // Redis down at startup degrades to fail-open, not refusal
        let redis = match RedisPool::new(&config.redis_url).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Redis unavailable ({}), continuing fail-open", e);
                RedisPool::create_noop()
            }
        };

        let loader = Arc::new(StateLoader::new(
            config.state_file.clone(),
            config.checksum_file.clone(),
        ));
        loader.refresh(true).await;
        if loader.snapshot().is_empty() {
            warn!("No providers loaded at startup; requests will 503 until the state file appears");
        }

        let google = Arc::new(GoogleClient::new(config.google_api_key.clone()));
        let judge = JudgeClient::new(Arc::clone(&google));
        let metrics = Arc::new(Metrics::new()?);

        let state = AppState::new(config.clone(), redis, loader, google, judge, metrics);

        // Sync the GPU gauge once at boot
        match state.redis.get("gpu_status").await {
            Ok(status) => {
                let green = status.as_deref() == Some("GREEN");
                state.metrics.gpu_status.set(green as i64);
                info!("Metrics initialized: GPU status synced");
            }
            Err(e) => warn!("Metrics init failed: {}", e),
        }

        Ok(Self {
            config: config.server.clone(),
            state,
        })
    }

    /// Create the Actix-web application
    fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(Cors::permissive())
            .wrap(MetricsMiddleware)
            .wrap(DefaultHeaders::new().add(("Server", "Neural-Home-Gateway")))
            .configure(routes::configure)
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);

        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .bind(&bind_addr)
            .map_err(|e| GatewayError::config(format!("Failed to bind {}: {}", bind_addr, e)))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| GatewayError::internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
