//! Prometheus metrics registry
//!
//! Two custom gauges (GPU status, rate-limit remaining) plus the default
//! per-request count/latency series. The gauges are refreshed from Redis by
//! the metrics middleware whenever Prometheus scrapes `/metrics`.

use crate::utils::error::{GatewayError, Result};
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Metrics registry for the gateway
pub struct Metrics {
    registry: Registry,
    /// GPU status: 1 = green (local provider eligible), 0 = excluded
    pub gpu_status: IntGauge,
    /// Remaining tokens per limiter bucket, labelled by provider and type
    pub rate_limit_remaining: GaugeVec,
    /// Total HTTP requests by method, path and status
    pub http_requests: IntCounterVec,
    /// HTTP request latency by method and path
    pub http_request_duration: HistogramVec,
}

impl Metrics {
    /// Create and register all gateway metrics
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let gpu_status = IntGauge::new(
            "neural_home_gpu_status",
            "GPU Status: 1=Green (Available), 0=Red (Busy/Cooldown)",
        )
        .map_err(|e| GatewayError::monitoring(e.to_string()))?;

        let rate_limit_remaining = GaugeVec::new(
            Opts::new(
                "neural_home_rate_limit_remaining",
                "Remaining tokens/requests",
            ),
            &["provider", "type"],
        )
        .map_err(|e| GatewayError::monitoring(e.to_string()))?;

        let http_requests = IntCounterVec::new(
            Opts::new("neural_home_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .map_err(|e| GatewayError::monitoring(e.to_string()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "neural_home_http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "path"],
        )
        .map_err(|e| GatewayError::monitoring(e.to_string()))?;

        registry
            .register(Box::new(gpu_status.clone()))
            .map_err(|e| GatewayError::monitoring(e.to_string()))?;
        registry
            .register(Box::new(rate_limit_remaining.clone()))
            .map_err(|e| GatewayError::monitoring(e.to_string()))?;
        registry
            .register(Box::new(http_requests.clone()))
            .map_err(|e| GatewayError::monitoring(e.to_string()))?;
        registry
            .register(Box::new(http_request_duration.clone()))
            .map_err(|e| GatewayError::monitoring(e.to_string()))?;

        Ok(Self {
            registry,
            gpu_status,
            rate_limit_remaining,
            http_requests,
            http_request_duration,
        })
    }

    /// Render the registry in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| GatewayError::monitoring(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| GatewayError::monitoring(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_encodes() {
        let metrics = Metrics::new().unwrap();
        metrics.gpu_status.set(1);
        metrics
            .rate_limit_remaining
            .with_label_values(&["global_user", "cheap"])
            .set(2000.0);

        let text = metrics.encode().unwrap();
        assert!(text.contains("neural_home_gpu_status 1"));
        assert!(text.contains("neural_home_rate_limit_remaining"));
    }

    #[test]
    fn gpu_gauge_tracks_status() {
        let metrics = Metrics::new().unwrap();
        metrics.gpu_status.set(0);
        assert_eq!(metrics.gpu_status.get(), 0);
        metrics.gpu_status.set(1);
        assert_eq!(metrics.gpu_status.get(), 1);
    }
}
