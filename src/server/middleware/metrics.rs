//! Metrics middleware
//!
//! Records count and latency for every request, and refreshes the
//! Redis-backed gauges (GPU status, limiter remaining) only when Prometheus
//! scrapes `/metrics`. Redis errors during the refresh are swallowed; a dead
//! store must not break the scrape.

use crate::core::limiter::{BucketClass, GLOBAL_SUBJECT};
use crate::server::state::AppState;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web;
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::info;

/// Metrics middleware for Actix-web
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService { service }))
    }
}

/// Service implementation for the metrics middleware
pub struct MetricsMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let app_state = req.app_data::<web::Data<AppState>>().cloned();

        let fut = self.service.call(req);

        Box::pin(async move {
            if path == "/metrics" {
                if let Some(state) = &app_state {
                    refresh_gauges(state).await;
                }
            }

            let res = fut.await?;

            let elapsed = start.elapsed();
            let status = res.status().as_u16().to_string();
            if let Some(state) = &app_state {
                state
                    .metrics
                    .http_requests
                    .with_label_values(&[&method, &path, &status])
                    .inc();
                state
                    .metrics
                    .http_request_duration
                    .with_label_values(&[&method, &path])
                    .observe(elapsed.as_secs_f64());
            }

            info!("{} {} -> {} in {:?}", method, path, status, elapsed);
            Ok(res)
        })
    }
}

/// Update the Redis-backed gauges ahead of a scrape
async fn refresh_gauges(state: &web::Data<AppState>) {
    if let Ok(status) = state.redis.get("gpu_status").await {
        let green = status.as_deref() == Some("GREEN");
        state.metrics.gpu_status.set(green as i64);
    }

    for class in BucketClass::ALL {
        if let Some(remaining) = state.limiter.remaining(GLOBAL_SUBJECT, class).await {
            state
                .metrics
                .rate_limit_remaining
                .with_label_values(&[GLOBAL_SUBJECT, class.as_str()])
                .set(remaining);
        }
    }
}
