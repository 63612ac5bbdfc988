//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::warn;

use super::state::AppState;
use crate::api::types::Json;

const STORE_PROBE_KEY: &str = "health:probe";

/// Detailed health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl HealthResponse {
    fn new(status: HealthStatus) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: None,
            latency_ms: None,
        }
    }
}

impl HealthCheck {
    fn from_probe<T, E: std::fmt::Display>(
        name: &str,
        outcome: Result<T, E>,
        started: Instant,
    ) -> Self {
        let (status, message) = match outcome {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
        };

        Self {
            name: name.to_string(),
            status,
            message,
            latency_ms: Some(started.elapsed().as_millis() as u64),
        }
    }
}

/// Returns 200 while the process is running
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new(HealthStatus::Healthy))
}

/// Readiness check with a store probe
///
/// An unreachable store only degrades the service: caches miss and the
/// limiter fails open, so requests are still accepted.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();

    let probe = state.store.exists(STORE_PROBE_KEY).await;
    if let Err(e) = &probe {
        warn!(error = %e, "Store readiness probe failed");
    }
    let store_check = HealthCheck::from_probe("store", probe, started);

    let status = if store_check.status == HealthStatus::Healthy {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let mut response = HealthResponse::new(status);
    response.checks = Some(vec![store_check]);
    response.latency_ms = Some(started.elapsed().as_millis() as u64);

    let status_code = match status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status_code, Json(response))
}

/// Used for Kubernetes liveness probes
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }

    #[test]
    fn test_health_response_with_checks() {
        let failed: Result<(), &str> = Err("Connection refused");
        let mut response = HealthResponse::new(HealthStatus::Degraded);
        response.checks = Some(vec![HealthCheck::from_probe("store", failed, Instant::now())]);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"degraded\""));
        assert!(json.contains("\"store\""));
        assert!(json.contains("Connection refused"));
    }
}
