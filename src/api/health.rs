// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::Utc;

use crate::models::{HealthResponse, LivenessResponse, ReadinessResponse};
use crate::state::AppState;

/// Open a session on the database and commit it.
async fn check_database(state: &AppState) -> bool {
    match state.database.check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Database readiness check failed");
            false
        }
    }
}

/// Health check endpoint handler.
///
/// Always healthy; no dependency checks.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.settings.project_version.clone()))
}

/// Readiness probe handler.
///
/// Reports `ready` only if every check passes. The status code is 200 either
/// way; callers read `status`.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    summary = "Readiness check",
    responses(
        (status = 200, description = "Readiness report", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let checks = BTreeMap::from([
        ("database".to_string(), check_database(&state).await),
        // Settings are validated before the router exists.
        ("configuration".to_string(), true),
    ]);

    let response = ReadinessResponse::from_checks(checks);
    if !response.is_ready() {
        tracing::warn!(checks = ?response.checks, "Service not ready");
    }
    Json(response)
}

/// Liveness probe handler.
///
/// Always alive while the process runs. Does not check dependencies.
#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    summary = "Liveness check",
    responses(
        (status = 200, description = "Service is alive", body = LivenessResponse)
    )
)]
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.uptime_seconds(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::SERVICE_NAME;

    #[tokio::test]
    async fn health_reports_version() {
        let state = AppState::default();
        let Json(response) = health(State(state.clone())).await;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, SERVICE_NAME);
        assert_eq!(response.version, state.settings.project_version);
    }

    #[tokio::test]
    async fn readiness_includes_all_checks() {
        let Json(response) = readiness(State(AppState::default())).await;

        assert_eq!(response.status, "ready");
        assert_eq!(response.checks.get("database"), Some(&true));
        assert_eq!(response.checks.get("configuration"), Some(&true));
    }

    #[tokio::test]
    async fn liveness_reports_uptime() {
        let state = AppState::default();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let Json(response) = liveness(State(state)).await;
        assert_eq!(response.status, "alive");
        assert!(response.uptime_seconds > 0.0);
    }
}
