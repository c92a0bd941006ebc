// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Configuration introspection endpoints.
//!
//! `/config` exposes the redacted settings. In production it is only served
//! when the admin panel feature is enabled; the [`ConfigAccess`] extractor
//! enforces that before the handler runs.

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use serde_json::{Map, Value};

use crate::{
    config::Settings,
    error::ApiError,
    models::{EnvironmentInfo, FeatureFlags},
    state::AppState,
};

/// Guard for the configuration endpoint.
pub struct ConfigAccess;

impl ConfigAccess {
    pub fn check(settings: &Settings) -> Result<(), ApiError> {
        if settings.is_production() && !settings.feature_admin_panel {
            return Err(ApiError::forbidden(
                "Configuration endpoint is disabled in production",
            ));
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for ConfigAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::check(&state.settings)?;
        Ok(ConfigAccess)
    }
}

#[utoipa::path(
    get,
    path = "/config",
    tag = "configuration",
    summary = "Get configuration",
    description = "Current application configuration with sensitive values redacted",
    responses(
        (status = 200, description = "Redacted settings", body = Object),
        (status = 403, description = "Disabled in production")
    )
)]
pub async fn get_configuration(
    _access: ConfigAccess,
    State(state): State<AppState>,
) -> Json<Map<String, Value>> {
    tracing::debug!("Configuration requested");
    Json(state.settings.export(true))
}

#[utoipa::path(
    get,
    path = "/config/environment",
    tag = "configuration",
    summary = "Get environment info",
    responses((status = 200, body = EnvironmentInfo))
)]
pub async fn get_environment(State(state): State<AppState>) -> Json<EnvironmentInfo> {
    let settings = &state.settings;
    Json(EnvironmentInfo {
        environment: settings.environment.to_string(),
        debug: settings.debug,
        version: settings.project_version.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/config/features",
    tag = "configuration",
    summary = "Get feature flags",
    responses((status = 200, body = FeatureFlags))
)]
pub async fn get_feature_flags(State(state): State<AppState>) -> Json<FeatureFlags> {
    let settings = &state.settings;
    Json(FeatureFlags {
        api_docs: settings.feature_api_docs,
        metrics: settings.feature_metrics,
        admin_panel: settings.feature_admin_panel,
        rate_limiting: settings.rate_limit_enabled,
        opentelemetry: settings.opentelemetry_enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::config::REDACTED;

    fn production(admin_panel: bool) -> Settings {
        Settings::builder()
            .set("ENVIRONMENT", "production")
            .set("SECRET_KEY", "production-secret")
            .set("FEATURE_ADMIN_PANEL", admin_panel)
            .build()
            .expect("production settings are valid")
    }

    #[test]
    fn access_is_denied_in_production_without_admin_panel() {
        let err = ConfigAccess::check(&production(false)).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        assert!(ConfigAccess::check(&production(true)).is_ok());
        assert!(ConfigAccess::check(&Settings::default()).is_ok());
    }

    #[tokio::test]
    async fn configuration_is_redacted() {
        let settings = Settings::builder()
            .set("SECRET_KEY", "s3cr3t")
            .build()
            .unwrap();
        let Json(body) = get_configuration(ConfigAccess, State(AppState::new(settings))).await;

        assert_eq!(body["SECRET_KEY"], REDACTED);
        assert_eq!(body["ENVIRONMENT"], "development");
    }

    #[tokio::test]
    async fn environment_info_reflects_settings() {
        let Json(info) = get_environment(State(AppState::new(production(false)))).await;

        assert_eq!(info.environment, "production");
        assert!(!info.debug);
        assert_eq!(info.version, "0.1.0");
    }

    #[tokio::test]
    async fn feature_flags_reflect_settings() {
        let settings = Settings::builder()
            .set("FEATURE_METRICS", true)
            .set("RATE_LIMIT_ENABLED", "true")
            .build()
            .unwrap();
        let Json(flags) = get_feature_flags(State(AppState::new(settings))).await;

        assert_eq!(
            flags,
            FeatureFlags {
                api_docs: true,
                metrics: true,
                admin_panel: false,
                rate_limiting: true,
                opentelemetry: false,
            }
        );
    }
}
