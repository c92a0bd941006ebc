// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{models::VersionInfo, state::AppState};

pub const API_VERSION: &str = "v1";

#[utoipa::path(
    get,
    path = "/api/v1/version",
    tag = "version",
    summary = "Get version",
    responses((status = 200, body = VersionInfo))
)]
pub async fn get_version(State(state): State<AppState>) -> Json<VersionInfo> {
    Json(VersionInfo {
        version: state.settings.project_version.clone(),
        api_version: API_VERSION.to_string(),
        environment: state.settings.environment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn version_comes_from_settings() {
        let Json(info) = get_version(State(AppState::default())).await;

        assert_eq!(info.version, "0.1.0");
        assert_eq!(info.api_version, "v1");
        assert_eq!(info.environment, "development");
    }
}
