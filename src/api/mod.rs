// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::fmt::Display;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Settings,
    models::{
        EnvironmentInfo, FeatureFlags, HealthResponse, Item, ItemPayload, LivenessResponse,
        ReadinessResponse, Record, VersionInfo,
    },
    state::AppState,
};

pub mod config;
pub mod health;
pub mod items;
pub mod version;

/// Prefix the v1 paths are documented under.
const DOCUMENTED_V1_PREFIX: &str = "/api/v1";

pub fn router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let v1_routes = Router::new()
        .route("/version", get(version::get_version))
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/items/{item_id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        );

    let mut app = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .route("/live", get(health::liveness))
        .route("/config", get(config::get_configuration))
        .route("/config/environment", get(config::get_environment))
        .route("/config/features", get(config::get_feature_flags))
        .nest(&settings.api_v1_prefix, v1_routes)
        .with_state(state);

    if settings.feature_api_docs {
        let doc = api_doc(&settings);
        app = app
            .merge(Redoc::with_url("/redoc", doc.clone()))
            .merge(
                SwaggerUi::new("/docs")
                    .url(format!("{}/openapi.json", settings.api_v1_prefix), doc),
            );
    }

    app.layer(cors_layer(&settings))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// OpenAPI document titled after the project, with v1 paths moved under the
/// configured prefix.
pub fn api_doc(settings: &Settings) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = settings.project_name.clone();
    doc.info.version = settings.project_version.clone();

    if settings.api_v1_prefix != DOCUMENTED_V1_PREFIX {
        let paths = std::mem::take(&mut doc.paths.paths);
        doc.paths.paths = paths
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOCUMENTED_V1_PREFIX) {
                Some(rest) => (format!("{}{rest}", settings.api_v1_prefix), item),
                None => (path, item),
            })
            .collect();
    }

    doc
}

/// CORS policy from the `ALLOW_*` settings.
///
/// Browsers refuse a literal `*` together with credentials, so wildcards are
/// served by mirroring the request when credentials are allowed.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let credentials = settings.allow_credentials;

    let origins = if is_wildcard(&settings.allowed_origins) {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        AllowOrigin::list(parse_entries("origin", &settings.allowed_origins, |v| {
            HeaderValue::from_str(v)
        }))
    };

    let methods = if is_wildcard(&settings.allow_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        AllowMethods::list(parse_entries("method", &settings.allow_methods, |v| {
            Method::from_bytes(v.to_ascii_uppercase().as_bytes())
        }))
    };

    let headers = if is_wildcard(&settings.allow_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        AllowHeaders::list(parse_entries("header", &settings.allow_headers, |v| {
            HeaderName::try_from(v)
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials)
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|value| value == "*")
}

fn parse_entries<T, E, F>(kind: &str, values: &[String], parse: F) -> Vec<T>
where
    E: Display,
    F: Fn(&str) -> Result<T, E>,
{
    values
        .iter()
        .filter_map(|value| match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(kind, value = %value, error = %err, "Skipping invalid CORS entry");
                None
            }
        })
        .collect()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        health::liveness,
        config::get_configuration,
        config::get_environment,
        config::get_feature_flags,
        version::get_version,
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item
    ),
    components(
        schemas(
            HealthResponse,
            ReadinessResponse,
            LivenessResponse,
            EnvironmentInfo,
            FeatureFlags,
            VersionInfo,
            Record,
            Item,
            ItemPayload
        )
    ),
    tags(
        (name = "health", description = "Health, readiness and liveness probes"),
        (name = "configuration", description = "Configuration introspection"),
        (name = "version", description = "Version information"),
        (name = "items", description = "Placeholder CRUD resource")
    )
)]
struct ApiDoc;
