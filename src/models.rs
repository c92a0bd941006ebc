// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API. All types derive
//! `Serialize` and `ToSchema` for JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Probes**: health, readiness and liveness responses
//! - **Configuration**: environment, feature flag and version views
//! - **Records**: the base entity shape and the sample `Item` resource

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Service identifier reported by the health probe.
pub const SERVICE_NAME: &str = "reference-backend";

// =============================================================================
// Probe Models
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HealthResponse {
    /// Health status, always `healthy`.
    pub status: String,
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,
    /// Service identifier.
    pub service: String,
    /// Service version.
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            service: SERVICE_NAME.to_string(),
            version: version.into(),
        }
    }
}

/// Readiness check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReadinessResponse {
    /// `ready` when every check passed, `not_ready` otherwise.
    pub status: String,
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,
    /// Individual readiness checks.
    pub checks: BTreeMap<String, bool>,
}

impl ReadinessResponse {
    /// Aggregate named checks: ready iff every check is true.
    pub fn from_checks(checks: BTreeMap<String, bool>) -> Self {
        let ready = checks.values().all(|passed| *passed);
        Self {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

/// Liveness check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LivenessResponse {
    /// Liveness status, always `alive`.
    pub status: String,
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,
    /// Seconds since the process started.
    pub uptime_seconds: f64,
}

// =============================================================================
// Configuration Models
// =============================================================================

/// Current environment and mode.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EnvironmentInfo {
    pub environment: String,
    pub debug: bool,
    pub version: String,
}

/// Feature flag states.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FeatureFlags {
    pub api_docs: bool,
    pub metrics: bool,
    pub admin_panel: bool,
    pub rate_limiting: bool,
    pub opentelemetry: bool,
}

/// Version information.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub api_version: String,
    pub environment: String,
}

// =============================================================================
// Record Models
// =============================================================================

/// Fields shared by every stored entity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Record {
    /// Unique identifier.
    pub id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample resource served by the placeholder CRUD routes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Item {
    #[serde(flatten)]
    pub record: Record,
    pub name: String,
    pub description: Option<String>,
}

/// Request body for creating or replacing an item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ItemPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Item {
    pub fn create(payload: ItemPayload) -> Self {
        Self {
            record: Record::new(),
            name: payload.name,
            description: payload.description,
        }
    }

    /// Item with the given id and payload, stamped as updated now.
    pub fn replace(id: Uuid, payload: ItemPayload) -> Self {
        let now = Utc::now();
        Self {
            record: Record {
                id,
                created_at: now,
                updated_at: Some(now),
            },
            name: payload.name,
            description: payload.description,
        }
    }
}

/// Pagination query for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct Pagination {
    /// Number of records to skip.
    #[serde(default)]
    pub skip: usize,
    /// Maximum number of records to return (default 100, at most 1000).
    pub limit: Option<usize>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: usize = 100;
    pub const MAX_LIMIT: usize = 1000;

    /// Requested limit, defaulted and clamped to [`Pagination::MAX_LIMIT`].
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_requires_every_check() {
        let ready = ReadinessResponse::from_checks(BTreeMap::from([
            ("database".to_string(), true),
            ("configuration".to_string(), true),
        ]));
        assert!(ready.is_ready());
        assert_eq!(ready.status, "ready");

        let degraded = ReadinessResponse::from_checks(BTreeMap::from([
            ("database".to_string(), true),
            ("cache".to_string(), false),
            ("external_api".to_string(), true),
        ]));
        assert_eq!(degraded.status, "not_ready");
        assert_eq!(degraded.checks.len(), 3);
        assert!(!degraded.checks["cache"]);
    }

    #[test]
    fn health_response_uses_default_service() {
        let response = HealthResponse::healthy("1.0.0");
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, SERVICE_NAME);
        assert_eq!(response.version, "1.0.0");
    }

    #[test]
    fn item_serializes_record_fields_inline() {
        let item = Item::create(ItemPayload {
            name: "widget".into(),
            description: None,
        });
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["id"], item.record.id.to_string());
        assert_eq!(value["name"], "widget");
        assert!(value["updated_at"].is_null());
    }

    #[test]
    fn pagination_limit_is_capped() {
        let page = Pagination {
            skip: 0,
            limit: Some(5000),
        };
        assert_eq!(page.effective_limit(), Pagination::MAX_LIMIT);
        assert_eq!(Pagination::default().effective_limit(), Pagination::DEFAULT_LIMIT);
    }
}
