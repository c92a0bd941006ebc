// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Application Settings
//!
//! Settings are assembled from layered sources, highest priority first:
//!
//! 1. Explicit values passed to [`SettingsBuilder::set`]
//! 2. Environment variables (case-sensitive, named after the fields)
//! 3. The `.env` file in the working directory, if present
//! 4. Schema defaults ([`Settings::default`])
//!
//! Unknown keys are ignored in every layer. Values are parsed and validated
//! once by [`SettingsBuilder::build`]; every violated constraint is reported
//! together in [`SettingsError::Invalid`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENVIRONMENT` | `development`, `testing`, `staging` or `production` | `development` |
//! | `PROJECT_NAME` | Service display name | `Reference Service` |
//! | `PROJECT_VERSION` | Reported service version | `0.1.0` |
//! | `API_V1_PREFIX` | Mount point of the v1 API | `/api/v1` |
//! | `DEBUG` / `RELOAD` | Derived from `ENVIRONMENT` in development and production | `false` |
//! | `HOST` / `PORT` | Server bind address (`PORT` in 1-65535) | `0.0.0.0` / `8000` |
//! | `WORKERS` | Runtime worker threads (>= 1) | `1` |
//! | `ALLOWED_ORIGINS` | CORS origins (JSON array or comma list) | `http://localhost:3000,http://localhost:8000` |
//! | `ALLOW_CREDENTIALS` | CORS credentials | `true` |
//! | `ALLOW_METHODS` / `ALLOW_HEADERS` | CORS methods and headers | `*` |
//! | `DATABASE_URL` | Database connection string | `sqlite:///./app.db` |
//! | `SECRET_KEY` | Token signing key, must be changed in production | `your-secret-key-here` |
//! | `REDIS_URL`, `EXTERNAL_API_KEY`, `SENTRY_DSN` | Optional integrations | unset |
//! | `RATE_LIMIT_*`, `FEATURE_*`, `OPENTELEMETRY_*` | Feature toggles | see [`Settings::default`] |
//!
//! Sensitive values (see [`SENSITIVE_FIELDS`]) are masked by
//! [`Settings::export`] and in the `Debug` output.

use std::{
    collections::HashMap,
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Default environment file, resolved against the working directory.
pub const ENV_FILE: &str = ".env";

/// Placeholder secret key that must never be used in production.
pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-here";

/// Marker substituted for sensitive values on export.
pub const REDACTED: &str = "***REDACTED***";

/// Fields whose values are masked when exporting with `exclude_sensitive`.
pub const SENSITIVE_FIELDS: [&str; 5] = [
    "SECRET_KEY",
    "DATABASE_URL",
    "REDIS_URL",
    "EXTERNAL_API_KEY",
    "SENTRY_DSN",
];

const POSTGRES_SCHEME: &str = "postgresql://";
const POSTGRES_ASYNC_SCHEME: &str = "postgresql+asyncpg://";

// =============================================================================
// Environment
// =============================================================================

/// Deployment environment the process runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "must be one of development, testing, staging, production (got \"{other}\")"
            )),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub constraint: String,
}

impl FieldViolation {
    fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read environment file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("invalid settings: {}", join_violations(.0))]
    Invalid(Vec<FieldViolation>),
}

impl SettingsError {
    /// Violations carried by an [`SettingsError::Invalid`] error.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            SettingsError::Invalid(violations) => violations,
            SettingsError::EnvFile { .. } => &[],
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Settings
// =============================================================================

/// Process-wide configuration record.
///
/// Built once at startup and shared read-only through
/// [`AppState`](crate::state::AppState).
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub environment: Environment,

    pub project_name: String,
    pub project_version: String,
    pub api_v1_prefix: String,

    pub debug: bool,
    pub reload: bool,
    pub host: String,
    pub port: u16,
    pub workers: u32,

    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,

    pub database_url: String,
    pub database_pool_size: u32,

    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: u32,
    pub refresh_token_expire_days: u32,

    pub redis_url: Option<String>,
    pub external_api_key: Option<String>,
    pub sentry_dsn: Option<String>,

    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_period_seconds: u32,

    pub feature_api_docs: bool,
    pub feature_metrics: bool,
    pub feature_admin_panel: bool,

    pub opentelemetry_enabled: bool,
    pub opentelemetry_endpoint: Option<String>,
}

impl Default for Settings {
    /// Schema defaults, with the development flags already derived.
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            project_name: "Reference Service".to_string(),
            project_version: "0.1.0".to_string(),
            api_v1_prefix: "/api/v1".to_string(),
            debug: true,
            reload: true,
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 1,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
            allow_credentials: true,
            allow_methods: vec!["*".to_string()],
            allow_headers: vec!["*".to_string()],
            database_url: "sqlite:///./app.db".to_string(),
            database_pool_size: 5,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            redis_url: None,
            external_api_key: None,
            sentry_dsn: None,
            rate_limit_enabled: false,
            rate_limit_requests: 100,
            rate_limit_period_seconds: 60,
            feature_api_docs: true,
            feature_metrics: false,
            feature_admin_panel: false,
            opentelemetry_enabled: false,
            opentelemetry_endpoint: None,
        }
    }
}

impl Settings {
    /// Start an empty builder. Nothing is read from the environment unless
    /// requested, so tests stay hermetic.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Load settings from `.env` and the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        Self::builder().env_file(ENV_FILE).process_env().build()
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_testing(&self) -> bool {
        self.environment == Environment::Testing
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Database URL, with the PostgreSQL scheme rewritten for the async
    /// driver when `async_driver` is set. Other schemes are returned as-is.
    pub fn get_database_url(&self, async_driver: bool) -> String {
        match self.database_url.strip_prefix(POSTGRES_SCHEME) {
            Some(rest) if async_driver => format!("{POSTGRES_ASYNC_SCHEME}{rest}"),
            _ => self.database_url.clone(),
        }
    }

    /// `HOST:PORT` pair the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Flat mapping of every field to its value.
    ///
    /// With `exclude_sensitive`, non-empty values of [`SENSITIVE_FIELDS`] are
    /// replaced by [`REDACTED`]. Empty or unset values are left untouched.
    pub fn export(&self, exclude_sensitive: bool) -> Map<String, Value> {
        let mut map = Map::new();
        let mut put = |key: &str, value: Value| {
            map.insert(key.to_string(), value);
        };

        put("ENVIRONMENT", json!(self.environment.as_str()));
        put("PROJECT_NAME", json!(self.project_name));
        put("PROJECT_VERSION", json!(self.project_version));
        put("API_V1_PREFIX", json!(self.api_v1_prefix));
        put("DEBUG", json!(self.debug));
        put("RELOAD", json!(self.reload));
        put("HOST", json!(self.host));
        put("PORT", json!(self.port));
        put("WORKERS", json!(self.workers));
        put("ALLOWED_ORIGINS", json!(self.allowed_origins));
        put("ALLOW_CREDENTIALS", json!(self.allow_credentials));
        put("ALLOW_METHODS", json!(self.allow_methods));
        put("ALLOW_HEADERS", json!(self.allow_headers));
        put("DATABASE_URL", json!(self.database_url));
        put("DATABASE_POOL_SIZE", json!(self.database_pool_size));
        put("SECRET_KEY", json!(self.secret_key));
        put("ALGORITHM", json!(self.algorithm));
        put(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            json!(self.access_token_expire_minutes),
        );
        put(
            "REFRESH_TOKEN_EXPIRE_DAYS",
            json!(self.refresh_token_expire_days),
        );
        put("REDIS_URL", json!(self.redis_url));
        put("EXTERNAL_API_KEY", json!(self.external_api_key));
        put("SENTRY_DSN", json!(self.sentry_dsn));
        put("RATE_LIMIT_ENABLED", json!(self.rate_limit_enabled));
        put("RATE_LIMIT_REQUESTS", json!(self.rate_limit_requests));
        put(
            "RATE_LIMIT_PERIOD_SECONDS",
            json!(self.rate_limit_period_seconds),
        );
        put("FEATURE_API_DOCS", json!(self.feature_api_docs));
        put("FEATURE_METRICS", json!(self.feature_metrics));
        put("FEATURE_ADMIN_PANEL", json!(self.feature_admin_panel));
        put("OPENTELEMETRY_ENABLED", json!(self.opentelemetry_enabled));
        put("OPENTELEMETRY_ENDPOINT", json!(self.opentelemetry_endpoint));

        if exclude_sensitive {
            for field in SENSITIVE_FIELDS {
                if let Some(value) = map.get_mut(field) {
                    if is_present(value) {
                        *value = Value::String(REDACTED.to_string());
                    }
                }
            }
        }

        map
    }

    /// Parse and validate a merged set of raw values.
    fn from_raw(values: &HashMap<String, Value>) -> Result<Self, SettingsError> {
        let defaults = Settings::default();
        let mut raw = RawValues::new(values);

        let environment = raw.environment("ENVIRONMENT", defaults.environment);
        let requested_debug = raw.optional_bool("DEBUG");
        let requested_reload = raw.optional_bool("RELOAD");

        let api_v1_prefix = raw.string("API_V1_PREFIX", &defaults.api_v1_prefix);
        if !api_v1_prefix.starts_with('/') || api_v1_prefix.ends_with('/') {
            raw.violation(
                "API_V1_PREFIX",
                format!("must start with '/' and not end with '/' (got \"{api_v1_prefix}\")"),
            );
        }

        let mut settings = Settings {
            environment,
            project_name: raw.string("PROJECT_NAME", &defaults.project_name),
            project_version: raw.string("PROJECT_VERSION", &defaults.project_version),
            api_v1_prefix,
            debug: false,
            reload: false,
            host: raw.string("HOST", &defaults.host),
            port: raw.bounded("PORT", defaults.port, 1, u16::MAX),
            workers: raw.at_least_one("WORKERS", defaults.workers),
            allowed_origins: raw.list("ALLOWED_ORIGINS", &defaults.allowed_origins),
            allow_credentials: raw.boolean("ALLOW_CREDENTIALS", defaults.allow_credentials),
            allow_methods: raw.list("ALLOW_METHODS", &defaults.allow_methods),
            allow_headers: raw.list("ALLOW_HEADERS", &defaults.allow_headers),
            database_url: raw.string("DATABASE_URL", &defaults.database_url),
            database_pool_size: raw.at_least_one("DATABASE_POOL_SIZE", defaults.database_pool_size),
            secret_key: raw.string("SECRET_KEY", &defaults.secret_key),
            algorithm: raw.string("ALGORITHM", &defaults.algorithm),
            access_token_expire_minutes: raw.at_least_one(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                defaults.access_token_expire_minutes,
            ),
            refresh_token_expire_days: raw
                .at_least_one("REFRESH_TOKEN_EXPIRE_DAYS", defaults.refresh_token_expire_days),
            redis_url: raw.optional_string("REDIS_URL"),
            external_api_key: raw.optional_string("EXTERNAL_API_KEY"),
            sentry_dsn: raw.optional_string("SENTRY_DSN"),
            rate_limit_enabled: raw.boolean("RATE_LIMIT_ENABLED", defaults.rate_limit_enabled),
            rate_limit_requests: raw
                .at_least_one("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            rate_limit_period_seconds: raw
                .at_least_one("RATE_LIMIT_PERIOD_SECONDS", defaults.rate_limit_period_seconds),
            feature_api_docs: raw.boolean("FEATURE_API_DOCS", defaults.feature_api_docs),
            feature_metrics: raw.boolean("FEATURE_METRICS", defaults.feature_metrics),
            feature_admin_panel: raw.boolean("FEATURE_ADMIN_PANEL", defaults.feature_admin_panel),
            opentelemetry_enabled: raw
                .boolean("OPENTELEMETRY_ENABLED", defaults.opentelemetry_enabled),
            opentelemetry_endpoint: raw.optional_string("OPENTELEMETRY_ENDPOINT"),
        };

        raw.finish()?;

        let (debug, reload) = derive_runtime_flags(environment, requested_debug, requested_reload);
        settings.debug = debug;
        settings.reload = reload;

        check_production_safety(&settings)?;

        tracing::info!(environment = %settings.environment, "Settings loaded");
        Ok(settings)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.export(true)).finish()
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Derive `DEBUG` and `RELOAD` from the environment.
///
/// Development forces both on and production forces both off, whatever was
/// requested. Testing and staging keep the requested values.
pub fn derive_runtime_flags(
    environment: Environment,
    requested_debug: Option<bool>,
    requested_reload: Option<bool>,
) -> (bool, bool) {
    let forced = match environment {
        Environment::Development => Some(true),
        Environment::Production => Some(false),
        Environment::Testing | Environment::Staging => None,
    };

    let Some(value) = forced else {
        return (
            requested_debug.unwrap_or(false),
            requested_reload.unwrap_or(false),
        );
    };

    for (field, requested) in [("DEBUG", requested_debug), ("RELOAD", requested_reload)] {
        if requested.is_some_and(|requested| requested != value) {
            tracing::warn!(
                field,
                %environment,
                value,
                "Explicit value overridden by environment"
            );
        }
    }

    (value, value)
}

/// A production setting that is allowed but worth flagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionWarning {
    ApiDocsEnabled,
    TooFewWorkers(u32),
}

impl fmt::Display for ProductionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiDocsEnabled => f.write_str("API documentation is enabled in production"),
            Self::TooFewWorkers(workers) => {
                write!(f, "Running production with fewer than 2 workers ({workers})")
            }
        }
    }
}

/// Non-fatal concerns about `settings`. Empty outside production.
pub fn production_warnings(settings: &Settings) -> Vec<ProductionWarning> {
    if !settings.is_production() {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    if settings.feature_api_docs {
        warnings.push(ProductionWarning::ApiDocsEnabled);
    }
    if settings.workers < 2 {
        warnings.push(ProductionWarning::TooFewWorkers(settings.workers));
    }
    warnings
}

/// Reject unsafe production settings and warn about questionable ones.
fn check_production_safety(settings: &Settings) -> Result<(), SettingsError> {
    if settings.is_production() && settings.secret_key == DEFAULT_SECRET_KEY {
        return Err(SettingsError::Invalid(vec![FieldViolation::new(
            "SECRET_KEY",
            "must be changed from the default value in production",
        )]));
    }

    for warning in production_warnings(settings) {
        tracing::warn!("{warning}");
    }

    Ok(())
}

// =============================================================================
// Raw value parsing
// =============================================================================

/// Parse a list value given as a string.
///
/// A string starting with `[` is read as a JSON array of strings; if that
/// fails, or for any other string, the value is split on commas and each
/// entry trimmed. Empty entries are dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
            return items;
        }
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Typed accessors over the merged layers, collecting violations as they go.
struct RawValues<'a> {
    values: &'a HashMap<String, Value>,
    violations: Vec<FieldViolation>,
}

impl<'a> RawValues<'a> {
    fn new(values: &'a HashMap<String, Value>) -> Self {
        Self {
            values,
            violations: Vec::new(),
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.values.get(field).filter(|value| !value.is_null())
    }

    fn violation(&mut self, field: &'static str, constraint: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, constraint));
    }

    fn finish(self) -> Result<(), SettingsError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::Invalid(self.violations))
        }
    }

    fn environment(&mut self, field: &'static str, default: Environment) -> Environment {
        match self.get(field) {
            None => default,
            Some(Value::String(s)) => s.parse().unwrap_or_else(|constraint: String| {
                self.violation(field, constraint);
                default
            }),
            Some(other) => {
                self.violation(field, format!("must be a string (got {other})"));
                default
            }
        }
    }

    fn string(&mut self, field: &'static str, default: &str) -> String {
        match self.get(field) {
            None => default.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(value @ (Value::Number(_) | Value::Bool(_))) => value.to_string(),
            Some(other) => {
                self.violation(field, format!("must be a string (got {other})"));
                default.to_string()
            }
        }
    }

    fn optional_string(&mut self, field: &'static str) -> Option<String> {
        let value = self.string(field, "");
        (!value.is_empty()).then_some(value)
    }

    fn optional_bool(&mut self, field: &'static str) -> Option<bool> {
        let parsed = match self.get(field)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => parse_bool(s),
            _ => None,
        };
        if parsed.is_none() {
            self.violation(field, "must be a boolean");
        }
        parsed
    }

    fn boolean(&mut self, field: &'static str, default: bool) -> bool {
        self.optional_bool(field).unwrap_or(default)
    }

    fn integer(&mut self, field: &'static str) -> Option<i64> {
        let parsed = match self.get(field)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.violation(field, "must be an integer");
        }
        parsed
    }

    fn bounded<T>(&mut self, field: &'static str, default: T, min: T, max: T) -> T
    where
        T: Copy + Into<i64> + TryFrom<i64>,
    {
        let Some(value) = self.integer(field) else {
            return default;
        };
        let (min, max): (i64, i64) = (min.into(), max.into());
        match T::try_from(value) {
            Ok(parsed) if (min..=max).contains(&value) => parsed,
            _ => {
                let constraint = if value < min && max >= i64::from(u32::MAX) {
                    format!("must be at least {min} (got {value})")
                } else {
                    format!("must be between {min} and {max} (got {value})")
                };
                self.violation(field, constraint);
                default
            }
        }
    }

    fn at_least_one(&mut self, field: &'static str, default: u32) -> u32 {
        self.bounded(field, default, 1, u32::MAX)
    }

    fn list(&mut self, field: &'static str, default: &[String]) -> Vec<String> {
        match self.get(field) {
            None => default.to_vec(),
            Some(Value::String(s)) => parse_list(s),
            Some(Value::Array(items)) => {
                let strings: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(String::from))
                    .collect();
                strings.unwrap_or_else(|| {
                    self.violation(field, "must be a list of strings");
                    default.to_vec()
                })
            }
            Some(_) => {
                self.violation(field, "must be a list of strings");
                default.to_vec()
            }
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects the configuration layers and builds a validated [`Settings`].
#[derive(Debug, Default, Clone)]
pub struct SettingsBuilder {
    env_file: Option<PathBuf>,
    env_vars: HashMap<String, String>,
    overrides: HashMap<String, Value>,
}

impl SettingsBuilder {
    /// Read the given env file as the lowest-priority layer. A missing file
    /// is skipped.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Add environment variables as a layer above the env file.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add the current process environment.
    pub fn process_env(self) -> Self {
        self.env_vars_os(std::env::vars_os())
    }

    /// Add OS environment pairs. Pairs whose key or value is not valid
    /// UTF-8 are skipped.
    pub fn env_vars_os<I>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        self.env_vars(vars.into_iter().filter_map(|(key, value)| {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    tracing::debug!(
                        key = %key.unwrap_or_else(|raw| raw.to_string_lossy().into_owned()),
                        "Skipping non UTF-8 environment variable"
                    );
                    None
                }
            }
        }))
    }

    /// Set an explicit value, overriding every other layer.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Settings, SettingsError> {
        let mut merged: HashMap<String, Value> = HashMap::new();

        if let Some(path) = &self.env_file {
            merged.extend(
                read_env_file(path)?
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v))),
            );
        }
        merged.extend(self.env_vars.into_iter().map(|(k, v)| (k, Value::String(v))));
        merged.extend(self.overrides);

        Settings::from_raw(&merged)
    }
}

fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, SettingsError> {
    let to_error = |source: dotenvy::Error| SettingsError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.collect::<Result<Vec<_>, _>>().map_err(to_error),
        Err(err) if err.not_found() => {
            tracing::debug!(path = %path.display(), "No environment file found");
            Ok(Vec::new())
        }
        Err(err) => Err(to_error(err)),
    }
}
