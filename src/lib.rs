// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reference Service - Web Service Scaffold
//!
//! Starting point for HTTP services: probes, layered settings with
//! validation and redaction, and placeholder CRUD routes.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and router
//! - `config` - Settings loading, validation and export
//! - `db` - Placeholder database sessions
//! - `services` - Placeholder CRUD service
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
