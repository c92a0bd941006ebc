// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Instant};

use crate::{config::Settings, db::Database, models::Item, services::PlaceholderService};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub database: Database,
    pub items: PlaceholderService<Item>,
    /// Captured once when the state is built at startup.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let database = Database::from_settings(&settings);
        Self {
            settings: Arc::new(settings),
            database,
            items: PlaceholderService::new("item"),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
