// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Placeholder database layer.
//!
//! Sessions only log what they would do. Swap [`Database`] for a real pool
//! when a storage backend is chosen; the readiness probe only relies on
//! [`Database::check`].

use uuid::Uuid;

use crate::config::Settings;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("session {0} is already closed")]
    SessionClosed(Uuid),
}

/// Handle to the configured database.
#[derive(Debug, Clone)]
pub struct Database {
    url: String,
}

impl Database {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Resolve the async-driver URL from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.get_database_url(true))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session(&self) -> DatabaseSession {
        DatabaseSession::open()
    }

    /// Run `work` inside a session.
    ///
    /// Commits when `work` succeeds, rolls back when it fails, and always
    /// closes the session. Returns the result of `work`.
    pub async fn with_session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut DatabaseSession) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let mut session = self.session();
        let outcome = work(&mut session);

        let finished = match &outcome {
            Ok(_) => session.commit().await,
            Err(_) => session.rollback().await,
        };
        session.close().await;

        finished?;
        outcome
    }

    /// Open a session and commit it.
    pub async fn check(&self) -> Result<(), DatabaseError> {
        self.with_session(|_| Ok(())).await
    }
}

/// Mock session. Never touches a real backend.
#[derive(Debug)]
pub struct DatabaseSession {
    id: Uuid,
    closed: bool,
}

impl DatabaseSession {
    fn open() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "Opening database session");
        Self { id, closed: false }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn commit(&mut self) -> Result<(), DatabaseError> {
        self.ensure_open()?;
        tracing::debug!(session = %self.id, "Committing transaction");
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<(), DatabaseError> {
        self.ensure_open()?;
        tracing::debug!(session = %self.id, "Rolling back transaction");
        Ok(())
    }

    pub async fn close(&mut self) {
        if !self.closed {
            tracing::debug!(session = %self.id, "Closing database session");
            self.closed = true;
        }
    }

    fn ensure_open(&self) -> Result<(), DatabaseError> {
        if self.closed {
            Err(DatabaseError::SessionClosed(self.id))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum WorkError {
        Failed,
        Database(String),
    }

    impl From<DatabaseError> for WorkError {
        fn from(err: DatabaseError) -> Self {
            WorkError::Database(err.to_string())
        }
    }

    #[tokio::test]
    async fn check_succeeds_on_mock() {
        let db = Database::new("sqlite:///./app.db");
        assert!(db.check().await.is_ok());
    }

    #[tokio::test]
    async fn with_session_returns_work_result() {
        let db = Database::new("sqlite:///./app.db");

        let value = db
            .with_session(|session| {
                assert!(!session.is_closed());
                Ok::<_, WorkError>(42)
            })
            .await;
        assert_eq!(value, Ok(42));

        let failed = db
            .with_session(|_| Err::<(), _>(WorkError::Failed))
            .await;
        assert_eq!(failed, Err(WorkError::Failed));
    }

    #[tokio::test]
    async fn closed_session_rejects_commit() {
        let db = Database::new("sqlite:///./app.db");
        let mut session = db.session();
        session.close().await;

        assert!(session.is_closed());
        assert!(matches!(
            session.commit().await,
            Err(DatabaseError::SessionClosed(id)) if id == session.id()
        ));
        assert!(session.rollback().await.is_err());
    }

    #[test]
    fn from_settings_uses_async_driver_url() {
        let settings = Settings::builder()
            .set("DATABASE_URL", "postgresql://u:p@h/db")
            .build()
            .unwrap();
        assert_eq!(Database::from_settings(&settings).url(), "postgresql+asyncpg://u:p@h/db");
    }
}
