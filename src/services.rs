// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Placeholder CRUD service.
//!
//! Every operation logs and returns a fixed answer so routes can be wired up
//! before a storage backend exists.

use std::marker::PhantomData;

use uuid::Uuid;

use crate::models::Pagination;

#[derive(Debug)]
pub struct PlaceholderService<T> {
    model_name: &'static str,
    _model: PhantomData<fn() -> T>,
}

impl<T> Clone for PlaceholderService<T> {
    fn clone(&self) -> Self {
        Self {
            model_name: self.model_name,
            _model: PhantomData,
        }
    }
}

impl<T> PlaceholderService<T> {
    pub fn new(model_name: &'static str) -> Self {
        tracing::debug!(model = model_name, "Initialized service");
        Self {
            model_name,
            _model: PhantomData,
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.model_name
    }

    /// Always empty.
    pub async fn get_all(&self, page: Pagination) -> Vec<T> {
        tracing::debug!(
            model = self.model_name,
            skip = page.skip,
            limit = page.effective_limit(),
            "Getting all items"
        );
        Vec::new()
    }

    /// Always `None`.
    pub async fn get_by_id(&self, id: Uuid) -> Option<T> {
        tracing::debug!(model = self.model_name, %id, "Getting item");
        None
    }

    /// Echoes the item back.
    pub async fn create(&self, item: T) -> T {
        tracing::debug!(model = self.model_name, "Creating item");
        item
    }

    /// Echoes the item back.
    pub async fn update(&self, id: Uuid, item: T) -> Option<T> {
        tracing::debug!(model = self.model_name, %id, "Updating item");
        Some(item)
    }

    /// Always reports a deletion.
    pub async fn delete(&self, id: Uuid) -> bool {
        tracing::debug!(model = self.model_name, %id, "Deleting item");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_operations_return_fixed_answers() {
        let service = PlaceholderService::<String>::new("note");
        let id = Uuid::new_v4();

        assert_eq!(service.model_name(), "note");
        assert!(service.get_all(Pagination::default()).await.is_empty());
        assert_eq!(service.get_by_id(id).await, None);
        assert_eq!(service.create("draft".to_string()).await, "draft");
        assert_eq!(
            service.update(id, "final".to_string()).await,
            Some("final".to_string())
        );
        assert!(service.delete(id).await);
    }
}
