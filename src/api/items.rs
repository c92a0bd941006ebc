// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Item, ItemPayload, Pagination},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(Pagination),
    tag = "items",
    responses((status = 200, body = [Item]))
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Json<Vec<Item>> {
    Json(state.items.get_all(page).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Identifier of the item")
    ),
    tag = "items",
    responses(
        (status = 200, body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    Path(item_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Item>, ApiError> {
    state
        .items
        .get_by_id(item_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = ItemPayload,
    tag = "items",
    responses((status = 201, body = Item))
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<ItemPayload>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::unprocessable("Item name must not be empty"));
    }
    let item = state.items.create(Item::create(payload)).await;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Identifier of the item to replace")
    ),
    request_body = ItemPayload,
    tag = "items",
    responses(
        (status = 200, body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    Path(item_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<ItemPayload>,
) -> Result<Json<Item>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::unprocessable("Item name must not be empty"));
    }
    state
        .items
        .update(item_id, Item::replace(item_id, payload))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Identifier of the item to delete")
    ),
    tag = "items",
    responses(
        (status = 204),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    Path(item_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if state.items.delete(item_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Item not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> ItemPayload {
        ItemPayload {
            name: name.into(),
            description: Some("placeholder".into()),
        }
    }

    #[tokio::test]
    async fn list_items_is_empty() {
        let Json(items) =
            list_items(State(AppState::default()), Query(Pagination::default())).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn get_item_is_not_found() {
        let err = get_item(Path(Uuid::new_v4()), State(AppState::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_item_echoes_payload() {
        let (status, Json(item)) =
            create_item(State(AppState::default()), Json(payload("widget")))
                .await
                .expect("item creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item.name, "widget");
        assert_eq!(item.description.as_deref(), Some("placeholder"));
        assert!(item.record.updated_at.is_none());
    }

    #[tokio::test]
    async fn create_item_rejects_blank_name() {
        let err = create_item(State(AppState::default()), Json(payload("  ")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn update_item_keeps_id() {
        let id = Uuid::new_v4();
        let Json(item) = update_item(Path(id), State(AppState::default()), Json(payload("renamed")))
            .await
            .expect("item update succeeds");

        assert_eq!(item.record.id, id);
        assert_eq!(item.name, "renamed");
        assert!(item.record.updated_at.is_some());
    }

    #[tokio::test]
    async fn delete_item_returns_no_content() {
        let status = delete_item(Path(Uuid::new_v4()), State(AppState::default()))
            .await
            .expect("item deletion succeeds");
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
