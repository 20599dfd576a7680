use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::item::{Item, ItemId, ItemInput};
use crate::query::{ListParams, ListQuery, QueryEngine};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::validation;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data })
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Item>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime: f64,
}

// Ids that are not integers can never match a stored item.
fn parse_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Item>>), ApiError> {
    let Json(input) = payload?;
    let new_item = validation::validate_new(input)?;
    let item = state.store.create(new_item)?;

    tracing::info!("Created item {}", item.id);
    Ok((StatusCode::CREATED, DataResponse::ok(item)))
}

pub async fn list_items(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(params) = params?;
    let query = ListQuery::from_params(params)?;
    let page = QueryEngine::new(&state.store).list(&query)?;

    Ok(Json(ListResponse {
        success: true,
        count: page.total_count,
        data: page.items,
        pagination: Pagination {
            current_page: page.current_page,
            total_pages: page.total_pages,
        },
    }))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Item>>, ApiError> {
    let item = state.store.get(parse_id(&id)?)?;
    Ok(DataResponse::ok(item))
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> Result<Json<DataResponse<Item>>, ApiError> {
    let Json(input) = payload?;
    let patch = validation::validate_patch(input)?;
    let item = state.store.update(parse_id(&id)?, patch)?;

    tracing::info!("Updated item {}", item.id);
    Ok(DataResponse::ok(item))
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.store.delete(parse_id(&id)?)?;

    tracing::info!("Deleted item {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
