use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a025_metafield_definition::aggregate::{
    MetafieldDefinitionDto, MetafieldDefinitionPatch,
};
use contracts::enums::MetafieldOwnerType;
use serde::Deserialize;
use serde_json::json;

use super::{error_response, parse_uuid};
use crate::domain::a025_metafield_definition;

type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Debug, Deserialize)]
pub struct ListDefinitionsQuery {
    pub owner_type: Option<MetafieldOwnerType>,
}

/// GET /api/metafield_definition
pub async fn list_all(
    Query(query): Query<ListDefinitionsQuery>,
) -> Result<Json<Vec<MetafieldDefinitionDto>>, ApiError> {
    let items = a025_metafield_definition::service::list(query.owner_type)
        .await
        .map_err(error_response)?;
    Ok(Json(items.iter().map(|d| d.to_dto()).collect()))
}

/// GET /api/metafield_definition/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<MetafieldDefinitionDto>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a025_metafield_definition::service::get_by_id(uuid).await {
        Ok(v) => Ok(Json(v.to_dto())),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/metafield_definition
pub async fn create(
    Json(dto): Json<MetafieldDefinitionDto>,
) -> Result<(StatusCode, Json<MetafieldDefinitionDto>), ApiError> {
    tracing::debug!(
        "Creating metafield definition {}.{} for {}",
        dto.namespace,
        dto.key,
        dto.owner_type
    );
    match a025_metafield_definition::service::create(dto).await {
        Ok(v) => Ok((StatusCode::CREATED, Json(v.to_dto()))),
        Err(e) => Err(error_response(e)),
    }
}

/// PATCH /api/metafield_definition/:id
pub async fn update(
    Path(id): Path<String>,
    Json(patch): Json<MetafieldDefinitionPatch>,
) -> Result<Json<MetafieldDefinitionDto>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a025_metafield_definition::service::update(uuid, patch).await {
        Ok(v) => Ok(Json(v.to_dto())),
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /api/metafield_definition/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a025_metafield_definition::service::delete(uuid).await {
        Ok(()) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(error_response(e)),
    }
}
