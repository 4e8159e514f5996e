use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a026_metafield_value::aggregate::{
    MetafieldValueView, SetMetafieldValueRequest,
};
use contracts::enums::MetafieldOwnerType;
use contracts::shared::metafields::RoleKey;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;

use super::{error_response, parse_uuid};
use crate::domain::a026_metafield_value;

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Кто смотрит: роли через запятую и признак сотрудника
#[derive(Debug, Default, Deserialize)]
pub struct ActorQuery {
    #[serde(default)]
    pub roles: Option<String>,
    #[serde(default)]
    pub staff: bool,
}

fn parse_roles(raw: Option<&str>) -> BTreeSet<RoleKey> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RoleKey::from)
        .collect()
}

/// GET /api/metafield_value/:owner_type/:owner_id
pub async fn list_for_owner(
    Path((owner_type, owner_id)): Path<(MetafieldOwnerType, String)>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<Vec<MetafieldValueView>>, ApiError> {
    let roles = parse_roles(actor.roles.as_deref());
    a026_metafield_value::service::list_for_owner(owner_type, &owner_id, &roles, actor.staff)
        .await
        .map(Json)
        .map_err(error_response)
}

/// PUT /api/metafield_value/:owner_type/:owner_id/:definition_id
pub async fn set_value(
    Path((owner_type, owner_id, definition_id)): Path<(MetafieldOwnerType, String, String)>,
    Json(req): Json<SetMetafieldValueRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let uuid = parse_uuid(&definition_id)?;
    match a026_metafield_value::service::set_value(owner_type, &owner_id, uuid, &req.value).await {
        Ok(v) => Ok(Json(json!({
            "definitionId": definition_id,
            "ownerId": v.owner_id,
            "valueJson": v.value_json,
            "updatedAt": v.updated_at,
        }))),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/metafield_value/validate/:definition_id
pub async fn validate(
    Path(definition_id): Path<String>,
    Json(req): Json<SetMetafieldValueRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let uuid = parse_uuid(&definition_id)?;
    match a026_metafield_value::service::preview(uuid, &req.value).await {
        Ok(value_json) => Ok(Json(json!({ "valid": true, "valueJson": value_json }))),
        Err(e) => Err(error_response(e)),
    }
}
