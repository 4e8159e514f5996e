pub mod a025_metafield_definition;
pub mod a026_metafield_value;

use axum::{http::StatusCode, Json};
use contracts::shared::metafields::{MetafieldError, MetafieldErrorKind};
use serde_json::json;

/// Ответ с ошибкой: статус по виду доменной ошибки, текст в поле `error`
pub fn error_response(e: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match e.downcast_ref::<MetafieldError>().map(MetafieldError::kind) {
        Some(MetafieldErrorKind::Conflict) => StatusCode::CONFLICT,
        Some(MetafieldErrorKind::NotFound) => StatusCode::NOT_FOUND,
        Some(MetafieldErrorKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let error_msg = format!("{}", e);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {}", error_msg);
    } else {
        tracing::debug!("Request rejected ({}): {}", status.as_u16(), error_msg);
    }
    (status, Json(json!({ "error": error_msg })))
}

pub(crate) fn parse_uuid(id: &str) -> Result<uuid::Uuid, (StatusCode, Json<serde_json::Value>)> {
    uuid::Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("invalid id '{}'", id) })),
        )
    })
}
