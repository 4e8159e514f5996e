use super::repository;
use crate::domain::a025_metafield_definition::service as definition_service;
use crate::shared::data::db;
use contracts::domain::a025_metafield_definition::aggregate::MetafieldDefinitionId;
use contracts::domain::a026_metafield_value::aggregate::{MetafieldValue, MetafieldValueView};
use contracts::enums::MetafieldOwnerType;
use contracts::shared::metafields::{codec, is_visible, MetafieldError, RoleKey};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Запись значения метаполя владельца.
///
/// Порядок: загрузить определение, проверить значение, получить каноничный
/// JSON и только после этого записать его в хранилище.
pub async fn set_value(
    owner_type: MetafieldOwnerType,
    owner_id: &str,
    definition_id: Uuid,
    raw: &Value,
) -> anyhow::Result<MetafieldValue> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(MetafieldError::Validation("owner id must not be empty".into()).into());
    }

    let definition = definition_service::get_by_id(definition_id).await?;
    if definition.owner_type != owner_type {
        return Err(MetafieldError::Validation(format!(
            "{}: defined for {}, not for {}",
            definition.label(),
            definition.owner_type,
            owner_type
        ))
        .into());
    }

    let value_json = codec::validate_and_encode(&definition, raw)?;
    let value = MetafieldValue::new(owner_id.to_string(), definition.id, value_json);
    repository::upsert(&value).await.map_err(|e| {
        if db::is_foreign_key_violation(&e) {
            // Определение удалили после того, как мы его загрузили
            anyhow::Error::from(MetafieldError::NotFound(format!(
                "metafield definition {}",
                definition_id
            )))
        } else {
            e
        }
    })?;

    tracing::info!(
        "Saved metafield {}.{} for {} {}",
        definition.namespace,
        definition.key,
        owner_type,
        owner_id
    );
    Ok(value)
}

/// Проверка значения без записи; возвращает каноничный JSON
pub async fn preview(definition_id: Uuid, raw: &Value) -> anyhow::Result<String> {
    let definition = definition_service::get_by_id(definition_id).await?;
    Ok(codec::validate_and_encode(&definition, raw)?)
}

/// Метаполя владельца, видимые пользователю, в порядке создания определений
pub async fn list_for_owner(
    owner_type: MetafieldOwnerType,
    owner_id: &str,
    actor_roles: &BTreeSet<RoleKey>,
    actor_is_staff: bool,
) -> anyhow::Result<Vec<MetafieldValueView>> {
    let definitions = definition_service::list(Some(owner_type)).await?;
    let values: HashMap<MetafieldDefinitionId, MetafieldValue> = repository::list_by_owner(owner_id)
        .await?
        .into_iter()
        .map(|v| (v.definition_id, v))
        .collect();

    let views: Vec<MetafieldValueView> = definitions
        .iter()
        .filter(|d| is_visible(d, actor_roles, actor_is_staff))
        .map(|d| MetafieldValueView::new(d, owner_id, values.get(&d.id)))
        .collect();

    let legacy = views.iter().filter(|v| v.is_legacy()).count();
    if legacy > 0 {
        tracing::warn!(
            "{} {} has {} metafield value(s) in unparseable legacy format",
            owner_type,
            owner_id,
            legacy
        );
    }
    Ok(views)
}
