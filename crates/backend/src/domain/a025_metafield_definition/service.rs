use super::repository;
use crate::domain::a026_metafield_value::repository as value_repository;
use contracts::domain::a025_metafield_definition::aggregate::{
    MetafieldDefinition, MetafieldDefinitionDto, MetafieldDefinitionId, MetafieldDefinitionPatch,
};
use contracts::enums::MetafieldOwnerType;
use contracts::shared::metafields::{DefinitionRegistry, MetafieldError};
use crate::shared::data::db;
use uuid::Uuid;

/// Реестр, собранный из хранилища
async fn load_registry() -> anyhow::Result<DefinitionRegistry> {
    Ok(DefinitionRegistry::from_definitions(
        repository::list_all().await?,
    ))
}

/// Ошибка UNIQUE-индекса означает, что параллельное сохранение заняло тройку раньше нас
fn map_unique_violation(e: anyhow::Error, definition: &MetafieldDefinition) -> anyhow::Error {
    if db::is_unique_violation(&e) {
        MetafieldError::DuplicateKey {
            owner_type: definition.owner_type,
            namespace: definition.namespace.clone(),
            key: definition.key.clone(),
        }
        .into()
    } else {
        e
    }
}

fn warn_if_unreachable(definition: &MetafieldDefinition) {
    if definition.visibility.grants_nobody() {
        tracing::warn!(
            "Metafield {}.{} ({}) is visible to nobody: no public flag, adminOnly or roles set",
            definition.namespace,
            definition.key,
            definition.owner_type
        );
    }
}

/// Создание нового определения метаполя
pub async fn create(dto: MetafieldDefinitionDto) -> anyhow::Result<MetafieldDefinition> {
    let mut registry = load_registry().await?;
    let definition = registry.create(dto)?;
    warn_if_unreachable(&definition);

    repository::insert(&definition)
        .await
        .map_err(|e| map_unique_violation(e, &definition))?;

    tracing::info!(
        "Created metafield definition {} {}.{} for {}",
        definition.id.value(),
        definition.namespace,
        definition.key,
        definition.owner_type
    );
    Ok(definition)
}

/// Частичное обновление определения
pub async fn update(id: Uuid, patch: MetafieldDefinitionPatch) -> anyhow::Result<MetafieldDefinition> {
    let mut registry = load_registry().await?;
    let definition = registry.update(MetafieldDefinitionId::new(id), patch)?;
    warn_if_unreachable(&definition);

    repository::update(&definition)
        .await
        .map_err(|e| map_unique_violation(e, &definition))?;

    tracing::info!(
        "Updated metafield definition {} (version {})",
        id,
        definition.metadata.version
    );
    Ok(definition)
}

/// Удаление определения.
///
/// Определение, на которое ссылаются сохранённые значения, удалить нельзя.
pub async fn delete(id: Uuid) -> anyhow::Result<()> {
    get_by_id(id).await?;

    let value_count = value_repository::count_by_definition(id).await?;
    if value_count > 0 {
        return Err(MetafieldError::DefinitionInUse {
            id: id.to_string(),
            value_count,
        }
        .into());
    }

    // Значение могло появиться между подсчётом и удалением; его держит внешний ключ
    let deleted = match repository::delete(id).await {
        Ok(deleted) => deleted,
        Err(e) if db::is_foreign_key_violation(&e) => {
            let value_count = value_repository::count_by_definition(id).await?;
            return Err(MetafieldError::DefinitionInUse {
                id: id.to_string(),
                value_count,
            }
            .into());
        }
        Err(e) => return Err(e),
    };
    if !deleted {
        return Err(MetafieldError::NotFound(format!("metafield definition {}", id)).into());
    }
    tracing::info!("Deleted metafield definition {}", id);
    Ok(())
}

/// Получение определения по ID
pub async fn get_by_id(id: Uuid) -> anyhow::Result<MetafieldDefinition> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| MetafieldError::NotFound(format!("metafield definition {}", id)).into())
}

/// Список определений в порядке создания, опционально по виду владельца
pub async fn list(owner_type: Option<MetafieldOwnerType>) -> anyhow::Result<Vec<MetafieldDefinition>> {
    let registry = load_registry().await?;
    let items = match owner_type {
        Some(owner_type) => registry.list(owner_type).into_iter().cloned().collect(),
        None => registry.all().to_vec(),
    };
    tracing::debug!("Loaded {} metafield definitions", items.len());
    Ok(items)
}
