use contracts::domain::a025_metafield_definition::aggregate::{
    MetafieldDefinition, MetafieldDefinitionDto,
};
use contracts::enums::{MetafieldOwnerType, MetafieldValueType};
use contracts::shared::metafields::MetafieldError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::{EntityTrait, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a025_metafield_definition")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_type: String,
    pub namespace: String,
    pub key: String,
    pub name: String,
    pub description: String,
    pub value_type: String,
    pub is_list: bool,
    pub validations_json: String,
    pub visibility_json: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for MetafieldDefinition {
    type Error = MetafieldError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let owner_type = MetafieldOwnerType::from_code(&m.owner_type).ok_or_else(|| {
            MetafieldError::InvalidDefinition(format!("unknown owner type '{}'", m.owner_type))
        })?;
        let value_type = MetafieldValueType::from_code(&m.value_type).ok_or_else(|| {
            MetafieldError::InvalidDefinition(format!("unknown value type '{}'", m.value_type))
        })?;

        MetafieldDefinition::from_dto(MetafieldDefinitionDto {
            id: Some(m.id),
            owner_type,
            namespace: m.namespace,
            key: m.key,
            name: m.name,
            description: m.description,
            value_type,
            is_list: m.is_list,
            validations_json: m.validations_json,
            visibility_json: m.visibility_json,
            created_at: m.created_at,
            updated_at: m.updated_at,
            version: m.version,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(definition: &MetafieldDefinition) -> ActiveModel {
    ActiveModel {
        id: Set(definition.to_string_id()),
        owner_type: Set(definition.owner_type.code().to_string()),
        namespace: Set(definition.namespace.clone()),
        key: Set(definition.key.clone()),
        name: Set(definition.name.clone()),
        description: Set(definition.description.clone()),
        value_type: Set(definition.value_type.code().to_string()),
        is_list: Set(definition.is_list),
        validations_json: Set(definition.validation.to_json()),
        visibility_json: Set(definition.visibility.to_json()),
        created_at: Set(Some(definition.metadata.created_at)),
        updated_at: Set(Some(definition.metadata.updated_at)),
        version: Set(definition.metadata.version),
    }
}

/// Все определения в порядке создания.
///
/// Записи, которые не удаётся разобрать, пропускаются с предупреждением,
/// чтобы одна испорченная строка не ломала весь экран настроек.
pub async fn list_all() -> anyhow::Result<Vec<MetafieldDefinition>> {
    let rows = Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(conn())
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id.clone();
        match MetafieldDefinition::try_from(row) {
            Ok(definition) => items.push(definition),
            Err(e) => tracing::warn!("Skipping metafield definition {}: {}", id, e),
        }
    }
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<MetafieldDefinition>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(MetafieldDefinition::try_from).transpose()?)
}

pub async fn insert(definition: &MetafieldDefinition) -> anyhow::Result<Uuid> {
    to_active_model(definition).insert(conn()).await?;
    Ok(definition.id.value())
}

pub async fn update(definition: &MetafieldDefinition) -> anyhow::Result<()> {
    let mut active = to_active_model(definition);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
