use contracts::domain::a025_metafield_definition::aggregate::MetafieldDefinitionId;
use contracts::domain::a026_metafield_value::aggregate::MetafieldValue;
use contracts::domain::common::AggregateId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a026_metafield_value")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub definition_id: String,
    pub value_json: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for MetafieldValue {
    type Error = String;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(MetafieldValue {
            definition_id: MetafieldDefinitionId::from_string(&m.definition_id)?,
            owner_id: m.owner_id,
            value_json: m.value_json,
            updated_at: m.updated_at,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Записать значение; существующая запись для той же пары перезаписывается
/// (last writer wins, без проверки версии)
pub async fn upsert(value: &MetafieldValue) -> anyhow::Result<()> {
    let active = ActiveModel {
        owner_id: Set(value.owner_id.clone()),
        definition_id: Set(value.definition_id.as_string()),
        value_json: Set(value.value_json.clone()),
        updated_at: Set(value.updated_at),
    };
    Entity::insert(active)
        .on_conflict(
            OnConflict::columns([Column::OwnerId, Column::DefinitionId])
                .update_columns([Column::ValueJson, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn())
        .await?;
    Ok(())
}

/// Все значения владельца
pub async fn list_by_owner(owner_id: &str) -> anyhow::Result<Vec<MetafieldValue>> {
    let rows = Entity::find()
        .filter(Column::OwnerId.eq(owner_id))
        .all(conn())
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let definition_id = row.definition_id.clone();
        match MetafieldValue::try_from(row) {
            Ok(value) => items.push(value),
            Err(e) => tracing::warn!(
                "Skipping metafield value of {} for definition {}: {}",
                owner_id,
                definition_id,
                e
            ),
        }
    }
    Ok(items)
}

pub async fn get(owner_id: &str, definition_id: Uuid) -> anyhow::Result<Option<MetafieldValue>> {
    let result = Entity::find()
        .filter(Column::OwnerId.eq(owner_id))
        .filter(Column::DefinitionId.eq(definition_id.to_string()))
        .one(conn())
        .await?;
    result
        .map(MetafieldValue::try_from)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Сколько значений ссылается на определение
pub async fn count_by_definition(definition_id: Uuid) -> anyhow::Result<u64> {
    let count = Entity::find()
        .filter(Column::DefinitionId.eq(definition_id.to_string()))
        .count(conn())
        .await?;
    Ok(count)
}
