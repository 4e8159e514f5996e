use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::a025_metafield_definition::aggregate::{
    MetafieldDefinition, MetafieldDefinitionId,
};
use crate::enums::{MetafieldOwnerType, MetafieldValueType};
use crate::shared::metafields::{codec, DecodedValue};

/// Значение метаполя одного владельца.
///
/// На пару `(owner_id, definition_id)` хранится ровно одна запись.
#[derive(Debug, Clone, PartialEq)]
pub struct MetafieldValue {
    pub owner_id: String,
    pub definition_id: MetafieldDefinitionId,
    /// Каноничный JSON, полученный из `codec::encode`
    pub value_json: String,
    pub updated_at: DateTime<Utc>,
}

impl MetafieldValue {
    pub fn new(owner_id: String, definition_id: MetafieldDefinitionId, value_json: String) -> Self {
        Self {
            owner_id,
            definition_id,
            value_json,
            updated_at: Utc::now(),
        }
    }

    pub fn decoded(&self) -> DecodedValue {
        codec::decode(&self.value_json)
    }
}

/// Тело запроса на запись значения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMetafieldValueRequest {
    #[serde(default)]
    pub value: Value,
}

/// Значение вместе с описанием поля, для отображения и редактирования
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldValueView {
    pub definition_id: String,
    pub owner_type: MetafieldOwnerType,
    pub owner_id: String,
    pub namespace: String,
    pub key: String,
    pub name: String,
    pub value_type: MetafieldValueType,
    pub is_list: bool,
    pub required: bool,
    pub value_json: Option<String>,
    pub value: DecodedValue,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MetafieldValueView {
    /// Собрать представление; при отсутствии записи значение пустое
    pub fn new(
        definition: &MetafieldDefinition,
        owner_id: &str,
        value: Option<&MetafieldValue>,
    ) -> Self {
        Self {
            definition_id: definition.to_string_id(),
            owner_type: definition.owner_type,
            owner_id: owner_id.to_string(),
            namespace: definition.namespace.clone(),
            key: definition.key.clone(),
            name: definition.name.clone(),
            value_type: definition.value_type,
            is_list: definition.is_list,
            required: definition.validation.required,
            value_json: value.map(|v| v.value_json.clone()),
            value: value.map(MetafieldValue::decoded).unwrap_or(DecodedValue::Empty),
            updated_at: value.map(|v| v.updated_at),
        }
    }

    /// Значение сохранено в формате, который не удалось разобрать
    pub fn is_legacy(&self) -> bool {
        self.value.is_legacy()
    }
}
