use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{AggregateId, EntityMetadata};
use crate::enums::{MetafieldOwnerType, MetafieldValueType};
use crate::shared::metafields::{MetafieldError, ValidationRules, VisibilityRules};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор определения метаполя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetafieldDefinitionId(pub Uuid);

impl MetafieldDefinitionId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for MetafieldDefinitionId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(MetafieldDefinitionId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Определение метаполя: схема пользовательского атрибута сущности
#[derive(Debug, Clone, PartialEq)]
pub struct MetafieldDefinition {
    pub id: MetafieldDefinitionId,
    pub owner_type: MetafieldOwnerType,
    pub namespace: String,
    pub key: String,
    pub name: String,
    pub description: String,
    pub value_type: MetafieldValueType,
    pub is_list: bool,
    pub validation: ValidationRules,
    pub visibility: VisibilityRules,
    pub metadata: EntityMetadata,
}

impl MetafieldDefinition {
    /// Создать новое определение для вставки (новый UUID и метаданные)
    pub fn new_for_insert(dto: MetafieldDefinitionDto) -> Result<Self, MetafieldError> {
        Self::build(MetafieldDefinitionId::new_v4(), dto, EntityMetadata::new())
    }

    /// Восстановить определение из сохранённого представления
    pub fn from_dto(dto: MetafieldDefinitionDto) -> Result<Self, MetafieldError> {
        let id = dto
            .id
            .as_deref()
            .ok_or_else(|| MetafieldError::InvalidDefinition("id is missing".into()))
            .and_then(|s| {
                MetafieldDefinitionId::from_string(s).map_err(MetafieldError::InvalidDefinition)
            })?;
        let metadata = EntityMetadata::restore(dto.created_at, dto.updated_at, dto.version);
        Self::build(id, dto, metadata)
    }

    fn build(
        id: MetafieldDefinitionId,
        dto: MetafieldDefinitionDto,
        metadata: EntityMetadata,
    ) -> Result<Self, MetafieldError> {
        let validation = ValidationRules::parse(dto.value_type, &dto.validations_json)?;
        let visibility = VisibilityRules::parse(&dto.visibility_json)?;
        let mut definition = Self {
            id,
            owner_type: dto.owner_type,
            namespace: dto.namespace.trim().to_string(),
            key: dto.key.trim().to_string(),
            name: dto.name.trim().to_string(),
            description: dto.description,
            value_type: dto.value_type,
            is_list: dto.is_list,
            validation,
            visibility,
            metadata,
        };
        definition.normalize();
        definition.validate()?;
        Ok(definition)
    }

    /// Применить частичное изменение.
    ///
    /// Изменения применяются к копии: при ошибке агрегат остаётся прежним.
    pub fn apply_patch(&mut self, patch: MetafieldDefinitionPatch) -> Result<(), MetafieldError> {
        let mut next = self.clone();

        if let Some(owner_type) = patch.owner_type {
            next.owner_type = owner_type;
        }
        if let Some(namespace) = patch.namespace {
            next.namespace = namespace.trim().to_string();
        }
        if let Some(key) = patch.key {
            next.key = key.trim().to_string();
        }
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(is_list) = patch.is_list {
            next.is_list = is_list;
        }

        let type_changed = patch
            .value_type
            .is_some_and(|value_type| value_type != self.value_type);
        if let Some(value_type) = patch.value_type {
            next.value_type = value_type;
        }
        if let Some(blob) = patch.validations_json {
            next.validation = ValidationRules::parse(next.value_type, &blob)?;
        } else if type_changed {
            // При смене типа старые ограничения теряют смысл, сохраняем только required
            if next.value_type == MetafieldValueType::Enum {
                return Err(MetafieldError::InvalidDefinition(
                    "switching to enum requires validationsJson with enumValues".into(),
                ));
            }
            let mut rules = ValidationRules::unconstrained(next.value_type);
            rules.required = self.validation.required;
            next.validation = rules;
        }
        if let Some(blob) = patch.visibility_json {
            next.visibility = VisibilityRules::parse(&blob)?;
        }

        next.normalize();
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Структурные инварианты, которые не проверяются, а исправляются
    fn normalize(&mut self) {
        if !self.value_type.supports_list() {
            self.is_list = false;
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), MetafieldError> {
        check_identifier("namespace", &self.namespace)?;
        check_identifier("key", &self.key)?;
        if self.value_type == MetafieldValueType::Enum && self.validation.enum_values().is_empty() {
            return Err(MetafieldError::InvalidDefinition(
                "enum metafields need at least one allowed value".into(),
            ));
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
    }

    /// Тройка, уникальная в пределах реестра
    pub fn same_key_as(&self, other: &MetafieldDefinition) -> bool {
        self.owner_type == other.owner_type
            && self.namespace == other.namespace
            && self.key == other.key
    }

    /// Подпись для сообщений об ошибках
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("{}.{}", self.namespace, self.key)
        } else {
            self.name.clone()
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    /// Представление для API и хранилища
    pub fn to_dto(&self) -> MetafieldDefinitionDto {
        MetafieldDefinitionDto {
            id: Some(self.id.as_string()),
            owner_type: self.owner_type,
            namespace: self.namespace.clone(),
            key: self.key.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            value_type: self.value_type,
            is_list: self.is_list,
            validations_json: self.validation.to_json(),
            visibility_json: self.visibility.to_json(),
            created_at: Some(self.metadata.created_at),
            updated_at: Some(self.metadata.updated_at),
            version: self.metadata.version,
        }
    }
}

fn check_identifier(field: &str, value: &str) -> Result<(), MetafieldError> {
    if value.is_empty() {
        return Err(MetafieldError::InvalidDefinition(format!(
            "{} must not be empty",
            field
        )));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(MetafieldError::InvalidDefinition(format!(
            "{} may only contain latin letters, digits, '_' and '-': {}",
            field, value
        )));
    }
    Ok(())
}

// ============================================================================
// DTOs
// ============================================================================

/// Определение метаполя в формате внешнего сервиса хранения
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldDefinitionDto {
    #[serde(default)]
    pub id: Option<String>,
    pub owner_type: MetafieldOwnerType,
    pub namespace: String,
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub value_type: MetafieldValueType,
    #[serde(default)]
    pub is_list: bool,
    /// Непрозрачный JSON `{required, min, max, regex, enumValues}`
    #[serde(default)]
    pub validations_json: String,
    /// Непрозрачный JSON `{adminOnly, public, roles}`
    #[serde(default)]
    pub visibility_json: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: i32,
}

/// Частичное изменение определения; отсутствующие поля не меняются
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldDefinitionPatch {
    #[serde(default)]
    pub owner_type: Option<MetafieldOwnerType>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value_type: Option<MetafieldValueType>,
    #[serde(default)]
    pub is_list: Option<bool>,
    #[serde(default)]
    pub validations_json: Option<String>,
    #[serde(default)]
    pub visibility_json: Option<String>,
}

impl MetafieldDefinitionPatch {
    /// Меняет ли патч уникальную тройку
    pub fn touches_identity(&self) -> bool {
        self.owner_type.is_some() || self.namespace.is_some() || self.key.is_some()
    }
}
