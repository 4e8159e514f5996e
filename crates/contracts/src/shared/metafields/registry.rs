//! In-memory registry of metafield definitions
//!
//! Owns the schema objects and enforces uniqueness of
//! `(owner_type, namespace, key)`. The registry never touches values; callers
//! persist what it returns.

use crate::domain::a025_metafield_definition::aggregate::{
    MetafieldDefinition, MetafieldDefinitionDto, MetafieldDefinitionId, MetafieldDefinitionPatch,
};
use crate::domain::common::AggregateId;
use crate::enums::MetafieldOwnerType;

use super::error::MetafieldError;

/// Definitions kept in creation order
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: Vec<MetafieldDefinition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from stored definitions, ordering them by creation time
    pub fn from_definitions(mut definitions: Vec<MetafieldDefinition>) -> Self {
        definitions.sort_by_key(|d| d.metadata.created_at);
        Self { definitions }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Register a new definition; fails on a duplicate key
    pub fn create(
        &mut self,
        dto: MetafieldDefinitionDto,
    ) -> Result<MetafieldDefinition, MetafieldError> {
        let definition = MetafieldDefinition::new_for_insert(dto)?;
        self.ensure_unique(&definition)?;
        self.definitions.push(definition.clone());
        Ok(definition)
    }

    /// Apply a patch; uniqueness is re-checked when the key triple changes
    pub fn update(
        &mut self,
        id: MetafieldDefinitionId,
        patch: MetafieldDefinitionPatch,
    ) -> Result<MetafieldDefinition, MetafieldError> {
        let position = self.position(id)?;
        let recheck = patch.touches_identity();

        let mut candidate = self.definitions[position].clone();
        candidate.apply_patch(patch)?;
        if recheck {
            self.ensure_unique(&candidate)?;
        }
        candidate.before_write();

        self.definitions[position] = candidate.clone();
        Ok(candidate)
    }

    /// Definitions of one owner type, in creation order
    pub fn list(&self, owner_type: MetafieldOwnerType) -> Vec<&MetafieldDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.owner_type == owner_type)
            .collect()
    }

    pub fn all(&self) -> &[MetafieldDefinition] {
        &self.definitions
    }

    pub fn get(&self, id: MetafieldDefinitionId) -> Result<&MetafieldDefinition, MetafieldError> {
        self.position(id).map(|position| &self.definitions[position])
    }

    pub fn find_by_key(
        &self,
        owner_type: MetafieldOwnerType,
        namespace: &str,
        key: &str,
    ) -> Option<&MetafieldDefinition> {
        self.definitions
            .iter()
            .find(|d| d.owner_type == owner_type && d.namespace == namespace && d.key == key)
    }

    pub fn remove(&mut self, id: MetafieldDefinitionId) -> Result<MetafieldDefinition, MetafieldError> {
        let position = self.position(id)?;
        Ok(self.definitions.remove(position))
    }

    fn position(&self, id: MetafieldDefinitionId) -> Result<usize, MetafieldError> {
        self.definitions
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| MetafieldError::NotFound(format!("metafield definition {}", id.as_string())))
    }

    fn ensure_unique(&self, candidate: &MetafieldDefinition) -> Result<(), MetafieldError> {
        let taken = self
            .definitions
            .iter()
            .any(|d| d.id != candidate.id && d.same_key_as(candidate));
        if taken {
            return Err(MetafieldError::DuplicateKey {
                owner_type: candidate.owner_type,
                namespace: candidate.namespace.clone(),
                key: candidate.key.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::MetafieldValueType;
    use crate::shared::metafields::test_support::dto;

    #[test]
    fn test_create_rejects_duplicate_triple() {
        let mut registry = DefinitionRegistry::new();
        registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "rank"))
            .unwrap();

        let err = registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "rank"))
            .unwrap_err();
        assert!(matches!(err, MetafieldError::DuplicateKey { .. }));

        // Same namespace/key on another owner type is a different metafield
        registry
            .create(dto(MetafieldOwnerType::Product, "profile", "rank"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_list_keeps_creation_order() {
        let mut registry = DefinitionRegistry::new();
        for key in ["b", "a", "c"] {
            registry
                .create(dto(MetafieldOwnerType::Product, "specs", key))
                .unwrap();
        }
        registry
            .create(dto(MetafieldOwnerType::Customer, "specs", "z"))
            .unwrap();

        let keys: Vec<&str> = registry
            .list(MetafieldOwnerType::Product)
            .iter()
            .map(|d| d.key.as_str())
            .collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_update_rechecks_uniqueness() {
        let mut registry = DefinitionRegistry::new();
        registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "rank"))
            .unwrap();
        let other = registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "tier"))
            .unwrap();

        let err = registry
            .update(
                other.id,
                MetafieldDefinitionPatch {
                    key: Some("rank".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, MetafieldError::DuplicateKey { .. }));
        assert_eq!(registry.get(other.id).unwrap().key, "tier");

        let renamed = registry
            .update(
                other.id,
                MetafieldDefinitionPatch {
                    name: Some("Tier".into()),
                    key: Some("tier".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Tier");
        assert_eq!(renamed.metadata.version, 1);
    }

    #[test]
    fn test_update_changes_type() {
        let mut registry = DefinitionRegistry::new();
        let def = registry
            .create(dto(MetafieldOwnerType::Product, "specs", "weight"))
            .unwrap();
        let updated = registry
            .update(
                def.id,
                MetafieldDefinitionPatch {
                    value_type: Some(MetafieldValueType::Number),
                    validations_json: Some(r#"{"min":0}"#.into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.value_type, MetafieldValueType::Number);
        assert_eq!(registry.get(def.id).unwrap(), &updated);
    }

    #[test]
    fn test_missing_ids() {
        let mut registry = DefinitionRegistry::new();
        let id = MetafieldDefinitionId::new_v4();
        assert!(matches!(registry.get(id), Err(MetafieldError::NotFound(_))));
        assert!(matches!(
            registry.update(id, MetafieldDefinitionPatch::default()),
            Err(MetafieldError::NotFound(_))
        ));
        assert!(matches!(registry.remove(id), Err(MetafieldError::NotFound(_))));
    }

    #[test]
    fn test_find_by_key_and_remove() {
        let mut registry = DefinitionRegistry::new();
        let def = registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "rank"))
            .unwrap();
        assert_eq!(
            registry
                .find_by_key(MetafieldOwnerType::Customer, "profile", "rank")
                .map(|d| d.id),
            Some(def.id)
        );
        registry.remove(def.id).unwrap();
        assert!(registry.is_empty());
        // The key is free again
        registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "rank"))
            .unwrap();
    }

    #[test]
    fn test_from_definitions_sorts_by_creation() {
        let mut registry = DefinitionRegistry::new();
        let first = registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "first"))
            .unwrap();
        let mut second = registry
            .create(dto(MetafieldOwnerType::Customer, "profile", "second"))
            .unwrap();
        second.metadata.created_at = first.metadata.created_at + chrono::Duration::seconds(1);

        let rebuilt = DefinitionRegistry::from_definitions(vec![second.clone(), first.clone()]);
        let ids: Vec<_> = rebuilt.all().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
