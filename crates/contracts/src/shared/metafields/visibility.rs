//! Visibility policy of metafield definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::error::MetafieldError;
use crate::domain::a025_metafield_definition::aggregate::MetafieldDefinition;

/// Key of an operator role, as supplied by the role directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleKey(pub String);

impl RoleKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoleKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who may see (and edit) values of a definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityRules {
    pub admin_only: bool,
    pub public: bool,
    pub roles: BTreeSet<RoleKey>,
}

impl VisibilityRules {
    /// Parse the opaque `visibilityJson` blob; blank means the default
    /// (nothing set).
    pub fn parse(blob: &str) -> Result<Self, MetafieldError> {
        if blob.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(blob).map_err(|e| {
            MetafieldError::InvalidDefinition(format!("visibility is not valid: {}", e))
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({
            "adminOnly": self.admin_only,
            "public": self.public,
            "roles": self.roles,
        })
        .to_string()
    }

    /// Nothing is set, so only an external superuser bypass can reveal the field
    pub fn grants_nobody(&self) -> bool {
        !self.public && !self.admin_only && self.roles.is_empty()
    }

    pub fn allows(&self, actor_roles: &BTreeSet<RoleKey>, actor_is_staff: bool) -> bool {
        if self.public {
            return true;
        }
        if self.admin_only {
            return actor_is_staff;
        }
        !self.roles.is_disjoint(actor_roles)
    }
}

/// Decide whether an actor may see the definition's values.
///
/// `public` wins over everything, `adminOnly` restricts to staff regardless
/// of roles, otherwise the actor needs at least one of the listed roles.
pub fn is_visible(
    definition: &MetafieldDefinition,
    actor_roles: &BTreeSet<RoleKey>,
    actor_is_staff: bool,
) -> bool {
    definition.visibility.allows(actor_roles, actor_is_staff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(keys: &[&str]) -> BTreeSet<RoleKey> {
        keys.iter().map(|k| RoleKey::from(*k)).collect()
    }

    #[test]
    fn test_public_is_always_visible() {
        let rules = VisibilityRules {
            public: true,
            admin_only: true,
            roles: BTreeSet::new(),
        };
        assert!(rules.allows(&BTreeSet::new(), false));
    }

    #[test]
    fn test_admin_only_ignores_roles() {
        let rules = VisibilityRules {
            admin_only: true,
            public: false,
            roles: roles(&["manager"]),
        };
        assert!(!rules.allows(&roles(&["manager"]), false));
        assert!(rules.allows(&BTreeSet::new(), true));
    }

    #[test]
    fn test_roles_need_intersection() {
        let rules = VisibilityRules {
            roles: roles(&["manager", "support"]),
            ..Default::default()
        };
        assert!(rules.allows(&roles(&["support"]), false));
        assert!(!rules.allows(&roles(&["warehouse"]), true));
    }

    #[test]
    fn test_nothing_set_grants_nobody() {
        let rules = VisibilityRules::default();
        assert!(rules.grants_nobody());
        assert!(!rules.allows(&roles(&["manager"]), true));
    }

    #[test]
    fn test_parse_partial_blob() {
        let rules = VisibilityRules::parse(r#"{"roles":["manager"]}"#).unwrap();
        assert!(!rules.public);
        assert_eq!(rules.roles, roles(&["manager"]));
        assert_eq!(VisibilityRules::parse(&rules.to_json()).unwrap(), rules);

        assert!(VisibilityRules::parse("{roles:").is_err());
    }
}
