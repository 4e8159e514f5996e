//! Custom attribute (metafield) engine
//!
//! Operators define typed, optionally list-valued attributes on customers and
//! products without a schema migration. The engine is pure and synchronous:
//!
//! - [`registry`] owns definitions and keeps `(owner_type, namespace, key)` unique;
//! - [`validation`] checks candidate values against a definition;
//! - [`codec`] turns accepted values into canonical `valueJson` and back;
//! - [`visibility`] decides which actors may see a definition.
//!
//! ## Usage
//!
//! ```rust
//! use contracts::domain::a025_metafield_definition::MetafieldDefinitionDto;
//! use contracts::enums::{MetafieldOwnerType, MetafieldValueType};
//! use contracts::shared::metafields::{codec, DefinitionRegistry};
//! use serde_json::json;
//!
//! let mut registry = DefinitionRegistry::new();
//! let definition = registry
//!     .create(MetafieldDefinitionDto {
//!         id: None,
//!         owner_type: MetafieldOwnerType::Customer,
//!         namespace: "profile".into(),
//!         key: "membership_rank".into(),
//!         name: "Membership rank".into(),
//!         description: String::new(),
//!         value_type: MetafieldValueType::Enum,
//!         is_list: false,
//!         validations_json: r#"{"required":true,"enumValues":["bronze","silver","gold"]}"#.into(),
//!         visibility_json: r#"{"public":true}"#.into(),
//!         created_at: None,
//!         updated_at: None,
//!         version: 0,
//!     })
//!     .unwrap();
//!
//! assert!(codec::validate_and_encode(&definition, &json!("platinum")).is_err());
//! assert_eq!(codec::validate_and_encode(&definition, &json!("gold")).unwrap(), "\"gold\"");
//! ```

pub mod codec;
mod error;
pub mod registry;
pub mod rules;
pub mod validation;
pub mod visibility;

pub use codec::{decode, encode, validate_and_encode, DecodedValue};
pub use error::{MetafieldError, MetafieldErrorKind};
pub use registry::DefinitionRegistry;
pub use rules::{Constraint, Pattern, RawValidations, ValidationRules};
pub use validation::validate;
pub use visibility::{is_visible, RoleKey, VisibilityRules};
