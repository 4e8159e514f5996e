use std::collections::BTreeSet;

use contracts::domain::a025_metafield_definition::{MetafieldDefinition, MetafieldDefinitionDto};
use contracts::enums::{MetafieldOwnerType, MetafieldValueType};
use contracts::shared::metafields::{
    codec, decode, encode, is_visible, validate, DecodedValue, DefinitionRegistry, MetafieldError,
    MetafieldErrorKind, RoleKey,
};
use serde_json::{json, Value};

fn definition(
    value_type: MetafieldValueType,
    is_list: bool,
    validations_json: &str,
    visibility_json: &str,
) -> MetafieldDefinition {
    MetafieldDefinition::new_for_insert(MetafieldDefinitionDto {
        id: None,
        owner_type: MetafieldOwnerType::Product,
        namespace: "specs".into(),
        key: "field".into(),
        name: "Field".into(),
        description: String::new(),
        value_type,
        is_list,
        validations_json: validations_json.into(),
        visibility_json: visibility_json.into(),
        created_at: None,
        updated_at: None,
        version: 0,
    })
    .unwrap()
}

#[test]
fn number_scalar_rejects_text_and_accepts_in_range() {
    let def = definition(MetafieldValueType::Number, false, r#"{"min":0,"max":100}"#, "");
    let err = validate(&def, &json!("abc")).unwrap_err();
    assert!(err.to_string().contains("must be a number"));
    assert!(validate(&def, &json!("42")).is_ok());
}

#[test]
fn required_rejects_empty_scalars_and_lists() {
    for value_type in [
        MetafieldValueType::String,
        MetafieldValueType::Number,
        MetafieldValueType::Date,
        MetafieldValueType::Color,
    ] {
        let scalar = definition(value_type, false, r#"{"required":true}"#, "");
        assert!(validate(&scalar, &json!(""))
            .unwrap_err()
            .to_string()
            .contains("required"));

        let list = definition(value_type, true, r#"{"required":true}"#, "");
        assert!(validate(&list, &json!([]))
            .unwrap_err()
            .to_string()
            .contains("required"));
    }
}

#[test]
fn boolean_and_string_survive_round_trip() {
    let flag = definition(MetafieldValueType::Boolean, false, "", "");
    assert_eq!(decode(&encode(&flag, &json!(true))), DecodedValue::Boolean(true));

    let colour = definition(MetafieldValueType::String, false, "", "");
    assert_eq!(decode(&encode(&colour, &json!("red"))), DecodedValue::Text("red".into()));

    let sizes = definition(MetafieldValueType::String, true, "", "");
    let raw = json!(["S", "M"]);
    assert_eq!(decode(&encode(&sizes, &raw)).to_raw(), raw);
}

#[test]
fn list_enum_checks_every_element() {
    let def = definition(
        MetafieldValueType::Enum,
        true,
        r#"{"enumValues":["S","M","L"]}"#,
        "",
    );
    assert!(validate(&def, &json!(["S", "XL"])).is_err());
    assert!(validate(&def, &json!(["S", "M"])).is_ok());
}

#[test]
fn date_bounds() {
    let def = definition(
        MetafieldValueType::Date,
        false,
        r#"{"min":"2024-01-01","max":"2024-12-31"}"#,
        "",
    );
    assert!(validate(&def, &json!("2023-12-31")).is_err());
    assert!(validate(&def, &json!("2024-06-15")).is_ok());
}

#[test]
fn regex_constraint() {
    let def = definition(MetafieldValueType::String, false, r#"{"regex":"^[0-9]+$"}"#, "");
    assert!(validate(&def, &json!("abc123")).is_err());
    assert!(validate(&def, &json!("123")).is_ok());
}

#[test]
fn admin_only_hidden_from_non_staff() {
    let def = definition(
        MetafieldValueType::String,
        false,
        "",
        r#"{"adminOnly":true,"public":false,"roles":["manager","support"]}"#,
    );
    let every_role: BTreeSet<RoleKey> = ["manager", "support", "owner"]
        .into_iter()
        .map(RoleKey::from)
        .collect();
    assert!(!is_visible(&def, &every_role, false));
    assert!(!is_visible(&def, &BTreeSet::new(), false));
    assert!(is_visible(&def, &BTreeSet::new(), true));
}

#[test]
fn membership_rank_end_to_end() {
    let mut registry = DefinitionRegistry::new();
    let def = registry
        .create(MetafieldDefinitionDto {
            id: None,
            owner_type: MetafieldOwnerType::Customer,
            namespace: "profile".into(),
            key: "membership_rank".into(),
            name: "Membership rank".into(),
            description: "Loyalty programme level".into(),
            value_type: MetafieldValueType::Enum,
            is_list: false,
            validations_json: r#"{"required":true,"enumValues":["bronze","silver","gold"]}"#
                .into(),
            visibility_json: r#"{"public":true}"#.into(),
            created_at: None,
            updated_at: None,
            version: 0,
        })
        .unwrap();

    let err = codec::validate_and_encode(&def, &json!("platinum")).unwrap_err();
    assert!(matches!(err, MetafieldError::Validation(_)));
    assert_eq!(err.kind(), MetafieldErrorKind::Validation);
    assert!(err.to_string().contains("bronze, silver, gold"));

    let value_json = codec::validate_and_encode(&def, &json!("gold")).unwrap();
    assert_eq!(value_json, "\"gold\"");
    assert_eq!(decode(&value_json), DecodedValue::Text("gold".into()));
    assert_eq!(
        registry.get(def.id).unwrap().validation.enum_values(),
        ["bronze", "silver", "gold"]
    );
}

#[test]
fn malformed_regex_fails_at_definition_save() {
    let mut registry = DefinitionRegistry::new();
    let err = registry
        .create(MetafieldDefinitionDto {
            id: None,
            owner_type: MetafieldOwnerType::Product,
            namespace: "specs".into(),
            key: "sku".into(),
            name: "SKU".into(),
            description: String::new(),
            value_type: MetafieldValueType::String,
            is_list: false,
            validations_json: r#"{"regex":"[0-9"}"#.into(),
            visibility_json: String::new(),
            created_at: None,
            updated_at: None,
            version: 0,
        })
        .unwrap_err();
    assert_eq!(err.kind(), MetafieldErrorKind::Conflict);
    assert!(registry.is_empty());
}

#[test]
fn legacy_values_are_flagged_not_dropped() {
    let decoded = decode("silver; gold");
    assert!(decoded.is_legacy());
    assert_eq!(decoded.to_raw(), Value::String("silver; gold".into()));
}
