use std::collections::BTreeSet;
use std::time::Duration;

use backend::domain::{a025_metafield_definition, a026_metafield_value};
use backend::shared::data::db;
use contracts::domain::a025_metafield_definition::aggregate::{
    MetafieldDefinitionDto, MetafieldDefinitionId, MetafieldDefinitionPatch,
};
use contracts::domain::a026_metafield_value::aggregate::MetafieldValue;
use contracts::enums::{MetafieldOwnerType, MetafieldValueType};
use contracts::shared::metafields::{DecodedValue, MetafieldError, MetafieldErrorKind, RoleKey};
use serde_json::json;
use uuid::Uuid;

fn dto(
    namespace: &str,
    key: &str,
    value_type: MetafieldValueType,
    validations_json: &str,
    visibility_json: &str,
) -> MetafieldDefinitionDto {
    MetafieldDefinitionDto {
        id: None,
        owner_type: MetafieldOwnerType::Product,
        namespace: namespace.into(),
        key: key.into(),
        name: String::new(),
        description: String::new(),
        value_type,
        is_list: false,
        validations_json: validations_json.into(),
        visibility_json: visibility_json.into(),
        created_at: None,
        updated_at: None,
        version: 0,
    }
}

fn domain_error(e: &anyhow::Error) -> &MetafieldError {
    e.downcast_ref::<MetafieldError>()
        .unwrap_or_else(|| panic!("expected a metafield error, got: {}", e))
}

/// Единое хранилище на процесс, поэтому весь сценарий живёт в одном тесте
#[tokio::test]
async fn metafield_lifecycle_against_sqlite() {
    let db_file = std::env::temp_dir().join(format!("metafields-{}.db", Uuid::new_v4()));
    db::initialize_database(&db_file).await.unwrap();

    // Создание и уникальность
    let size = a025_metafield_definition::service::create(dto(
        "specs",
        "size",
        MetafieldValueType::Number,
        r#"{"required":true,"min":1,"max":10}"#,
        r#"{"public":true}"#,
    ))
    .await
    .unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let internal = a025_metafield_definition::service::create(dto(
        "ops",
        "supplier_note",
        MetafieldValueType::Text,
        "",
        r#"{"adminOnly":true}"#,
    ))
    .await
    .unwrap();

    let err = a025_metafield_definition::service::create(dto(
        "specs",
        "size",
        MetafieldValueType::String,
        "",
        "",
    ))
    .await
    .unwrap_err();
    assert!(matches!(domain_error(&err), MetafieldError::DuplicateKey { .. }));

    let listed = a025_metafield_definition::service::list(Some(MetafieldOwnerType::Product))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, size.id);
    assert!(a025_metafield_definition::service::list(Some(MetafieldOwnerType::Customer))
        .await
        .unwrap()
        .is_empty());

    // Запись значений
    let size_id = size.id.value();
    let err = a026_metafield_value::service::set_value(
        MetafieldOwnerType::Product,
        "sku-1",
        size_id,
        &json!("42"),
    )
    .await
    .unwrap_err();
    assert_eq!(domain_error(&err).kind(), MetafieldErrorKind::Validation);

    let err = a026_metafield_value::service::set_value(
        MetafieldOwnerType::Customer,
        "sku-1",
        size_id,
        &json!("5"),
    )
    .await
    .unwrap_err();
    assert_eq!(domain_error(&err).kind(), MetafieldErrorKind::Validation);

    let saved = a026_metafield_value::service::set_value(
        MetafieldOwnerType::Product,
        " sku-1 ",
        size_id,
        &json!("7"),
    )
    .await
    .unwrap();
    assert_eq!(saved.owner_id, "sku-1");
    assert_eq!(saved.value_json, "\"7\"");

    a026_metafield_value::service::set_value(
        MetafieldOwnerType::Product,
        "sku-1",
        size_id,
        &json!(8),
    )
    .await
    .unwrap();
    let stored = a026_metafield_value::repository::get("sku-1", size_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.value_json, "\"8\"");
    assert_eq!(
        a026_metafield_value::repository::count_by_definition(size_id)
            .await
            .unwrap(),
        1
    );

    // Проверка без записи
    let err = a026_metafield_value::service::preview(size_id, &json!("0"))
        .await
        .unwrap_err();
    assert!(domain_error(&err).is_validation());
    assert_eq!(
        a026_metafield_value::service::preview(size_id, &json!("3"))
            .await
            .unwrap(),
        "\"3\""
    );

    // Видимость
    let nobody = BTreeSet::<RoleKey>::new();
    let customer_view =
        a026_metafield_value::service::list_for_owner(MetafieldOwnerType::Product, "sku-1", &nobody, false)
            .await
            .unwrap();
    assert_eq!(customer_view.len(), 1);
    assert_eq!(customer_view[0].key, "size");
    assert_eq!(customer_view[0].value, DecodedValue::Text("8".into()));

    let staff_view =
        a026_metafield_value::service::list_for_owner(MetafieldOwnerType::Product, "sku-1", &nobody, true)
            .await
            .unwrap();
    let keys: Vec<&str> = staff_view.iter().map(|v| v.key.as_str()).collect();
    assert_eq!(keys, vec!["size", "supplier_note"]);
    assert_eq!(staff_view[1].value, DecodedValue::Empty);

    // Изменение определения
    let renamed = a025_metafield_definition::service::update(
        size_id,
        MetafieldDefinitionPatch {
            name: Some("Size".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Size");
    assert_eq!(renamed.metadata.version, size.metadata.version + 1);

    let err = a025_metafield_definition::service::update(
        internal.id.value(),
        MetafieldDefinitionPatch {
            namespace: Some("specs".into()),
            key: Some("size".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(domain_error(&err), MetafieldError::DuplicateKey { .. }));

    // Удаление
    let err = a025_metafield_definition::service::delete(size_id)
        .await
        .unwrap_err();
    assert!(matches!(
        domain_error(&err),
        MetafieldError::DefinitionInUse { value_count: 1, .. }
    ));

    // Внешний ключ держит определение, даже если проверку количества обойти
    let err = a025_metafield_definition::repository::delete(size_id)
        .await
        .unwrap_err();
    assert!(db::is_foreign_key_violation(&err));
    assert!(a025_metafield_definition::service::get_by_id(size_id).await.is_ok());

    let orphan = MetafieldValue::new(
        "sku-1".into(),
        MetafieldDefinitionId::new_v4(),
        "\"1\"".into(),
    );
    let err = a026_metafield_value::repository::upsert(&orphan)
        .await
        .unwrap_err();
    assert!(db::is_foreign_key_violation(&err));

    a025_metafield_definition::service::delete(internal.id.value())
        .await
        .unwrap();
    let err = a025_metafield_definition::service::get_by_id(internal.id.value())
        .await
        .unwrap_err();
    assert_eq!(domain_error(&err).kind(), MetafieldErrorKind::NotFound);

    let err = a025_metafield_definition::service::delete(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(domain_error(&err).kind(), MetafieldErrorKind::NotFound);

    let _ = std::fs::remove_file(&db_file);
}
