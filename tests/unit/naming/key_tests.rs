//! Key name disambiguation tests

use shared_table_names::model::{Key, KeyRef, Name, Property, RecordType, SchemaModel};
use shared_table_names::naming::{key_name, resolve_with_report, ArtifactKind};

use super::{add_bird, add_keyed, zoo, Zoo};

fn effective_name(model: &SchemaModel, key: KeyRef) -> String {
    let table = model.table_of(key.record_type).unwrap();
    key_name(model, key, &table, 128).unwrap().value
}

/// Dog and Cat each with an alternate key over a differently named column
fn zoo_with_alternate_keys(dog_name: Name, cat_name: Name) -> (Zoo, KeyRef, KeyRef) {
    let mut zoo = zoo();
    let tag = zoo.model.add_property(zoo.dog, Property::new("Tag"));
    let dog_key = zoo
        .model
        .add_key(zoo.dog, Key::new(vec![tag]).with_name(dog_name));
    let label = zoo.model.add_property(zoo.cat, Property::new("Label"));
    let cat_key = zoo
        .model
        .add_key(zoo.cat, Key::new(vec![label]).with_name(cat_name));
    (zoo, dog_key, cat_key)
}

#[test]
fn test_colliding_alternate_key_is_renamed() {
    let (mut zoo, dog_key, cat_key) = zoo_with_alternate_keys(
        Name::convention("AK_Animals_Code"),
        Name::convention("AK_Animals_Code"),
    );

    let report = resolve_with_report(&mut zoo.model, 128);

    assert_eq!(effective_name(&zoo.model, dog_key), "AK_Animals_Code");
    assert_eq!(effective_name(&zoo.model, cat_key), "AK_Animals_Code1");
    let renames: Vec<_> = report.renames_of(ArtifactKind::Key).collect();
    assert_eq!(renames.len(), 1);
    assert_eq!(renames[0].owner, "Zoo.Cat");
}

#[test]
fn test_pinned_alternate_key_forces_the_other_to_move() {
    let (mut zoo, dog_key, cat_key) = zoo_with_alternate_keys(
        Name::convention("AK_Animals_Code"),
        Name::explicit("AK_Animals_Code"),
    );

    resolve_with_report(&mut zoo.model, 128);

    assert_eq!(effective_name(&zoo.model, dog_key), "AK_Animals_Code1");
    assert_eq!(effective_name(&zoo.model, cat_key), "AK_Animals_Code");
}

#[test]
fn test_both_pinned_alternate_keys_are_reported() {
    let (mut zoo, dog_key, cat_key) = zoo_with_alternate_keys(
        Name::explicit("AK_Animals_Code"),
        Name::explicit("AK_Animals_Code"),
    );

    let report = resolve_with_report(&mut zoo.model, 128);

    assert_eq!(effective_name(&zoo.model, dog_key), "AK_Animals_Code");
    assert_eq!(effective_name(&zoo.model, cat_key), "AK_Animals_Code");
    assert_eq!(report.renames_of(ArtifactKind::Key).count(), 0);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].kind, ArtifactKind::Key);
    assert_eq!(report.unresolved[0].name, "AK_Animals_Code");
}

#[test]
fn test_keys_over_the_same_columns_share_a_name() {
    let mut zoo = zoo();
    let dog_code = zoo
        .model
        .add_property(zoo.dog, Property::new("Code").with_member("ICoded.Code"));
    let dog_key = zoo.model.add_key(zoo.dog, Key::new(vec![dog_code]));
    let cat_code = zoo
        .model
        .add_property(zoo.cat, Property::new("Code").with_member("ICoded.Code"));
    let cat_key = zoo.model.add_key(zoo.cat, Key::new(vec![cat_code]));

    let report = resolve_with_report(&mut zoo.model, 128);

    assert_eq!(effective_name(&zoo.model, dog_key), "AK_Animals_Code");
    assert_eq!(effective_name(&zoo.model, cat_key), "AK_Animals_Code");
    assert!(report.is_empty());
}

#[test]
fn test_default_names_follow_renamed_columns() {
    let mut zoo = zoo();
    let dog_color = zoo.model.add_property(zoo.dog, Property::new("Color"));
    let dog_key = zoo.model.add_key(zoo.dog, Key::new(vec![dog_color]));
    let cat_color = zoo.model.add_property(zoo.cat, Property::new("Color"));
    let cat_key = zoo.model.add_key(zoo.cat, Key::new(vec![cat_color]));

    let report = resolve_with_report(&mut zoo.model, 128);

    assert_eq!(effective_name(&zoo.model, dog_key), "AK_Animals_Color");
    assert_eq!(effective_name(&zoo.model, cat_key), "AK_Animals_Cat_Color");
    assert_eq!(report.renames_of(ArtifactKind::Key).count(), 0);
}

#[test]
fn test_primary_keys_of_split_table_are_never_renamed() {
    let mut model = SchemaModel::new();
    let (order, _) = add_keyed(
        &mut model,
        RecordType::new("Order").with_table(Name::convention("Orders")),
    );
    let (info, _) = add_keyed(
        &mut model,
        RecordType::new("OrderInfo").with_table(Name::convention("Orders")),
    );

    let report = resolve_with_report(&mut model, 128);

    let order_key = model.primary_key(order).unwrap();
    let info_key = model.primary_key(info).unwrap();
    assert_eq!(effective_name(&model, order_key), "PK_Orders");
    assert_eq!(effective_name(&model, info_key), "PK_Orders");
    assert!(report.is_empty());
}

#[test]
fn test_shared_key_moves_together_for_pinned_key() {
    let mut zoo = zoo();
    let dog_code = zoo
        .model
        .add_property(zoo.dog, Property::new("Code").with_member("ICoded.Code"));
    let dog_key = zoo.model.add_key(
        zoo.dog,
        Key::new(vec![dog_code]).with_name(Name::convention("AK_Shared")),
    );
    let cat_code = zoo
        .model
        .add_property(zoo.cat, Property::new("Code").with_member("ICoded.Code"));
    let cat_key = zoo.model.add_key(
        zoo.cat,
        Key::new(vec![cat_code]).with_name(Name::convention("AK_Shared")),
    );
    let bird = add_bird(&mut zoo);
    let ring = zoo.model.add_property(bird, Property::new("Ring"));
    let bird_key = zoo.model.add_key(
        bird,
        Key::new(vec![ring]).with_name(Name::explicit("AK_Shared")),
    );

    let report = resolve_with_report(&mut zoo.model, 128);

    assert_eq!(effective_name(&zoo.model, bird_key), "AK_Shared");
    assert_eq!(effective_name(&zoo.model, dog_key), "AK_Shared1");
    assert_eq!(effective_name(&zoo.model, cat_key), "AK_Shared1");
    assert_eq!(report.renames_of(ArtifactKind::Key).count(), 2);
    assert!(report.unresolved.is_empty());

    assert!(resolve_with_report(&mut zoo.model, 128).is_empty());
}
