//! Table grouping tests

use shared_table_names::model::{ForeignKey, Name, Property, RecordType, SchemaModel, TableId};
use shared_table_names::naming::{
    group_tables, identifier_len, resolve_with_report, ArtifactKind, ResolutionReport,
};

use super::{add_keyed, snapshot};

#[test]
fn test_clipped_table_names_are_split() {
    let mut model = SchemaModel::new();
    let (customer, _) = add_keyed(
        &mut model,
        RecordType::new("CustomerOrderHistoryTableForAuditing")
            .with_table(Name::convention("CUSTOMER_ORDER_HISTORY_TA")),
    );
    let (order, _) = add_keyed(
        &mut model,
        RecordType::new("CustomerOrderHistoryTableArchive")
            .with_table(Name::convention("CUSTOMER_ORDER_HISTORY_TA")),
    );

    let report = resolve_with_report(&mut model, 25);

    assert_eq!(
        model.table_of(customer).unwrap().name,
        "CUSTOMER_ORDER_HISTORY_TA"
    );
    assert_eq!(
        model.table_of(order).unwrap().name,
        "CUSTOMER_ORDER_HISTORY_T1"
    );
    let renames: Vec<_> = report.renames_of(ArtifactKind::Table).collect();
    assert_eq!(renames.len(), 1);
    assert_eq!(renames[0].owner, "CustomerOrderHistoryTableArchive");
    assert_eq!(renames[0].to, "CUSTOMER_ORDER_HISTORY_T1");
}

#[test]
fn test_split_takes_the_clipped_name_when_free() {
    let mut model = SchemaModel::new();
    let (customer, _) = add_keyed(
        &mut model,
        RecordType::new("Customer").with_table(Name::convention("CUSTOMER_ORDER_HISTORY_TAB")),
    );
    let (order, _) = add_keyed(
        &mut model,
        RecordType::new("Order").with_table(Name::convention("CUSTOMER_ORDER_HISTORY_TAB")),
    );

    let report = resolve_with_report(&mut model, 25);

    assert_eq!(
        model.table_of(customer).unwrap().name,
        "CUSTOMER_ORDER_HISTORY_TAB"
    );
    let order_table = model.table_of(order).unwrap().name;
    assert_eq!(order_table, "CUSTOMER_ORDER_HISTORY_TA");
    assert!(identifier_len(&order_table) <= 25);
    let renames: Vec<_> = report.renames_of(ArtifactKind::Table).collect();
    assert_eq!(renames.len(), 1);
    assert_eq!(renames[0].owner, "Order");
    assert_eq!(renames[0].from, "CUSTOMER_ORDER_HISTORY_TAB");
}

#[test]
fn test_zero_identifier_length_changes_nothing() {
    let mut model = SchemaModel::new();
    let (customer, _) = add_keyed(
        &mut model,
        RecordType::new("Customer").with_table(Name::convention("People")),
    );
    let (employee, _) = add_keyed(
        &mut model,
        RecordType::new("Employee").with_table(Name::convention("People")),
    );
    let before = snapshot(&model, 128);

    let report = resolve_with_report(&mut model, 0);

    assert!(report.is_empty());
    assert_eq!(model.table_of(customer).unwrap().name, "People");
    assert_eq!(model.table_of(employee).unwrap().name, "People");
    assert_eq!(snapshot(&model, 128), before);
}

#[test]
fn test_short_table_names_are_never_split() {
    let mut model = SchemaModel::new();
    let (customer, _) = add_keyed(
        &mut model,
        RecordType::new("Customer").with_table(Name::convention("People")),
    );
    let (employee, _) = add_keyed(
        &mut model,
        RecordType::new("Employee").with_table(Name::convention("People")),
    );

    let report = resolve_with_report(&mut model, 25);

    assert_eq!(model.table_of(customer), model.table_of(employee));
    assert_eq!(report.renames_of(ArtifactKind::Table).count(), 0);
}

#[test]
fn test_inheritance_keeps_long_table_together() {
    let mut model = SchemaModel::new();
    let (animal, _) = add_keyed(
        &mut model,
        RecordType::new("Animal").with_table(Name::convention("ANIMALS_LO")),
    );
    let dog = model.add_record_type(
        RecordType::new("Dog")
            .derived_from(animal)
            .with_table(Name::convention("ANIMALS_LO")),
    );

    resolve_with_report(&mut model, 10);

    assert_eq!(model.table_of(dog).unwrap().name, "ANIMALS_LO");
    assert_eq!(model.table_of(animal).unwrap().name, "ANIMALS_LO");
}

#[test]
fn test_same_table_link_keeps_long_table_together() {
    let mut model = SchemaModel::new();
    let (order, _) = add_keyed(
        &mut model,
        RecordType::new("Order").with_table(Name::convention("ORDERS_LON")),
    );
    let (details, details_id) = add_keyed(
        &mut model,
        RecordType::new("OrderDetails").with_table(Name::convention("ORDERS_LON")),
    );
    model.add_foreign_key(details, ForeignKey::new(vec![details_id], order));

    let mut report = ResolutionReport::default();
    let tables = group_tables(&mut model, 10, &mut report);

    assert_eq!(tables.len(), 1);
    assert_eq!(
        tables[&TableId::new("ORDERS_LON", None)],
        vec![order, details]
    );
    assert!(report.is_empty());
}

#[test]
fn test_pinned_tables_are_left_alone() {
    let mut model = SchemaModel::new();
    let (first, _) = add_keyed(
        &mut model,
        RecordType::new("First").with_table(Name::explicit("LONGNAME")),
    );
    let (second, _) = add_keyed(
        &mut model,
        RecordType::new("Second").with_table(Name::explicit("LONGNAME")),
    );

    let report = resolve_with_report(&mut model, 8);

    assert_eq!(model.table_of(first).unwrap().name, "LONGNAME");
    assert_eq!(model.table_of(second).unwrap().name, "LONGNAME");
    assert_eq!(report.renames_of(ArtifactKind::Table).count(), 0);
}

#[test]
fn test_pinned_first_component_moves_the_rest() {
    let mut model = SchemaModel::new();
    let (first, _) = add_keyed(
        &mut model,
        RecordType::new("First").with_table(Name::explicit("LONGNAME")),
    );
    let (second, _) = add_keyed(
        &mut model,
        RecordType::new("Second").with_table(Name::convention("LONGNAME")),
    );

    resolve_with_report(&mut model, 8);

    assert_eq!(model.table_of(first).unwrap().name, "LONGNAME");
    assert_eq!(model.table_of(second).unwrap().name, "LONGNAM1");
}

#[test]
fn test_new_table_name_is_unique_within_its_schema() {
    let mut model = SchemaModel::new();
    add_keyed(
        &mut model,
        RecordType::new("A")
            .with_table(Name::convention("LONGNAME"))
            .with_schema("sales"),
    );
    let (b, _) = add_keyed(
        &mut model,
        RecordType::new("B")
            .with_table(Name::convention("LONGNAME"))
            .with_schema("sales"),
    );
    // Same name in another schema does not block the candidate
    add_keyed(
        &mut model,
        RecordType::new("C")
            .with_table(Name::convention("LONGNAM1"))
            .with_schema("audit"),
    );
    // Same name in the same schema does
    add_keyed(
        &mut model,
        RecordType::new("D")
            .with_table(Name::convention("LONGNAM1"))
            .with_schema("sales"),
    );

    resolve_with_report(&mut model, 8);

    assert_eq!(
        model.table_of(b).unwrap(),
        TableId::new("LONGNAM2", Some("sales".to_string()))
    );
}

#[test]
fn test_unmapped_and_keyless_types_are_not_grouped() {
    let mut model = SchemaModel::new();
    let (order, _) = add_keyed(
        &mut model,
        RecordType::new("Order").with_table(Name::convention("Orders")),
    );
    let summary = model
        .add_record_type(RecordType::new("OrderSummary").with_table(Name::convention("Orders")));
    model.add_property(summary, Property::new("Total"));
    let projection = model.add_record_type(RecordType::new("OrderView").unmapped());
    model.add_property(projection, Property::new("Total"));

    let mut report = ResolutionReport::default();
    let tables = group_tables(&mut model, 128, &mut report);

    assert_eq!(tables.len(), 1);
    assert_eq!(tables[&TableId::new("Orders", None)], vec![order]);
}
