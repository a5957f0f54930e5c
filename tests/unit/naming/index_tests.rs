//! Index name disambiguation tests

use shared_table_names::model::{
    DeleteBehavior, ForeignKey, Index, IndexRef, Name, Property, SchemaModel,
};
use shared_table_names::naming::{index_name, resolve_with_report, ArtifactKind};

use super::{add_bird, owned_zoo, zoo, OwnedZoo};

fn effective_name(model: &SchemaModel, index: IndexRef) -> String {
    let table = model.table_of(index.record_type).unwrap();
    index_name(model, index, &table, 128).unwrap().value
}

/// Dog and Cat each index the shared `OwnerId`
fn indexed_zoo(
    dog: impl FnOnce(Index) -> Index,
    cat: impl FnOnce(Index) -> Index,
) -> (OwnedZoo, IndexRef, IndexRef) {
    let mut owned = owned_zoo();
    let dog_index = owned
        .zoo
        .model
        .add_index(owned.zoo.dog, dog(Index::new(vec![owned.dog_owner_id])));
    let cat_index = owned
        .zoo
        .model
        .add_index(owned.zoo.cat, cat(Index::new(vec![owned.cat_owner_id])));
    (owned, dog_index, cat_index)
}

/// Adds a foreign key to Owner over the shared column for both Dog and Cat
fn link_to_owner(owned: &mut OwnedZoo, cat_on_delete: DeleteBehavior) {
    owned.zoo.model.add_foreign_key(
        owned.zoo.dog,
        ForeignKey::new(vec![owned.dog_owner_id], owned.owner),
    );
    owned.zoo.model.add_foreign_key(
        owned.zoo.cat,
        ForeignKey::new(vec![owned.cat_owner_id], owned.owner).on_delete(cat_on_delete),
    );
}

#[test]
fn test_identical_indexes_share_a_name() {
    let (mut owned, dog_index, cat_index) = indexed_zoo(|i| i, |i| i);

    let report = resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(effective_name(&owned.zoo.model, dog_index), "IX_Animals_OwnerId");
    assert_eq!(effective_name(&owned.zoo.model, cat_index), "IX_Animals_OwnerId");
    assert!(report.is_empty());
}

#[test]
fn test_indexes_backing_one_constraint_merge() {
    let (mut owned, dog_index, cat_index) = indexed_zoo(|i| i, |i| i.unique());
    link_to_owner(&mut owned, DeleteBehavior::NoAction);

    let report = resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(effective_name(&owned.zoo.model, dog_index), "IX_Animals_OwnerId");
    assert_eq!(effective_name(&owned.zoo.model, cat_index), "IX_Animals_OwnerId");
    assert!(report.is_empty());
}

#[test]
fn test_explicitly_configured_index_does_not_merge() {
    let (mut owned, dog_index, cat_index) =
        indexed_zoo(|i| i, |i| i.unique().explicitly_configured());
    link_to_owner(&mut owned, DeleteBehavior::NoAction);

    let report = resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(effective_name(&owned.zoo.model, dog_index), "IX_Animals_OwnerId");
    assert_eq!(effective_name(&owned.zoo.model, cat_index), "IX_Animals_OwnerId1");
    assert_eq!(report.renames_of(ArtifactKind::Index).count(), 1);
}

#[test]
fn test_incompatible_constraints_rename_both_artifacts() {
    let (mut owned, _, cat_index) = indexed_zoo(|i| i, |i| i.unique());
    link_to_owner(&mut owned, DeleteBehavior::Cascade);

    let report = resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(effective_name(&owned.zoo.model, cat_index), "IX_Animals_OwnerId1");
    assert_eq!(report.renames_of(ArtifactKind::ForeignKey).count(), 1);
    assert_eq!(report.renames_of(ArtifactKind::Index).count(), 1);
}

#[test]
fn test_different_filter_is_renamed() {
    let (mut owned, _, cat_index) =
        indexed_zoo(|i| i, |i| i.with_filter("[OwnerId] IS NOT NULL"));

    resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(effective_name(&owned.zoo.model, cat_index), "IX_Animals_OwnerId1");
}

#[test]
fn test_same_name_over_different_columns_is_renamed() {
    let mut zoo = zoo();
    let tag = zoo.model.add_property(zoo.dog, Property::new("Tag"));
    let dog_index = zoo.model.add_index(
        zoo.dog,
        Index::new(vec![tag]).with_name(Name::convention("IX_Shared")),
    );
    let label = zoo.model.add_property(zoo.cat, Property::new("Label"));
    let cat_index = zoo.model.add_index(
        zoo.cat,
        Index::new(vec![label]).with_name(Name::convention("IX_Shared")),
    );

    resolve_with_report(&mut zoo.model, 128);

    assert_eq!(effective_name(&zoo.model, dog_index), "IX_Shared");
    assert_eq!(effective_name(&zoo.model, cat_index), "IX_Shared1");
}

#[test]
fn test_pinned_index_forces_the_other_to_move() {
    let (mut owned, dog_index, cat_index) = indexed_zoo(
        |i| i,
        |i| i.unique().with_name(Name::explicit("IX_Animals_OwnerId")),
    );

    resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(effective_name(&owned.zoo.model, dog_index), "IX_Animals_OwnerId1");
    assert_eq!(effective_name(&owned.zoo.model, cat_index), "IX_Animals_OwnerId");
}

#[test]
fn test_both_pinned_indexes_are_reported() {
    let (mut owned, _, _) = indexed_zoo(
        |i| i.with_name(Name::explicit("IX_Owner")),
        |i| i.unique().with_name(Name::explicit("IX_Owner")),
    );

    let report = resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].kind, ArtifactKind::Index);
    assert_eq!(report.unresolved[0].name, "IX_Owner");
}

#[test]
fn test_merged_indexes_move_together_for_pinned_index() {
    let (mut owned, dog_index, cat_index) = indexed_zoo(|i| i, |i| i);
    let bird = add_bird(&mut owned.zoo);
    let ring = owned.zoo.model.add_property(bird, Property::new("Ring"));
    let bird_index = owned.zoo.model.add_index(
        bird,
        Index::new(vec![ring]).with_name(Name::explicit("IX_Animals_OwnerId")),
    );

    let report = resolve_with_report(&mut owned.zoo.model, 128);

    assert_eq!(effective_name(&owned.zoo.model, bird_index), "IX_Animals_OwnerId");
    assert_eq!(effective_name(&owned.zoo.model, dog_index), "IX_Animals_OwnerId1");
    assert_eq!(effective_name(&owned.zoo.model, cat_index), "IX_Animals_OwnerId1");
    assert_eq!(report.renames_of(ArtifactKind::Index).count(), 2);
    assert!(report.unresolved.is_empty());

    assert!(resolve_with_report(&mut owned.zoo.model, 128).is_empty());
}
