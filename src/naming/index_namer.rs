//! Index name disambiguation, including merging of indexes that back equivalent foreign keys

use crate::model::{ConfigSource, ForeignKeyRef, IndexRef, SchemaModel};

use super::conventions::index_name;
use super::foreign_key_namer::{constraint_name, foreign_keys_compatible};
use super::report::{ArtifactKind, Rename, ResolutionReport, UnresolvedClash};
use super::uniquifier::{uniquify, UsedNames};
use super::TableScope;

pub(crate) fn uniquify_index_names(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    report: &mut ResolutionReport,
) {
    let mut indexes: UsedNames<IndexRef> = UsedNames::new();

    for &record_type in scope.members {
        for index in model.declared_indexes(record_type) {
            let Some(name) = index_name(model, index, scope.table, scope.max_len) else {
                continue;
            };
            let holders = indexes.holders(name.as_str()).to_vec();
            let Some(&other) = holders.first() else {
                indexes.claim(name.value, index);
                continue;
            };
            // An identical index is the same physical index, pinned or not
            let merged = holders.iter().any(|&h| {
                indexes_compatible(model, index, h)
                    || (!name.is_pinned() && backs_same_foreign_key(model, scope, index, h))
            });
            if merged {
                indexes.claim(name.value, index);
                continue;
            }

            if !name.is_pinned()
                && rename_indexes(model, scope, &[index], &name.value, &mut indexes, report)
            {
                continue;
            }
            let holders_pinned = holders.iter().any(|&h| {
                index_name(model, h, scope.table, scope.max_len).map_or(true, |n| n.is_pinned())
            });
            if !holders_pinned
                && rename_indexes(model, scope, &holders, &name.value, &mut indexes, report)
            {
                indexes.assign(name.value, vec![index]);
                continue;
            }

            report.record_unresolved(UnresolvedClash {
                kind: ArtifactKind::Index,
                table: scope.table.clone(),
                name: name.value,
                first_owner: owner_name(model, other),
                second_owner: owner_name(model, index),
            });
        }
    }
}

/// Same columns in the same order, same uniqueness and same filter
fn indexes_compatible(model: &SchemaModel, a: IndexRef, b: IndexRef) -> bool {
    let (Some(left), Some(right)) = (model.index(a), model.index(b)) else {
        return false;
    };
    if left.is_unique != right.is_unique || left.filter != right.filter {
        return false;
    }
    match (
        model.column_names(&left.properties),
        model.column_names(&right.properties),
    ) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Two convention-added, renameable indexes each backing a foreign key over the
/// same columns, where both foreign keys resolve to one compatible constraint.
fn backs_same_foreign_key(
    model: &SchemaModel,
    scope: &TableScope<'_>,
    index: IndexRef,
    other: IndexRef,
) -> bool {
    let is_free_convention_index = |r: IndexRef| {
        model.index(r).is_some_and(|i| {
            i.origin == ConfigSource::Convention && !i.name.as_ref().is_some_and(|n| n.is_pinned())
        })
    };
    if !is_free_convention_index(index) || !is_free_convention_index(other) {
        return false;
    }

    let (Some(foreign_key), Some(other_foreign_key)) = (
        associated_foreign_key(model, index),
        associated_foreign_key(model, other),
    ) else {
        return false;
    };

    match (
        constraint_name(model, foreign_key, scope),
        constraint_name(model, other_foreign_key, scope),
    ) {
        (Some(l), Some(r)) if l.value == r.value => {
            foreign_keys_compatible(model, foreign_key, other_foreign_key)
        }
        _ => false,
    }
}

/// First foreign key declared alongside `index` over exactly the index's columns
fn associated_foreign_key(model: &SchemaModel, index: IndexRef) -> Option<ForeignKeyRef> {
    let columns = model.column_names(&model.index(index)?.properties)?;
    model
        .declared_foreign_keys(index.record_type)
        .into_iter()
        .find(|&fk| {
            model
                .foreign_key(fk)
                .and_then(|f| model.column_names(&f.properties))
                .is_some_and(|c| c == columns)
        })
}

/// Moves every index in `group` to one new name
fn rename_indexes(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    group: &[IndexRef],
    current: &str,
    indexes: &mut UsedNames<IndexRef>,
    report: &mut ResolutionReport,
) -> bool {
    let new_name = uniquify(current, |n| indexes.contains(n), scope.max_len);
    let mut moved = Vec::with_capacity(group.len());
    for &index in group {
        if !model.set_index_name(index, new_name.clone()) {
            continue;
        }
        report.record_rename(Rename {
            kind: ArtifactKind::Index,
            table: scope.table.clone(),
            owner: owner_name(model, index),
            from: current.to_string(),
            to: new_name.clone(),
        });
        moved.push(index);
    }
    if moved.is_empty() {
        return false;
    }
    indexes.assign(new_name, moved);
    true
}

fn owner_name(model: &SchemaModel, index: IndexRef) -> String {
    model
        .record_type(index.record_type)
        .map(|r| r.name.clone())
        .unwrap_or_default()
}
