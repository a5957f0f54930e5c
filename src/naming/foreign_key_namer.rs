//! Foreign-key constraint name disambiguation.
//!
//! A foreign key between two record types mapped to the same (table, schema) links
//! two halves of one row; it has no physical constraint and is never named here.

use crate::model::{ForeignKeyRef, MemberId, Name, SchemaModel, TableId};

use super::conventions::foreign_key_name;
use super::report::{ArtifactKind, Rename, ResolutionReport, UnresolvedClash};
use super::uniquifier::{uniquify, UsedNames};
use super::TableScope;

pub(crate) fn uniquify_foreign_key_names(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    report: &mut ResolutionReport,
) {
    let mut foreign_keys: UsedNames<ForeignKeyRef> = UsedNames::new();

    for &record_type in scope.members {
        for foreign_key in model.declared_foreign_keys(record_type) {
            let Some(name) = constraint_name(model, foreign_key, scope) else {
                continue;
            };
            let holders = foreign_keys.holders(name.as_str()).to_vec();
            let Some(&other) = holders.first() else {
                foreign_keys.claim(name.value, foreign_key);
                continue;
            };
            // A compatible foreign key is the same constraint, pinned or not
            if holders
                .iter()
                .any(|&h| foreign_keys_compatible(model, foreign_key, h))
            {
                foreign_keys.claim(name.value, foreign_key);
                continue;
            }

            if !name.is_pinned()
                && rename_foreign_keys(
                    model,
                    scope,
                    &[foreign_key],
                    &name.value,
                    &mut foreign_keys,
                    report,
                )
            {
                continue;
            }
            let holders_pinned = holders
                .iter()
                .any(|&h| constraint_name(model, h, scope).map_or(true, |n| n.is_pinned()));
            if !holders_pinned
                && rename_foreign_keys(
                    model,
                    scope,
                    &holders,
                    &name.value,
                    &mut foreign_keys,
                    report,
                )
            {
                foreign_keys.assign(name.value, vec![foreign_key]);
                continue;
            }

            report.record_unresolved(UnresolvedClash {
                kind: ArtifactKind::ForeignKey,
                table: scope.table.clone(),
                name: name.value,
                first_owner: owner_name(model, other),
                second_owner: owner_name(model, foreign_key),
            });
        }
    }
}

/// Table the principal of `foreign_key` is mapped to, if it is a real record type
fn principal_table(model: &SchemaModel, foreign_key: ForeignKeyRef) -> Option<TableId> {
    let principal = model.foreign_key(foreign_key)?.principal;
    model.table_of(principal)
}

/// Effective constraint name, or `None` for same-table links and malformed relationships
pub(crate) fn constraint_name(
    model: &SchemaModel,
    foreign_key: ForeignKeyRef,
    scope: &TableScope<'_>,
) -> Option<Name> {
    let principal_table = principal_table(model, foreign_key)?;
    if principal_table == *scope.table {
        return None;
    }
    model.principal_key(foreign_key)?;
    foreign_key_name(model, foreign_key, scope.table, &principal_table, scope.max_len)
}

/// Whether two same-named foreign keys describe one physical constraint.
///
/// Navigations present on both sides must be the same member; columns, principal
/// table, principal key columns, delete behavior and uniqueness must all agree.
pub(crate) fn foreign_keys_compatible(
    model: &SchemaModel,
    a: ForeignKeyRef,
    b: ForeignKeyRef,
) -> bool {
    let (Some(left), Some(right)) = (model.foreign_key(a), model.foreign_key(b)) else {
        return false;
    };

    if !navigations_match(
        left.dependent_to_principal.as_ref(),
        right.dependent_to_principal.as_ref(),
    ) || !navigations_match(
        left.principal_to_dependent.as_ref(),
        right.principal_to_dependent.as_ref(),
    )
    {
        return false;
    }
    if left.on_delete != right.on_delete || left.is_unique != right.is_unique {
        return false;
    }

    let columns_match = match (
        model.column_names(&left.properties),
        model.column_names(&right.properties),
    ) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    };
    if !columns_match {
        return false;
    }

    match (principal_table(model, a), principal_table(model, b)) {
        (Some(l), Some(r)) if l == r => {}
        _ => return false,
    }

    let principal_columns = |r: ForeignKeyRef| {
        model
            .principal_key(r)
            .and_then(|k| model.key(k))
            .and_then(|k| model.column_names(&k.properties))
    };
    match (principal_columns(a), principal_columns(b)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

fn navigations_match(a: Option<&MemberId>, b: Option<&MemberId>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Moves every foreign key in `group` to one new constraint name
fn rename_foreign_keys(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    group: &[ForeignKeyRef],
    current: &str,
    foreign_keys: &mut UsedNames<ForeignKeyRef>,
    report: &mut ResolutionReport,
) -> bool {
    let new_name = uniquify(current, |n| foreign_keys.contains(n), scope.max_len);
    let mut moved = Vec::with_capacity(group.len());
    for &foreign_key in group {
        if !model.set_foreign_key_name(foreign_key, new_name.clone()) {
            continue;
        }
        report.record_rename(Rename {
            kind: ArtifactKind::ForeignKey,
            table: scope.table.clone(),
            owner: owner_name(model, foreign_key),
            from: current.to_string(),
            to: new_name.clone(),
        });
        moved.push(foreign_key);
    }
    if moved.is_empty() {
        return false;
    }
    foreign_keys.assign(new_name, moved);
    true
}

fn owner_name(model: &SchemaModel, foreign_key: ForeignKeyRef) -> String {
    model
        .record_type(foreign_key.record_type)
        .map(|r| r.name.clone())
        .unwrap_or_default()
}
