//! Column name disambiguation within one shared table

use crate::model::{Property, PropertyRef, SchemaModel};
use crate::util::starts_with_ci;

use super::report::{ArtifactKind, Rename, ResolutionReport, UnresolvedClash};
use super::uniquifier::{uniquify, UsedNames};
use super::TableScope;

/// Gives every declared property of the table's record types a distinct column,
/// except where two properties intentionally share one.
pub(crate) fn uniquify_column_names(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    report: &mut ResolutionReport,
) {
    let mut columns: UsedNames<PropertyRef> = UsedNames::new();

    for &record_type in scope.members {
        for property in model.declared_properties(record_type) {
            let Some(column_name) = model.property(property).map(|p| p.column.value.clone())
            else {
                continue;
            };
            let holders = columns.holders(&column_name).to_vec();
            let Some(&other) = holders.first() else {
                columns.claim(column_name, property);
                continue;
            };
            let (Some(current), Some(existing)) = (model.property(property), model.property(other))
            else {
                continue;
            };
            let shared = holders
                .iter()
                .filter_map(|&h| model.property(h))
                .any(|holder| shares_column(current, holder));
            if shared {
                columns.claim(column_name, property);
                continue;
            }

            let use_prefix = property.record_type != other.record_type
                || current.is_primary_key
                || existing.is_primary_key;
            let current_renameable = is_renameable(current);
            let holders_renameable = holders
                .iter()
                .all(|&h| model.property(h).is_some_and(is_renameable));

            if current_renameable
                && rename_columns(
                    model,
                    scope,
                    &[property],
                    &column_name,
                    &mut columns,
                    use_prefix,
                    report,
                )
            {
                continue;
            }
            if holders_renameable
                && rename_columns(
                    model,
                    scope,
                    &holders,
                    &column_name,
                    &mut columns,
                    use_prefix,
                    report,
                )
            {
                columns.assign(column_name, vec![property]);
                continue;
            }

            report.record_unresolved(UnresolvedClash {
                kind: ArtifactKind::Column,
                table: scope.table.clone(),
                name: column_name,
                first_owner: owner_name(model, other),
                second_owner: owner_name(model, property),
            });
        }
    }
}

/// Same underlying member, or the table's shared key / concurrency columns
fn shares_column(a: &Property, b: &Property) -> bool {
    let same_member = matches!((&a.member, &b.member), (Some(x), Some(y)) if x == y);
    same_member
        || (a.is_primary_key && b.is_primary_key)
        || (a.is_concurrency_token && b.is_concurrency_token)
}

/// Key and concurrency-token columns are referenced elsewhere by name and never move
fn is_renameable(property: &Property) -> bool {
    !property.column.is_pinned() && !property.is_primary_key && !property.is_concurrency_token
}

/// Moves every property in `group` to one new column name.
///
/// With `use_prefix` the name takes the declaring type's short name as a prefix,
/// unless the group spans several types and so belongs to none of them.
fn rename_columns(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    group: &[PropertyRef],
    column_name: &str,
    columns: &mut UsedNames<PropertyRef>,
    use_prefix: bool,
    report: &mut ResolutionReport,
) -> bool {
    let Some(&first) = group.first() else {
        return false;
    };
    let single_owner = group.iter().all(|p| p.record_type == first.record_type);
    let mut candidate = column_name.to_string();
    if use_prefix && single_owner {
        if let Some(record_type) = model.record_type(first.record_type) {
            let prefix = format!("{}_", record_type.short_name());
            if !starts_with_ci(&candidate, &prefix) {
                candidate = format!("{}{}", prefix, candidate);
            }
        }
    }
    let new_name = uniquify(&candidate, |n| columns.contains(n), scope.max_len);

    let mut moved = Vec::with_capacity(group.len());
    for &property in group {
        if !model.set_column_name(property, new_name.clone()) {
            continue;
        }
        report.record_rename(Rename {
            kind: ArtifactKind::Column,
            table: scope.table.clone(),
            owner: owner_name(model, property),
            from: column_name.to_string(),
            to: new_name.clone(),
        });
        moved.push(property);
    }
    if moved.is_empty() {
        return false;
    }
    columns.assign(new_name, moved);
    true
}

fn owner_name(model: &SchemaModel, property: PropertyRef) -> String {
    model
        .record_type(property.record_type)
        .map(|r| r.name.clone())
        .unwrap_or_default()
}
