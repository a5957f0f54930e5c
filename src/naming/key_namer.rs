//! Primary / alternate key constraint name disambiguation

use crate::model::{KeyRef, SchemaModel};

use super::conventions::key_name;
use super::report::{ArtifactKind, Rename, ResolutionReport, UnresolvedClash};
use super::uniquifier::{uniquify, UsedNames};
use super::TableScope;

pub(crate) fn uniquify_key_names(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    report: &mut ResolutionReport,
) {
    let mut keys: UsedNames<KeyRef> = UsedNames::new();

    for &record_type in scope.members {
        for key in model.declared_keys(record_type) {
            let Some(name) = key_name(model, key, scope.table, scope.max_len) else {
                continue;
            };
            let holders = keys.holders(name.as_str()).to_vec();
            let Some(&other) = holders.first() else {
                keys.claim(name.value, key);
                continue;
            };
            // One table has one physical primary key, however many types map to it
            let shared = is_primary(model, key)
                || holders
                    .iter()
                    .any(|&h| is_primary(model, h) || keys_compatible(model, key, h));
            if shared {
                keys.claim(name.value, key);
                continue;
            }

            if !name.is_pinned()
                && rename_keys(model, scope, &[key], &name.value, &mut keys, report)
            {
                continue;
            }
            let holders_pinned = holders.iter().any(|&h| {
                key_name(model, h, scope.table, scope.max_len).map_or(true, |n| n.is_pinned())
            });
            if !holders_pinned
                && rename_keys(model, scope, &holders, &name.value, &mut keys, report)
            {
                keys.assign(name.value, vec![key]);
                continue;
            }

            report.record_unresolved(UnresolvedClash {
                kind: ArtifactKind::Key,
                table: scope.table.clone(),
                name: name.value,
                first_owner: owner_name(model, other),
                second_owner: owner_name(model, key),
            });
        }
    }
}

fn is_primary(model: &SchemaModel, key: KeyRef) -> bool {
    model.key(key).is_some_and(|k| k.is_primary)
}

/// Same columns, in the same order, under their resolved names
pub(crate) fn keys_compatible(model: &SchemaModel, a: KeyRef, b: KeyRef) -> bool {
    let (Some(a), Some(b)) = (model.key(a), model.key(b)) else {
        return false;
    };
    match (model.column_names(&a.properties), model.column_names(&b.properties)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Moves every key in `group` to one new constraint name
fn rename_keys(
    model: &mut SchemaModel,
    scope: &TableScope<'_>,
    group: &[KeyRef],
    current: &str,
    keys: &mut UsedNames<KeyRef>,
    report: &mut ResolutionReport,
) -> bool {
    let new_name = uniquify(current, |n| keys.contains(n), scope.max_len);
    let mut moved = Vec::with_capacity(group.len());
    for &key in group {
        if !model.set_key_name(key, new_name.clone()) {
            continue;
        }
        report.record_rename(Rename {
            kind: ArtifactKind::Key,
            table: scope.table.clone(),
            owner: owner_name(model, key),
            from: current.to_string(),
            to: new_name.clone(),
        });
        moved.push(key);
    }
    if moved.is_empty() {
        return false;
    }
    keys.assign(new_name, moved);
    true
}

fn owner_name(model: &SchemaModel, key: KeyRef) -> String {
    model
        .record_type(key.record_type)
        .map(|r| r.name.clone())
        .unwrap_or_default()
}
