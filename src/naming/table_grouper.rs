//! Table partitioning.
//!
//! Record types are bucketed by their (table, schema). A bucket whose table name is
//! at least as long as the maximum identifier length may have been formed by two
//! long names clipping to the same prefix; such buckets are split into weakly
//! connected components of the inheritance / same-table-link graph, and every
//! component but the first moves to a freshly uniquified table name.

use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::warn;

use crate::model::{RecordTypeId, SchemaModel, TableId};

use super::report::{ArtifactKind, Rename, ResolutionReport};
use super::uniquifier::{identifier_len, uniquify};

/// Final table -> record types assignment, each list in declaration order
pub type TablePartition = BTreeMap<TableId, Vec<RecordTypeId>>;

/// Buckets eligible record types by table and splits accidental truncation merges.
///
/// Eligible means mapped to a table and having a primary key (own or inherited);
/// anything else is left out of the partition.
pub fn group_tables(
    model: &mut SchemaModel,
    max_len: usize,
    report: &mut ResolutionReport,
) -> TablePartition {
    let mut tables: TablePartition = BTreeMap::new();
    let mut known_tables: HashSet<TableId> = HashSet::new();

    for (id, record_type) in model.record_types() {
        let Some(table) = model.table_of(id) else {
            continue;
        };
        known_tables.insert(table.clone());
        if model.primary_key(id).is_none() {
            warn!(
                table = %table,
                record_type = %record_type.name,
                "record type has no primary key, excluded from table grouping"
            );
            continue;
        }
        tables.entry(table).or_default().push(id);
    }

    let candidates: Vec<TableId> = tables
        .iter()
        .filter(|(table, members)| members.len() > 1 && identifier_len(&table.name) >= max_len)
        .map(|(table, _)| table.clone())
        .collect();

    for table in candidates {
        let members = tables[&table].clone();
        let components = connected_components(model, &members);
        if components.len() < 2 {
            continue;
        }

        let mut to_move: Vec<&Vec<RecordTypeId>> = Vec::new();
        let mut skipped_pinned = false;
        for component in components.iter().skip(1) {
            if has_pinned_table(model, component) {
                skipped_pinned = true;
            } else {
                to_move.push(component);
            }
        }
        // Keeping the clipped name for whichever component happens to be first is
        // only safe when no pinned component claims the same name.
        if skipped_pinned && !has_pinned_table(model, &components[0]) {
            to_move.insert(0, &components[0]);
        }

        for component in to_move {
            let new_name = uniquify(
                &table.name,
                |candidate| known_tables.contains(&TableId::new(candidate, table.schema.clone())),
                max_len,
            );
            let new_table = TableId::new(new_name.clone(), table.schema.clone());
            known_tables.insert(new_table.clone());

            for &member in component {
                if !model.set_table(member, new_name.clone()) {
                    continue;
                }
                let owner = model
                    .record_type(member)
                    .map(|r| r.name.clone())
                    .unwrap_or_default();
                report.record_rename(Rename {
                    kind: ArtifactKind::Table,
                    table: table.clone(),
                    owner,
                    from: table.name.clone(),
                    to: new_name.clone(),
                });
            }

            if let Some(bucket) = tables.get_mut(&table) {
                bucket.retain(|m| !component.contains(m));
            }
            tables.entry(new_table).or_default().extend(component);
        }
    }

    tables.retain(|_, members| !members.is_empty());
    tables
}

fn has_pinned_table(model: &SchemaModel, component: &[RecordTypeId]) -> bool {
    component.iter().any(|&id| {
        model
            .record_type(id)
            .and_then(|r| r.table.as_ref())
            .is_some_and(|t| t.is_pinned())
    })
}

/// Weakly connected components over `members`.
///
/// Edges join a type to its base type and to the principal of each foreign key it
/// declares, when the other end is also in `members` (i.e. shares the table).
/// Components come out ordered by their earliest member.
fn connected_components(model: &SchemaModel, members: &[RecordTypeId]) -> Vec<Vec<RecordTypeId>> {
    let position = |id: RecordTypeId| members.iter().position(|&m| m == id);
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); members.len()];

    for (i, &member) in members.iter().enumerate() {
        let Some(record_type) = model.record_type(member) else {
            continue;
        };
        let mut neighbours: Vec<RecordTypeId> = record_type.base.into_iter().collect();
        neighbours.extend(record_type.foreign_keys.iter().map(|fk| fk.principal));

        for neighbour in neighbours {
            if let Some(j) = position(neighbour) {
                if i != j {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }
    }

    let mut visited = vec![false; members.len()];
    let mut components = Vec::new();
    for start in 0..members.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            component.push(current);
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component.into_iter().map(|i| members[i]).collect());
    }
    components
}
