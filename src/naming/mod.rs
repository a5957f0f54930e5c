//! Name disambiguation for record types sharing a table.
//!
//! A run first settles which record types occupy which table
//! ([`table_grouper`]), then for every table renames colliding columns, keys,
//! foreign-key constraints and indexes, in that order. Later passes read the
//! names settled by earlier ones: key compatibility compares resolved column
//! names, and index merging compares resolved constraint names.
//!
//! Explicit names are never rewritten. When both sides of a clash are explicit and
//! incompatible, the clash stays in the model and is listed in the report.

mod column_namer;
mod conventions;
mod foreign_key_namer;
mod index_namer;
mod key_namer;
mod report;
mod table_grouper;
mod uniquifier;

use tracing::warn;

use crate::model::{ForeignKeyRef, Name, RecordTypeId, SchemaModel, TableId};

pub use conventions::{foreign_key_name, index_name, key_name};
pub use report::{ArtifactKind, Rename, ResolutionReport, UnresolvedClash};
pub use table_grouper::{group_tables, TablePartition};
pub use uniquifier::{identifier_len, truncate, uniquify};

/// One table and the record types mapped to it, in declaration order
pub(crate) struct TableScope<'a> {
    pub table: &'a TableId,
    pub members: &'a [RecordTypeId],
    pub max_len: usize,
}

/// Resolves every naming collision in `model` in place.
pub fn resolve(model: &mut SchemaModel, max_identifier_length: usize) {
    resolve_with_report(model, max_identifier_length);
}

/// Like [`resolve`], returning what was renamed and which clashes were left alone.
///
/// A zero identifier length leaves the model untouched, since no name fits in it.
pub fn resolve_with_report(
    model: &mut SchemaModel,
    max_identifier_length: usize,
) -> ResolutionReport {
    let mut report = ResolutionReport::default();
    if max_identifier_length == 0 {
        warn!("maximum identifier length is zero, skipping name resolution");
        return report;
    }
    let tables = group_tables(model, max_identifier_length, &mut report);

    for (table, members) in &tables {
        let scope = TableScope {
            table,
            members,
            max_len: max_identifier_length,
        };
        column_namer::uniquify_column_names(model, &scope, &mut report);
        key_namer::uniquify_key_names(model, &scope, &mut report);
        foreign_key_namer::uniquify_foreign_key_names(model, &scope, &mut report);
        index_namer::uniquify_index_names(model, &scope, &mut report);
    }

    report
}

/// Effective constraint name of a foreign key, or `None` for same-table links
/// and relationships whose principal is missing or unmapped.
pub fn constraint_name_of(
    model: &SchemaModel,
    foreign_key: ForeignKeyRef,
    max_identifier_length: usize,
) -> Option<Name> {
    let table = model.table_of(foreign_key.record_type)?;
    let members = [foreign_key.record_type];
    let scope = TableScope {
        table: &table,
        members: &members,
        max_len: max_identifier_length,
    };
    foreign_key_namer::constraint_name(model, foreign_key, &scope)
}
