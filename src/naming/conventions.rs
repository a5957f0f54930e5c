//! Convention default names for keys, foreign keys and indexes.
//!
//! An element whose name slot is `None` takes its default from the table it is
//! currently mapped to, so defaults follow table renames made during grouping.

use crate::model::{ForeignKeyRef, IndexRef, KeyRef, Name, SchemaModel, TableId};

use super::uniquifier::truncate;

/// Effective name of a key in `table`
pub fn key_name(
    model: &SchemaModel,
    key: KeyRef,
    table: &TableId,
    max_len: usize,
) -> Option<Name> {
    let element = model.key(key)?;
    if let Some(name) = &element.name {
        return Some(name.clone());
    }
    let default = if element.is_primary {
        format!("PK_{}", table.name)
    } else {
        let columns = model.column_names(&element.properties)?;
        format!("AK_{}_{}", table.name, columns.join("_"))
    };
    Some(Name::convention(truncate(&default, max_len)))
}

/// Effective constraint name of a foreign key from `table` to `principal_table`
pub fn foreign_key_name(
    model: &SchemaModel,
    foreign_key: ForeignKeyRef,
    table: &TableId,
    principal_table: &TableId,
    max_len: usize,
) -> Option<Name> {
    let element = model.foreign_key(foreign_key)?;
    if let Some(name) = &element.name {
        return Some(name.clone());
    }
    let columns = model.column_names(&element.properties)?;
    let default = format!(
        "FK_{}_{}_{}",
        table.name,
        principal_table.name,
        columns.join("_")
    );
    Some(Name::convention(truncate(&default, max_len)))
}

/// Effective database name of an index in `table`
pub fn index_name(
    model: &SchemaModel,
    index: IndexRef,
    table: &TableId,
    max_len: usize,
) -> Option<Name> {
    let element = model.index(index)?;
    if let Some(name) = &element.name {
        return Some(name.clone());
    }
    let columns = model.column_names(&element.properties)?;
    let default = format!("IX_{}_{}", table.name, columns.join("_"));
    Some(Name::convention(truncate(&default, max_len)))
}
