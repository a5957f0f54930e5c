//! Write a resolved model and its resolution report as XML

use std::collections::BTreeMap;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::model::{RecordTypeId, SchemaModel, TableId};
use crate::naming::{constraint_name_of, index_name, key_name, ResolutionReport};

/// Write `<ResolvedModel>`: final names per table, then the renames and unresolved clashes.
pub fn write_resolved_model<W: Write>(
    writer: W,
    model: &SchemaModel,
    report: &ResolutionReport,
    max_identifier_length: usize,
) -> anyhow::Result<()> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);
    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let length = max_identifier_length.to_string();
    let root = BytesStart::new("ResolvedModel")
        .with_attributes([("maxIdentifierLength", length.as_str())]);
    xml_writer.write_event(Event::Start(root))?;

    for (table, members) in tables_of(model) {
        write_table(&mut xml_writer, model, &table, &members, max_identifier_length)?;
    }
    write_report(&mut xml_writer, report)?;

    xml_writer.write_event(Event::End(BytesEnd::new("ResolvedModel")))?;
    Ok(())
}

/// Every mapped record type grouped by its current table
fn tables_of(model: &SchemaModel) -> BTreeMap<TableId, Vec<RecordTypeId>> {
    let mut tables: BTreeMap<TableId, Vec<RecordTypeId>> = BTreeMap::new();
    for (id, _) in model.record_types() {
        if let Some(table) = model.table_of(id) {
            tables.entry(table).or_default().push(id);
        }
    }
    tables
}

fn write_table<W: Write>(
    writer: &mut Writer<W>,
    model: &SchemaModel,
    table: &TableId,
    members: &[RecordTypeId],
    max_len: usize,
) -> anyhow::Result<()> {
    let mut start = BytesStart::new("Table").with_attributes([("name", table.name.as_str())]);
    if let Some(schema) = &table.schema {
        start.push_attribute(("schema", schema.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    for &id in members {
        let Some(record_type) = model.record_type(id) else {
            continue;
        };
        let start =
            BytesStart::new("RecordType").with_attributes([("name", record_type.name.as_str())]);
        writer.write_event(Event::Start(start))?;

        for property in &record_type.properties {
            let column = BytesStart::new("Column").with_attributes([
                ("property", property.name.as_str()),
                ("name", property.column.as_str()),
                ("source", source_str(property.column.is_pinned())),
            ]);
            writer.write_event(Event::Empty(column))?;
        }

        for key in model.declared_keys(id) {
            let Some(name) = key_name(model, key, table, max_len) else {
                continue;
            };
            let primary = model.key(key).is_some_and(|k| k.is_primary);
            let element = BytesStart::new("Key").with_attributes([
                ("name", name.as_str()),
                ("source", source_str(name.is_pinned())),
                ("primary", if primary { "true" } else { "false" }),
            ]);
            writer.write_event(Event::Empty(element))?;
        }

        for foreign_key in model.declared_foreign_keys(id) {
            let Some(principal_id) = model.foreign_key(foreign_key).map(|fk| fk.principal) else {
                continue;
            };
            let Some(principal) = model.record_type(principal_id) else {
                continue;
            };
            let mut element = BytesStart::new("ForeignKey")
                .with_attributes([("principal", principal.name.as_str())]);
            if let Some(name) = constraint_name_of(model, foreign_key, max_len) {
                element.push_attribute(("name", name.as_str()));
                element.push_attribute(("source", source_str(name.is_pinned())));
            } else if model.table_of(principal_id).as_ref() == Some(table) {
                element.push_attribute(("linking", "true"));
            }
            writer.write_event(Event::Empty(element))?;
        }

        for index in model.declared_indexes(id) {
            let Some(name) = index_name(model, index, table, max_len) else {
                continue;
            };
            let element = BytesStart::new("Index").with_attributes([
                ("name", name.as_str()),
                ("source", source_str(name.is_pinned())),
            ]);
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("RecordType")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Table")))?;
    Ok(())
}

fn write_report<W: Write>(writer: &mut Writer<W>, report: &ResolutionReport) -> anyhow::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("Renames")))?;
    for rename in &report.renames {
        let table = rename.table.to_string();
        let element = BytesStart::new("Rename").with_attributes([
            ("kind", rename.kind.as_str()),
            ("table", table.as_str()),
            ("owner", rename.owner.as_str()),
            ("from", rename.from.as_str()),
            ("to", rename.to.as_str()),
        ]);
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Renames")))?;

    writer.write_event(Event::Start(BytesStart::new("Unresolved")))?;
    for clash in &report.unresolved {
        let table = clash.table.to_string();
        let element = BytesStart::new("Clash").with_attributes([
            ("kind", clash.kind.as_str()),
            ("table", table.as_str()),
            ("name", clash.name.as_str()),
            ("first", clash.first_owner.as_str()),
            ("second", clash.second_owner.as_str()),
        ]);
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Unresolved")))?;
    Ok(())
}

fn source_str(pinned: bool) -> &'static str {
    if pinned {
        "explicit"
    } else {
        "convention"
    }
}
