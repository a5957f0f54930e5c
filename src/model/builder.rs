//! Build a schema model from an XML model file
//!
//! ```xml
//! <Model maxIdentifierLength="30">
//!   <RecordType name="Animal" table="Animals">
//!     <Property name="Id" />
//!     <Property name="Name" member="Animal.Name" />
//!     <Key properties="Id" primary="true" />
//!   </RecordType>
//!   <RecordType name="Dog" base="Animal" table="Animals">
//!     <Property name="OwnerId" column="OWNER" columnSource="explicit" />
//!     <ForeignKey principal="Owner" properties="OwnerId" onDelete="cascade" />
//!     <Index properties="OwnerId" />
//!   </RecordType>
//! </Model>
//! ```
//!
//! Record types may be declared in any order. Property lists are comma separated and
//! resolve along the base-type chain. A foreign key naming a principal that is not in
//! the file is dropped with a warning rather than failing the load.

use std::path::Path;

use anyhow::Result;
use roxmltree::{Document, Node};
use tracing::warn;

use crate::error::NamingError;
use crate::util::split_list;

use super::{
    ConfigSource, DeleteBehavior, ForeignKey, Index, Key, KeyRef, Name, Property, PropertyRef,
    RecordType, RecordTypeId, SchemaModel,
};

/// A model loaded from file, with the naming policy it declares (if any)
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: SchemaModel,
    pub max_identifier_length: Option<usize>,
}

/// Read and build a model file
pub fn load_model_file(path: &Path) -> Result<LoadedModel> {
    let content = std::fs::read_to_string(path).map_err(|e| NamingError::ModelReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    build_model(&content, path)
}

/// Build a model from XML content; `path` is only used in error messages
pub fn build_model(content: &str, path: &Path) -> Result<LoadedModel> {
    let doc = Document::parse(content).map_err(|e| NamingError::ModelParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Model" {
        return Err(invalid(format!(
            "expected <Model> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let max_identifier_length = match root.attribute("maxIdentifierLength") {
        Some(value) => Some(parse_length(value)?),
        None => None,
    };

    let nodes: Vec<Node> = child_elements(&root, "RecordType").collect();
    let mut model = SchemaModel::new();

    // Pass 1: record types, so later references can be resolved in any order
    let mut ids = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let record_type = record_type_from_node(node)?;
        if model.find_record_type(&record_type.name).is_some() {
            return Err(invalid(format!(
                "record type '{}' is declared more than once",
                record_type.name
            )));
        }
        ids.push(model.add_record_type(record_type));
    }

    // Pass 2: base types
    for (node, &id) in nodes.iter().zip(&ids) {
        if let Some(base) = node.attribute("base") {
            let base_id = lookup_record_type(&model, base, id)?;
            model.set_base(id, Some(base_id));
        }
    }

    // Pass 3: properties
    for (node, &id) in nodes.iter().zip(&ids) {
        for property in child_elements(node, "Property") {
            let property = property_from_node(&property, &model, id)?;
            model.add_property(id, property);
        }
    }

    // Pass 4: keys and indexes
    for (node, &id) in nodes.iter().zip(&ids) {
        for key_node in child_elements(node, "Key") {
            let properties = resolve_properties(&model, id, &key_node)?;
            let mut key = Key::new(properties);
            key.is_primary = parse_bool(key_node.attribute("primary"));
            key.name = parse_name(&key_node, "name", "nameSource")?;
            model.add_key(id, key);
        }
        for index_node in child_elements(node, "Index") {
            let properties = resolve_properties(&model, id, &index_node)?;
            let mut index = Index::new(properties);
            index.name = parse_name(&index_node, "name", "nameSource")?;
            index.origin = parse_source(index_node.attribute("origin"))?;
            index.is_unique = parse_bool(index_node.attribute("unique"));
            index.filter = index_node.attribute("filter").map(str::to_string);
            model.add_index(id, index);
        }
    }

    // Pass 5: foreign keys, which may target alternate keys declared in pass 4
    for (node, &id) in nodes.iter().zip(&ids) {
        for fk_node in child_elements(node, "ForeignKey") {
            if let Some(foreign_key) = foreign_key_from_node(&fk_node, &model, id)? {
                model.add_foreign_key(id, foreign_key);
            }
        }
    }

    Ok(LoadedModel {
        model,
        max_identifier_length,
    })
}

fn child_elements<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn record_type_from_node(node: &Node) -> Result<RecordType> {
    let name = required_attribute(node, "name")?;
    let mut record_type = RecordType::new(name);

    if node.attribute("mapped").is_some_and(|v| v.eq_ignore_ascii_case("false")) {
        record_type = record_type.unmapped();
    } else if let Some(table) = parse_name(node, "table", "tableSource")? {
        record_type = record_type.with_table(table);
    }
    if let Some(schema) = node.attribute("schema") {
        record_type = record_type.with_schema(schema);
    }
    Ok(record_type)
}

fn property_from_node(node: &Node, model: &SchemaModel, owner: RecordTypeId) -> Result<Property> {
    let name = required_attribute(node, "name")?;
    if model
        .record_type(owner)
        .is_some_and(|r| r.properties.iter().any(|p| p.name == name))
    {
        return Err(invalid(format!(
            "property '{}' is declared more than once on '{}'",
            name,
            type_name(model, owner)
        )));
    }

    let mut property = Property::new(name);
    if let Some(column) = parse_name(node, "column", "columnSource")? {
        property = property.with_column(column);
    }
    if parse_bool(node.attribute("concurrencyToken")) {
        property = property.concurrency_token();
    }
    if let Some(member) = node.attribute("member") {
        property = property.with_member(member);
    }
    // Key membership comes from <Key primary="true">; the attribute is accepted
    // for properties whose key is inherited from elsewhere
    property.is_primary_key = parse_bool(node.attribute("primaryKey"));
    Ok(property)
}

fn foreign_key_from_node(
    node: &Node,
    model: &SchemaModel,
    owner: RecordTypeId,
) -> Result<Option<ForeignKey>> {
    let principal_name = required_attribute(node, "principal")?;
    let Some(principal) = model.find_record_type(principal_name) else {
        warn!(
            dependent = %type_name(model, owner),
            principal = principal_name,
            "skipping foreign key to unknown record type"
        );
        return Ok(None);
    };

    let properties = resolve_properties(model, owner, node)?;
    let mut foreign_key = ForeignKey::new(properties, principal).with_navigations(
        node.attribute("dependentToPrincipal"),
        node.attribute("principalToDependent"),
    );

    if let Some(key_properties) = node.attribute("principalKey") {
        let key = find_key(model, principal, &split_list(key_properties)).ok_or_else(|| {
            invalid(format!(
                "no key over ({}) on '{}' for foreign key of '{}'",
                key_properties,
                principal_name,
                type_name(model, owner)
            ))
        })?;
        foreign_key = foreign_key.with_principal_key(key);
    }

    foreign_key.name = parse_name(node, "name", "nameSource")?;
    if let Some(on_delete) = node.attribute("onDelete") {
        foreign_key.on_delete = on_delete.parse::<DeleteBehavior>().map_err(invalid)?;
    }
    foreign_key.is_unique = parse_bool(node.attribute("unique"));
    Ok(Some(foreign_key))
}

/// Key on `owner` or a base type whose properties have exactly `names`, in order
fn find_key(model: &SchemaModel, owner: RecordTypeId, names: &[&str]) -> Option<KeyRef> {
    model.base_chain(owner).into_iter().find_map(|id| {
        model.declared_keys(id).into_iter().find(|&key| {
            model.key(key).is_some_and(|k| {
                k.properties.len() == names.len()
                    && k.properties
                        .iter()
                        .zip(names)
                        .all(|(p, name)| model.property(*p).is_some_and(|p| p.name == *name))
            })
        })
    })
}

fn resolve_properties(
    model: &SchemaModel,
    owner: RecordTypeId,
    node: &Node,
) -> Result<Vec<PropertyRef>> {
    let list = required_attribute(node, "properties")?;
    let names = split_list(list);
    if names.is_empty() {
        return Err(invalid(format!(
            "<{}> on '{}' lists no properties",
            node.tag_name().name(),
            type_name(model, owner)
        )));
    }
    names
        .into_iter()
        .map(|name| {
            model.find_property(owner, name).ok_or_else(|| {
                invalid(format!(
                    "unknown property '{}' in <{}> on '{}'",
                    name,
                    node.tag_name().name(),
                    type_name(model, owner)
                ))
            })
        })
        .collect()
}

fn lookup_record_type(
    model: &SchemaModel,
    name: &str,
    referenced_from: RecordTypeId,
) -> Result<RecordTypeId> {
    model.find_record_type(name).ok_or_else(|| {
        NamingError::UnknownRecordType {
            name: name.to_string(),
            referenced_from: type_name(model, referenced_from),
        }
        .into()
    })
}

fn parse_name(node: &Node, attribute: &str, source_attribute: &str) -> Result<Option<Name>> {
    let Some(value) = node.attribute(attribute) else {
        return Ok(None);
    };
    let source = parse_source(node.attribute(source_attribute))?;
    Ok(Some(Name {
        value: value.to_string(),
        source,
    }))
}

fn parse_source(value: Option<&str>) -> Result<ConfigSource> {
    match value {
        None => Ok(ConfigSource::Convention),
        Some(v) if v.eq_ignore_ascii_case("convention") => Ok(ConfigSource::Convention),
        Some(v) if v.eq_ignore_ascii_case("explicit") => Ok(ConfigSource::Explicit),
        Some(v) => Err(invalid(format!(
            "unknown name source '{}' (expected 'convention' or 'explicit')",
            v
        ))),
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn parse_length(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(NamingError::InvalidIdentifierLength { length: 0 }.into()),
        Ok(length) => Ok(length),
        Err(_) => Err(invalid(format!(
            "maxIdentifierLength '{}' is not a positive integer",
            value
        ))),
    }
}

fn required_attribute<'a>(node: &Node<'a, '_>, attribute: &str) -> Result<&'a str> {
    node.attribute(attribute).ok_or_else(|| {
        invalid(format!(
            "<{}> is missing required attribute '{}'",
            node.tag_name().name(),
            attribute
        ))
    })
}

fn type_name(model: &SchemaModel, id: RecordTypeId) -> String {
    model
        .record_type(id)
        .map(|r| r.name.clone())
        .unwrap_or_default()
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    NamingError::InvalidModelFormat {
        message: message.into(),
    }
    .into()
}
