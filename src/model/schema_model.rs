//! Schema model representation
//!
//! Record types live in an arena addressed by [`RecordTypeId`]; their members are
//! addressed by (declaring type, ordinal) refs. Every lookup is fallible so that a
//! dangling reference excludes the element instead of aborting a resolution run.

use super::{
    ForeignKey, ForeignKeyRef, Index, IndexRef, Key, KeyRef, Name, Property, PropertyRef,
    RecordType, RecordTypeId, TableId,
};

/// The complete schema model
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    record_types: Vec<RecordType>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record_type(&mut self, record_type: RecordType) -> RecordTypeId {
        self.record_types.push(record_type);
        RecordTypeId(self.record_types.len() - 1)
    }

    /// Adds a property declared directly on `owner`.
    ///
    /// Panics if `owner` does not belong to this model.
    pub fn add_property(&mut self, owner: RecordTypeId, property: Property) -> PropertyRef {
        let properties = &mut self.record_types[owner.0].properties;
        properties.push(property);
        PropertyRef {
            record_type: owner,
            ordinal: properties.len() - 1,
        }
    }

    /// Adds a key declared on `owner`. Properties of a primary key are flagged as such.
    pub fn add_key(&mut self, owner: RecordTypeId, key: Key) -> KeyRef {
        if key.is_primary {
            for property in &key.properties {
                if let Some(p) = self.property_mut(*property) {
                    p.is_primary_key = true;
                }
            }
        }
        let keys = &mut self.record_types[owner.0].keys;
        keys.push(key);
        KeyRef {
            record_type: owner,
            ordinal: keys.len() - 1,
        }
    }

    pub fn add_foreign_key(
        &mut self,
        owner: RecordTypeId,
        foreign_key: ForeignKey,
    ) -> ForeignKeyRef {
        let foreign_keys = &mut self.record_types[owner.0].foreign_keys;
        foreign_keys.push(foreign_key);
        ForeignKeyRef {
            record_type: owner,
            ordinal: foreign_keys.len() - 1,
        }
    }

    pub fn add_index(&mut self, owner: RecordTypeId, index: Index) -> IndexRef {
        let indexes = &mut self.record_types[owner.0].indexes;
        indexes.push(index);
        IndexRef {
            record_type: owner,
            ordinal: indexes.len() - 1,
        }
    }

    /// Sets or clears the base type of `id`.
    ///
    /// Panics if `id` does not belong to this model.
    pub fn set_base(&mut self, id: RecordTypeId, base: Option<RecordTypeId>) {
        self.record_types[id.0].base = base;
    }

    pub fn len(&self) -> usize {
        self.record_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_types.is_empty()
    }

    /// All record types in declaration order
    pub fn record_types(&self) -> impl Iterator<Item = (RecordTypeId, &RecordType)> {
        self.record_types
            .iter()
            .enumerate()
            .map(|(i, r)| (RecordTypeId(i), r))
    }

    pub fn record_type(&self, id: RecordTypeId) -> Option<&RecordType> {
        self.record_types.get(id.0)
    }

    pub fn find_record_type(&self, name: &str) -> Option<RecordTypeId> {
        self.record_types
            .iter()
            .position(|r| r.name == name)
            .map(RecordTypeId)
    }

    /// The (table, schema) a record type is currently mapped to
    pub fn table_of(&self, id: RecordTypeId) -> Option<TableId> {
        let record_type = self.record_type(id)?;
        let table = record_type.table.as_ref()?;
        Some(TableId::new(table.value.clone(), record_type.schema.clone()))
    }

    /// `id` followed by its base types, nearest first.
    ///
    /// Stops early on a cyclic or dangling base link.
    pub fn base_chain(&self, id: RecordTypeId) -> Vec<RecordTypeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(next) = current {
            if self.record_type(next).is_none() || chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = self.record_types[next.0].base;
        }
        chain
    }

    /// Primary key declared on the type or inherited from a base type
    pub fn primary_key(&self, id: RecordTypeId) -> Option<KeyRef> {
        self.base_chain(id).into_iter().find_map(|owner| {
            self.record_types[owner.0]
                .keys
                .iter()
                .position(|k| k.is_primary)
                .map(|ordinal| KeyRef {
                    record_type: owner,
                    ordinal,
                })
        })
    }

    /// Finds a property by name on the type or any of its base types
    pub fn find_property(&self, id: RecordTypeId, name: &str) -> Option<PropertyRef> {
        self.base_chain(id).into_iter().find_map(|owner| {
            self.record_types[owner.0]
                .properties
                .iter()
                .position(|p| p.name == name)
                .map(|ordinal| PropertyRef {
                    record_type: owner,
                    ordinal,
                })
        })
    }

    pub fn property(&self, r: PropertyRef) -> Option<&Property> {
        self.record_type(r.record_type)?.properties.get(r.ordinal)
    }

    fn property_mut(&mut self, r: PropertyRef) -> Option<&mut Property> {
        self.record_types
            .get_mut(r.record_type.0)?
            .properties
            .get_mut(r.ordinal)
    }

    pub fn key(&self, r: KeyRef) -> Option<&Key> {
        self.record_type(r.record_type)?.keys.get(r.ordinal)
    }

    pub fn foreign_key(&self, r: ForeignKeyRef) -> Option<&ForeignKey> {
        self.record_type(r.record_type)?.foreign_keys.get(r.ordinal)
    }

    pub fn index(&self, r: IndexRef) -> Option<&Index> {
        self.record_type(r.record_type)?.indexes.get(r.ordinal)
    }

    pub fn declared_properties(&self, id: RecordTypeId) -> Vec<PropertyRef> {
        let count = self.record_type(id).map_or(0, |r| r.properties.len());
        (0..count)
            .map(|ordinal| PropertyRef {
                record_type: id,
                ordinal,
            })
            .collect()
    }

    pub fn declared_keys(&self, id: RecordTypeId) -> Vec<KeyRef> {
        let count = self.record_type(id).map_or(0, |r| r.keys.len());
        (0..count)
            .map(|ordinal| KeyRef {
                record_type: id,
                ordinal,
            })
            .collect()
    }

    pub fn declared_foreign_keys(&self, id: RecordTypeId) -> Vec<ForeignKeyRef> {
        let count = self.record_type(id).map_or(0, |r| r.foreign_keys.len());
        (0..count)
            .map(|ordinal| ForeignKeyRef {
                record_type: id,
                ordinal,
            })
            .collect()
    }

    pub fn declared_indexes(&self, id: RecordTypeId) -> Vec<IndexRef> {
        let count = self.record_type(id).map_or(0, |r| r.indexes.len());
        (0..count)
            .map(|ordinal| IndexRef {
                record_type: id,
                ordinal,
            })
            .collect()
    }

    /// Current column names of `properties`, or `None` if any ref dangles
    pub fn column_names(&self, properties: &[PropertyRef]) -> Option<Vec<String>> {
        properties
            .iter()
            .map(|r| self.property(*r).map(|p| p.column.value.clone()))
            .collect()
    }

    /// The key a foreign key targets: the explicit principal key, or the principal's primary key
    pub fn principal_key(&self, r: ForeignKeyRef) -> Option<KeyRef> {
        let foreign_key = self.foreign_key(r)?;
        match foreign_key.principal_key {
            Some(key) => self.key(key).map(|_| key),
            None => self.primary_key(foreign_key.principal),
        }
    }

    // ------------------------------------------------------------------------
    // Name setters. Each refuses to overwrite an explicit name and reports
    // whether the new name was applied.
    // ------------------------------------------------------------------------

    pub fn set_table(&mut self, id: RecordTypeId, table: impl Into<String>) -> bool {
        let Some(record_type) = self.record_types.get_mut(id.0) else {
            return false;
        };
        set_if_mutable(&mut record_type.table, table.into())
    }

    pub fn set_column_name(&mut self, r: PropertyRef, column: impl Into<String>) -> bool {
        let Some(property) = self.property_mut(r) else {
            return false;
        };
        if property.column.is_pinned() {
            return false;
        }
        property.column = Name::convention(column);
        true
    }

    pub fn set_key_name(&mut self, r: KeyRef, name: impl Into<String>) -> bool {
        let Some(key) = self
            .record_types
            .get_mut(r.record_type.0)
            .and_then(|t| t.keys.get_mut(r.ordinal))
        else {
            return false;
        };
        set_if_mutable(&mut key.name, name.into())
    }

    pub fn set_foreign_key_name(&mut self, r: ForeignKeyRef, name: impl Into<String>) -> bool {
        let Some(foreign_key) = self
            .record_types
            .get_mut(r.record_type.0)
            .and_then(|t| t.foreign_keys.get_mut(r.ordinal))
        else {
            return false;
        };
        set_if_mutable(&mut foreign_key.name, name.into())
    }

    pub fn set_index_name(&mut self, r: IndexRef, name: impl Into<String>) -> bool {
        let Some(index) = self
            .record_types
            .get_mut(r.record_type.0)
            .and_then(|t| t.indexes.get_mut(r.ordinal))
        else {
            return false;
        };
        set_if_mutable(&mut index.name, name.into())
    }
}

fn set_if_mutable(slot: &mut Option<Name>, value: String) -> bool {
    if slot.as_ref().is_some_and(Name::is_pinned) {
        return false;
    }
    *slot = Some(Name::convention(value));
    true
}
