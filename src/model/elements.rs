//! Schema model element types

use std::fmt;

/// Where a name (or an element) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Assigned by a default heuristic, eligible for rewriting
    #[default]
    Convention,
    /// Configured by a caller, never rewritten
    Explicit,
}

/// A physical name together with its provenance.
///
/// Only [`ConfigSource::Convention`] names may be rewritten during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub value: String,
    pub source: ConfigSource,
}

impl Name {
    /// A convention-derived (mutable) name
    pub fn convention(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: ConfigSource::Convention,
        }
    }

    /// An explicitly configured (pinned) name
    pub fn explicit(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: ConfigSource::Explicit,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.source == ConfigSource::Explicit
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Stable identity of the member a property or navigation was declared from.
///
/// Two properties on different record types carrying equal member ids are the
/// same underlying field (e.g. one inherited declaration), and must share a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Index of a record type inside its [`SchemaModel`](super::SchemaModel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordTypeId(pub(crate) usize);

impl RecordTypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

macro_rules! member_ref {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            /// Declaring record type
            pub record_type: RecordTypeId,
            /// Position among the declaring type's own members
            pub ordinal: usize,
        }
    };
}

member_ref!(
    /// Address of a declared property
    PropertyRef
);
member_ref!(
    /// Address of a declared key
    KeyRef
);
member_ref!(
    /// Address of a declared foreign key
    ForeignKeyRef
);
member_ref!(
    /// Address of a declared index
    IndexRef
);

/// Physical table identity: (name, schema)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId {
    pub name: String,
    pub schema: Option<String>,
}

impl TableId {
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "[{}].[{}]", schema, self.name),
            None => write!(f, "[{}]", self.name),
        }
    }
}

/// A logical mapped record type
#[derive(Debug, Clone)]
pub struct RecordType {
    /// Full type name, possibly namespace-qualified (e.g. `Zoo.Animals.Dog`)
    pub name: String,
    pub base: Option<RecordTypeId>,
    pub table: Option<Name>,
    pub schema: Option<String>,
    pub properties: Vec<Property>,
    pub keys: Vec<Key>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

impl RecordType {
    /// A record type mapped by convention to a table named after itself
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = Name::convention(short_type_name(&name));
        Self {
            name,
            base: None,
            table: Some(table),
            schema: None,
            properties: Vec::new(),
            keys: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Name) -> Self {
        self.table = Some(table);
        self
    }

    /// Not mapped to any table (e.g. a keyless projection)
    pub fn unmapped(mut self) -> Self {
        self.table = None;
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn derived_from(mut self, base: RecordTypeId) -> Self {
        self.base = Some(base);
        self
    }

    /// Type name without namespace or generic arguments
    pub fn short_name(&self) -> &str {
        short_type_name(&self.name)
    }
}

fn short_type_name(name: &str) -> &str {
    let name = name
        .split(|c: char| c == '<' || c == '`')
        .next()
        .unwrap_or(name);
    name.rsplit(|c: char| c == '.' || c == '+' || c == ':')
        .find(|segment| !segment.is_empty())
        .unwrap_or(name)
}

/// A scalar property mapped to a column
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub column: Name,
    pub is_primary_key: bool,
    pub is_concurrency_token: bool,
    /// Identifying member, used to detect shared declarations across types
    pub member: Option<MemberId>,
}

impl Property {
    /// A property whose column is named after it by convention
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column: Name::convention(name.clone()),
            name,
            is_primary_key: false,
            is_concurrency_token: false,
            member: None,
        }
    }

    pub fn with_column(mut self, column: Name) -> Self {
        self.column = column;
        self
    }

    pub fn concurrency_token(mut self) -> Self {
        self.is_concurrency_token = true;
        self
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(MemberId::new(member));
        self
    }
}

/// Primary or alternate key
#[derive(Debug, Clone)]
pub struct Key {
    pub properties: Vec<PropertyRef>,
    /// `None` means the convention default (`PK_<table>` / `AK_<table>_<columns>`)
    pub name: Option<Name>,
    pub is_primary: bool,
}

impl Key {
    pub fn new(properties: Vec<PropertyRef>) -> Self {
        Self {
            properties,
            name: None,
            is_primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn with_name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }
}

/// Referential action on principal deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteBehavior {
    Cascade,
    Restrict,
    SetNull,
    #[default]
    NoAction,
}

impl std::str::FromStr for DeleteBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cascade" => Ok(DeleteBehavior::Cascade),
            "restrict" => Ok(DeleteBehavior::Restrict),
            "setnull" | "set_null" | "set null" => Ok(DeleteBehavior::SetNull),
            "noaction" | "no_action" | "no action" => Ok(DeleteBehavior::NoAction),
            _ => Err(format!("Unknown delete behavior: {}", s)),
        }
    }
}

/// Relationship from a dependent (declaring) type to a principal key
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub properties: Vec<PropertyRef>,
    pub principal: RecordTypeId,
    /// `None` targets the principal's primary key
    pub principal_key: Option<KeyRef>,
    /// `None` means the convention default (`FK_<table>_<principal>_<columns>`)
    pub name: Option<Name>,
    pub dependent_to_principal: Option<MemberId>,
    pub principal_to_dependent: Option<MemberId>,
    pub on_delete: DeleteBehavior,
    pub is_unique: bool,
}

impl ForeignKey {
    pub fn new(properties: Vec<PropertyRef>, principal: RecordTypeId) -> Self {
        Self {
            properties,
            principal,
            principal_key: None,
            name: None,
            dependent_to_principal: None,
            principal_to_dependent: None,
            on_delete: DeleteBehavior::default(),
            is_unique: false,
        }
    }

    pub fn with_principal_key(mut self, key: KeyRef) -> Self {
        self.principal_key = Some(key);
        self
    }

    pub fn with_name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_navigations(
        mut self,
        dependent_to_principal: Option<&str>,
        principal_to_dependent: Option<&str>,
    ) -> Self {
        self.dependent_to_principal = dependent_to_principal.map(MemberId::new);
        self.principal_to_dependent = principal_to_dependent.map(MemberId::new);
        self
    }

    pub fn on_delete(mut self, behavior: DeleteBehavior) -> Self {
        self.on_delete = behavior;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }
}

/// Database index
#[derive(Debug, Clone)]
pub struct Index {
    pub properties: Vec<PropertyRef>,
    /// `None` means the convention default (`IX_<table>_<columns>`)
    pub name: Option<Name>,
    /// Whether the index itself was added by convention (e.g. to back a foreign key)
    pub origin: ConfigSource,
    pub is_unique: bool,
    pub filter: Option<String>,
}

impl Index {
    pub fn new(properties: Vec<PropertyRef>) -> Self {
        Self {
            properties,
            name: None,
            origin: ConfigSource::Convention,
            is_unique: false,
            filter: None,
        }
    }

    pub fn with_name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }

    pub fn explicitly_configured(mut self) -> Self {
        self.origin = ConfigSource::Explicit;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}
