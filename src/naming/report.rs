//! Record of what a resolution run changed, and what it could not resolve

use std::fmt;

use tracing::{debug, warn};

use crate::model::TableId;

/// Kind of named artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Table,
    Column,
    Key,
    ForeignKey,
    Index,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Table => "Table",
            ArtifactKind::Column => "Column",
            ArtifactKind::Key => "Key",
            ArtifactKind::ForeignKey => "ForeignKey",
            ArtifactKind::Index => "Index",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One name rewritten by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub kind: ArtifactKind,
    /// Table the artifact lives in (for tables: the original, pre-split table)
    pub table: TableId,
    /// Record type declaring the artifact
    pub owner: String,
    pub from: String,
    pub to: String,
}

/// Two same-named artifacts that could not be told apart because both names are pinned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedClash {
    pub kind: ArtifactKind,
    pub table: TableId,
    pub name: String,
    pub first_owner: String,
    pub second_owner: String,
}

/// Outcome of one resolution run
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    pub renames: Vec<Rename>,
    pub unresolved: Vec<UnresolvedClash>,
}

impl ResolutionReport {
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty() && self.unresolved.is_empty()
    }

    /// Renames of one artifact kind, in the order they happened
    pub fn renames_of(&self, kind: ArtifactKind) -> impl Iterator<Item = &Rename> {
        self.renames.iter().filter(move |r| r.kind == kind)
    }

    pub(crate) fn record_rename(&mut self, rename: Rename) {
        debug!(
            kind = %rename.kind,
            table = %rename.table,
            owner = %rename.owner,
            "renamed {} -> {}",
            rename.from,
            rename.to
        );
        self.renames.push(rename);
    }

    pub(crate) fn record_unresolved(&mut self, clash: UnresolvedClash) {
        warn!(
            kind = %clash.kind,
            table = %clash.table,
            "name '{}' is pinned on both {} and {}; leaving the clash in place",
            clash.name,
            clash.first_owner,
            clash.second_owner
        );
        self.unresolved.push(clash);
    }
}
