//! Statement classification.
//!
//! The command tag of a statement is the concatenation of its top-level
//! keywords (`ALTER TABLE Persons DROP COLUMN x` is `ALTERTABLEDROPCOLUMN`).
//! After normalization the tag selects the extractor.

use std::fmt;

use tracing::debug;

use crate::entity::Entity;
use crate::error::{ClassifyError, Result};
use crate::extract::{self, Extractor};
use crate::tree::{Group, TreeBuilder};

/// A recognized command tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTag {
    CreateDatabase,
    DropDatabase,
    CreateTable,
    AlterTableAdd,
    AlterTableModifyColumn,
    AlterTableDropColumn,
    AlterTableModifyNotNull,
    AlterTableAddConstraintUnique,
    AlterTableAddConstraintPrimaryKey,
    AlterTableDropConstraint,
    AlterTableAlterColumnSetDefault,
    AlterTableAlterColumnDropDefault,
    DropTable,
    SelectFrom,
    InsertIntoValues,
    UpdateSet,
    DeleteFrom,
}

impl CommandTag {
    /// All recognized tags.
    pub const ALL: [Self; 17] = [
        Self::CreateDatabase,
        Self::DropDatabase,
        Self::CreateTable,
        Self::AlterTableAdd,
        Self::AlterTableModifyColumn,
        Self::AlterTableDropColumn,
        Self::AlterTableModifyNotNull,
        Self::AlterTableAddConstraintUnique,
        Self::AlterTableAddConstraintPrimaryKey,
        Self::AlterTableDropConstraint,
        Self::AlterTableAlterColumnSetDefault,
        Self::AlterTableAlterColumnDropDefault,
        Self::DropTable,
        Self::SelectFrom,
        Self::InsertIntoValues,
        Self::UpdateSet,
        Self::DeleteFrom,
    ];

    /// Returns the tag text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateDatabase => "CREATEDATABASE",
            Self::DropDatabase => "DROPDATABASE",
            Self::CreateTable => "CREATETABLE",
            Self::AlterTableAdd => "ALTERTABLEADD",
            Self::AlterTableModifyColumn => "ALTERTABLEMODIFYCOLUMN",
            Self::AlterTableDropColumn => "ALTERTABLEDROPCOLUMN",
            Self::AlterTableModifyNotNull => "ALTERTABLEMODIFYNOTNULL",
            Self::AlterTableAddConstraintUnique => "ALTERTABLEADDCONSTRAINTUNIQUE",
            Self::AlterTableAddConstraintPrimaryKey => "ALTERTABLEADDCONSTRAINTPRIMARYKEY",
            Self::AlterTableDropConstraint => "ALTERTABLEDROPCONSTRAINT",
            Self::AlterTableAlterColumnSetDefault => "ALTERTABLEALTERCOLUMNSETDEFAULT",
            Self::AlterTableAlterColumnDropDefault => "ALTERTABLEALTERCOLUMNDROPDEFAULT",
            Self::DropTable => "DROPTABLE",
            Self::SelectFrom => "SELECTFROM",
            Self::InsertIntoValues => "INSERTINTOVALUES",
            Self::UpdateSet => "UPDATESET",
            Self::DeleteFrom => "DELETEFROM",
        }
    }

    /// Looks up a normalized tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }

    /// Returns the extractor for this tag.
    #[must_use]
    pub fn extractor(self) -> &'static dyn Extractor {
        match self {
            Self::CreateDatabase => &extract::CREATE_DATABASE,
            Self::DropDatabase => &extract::DROP_DATABASE,
            Self::CreateTable => &extract::CREATE_TABLE,
            Self::AlterTableAdd => &extract::ADD_COLUMN,
            Self::AlterTableModifyColumn => &extract::MODIFY_COLUMN,
            Self::AlterTableDropColumn => &extract::DROP_COLUMN,
            Self::AlterTableModifyNotNull => &extract::MODIFY_NOT_NULL,
            Self::AlterTableAddConstraintUnique => &extract::ADD_UNIQUE,
            Self::AlterTableAddConstraintPrimaryKey => &extract::ADD_PRIMARY_KEY,
            Self::AlterTableDropConstraint => &extract::DROP_CONSTRAINT,
            Self::AlterTableAlterColumnSetDefault => &extract::SET_DEFAULT,
            Self::AlterTableAlterColumnDropDefault => &extract::DROP_DEFAULT,
            Self::DropTable => &extract::DROP_TABLE,
            Self::SelectFrom => &extract::SELECT,
            Self::InsertIntoValues => &extract::INSERT,
            Self::UpdateSet => &extract::UPDATE,
            Self::DeleteFrom => &extract::DELETE,
        }
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapses tag variants that share an extractor.
///
/// `CREATETABLE...` becomes `CREATETABLE`, and `ALTERTABLEADD...` becomes
/// `ALTERTABLEADD` unless it adds a named unique or primary key constraint.
/// Normalizing twice gives the same result as normalizing once.
#[must_use]
pub fn normalize_tag(tag: &str) -> &str {
    const CREATE_TABLE: &str = "CREATETABLE";
    const ALTER_TABLE_ADD: &str = "ALTERTABLEADD";

    if tag.starts_with(CREATE_TABLE) {
        return CREATE_TABLE;
    }
    if tag.starts_with(ALTER_TABLE_ADD)
        && tag != CommandTag::AlterTableAddConstraintUnique.as_str()
        && tag != CommandTag::AlterTableAddConstraintPrimaryKey.as_str()
    {
        return ALTER_TABLE_ADD;
    }
    tag
}

/// Returns the raw command tag of a statement tree: its top-level keywords,
/// uppercase, whitespace removed.
#[must_use]
pub fn command_tag(root: &Group) -> String {
    root.keywords()
        .map(|token| {
            token
                .normalized()
                .replace(char::is_whitespace, "")
                .to_ascii_uppercase()
        })
        .collect()
}

/// Returns the normalized command tag of a statement, recognized or not.
///
/// # Errors
///
/// Returns a parse error if the text cannot be turned into a token tree.
pub fn statement_tag(sql: &str) -> Result<String> {
    let root = TreeBuilder::new(sql).build()?;
    Ok(normalize_tag(&command_tag(&root)).to_string())
}

/// Classifies one SQL statement.
///
/// Only the first statement of the text is considered.
///
/// # Errors
///
/// - `Parse` if the text cannot be turned into a token tree
/// - `UnsupportedStatement` if the command tag is not recognized
/// - `MalformedConstraint` for unsupported constraint kinds
/// - `StructuralMismatch` if the statement lacks a part its command needs
pub fn classify(sql: &str) -> Result<Entity> {
    let root = TreeBuilder::new(sql).build()?;
    let raw = command_tag(&root);
    let tag = normalize_tag(&raw);
    debug!(raw = %raw, tag = %tag, "Derived command tag");

    let command = CommandTag::from_tag(tag)
        .ok_or_else(|| ClassifyError::UnsupportedStatement(tag.to_string()))?;
    debug!(command = %command, "Dispatching");
    command.extractor().extract(&root)
}
