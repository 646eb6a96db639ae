//! Entity extractors.
//!
//! One extractor per command tag. Each composes the role predicates, the
//! constraint resolver and the filter builder into a [`Database`] or a
//! [`Table`].

use tracing::debug;

use crate::constraints::resolve_all;
use crate::entity::{Action, Column, Constraint, Database, Entity, Table};
use crate::error::{ClassifyError, Result};
use crate::filter::build_filter;
use crate::lexer::Keyword;
use crate::roles::{
    column_type, is_column_name, is_column_type, is_db_or_table_name, is_literal_value,
    literal_action,
};
use crate::tree::{Group, Leaf};

/// Derives an entity from the token tree of one statement.
pub trait Extractor: Send + Sync {
    /// Extracts the entity.
    ///
    /// # Errors
    ///
    /// Returns `StructuralMismatch` when the tree lacks something the command
    /// requires, or `MalformedConstraint` for unsupported constraints.
    fn extract(&self, root: &Group) -> Result<Entity>;
}

/// Returns the values of the first `count` database or table names.
fn target_names(leaves: &[Leaf<'_>], count: usize) -> Result<Vec<String>> {
    let names: Vec<String> = leaves
        .iter()
        .filter(|leaf| is_db_or_table_name(leaf))
        .take(count)
        .map(|leaf| leaf.value().into_owned())
        .collect();
    if names.len() < count {
        return Err(ClassifyError::mismatch(format!(
            "expected {count} target name(s), found {}",
            names.len()
        )));
    }
    Ok(names)
}

fn target_name(leaves: &[Leaf<'_>]) -> Result<String> {
    target_names(leaves, 1)?
        .pop()
        .ok_or_else(|| ClassifyError::mismatch("missing target name"))
}

fn first_column_name(leaves: &[Leaf<'_>]) -> Result<String> {
    leaves
        .iter()
        .find(|leaf| is_column_name(leaf))
        .map(|leaf| leaf.value().into_owned())
        .ok_or_else(|| ClassifyError::mismatch("missing column name"))
}

/// `CREATE DATABASE` / `DROP DATABASE`.
pub struct DatabaseCommand {
    action: Action,
}

impl Extractor for DatabaseCommand {
    fn extract(&self, root: &Group) -> Result<Entity> {
        let leaves = root.flatten();
        Ok(Entity::Database(Database {
            name: target_name(&leaves)?,
            action: self.action,
        }))
    }
}

/// Table commands whose columns come from column names: table DDL, `SELECT`
/// and `DELETE`.
pub struct TableCommand {
    table: Action,
    /// Action of each column, `None` for commands without columns.
    column: Option<Action>,
    /// Whether columns carry declared types and constraints.
    definitions: bool,
    filter: bool,
}

impl TableCommand {
    /// Collects the named columns in source order. A name seen twice (as in
    /// `ID int, ..., PRIMARY KEY (ID)`) yields one column.
    fn columns(&self, action: Action, leaves: &[Leaf<'_>]) -> Result<Vec<Column>> {
        let resolved = if self.definitions {
            resolve_all(leaves)?
        } else {
            Vec::new()
        };
        let mut columns: Vec<Column> = Vec::new();
        let mut current: Option<usize> = None;

        for leaf in leaves {
            if is_column_name(leaf) {
                let name = leaf.value();
                let index = match columns
                    .iter()
                    .position(|column| column.name.as_deref() == Some(&*name))
                {
                    Some(index) => index,
                    None => {
                        columns.push(Column::new(name, action));
                        columns.len() - 1
                    }
                };
                current = Some(index);
            } else if self.definitions && is_column_type(leaf) {
                let Some(declared) = column_type(leaf) else {
                    continue;
                };
                let Some(column) = current.map(|index| &mut columns[index]) else {
                    return Err(ClassifyError::mismatch(format!(
                        "type '{}' has no column",
                        declared.name
                    )));
                };
                if let Some(existing) = &column.data_type {
                    return Err(ClassifyError::mismatch(format!(
                        "column '{}' has two types: '{existing}' and '{}'",
                        column.name.as_deref().unwrap_or_default(),
                        declared.name
                    )));
                }
                column.data_type = Some(declared.name);
                column.size = declared.size;
            }
        }

        for column in &mut columns {
            column.constraints = resolved
                .iter()
                .filter(|r| column.name.as_deref() == Some(r.column.as_str()))
                .map(|r| r.constraint.clone())
                .collect();
        }

        Ok(columns)
    }
}

impl Extractor for TableCommand {
    fn extract(&self, root: &Group) -> Result<Entity> {
        let leaves = root.flatten();
        let mut table = Table::new(target_name(&leaves)?, self.table);
        if let Some(action) = self.column {
            table.columns = self.columns(action, &leaves)?;
        }
        if self.filter {
            table.filter = build_filter(root)?;
        }
        debug!(
            table = %table.name,
            columns = table.columns.len(),
            "Extracted table"
        );
        Ok(Entity::Table(table))
    }
}

/// Kind of constraint added by `ADD CONSTRAINT`.
#[derive(Debug, Clone, Copy)]
enum ConstraintKind {
    Unique,
    PrimaryKey,
}

/// `ALTER TABLE t ADD CONSTRAINT name UNIQUE|PRIMARY KEY (columns)`.
pub struct AddConstraintCommand {
    kind: ConstraintKind,
}

impl Extractor for AddConstraintCommand {
    fn extract(&self, root: &Group) -> Result<Entity> {
        let leaves = root.flatten();
        let mut names = target_names(&leaves, 2)?.into_iter();
        let (Some(table_name), Some(constraint_name)) = (names.next(), names.next()) else {
            return Err(ClassifyError::mismatch("missing constraint name"));
        };
        let action = Action::AddConstraint;

        let mut table = Table::new(table_name, action);
        table.columns = leaves
            .iter()
            .filter(|leaf| is_column_name(leaf))
            .map(|leaf| {
                let name = constraint_name.clone();
                let constraint = match self.kind {
                    ConstraintKind::Unique => Constraint::Unique { name, action },
                    ConstraintKind::PrimaryKey => Constraint::PrimaryKey { name, action },
                };
                Column::new(leaf.value(), action).constraint(constraint)
            })
            .collect();

        if table.columns.is_empty() {
            return Err(ClassifyError::mismatch(format!(
                "constraint '{constraint_name}' names no columns"
            )));
        }
        Ok(Entity::Table(table))
    }
}

/// `ALTER TABLE t DROP CONSTRAINT name`.
pub struct DropConstraintCommand;

impl Extractor for DropConstraintCommand {
    fn extract(&self, root: &Group) -> Result<Entity> {
        let leaves = root.flatten();
        let mut names = target_names(&leaves, 2)?.into_iter();
        let (Some(table_name), Some(constraint_name)) = (names.next(), names.next()) else {
            return Err(ClassifyError::mismatch("missing constraint name"));
        };
        let action = Action::DropConstraint;

        let mut table = Table::new(table_name, action);
        table.columns.push(Column::new("*", action).constraint(Constraint::Generic {
            name: constraint_name,
            action,
        }));
        Ok(Entity::Table(table))
    }
}

/// `INSERT ... VALUES` / `UPDATE ... SET`: column names paired with
/// literal values.
pub struct WriteCommand {
    action: Action,
    /// Keyword introducing the values.
    keyword: Keyword,
    filter: bool,
}

impl Extractor for WriteCommand {
    fn extract(&self, root: &Group) -> Result<Entity> {
        let leaves = root.flatten();
        let mut table = Table::new(target_name(&leaves)?, self.action);

        let names: Vec<&Leaf<'_>> = leaves.iter().filter(|leaf| is_column_name(leaf)).collect();
        let values: Vec<&Leaf<'_>> = leaves
            .iter()
            .filter(|leaf| is_literal_value(leaf, self.keyword))
            .collect();

        table.columns = if names.is_empty() {
            values
                .iter()
                .map(|value| Column::positional(value.value(), literal_action(value)))
                .collect()
        } else if names.len() == values.len() {
            names
                .iter()
                .zip(&values)
                .map(|(name, value)| {
                    Column::new(name.value(), literal_action(value)).value(value.value())
                })
                .collect()
        } else {
            return Err(ClassifyError::mismatch(format!(
                "{} column name(s) for {} value(s)",
                names.len(),
                values.len()
            )));
        };

        if self.filter {
            table.filter = build_filter(root)?;
        }
        debug!(
            table = %table.name,
            columns = table.columns.len(),
            "Extracted write"
        );
        Ok(Entity::Table(table))
    }
}

/// `ALTER TABLE t ALTER COLUMN c SET DEFAULT value`.
pub struct SetDefaultCommand;

impl Extractor for SetDefaultCommand {
    fn extract(&self, root: &Group) -> Result<Entity> {
        let leaves = root.flatten();
        let action = Action::AddConstraint;
        let mut table = Table::new(target_name(&leaves)?, action);

        let default = leaves
            .iter()
            .position(|leaf| leaf.token.as_keyword() == Some(Keyword::Default))
            .and_then(|index| {
                leaves[index + 1..]
                    .iter()
                    .find(|leaf| !leaf.token.is_whitespace())
            })
            .ok_or_else(|| ClassifyError::MalformedConstraint("DEFAULT".to_string()))?;

        table.columns.push(
            Column::new(first_column_name(&leaves)?, action).constraint(Constraint::Default {
                name: "default".to_string(),
                action,
                value: default.value().into_owned(),
            }),
        );
        Ok(Entity::Table(table))
    }
}

/// `ALTER TABLE t ALTER COLUMN c DROP DEFAULT`.
pub struct DropDefaultCommand;

impl Extractor for DropDefaultCommand {
    fn extract(&self, root: &Group) -> Result<Entity> {
        let leaves = root.flatten();
        let action = Action::DropConstraint;
        let mut table = Table::new(target_name(&leaves)?, action);
        table.columns.push(
            Column::new(first_column_name(&leaves)?, action).constraint(Constraint::Generic {
                name: "default".to_string(),
                action,
            }),
        );
        Ok(Entity::Table(table))
    }
}

pub static CREATE_DATABASE: DatabaseCommand = DatabaseCommand {
    action: Action::Create,
};
pub static DROP_DATABASE: DatabaseCommand = DatabaseCommand {
    action: Action::Drop,
};

pub static CREATE_TABLE: TableCommand = TableCommand {
    table: Action::Create,
    column: Some(Action::Create),
    definitions: true,
    filter: false,
};
pub static ADD_COLUMN: TableCommand = TableCommand {
    table: Action::Alter,
    column: Some(Action::AddColumn),
    definitions: true,
    filter: false,
};
pub static MODIFY_COLUMN: TableCommand = TableCommand {
    table: Action::Alter,
    column: Some(Action::ModifyColumn),
    definitions: true,
    filter: false,
};
pub static DROP_COLUMN: TableCommand = TableCommand {
    table: Action::Alter,
    column: Some(Action::DropColumn),
    definitions: false,
    filter: false,
};
pub static MODIFY_NOT_NULL: TableCommand = TableCommand {
    table: Action::AddConstraint,
    column: Some(Action::AddConstraint),
    definitions: true,
    filter: false,
};
pub static DROP_TABLE: TableCommand = TableCommand {
    table: Action::Drop,
    column: None,
    definitions: false,
    filter: false,
};
pub static SELECT: TableCommand = TableCommand {
    table: Action::Select,
    column: Some(Action::Select),
    definitions: false,
    filter: true,
};
pub static DELETE: TableCommand = TableCommand {
    table: Action::Delete,
    column: None,
    definitions: false,
    filter: true,
};

pub static ADD_UNIQUE: AddConstraintCommand = AddConstraintCommand {
    kind: ConstraintKind::Unique,
};
pub static ADD_PRIMARY_KEY: AddConstraintCommand = AddConstraintCommand {
    kind: ConstraintKind::PrimaryKey,
};
pub static DROP_CONSTRAINT: DropConstraintCommand = DropConstraintCommand;

pub static INSERT: WriteCommand = WriteCommand {
    action: Action::Insert,
    keyword: Keyword::Values,
    filter: false,
};
pub static UPDATE: WriteCommand = WriteCommand {
    action: Action::Update,
    keyword: Keyword::Set,
    filter: true,
};

pub static SET_DEFAULT: SetDefaultCommand = SetDefaultCommand;
pub static DROP_DEFAULT: DropDefaultCommand = DropDefaultCommand;
