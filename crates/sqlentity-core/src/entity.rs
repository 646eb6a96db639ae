//! Extracted entities.
//!
//! Every value here is built in one pass by [`crate::classify`] and never
//! mutated afterwards.

use std::fmt;

use serde::Serialize;

/// The operation a statement performs on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Alter,
    Drop,
    AddConstraint,
    DropConstraint,
    AddColumn,
    ModifyColumn,
    DropColumn,
    Select,
    Insert,
    Update,
    Delete,
}

impl Action {
    /// Returns the uppercase name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::AddConstraint => "ADDCONSTRAINT",
            Self::DropConstraint => "DROPCONSTRAINT",
            Self::AddColumn => "ADDCOLUMN",
            Self::ModifyColumn => "MODIFYCOLUMN",
            Self::DropColumn => "DROPCOLUMN",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database-level command result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Database {
    /// Database name.
    pub name: String,
    /// `CREATE` or `DROP`.
    pub action: Action,
}

/// A table-level command result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// The table action.
    pub action: Action,
    /// Columns in source order.
    pub columns: Vec<Column>,
    /// WHERE filter, if the statement has one.
    pub filter: Option<Vec<FilterNode>>,
}

impl Table {
    /// Creates a table with no columns and no filter.
    #[must_use]
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
            columns: Vec::new(),
            filter: None,
        }
    }

    /// Returns the column with the given name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.name.as_deref() == Some(name))
    }

    /// Returns the column names in order. Positional columns are skipped.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|column| column.name.as_deref())
            .collect()
    }
}

/// One column touched by a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name; `None` for positional DML values.
    pub name: Option<String>,
    /// The column action.
    pub action: Action,
    /// Declared type name.
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    /// Declared type size, e.g. `255` for `varchar(255)`.
    pub size: Option<String>,
    /// Constraints in source order.
    pub constraints: Vec<Constraint>,
    /// DML literal value.
    pub value: Option<String>,
}

impl Column {
    /// Creates a named column.
    #[must_use]
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: Some(name.into()),
            action,
            data_type: None,
            size: None,
            constraints: Vec::new(),
            value: None,
        }
    }

    /// Creates a positional column carrying only a value.
    #[must_use]
    pub fn positional(value: impl Into<String>, action: Action) -> Self {
        Self {
            name: None,
            action,
            data_type: None,
            size: None,
            constraints: Vec::new(),
            value: Some(value.into()),
        }
    }

    /// Appends a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Sets the DML value.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A constraint attached to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Constraint {
    /// A constraint named without its kind, as in `DROP CONSTRAINT`.
    Generic { name: String, action: Action },
    Unique { name: String, action: Action },
    PrimaryKey { name: String, action: Action },
    NotNull { name: String, action: Action },
    Default {
        name: String,
        action: Action,
        value: String,
    },
}

impl Constraint {
    /// Returns the constraint name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Generic { name, .. }
            | Self::Unique { name, .. }
            | Self::PrimaryKey { name, .. }
            | Self::NotNull { name, .. }
            | Self::Default { name, .. } => name,
        }
    }

    /// Returns the constraint action.
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Generic { action, .. }
            | Self::Unique { action, .. }
            | Self::PrimaryKey { action, .. }
            | Self::NotNull { action, .. }
            | Self::Default { action, .. } => *action,
        }
    }
}

/// A node of a WHERE filter tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterNode {
    And(Vec<FilterItem>),
    Or(Vec<FilterItem>),
}

impl FilterNode {
    /// Returns the children of the node.
    #[must_use]
    pub fn children(&self) -> &[FilterItem] {
        match self {
            Self::And(children) | Self::Or(children) => children,
        }
    }

    /// Returns the number of nested node levels, this one included.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| match child {
                FilterItem::Node(node) => node.depth(),
                FilterItem::Condition(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }

    /// Returns all conditions below this node, in source order.
    #[must_use]
    pub fn conditions(&self) -> Vec<&Condition> {
        self.children()
            .iter()
            .flat_map(|child| match child {
                FilterItem::Node(node) => node.conditions(),
                FilterItem::Condition(condition) => vec![condition],
            })
            .collect()
    }
}

/// A child of a [`FilterNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterItem {
    /// A parenthesized sub-expression.
    Node(FilterNode),
    /// A single comparison.
    Condition(Condition),
}

/// One comparison of a WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Left operand.
    pub column: String,
    /// Operator text, e.g. `=` or `LIKE`.
    pub operator: String,
    /// Right operand, quotes stripped.
    pub value: String,
}

/// The result of classifying one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum Entity {
    Database(Database),
    Table(Table),
}

impl Entity {
    /// Returns the table if this is a table result.
    #[must_use]
    pub const fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Database(_) => None,
        }
    }

    /// Returns the database if this is a database result.
    #[must_use]
    pub const fn as_database(&self) -> Option<&Database> {
        match self {
            Self::Database(database) => Some(database),
            Self::Table(_) => None,
        }
    }

    /// Returns the entity name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Database(database) => &database.name,
            Self::Table(table) => &table.name,
        }
    }

    /// Returns the entity action.
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Database(database) => database.action,
            Self::Table(table) => table.action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(column: &str, value: &str) -> FilterItem {
        FilterItem::Condition(Condition {
            column: column.to_string(),
            operator: "=".to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_filter_depth() {
        let flat = FilterNode::And(vec![condition("a", "1")]);
        assert_eq!(flat.depth(), 1);

        let nested = FilterNode::And(vec![
            condition("a", "1"),
            FilterItem::Node(FilterNode::Or(vec![FilterItem::Node(FilterNode::And(
                vec![condition("b", "2")],
            ))])),
        ]);
        assert_eq!(nested.depth(), 3);
        let columns: Vec<_> = nested.conditions().iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "b"]);
    }

    #[test]
    fn test_constraint_accessors() {
        let constraint = Constraint::Default {
            name: "default".to_string(),
            action: Action::AddConstraint,
            value: "Oslo".to_string(),
        };
        assert_eq!(constraint.name(), "default");
        assert_eq!(constraint.action(), Action::AddConstraint);
    }

    #[test]
    fn test_serialized_shape() {
        let mut table = Table::new("Persons", Action::Create);
        let mut age = Column::new("Age", Action::Create).constraint(Constraint::NotNull {
            name: "notnull".to_string(),
            action: Action::AddConstraint,
        });
        age.data_type = Some("int".to_string());
        table.columns.push(age);
        let json = serde_json::to_value(Entity::Table(table)).unwrap();

        assert_eq!(json["entity"], "table");
        assert_eq!(json["action"], "CREATE");
        assert_eq!(json["columns"][0]["type"], "int");
        assert_eq!(json["columns"][0]["constraints"][0]["kind"], "NOT_NULL");
        assert_eq!(
            json["columns"][0]["constraints"][0]["action"],
            "ADDCONSTRAINT"
        );
        assert!(json["filter"].is_null());
    }

    #[test]
    fn test_filter_serializes_untagged_conditions() {
        let filter = FilterNode::Or(vec![condition("City", "Oslo")]);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["OR"][0]["column"], "City");
        assert_eq!(json["OR"][0]["value"], "Oslo");
    }
}
