//! # sqlentity-core
//!
//! Classifies one SQL statement and extracts the entities it touches.
//!
//! The input goes through three stages:
//! - A hand-written lexer and a shallow tree builder group the text into a
//!   token tree ([`tree`])
//! - The top-level keywords form a command tag that selects an extractor
//! - The extractor finds tables, columns, types, constraints and WHERE
//!   filters by looking at where each token sits in the tree
//!
//! ```rust
//! use sqlentity_core::{Action, Entity, classify};
//!
//! let entity = classify("ALTER TABLE Persons MODIFY Age int NOT NULL;").unwrap();
//! let Entity::Table(table) = entity else { panic!("expected a table") };
//!
//! assert_eq!(table.name, "Persons");
//! assert_eq!(table.action, Action::AddConstraint);
//! assert_eq!(table.columns[0].data_type.as_deref(), Some("int"));
//! assert_eq!(table.columns[0].constraints[0].name(), "notnull");
//! ```
//!
//! Statements are not validated: `classify` recognizes a fixed set of DDL
//! and DML shapes and reports anything else as unsupported.

pub mod classify;
pub mod constraints;
pub mod entity;
pub mod error;
pub mod extract;
pub mod filter;
pub mod lexer;
pub mod roles;
pub mod tree;

pub use classify::{classify, command_tag, normalize_tag, statement_tag, CommandTag};
pub use entity::{
    Action, Column, Condition, Constraint, Database, Entity, FilterItem, FilterNode, Table,
};
pub use error::{ClassifyError, Result};
pub use tree::{Group, ParseError, TreeBuilder};
