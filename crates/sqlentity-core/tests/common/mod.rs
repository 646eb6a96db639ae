#![allow(dead_code)]

use sqlentity_core::{classify, ClassifyError, Database, Entity, Table};

pub fn entity(sql: &str) -> Entity {
    classify(sql).unwrap_or_else(|e| panic!("Failed to classify: {sql}\nError: {e}"))
}

pub fn classify_err(sql: &str) -> ClassifyError {
    classify(sql).expect_err(&format!("Expected classify error for: {sql}"))
}

pub fn table(sql: &str) -> Table {
    match entity(sql) {
        Entity::Table(t) => t,
        other => panic!("Expected a table, got {other:?}"),
    }
}

pub fn database(sql: &str) -> Database {
    match entity(sql) {
        Entity::Database(d) => d,
        other => panic!("Expected a database, got {other:?}"),
    }
}

/// Column names in order, positional columns shown as `?`.
pub fn names(table: &Table) -> Vec<String> {
    table
        .columns
        .iter()
        .map(|c| c.name.clone().unwrap_or_else(|| "?".to_string()))
        .collect()
}
