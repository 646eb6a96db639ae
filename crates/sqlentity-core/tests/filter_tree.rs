//! Tests for WHERE clause filter trees.

mod common;
use common::*;

use sqlentity_core::{Condition, FilterItem, FilterNode};

fn filter(sql: &str) -> Vec<FilterNode> {
    table(sql)
        .filter
        .unwrap_or_else(|| panic!("Expected a filter for: {sql}"))
}

fn cond(column: &str, operator: &str, value: &str) -> FilterItem {
    FilterItem::Condition(Condition {
        column: column.to_string(),
        operator: operator.to_string(),
        value: value.to_string(),
    })
}

/// Deepest parenthesis nesting of the text.
fn paren_depth(sql: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0;
    for c in sql.chars() {
        match c {
            '(' => {
                depth += 1;
                max = max.max(depth);
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    max
}

#[test]
fn single_condition() {
    assert_eq!(
        filter("SELECT * FROM Persons WHERE Age >= 18"),
        vec![FilterNode::And(vec![cond("Age", ">=", "18")])]
    );
}

#[test]
fn conditions_in_anchor_order() {
    assert_eq!(
        filter("SELECT * FROM Persons WHERE City = 'Oslo' OR City = 'Bergen' AND Age < 30"),
        vec![
            FilterNode::And(vec![cond("City", "=", "Oslo")]),
            FilterNode::Or(vec![cond("City", "=", "Bergen")]),
            FilterNode::And(vec![cond("Age", "<", "30")]),
        ]
    );
}

#[test]
fn nested_group() {
    assert_eq!(
        filter("SELECT * FROM Persons WHERE Age > 30 AND (City = 'Oslo' OR City = 'Bergen')"),
        vec![
            FilterNode::And(vec![cond("Age", ">", "30")]),
            FilterNode::And(vec![
                FilterItem::Node(FilterNode::And(vec![cond("City", "=", "Oslo")])),
                FilterItem::Node(FilterNode::Or(vec![cond("City", "=", "Bergen")])),
            ]),
        ]
    );
}

#[test]
fn or_group() {
    let nodes = filter("DELETE FROM Persons WHERE Age < 18 OR (Active = 0 AND Name LIKE 'test%')");
    let FilterNode::Or(children) = &nodes[1] else {
        panic!("Expected OR, got {:?}", nodes[1]);
    };
    assert_eq!(children.len(), 2);
    assert_eq!(
        children[1],
        FilterItem::Node(FilterNode::And(vec![cond("Name", "LIKE", "test%")]))
    );
}

#[test]
fn depth_follows_parenthesis_nesting() {
    for sql in [
        "SELECT * FROM t WHERE a = 1",
        "SELECT * FROM t WHERE a = 1 AND (b = 2 OR c = 3)",
        "SELECT * FROM t WHERE a = 1 AND (b = 2 OR (c = 3 AND (d = 4 OR e = 5)))",
        "UPDATE t SET x = 1 WHERE ((a = 1))",
    ] {
        let depth = filter(sql).iter().map(FilterNode::depth).max().unwrap();
        let parens = paren_depth(sql.split_once("WHERE").unwrap().1);
        assert_eq!(depth, parens + 1, "{sql}");
    }
}

#[test]
fn where_stops_at_order_by() {
    let root = sqlentity_core::TreeBuilder::new("SELECT a FROM t WHERE a = 1 ORDER BY a")
        .build()
        .unwrap();
    let nodes = sqlentity_core::filter::build_filter(&root).unwrap().unwrap();
    assert_eq!(nodes, vec![FilterNode::And(vec![cond("a", "=", "1")])]);
}

#[test]
fn quoted_operands() {
    assert_eq!(
        filter(r#"SELECT * FROM t WHERE "Last Name" <> 'O''Hara'"#),
        vec![FilterNode::And(vec![cond("Last Name", "<>", "O'Hara")])]
    );
}
