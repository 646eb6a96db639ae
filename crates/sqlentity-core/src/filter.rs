//! WHERE clause filter trees.
//!
//! Conditions are grouped by the keyword that introduces them, with no
//! operator precedence: every `WHERE`, `AND` or `(` starts an AND node, every
//! `OR` starts an OR node. A parenthesized sub-expression becomes a nested
//! node.

use tracing::trace;

use crate::entity::{Condition, FilterItem, FilterNode};
use crate::error::{ClassifyError, Result};
use crate::lexer::{Keyword, Token};
use crate::tree::{Group, Node, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    And,
    Or,
}

impl Anchor {
    fn of(node: &Node) -> Option<Self> {
        match node.as_keyword() {
            Some(Keyword::Where | Keyword::And) => Some(Self::And),
            Some(Keyword::Or) => Some(Self::Or),
            _ if node.is_punctuation("(") => Some(Self::And),
            _ => None,
        }
    }

    fn wrap(self, children: Vec<FilterItem>) -> FilterNode {
        match self {
            Self::And => FilterNode::And(children),
            Self::Or => FilterNode::Or(children),
        }
    }
}

/// Builds the filter of the statement's WHERE clause.
///
/// Returns `None` when the statement has no WHERE clause.
///
/// # Errors
///
/// Returns `StructuralMismatch` when a condition keyword is not followed by
/// a comparison or a parenthesized sub-expression.
pub fn build_filter(root: &Group) -> Result<Option<Vec<FilterNode>>> {
    root.find_group(Shape::Where)
        .map(collect)
        .transpose()
}

fn collect(group: &Group) -> Result<Vec<FilterNode>> {
    let mut nodes = Vec::new();

    for (index, node) in group.children().iter().enumerate() {
        let Some(anchor) = Anchor::of(node) else {
            continue;
        };
        let Some((_, next)) = group.next_sibling(index) else {
            return Err(ClassifyError::mismatch(format!(
                "'{}' is not followed by a condition",
                node.text()
            )));
        };

        let wrapped = match next {
            Node::Group(inner) if inner.shape() == Shape::Comparison => {
                anchor.wrap(vec![FilterItem::Condition(condition(inner)?)])
            }
            Node::Group(inner) if inner.shape() == Shape::Parenthesis => {
                let children = collect(inner)?;
                anchor.wrap(children.into_iter().map(FilterItem::Node).collect())
            }
            other => {
                return Err(ClassifyError::mismatch(format!(
                    "expected a condition after '{}', found '{}'",
                    node.text(),
                    other.text()
                )));
            }
        };
        trace!(?anchor, node = ?wrapped, "Filter node");
        nodes.push(wrapped);
    }

    Ok(nodes)
}

fn condition(comparison: &Group) -> Result<Condition> {
    let parts: Vec<&Node> = comparison
        .children()
        .iter()
        .filter(|node| !node.is_whitespace())
        .collect();
    let [column, operator, value] = parts.as_slice() else {
        return Err(ClassifyError::mismatch(format!(
            "malformed comparison '{}'",
            comparison.text()
        )));
    };

    Ok(Condition {
        column: column.value().into_owned(),
        operator: operator
            .as_leaf()
            .map_or_else(|| operator.text(), Token::normalized)
            .into_owned(),
        value: value.value().into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn filter(sql: &str) -> Result<Option<Vec<FilterNode>>> {
        let root = TreeBuilder::new(sql).build().unwrap();
        build_filter(&root)
    }

    fn cond(column: &str, operator: &str, value: &str) -> FilterItem {
        FilterItem::Condition(Condition {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_no_where_clause() {
        assert_eq!(filter("SELECT a FROM t").unwrap(), None);
    }

    #[test]
    fn test_flat_conditions() {
        let nodes = filter("SELECT a FROM t WHERE a = 1 AND b <> 'x' OR c LIKE 'y%'")
            .unwrap()
            .unwrap();
        assert_eq!(
            nodes,
            vec![
                FilterNode::And(vec![cond("a", "=", "1")]),
                FilterNode::And(vec![cond("b", "<>", "x")]),
                FilterNode::Or(vec![cond("c", "LIKE", "y%")]),
            ]
        );
    }

    #[test]
    fn test_parenthesized_group() {
        let nodes = filter("SELECT * FROM Persons WHERE Age > 30 AND (City = 'Oslo' OR City = 'Bergen')")
            .unwrap()
            .unwrap();
        assert_eq!(
            nodes,
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
    fn test_condition_keyword_without_comparison() {
        let err = filter("SELECT a FROM t WHERE a IS NULL").unwrap_err();
        assert!(matches!(err, ClassifyError::StructuralMismatch(_)));
    }
}
