//! Token role predicates.
//!
//! A bare name can be a table, a column, a type or a WHERE operand depending
//! only on where it sits. These predicates decide the role of one leaf from
//! its lexical kind, its ancestor shapes and its neighboring keywords. They
//! are pure functions over a read-only tree.

use crate::entity::Action;
use crate::lexer::{Keyword, Token, TokenKind};
use crate::tree::{Frame, Leaf, Node, Shape};

/// A declared column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    /// Type name as written, e.g. `varchar`.
    pub name: String,
    /// Parameter text, e.g. `255` for `varchar(255)`.
    pub size: Option<String>,
}

fn is_name(leaf: &Leaf<'_>) -> bool {
    *leaf.kind() == TokenKind::Name
}

/// Returns true if the node is a type: a builtin type name or a
/// parameterized type such as `varchar(255)`.
fn is_type_node(node: &Node) -> bool {
    node.is_group(Shape::FunctionCall)
        || node
            .as_leaf()
            .is_some_and(|token| token.kind == TokenKind::Builtin)
}

/// Returns true if the leaf names a database or a table.
///
/// That is a name reference directly under the statement root, or the name
/// of a call directly under the root (`INSERT INTO Persons(a) ...`).
#[must_use]
pub fn is_db_or_table_name(leaf: &Leaf<'_>) -> bool {
    is_name(leaf)
        && (leaf.ancestors_are(&[Shape::NameRef, Shape::Statement])
            || leaf.ancestors_are(&[Shape::NameRef, Shape::FunctionCall, Shape::Statement]))
}

/// Returns true if the leaf names a column.
#[must_use]
pub fn is_column_name(leaf: &Leaf<'_>) -> bool {
    if !is_name(leaf) || is_in_where(leaf) || leaf.parent().map(Frame::shape) != Some(Shape::NameRef) {
        return false;
    }
    let Some(frame) = leaf.ancestor(1) else {
        return false;
    };
    // `CONSTRAINT pk_t ...` names a constraint and `Persons.City` a table.
    if frame
        .prev_sibling()
        .is_some_and(|node| node.as_keyword() == Some(Keyword::Constraint))
        || frame.next_sibling().is_some_and(|node| node.is_punctuation("."))
    {
        return false;
    }
    match frame.shape() {
        Shape::Parenthesis | Shape::NameList | Shape::Comparison => true,
        Shape::Statement => {
            frame.next_sibling().is_some_and(is_type_node)
                || frame
                    .prev_sibling()
                    .is_some_and(|node| node.as_keyword() == Some(Keyword::Column))
        }
        _ => false,
    }
}

/// Returns true if the leaf is a column type.
#[must_use]
pub fn is_column_type(leaf: &Leaf<'_>) -> bool {
    match leaf.kind() {
        TokenKind::Builtin => true,
        TokenKind::Name => leaf.ancestors_are(&[Shape::NameRef, Shape::FunctionCall]),
        _ => false,
    }
}

/// Returns the type a type leaf declares.
///
/// A builtin leaf has no size. The name of a parameterized type yields the
/// text of the whole call split at its parenthesis.
#[must_use]
pub fn column_type(leaf: &Leaf<'_>) -> Option<ColumnType> {
    match leaf.kind() {
        TokenKind::Builtin => Some(ColumnType {
            name: leaf.token.text.clone(),
            size: None,
        }),
        TokenKind::Name if leaf.ancestors_are(&[Shape::NameRef, Shape::FunctionCall]) => {
            let call = leaf.ancestor(1)?.group.text();
            let (name, rest) = call.split_once('(')?;
            let size = rest.rsplit_once(')').map_or(rest, |(inner, _)| inner).trim();
            Some(ColumnType {
                name: name.trim().to_string(),
                size: (!size.is_empty()).then(|| size.to_string()),
            })
        }
        _ => None,
    }
}

/// Returns true if the token is a value: a string, a number, `NULL`, `TRUE`
/// or `FALSE`.
fn is_value_token(token: &Token) -> bool {
    token.is_literal()
        || matches!(
            token.as_keyword(),
            Some(Keyword::Null | Keyword::True | Keyword::False)
        )
}

/// Returns true if the leaf is a DML literal value.
///
/// Literals inside a list qualify, as do literals of a comparison that comes
/// after `keyword` in the statement (`SET a = 1`). WHERE operands never do.
#[must_use]
pub fn is_literal_value(leaf: &Leaf<'_>, keyword: Keyword) -> bool {
    if !is_value_token(leaf.token) || is_in_where(leaf) {
        return false;
    }
    if leaf.has_ancestor(Shape::NameList) {
        return true;
    }
    leaf.has_ancestor(Shape::Comparison)
        && leaf.root().is_some_and(|root| {
            root.group.children()[..root.index]
                .iter()
                .any(|node| node.as_keyword() == Some(keyword))
        })
}

/// Returns true if the leaf sits inside a WHERE clause.
#[must_use]
pub fn is_in_where(leaf: &Leaf<'_>) -> bool {
    leaf.has_ancestor(Shape::Where)
}

/// Returns the action of a DML literal: assignments update, list items
/// insert.
#[must_use]
pub fn literal_action(leaf: &Leaf<'_>) -> Action {
    if leaf.has_ancestor(Shape::Comparison) {
        Action::Update
    } else {
        Action::Insert
    }
}
