//! Column constraint resolution.
//!
//! A constraint keyword belongs to the nearest column name before it
//! (`Age int NOT NULL`), unless it is followed by a parenthesized column
//! list (`PRIMARY KEY (ID)`), in which case it belongs to those columns.

use tracing::trace;

use crate::entity::{Action, Constraint};
use crate::error::{ClassifyError, Result};
use crate::lexer::Keyword;
use crate::roles::{is_column_name, is_in_where};
use crate::tree::{Leaf, Shape};

/// Constraint keywords that are recognized but not supported.
const UNSUPPORTED: [Keyword; 3] = [Keyword::Check, Keyword::Foreign, Keyword::References];

/// A constraint together with the column it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Name of the owning column.
    pub column: String,
    pub constraint: Constraint,
}

/// Resolves every constraint keyword of the statement, in source order.
///
/// # Errors
///
/// Returns `MalformedConstraint` for `CHECK`, `FOREIGN KEY`, `REFERENCES` or
/// a `DEFAULT` without a value, and `StructuralMismatch` for a constraint
/// keyword with no column to attach to.
pub fn resolve_all(leaves: &[Leaf<'_>]) -> Result<Vec<Resolved>> {
    let keywords: Vec<(usize, Keyword)> = leaves
        .iter()
        .enumerate()
        .filter(|(_, leaf)| !is_in_where(leaf))
        .filter_map(|(index, leaf)| leaf.token.as_keyword().map(|keyword| (index, keyword)))
        .collect();

    if let Some((_, keyword)) = keywords.iter().find(|(_, k)| UNSUPPORTED.contains(k)) {
        return Err(ClassifyError::MalformedConstraint(
            keyword.as_str().to_string(),
        ));
    }

    let mut resolved = Vec::new();
    for (index, keyword) in keywords {
        let Some(constraint) = constraint_for(keyword, index, leaves)? else {
            continue;
        };
        let owners = owners(keyword, index, leaves)?;
        trace!(
            constraint = constraint.name(),
            owners = ?owners,
            "Resolved constraint"
        );
        resolved.extend(owners.into_iter().map(|column| Resolved {
            column,
            constraint: constraint.clone(),
        }));
    }

    Ok(resolved)
}

/// Returns the constraints attached to `column`, in source order.
///
/// # Errors
///
/// Fails as [`resolve_all`] does, whatever the column.
pub fn resolve_constraints(column: &str, leaves: &[Leaf<'_>]) -> Result<Vec<Constraint>> {
    Ok(resolve_all(leaves)?
        .into_iter()
        .filter(|resolved| resolved.column == column)
        .map(|resolved| resolved.constraint)
        .collect())
}

fn constraint_for(keyword: Keyword, index: usize, leaves: &[Leaf<'_>]) -> Result<Option<Constraint>> {
    let action = Action::AddConstraint;
    let constraint = match keyword {
        Keyword::Primary => Constraint::PrimaryKey {
            name: "primarykey".to_string(),
            action,
        },
        Keyword::NotNull => Constraint::NotNull {
            name: "notnull".to_string(),
            action,
        },
        Keyword::Unique => Constraint::Unique {
            name: "unique".to_string(),
            action,
        },
        Keyword::Default => {
            let value = next_significant(leaves, index)
                .map(|next| leaves[next].value().into_owned())
                .ok_or_else(|| {
                    ClassifyError::MalformedConstraint(keyword.as_str().to_string())
                })?;
            Constraint::Default {
                name: "default".to_string(),
                action,
                value,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(constraint))
}

fn next_significant(leaves: &[Leaf<'_>], after: usize) -> Option<usize> {
    (after + 1..leaves.len()).find(|&i| !leaves[i].token.is_whitespace())
}

/// Returns the names of the columns the keyword at `index` applies to.
fn owners(keyword: Keyword, index: usize, leaves: &[Leaf<'_>]) -> Result<Vec<String>> {
    if matches!(keyword, Keyword::Primary | Keyword::Unique) {
        if let Some(columns) = listed_columns(index, leaves) {
            return Ok(columns);
        }
    }

    leaves[..index]
        .iter()
        .rev()
        .find(|leaf| is_column_name(leaf))
        .map(|leaf| vec![leaf.value().into_owned()])
        .ok_or_else(|| {
            ClassifyError::mismatch(format!(
                "no column before constraint '{}'",
                keyword.as_str()
            ))
        })
}

/// Returns the columns of a `(...)` list directly after the keyword at
/// `index`, skipping an optional `KEY`.
fn listed_columns(index: usize, leaves: &[Leaf<'_>]) -> Option<Vec<String>> {
    let mut next = next_significant(leaves, index)?;
    if leaves[next].token.as_keyword() == Some(Keyword::Key) {
        next = next_significant(leaves, next)?;
    }
    let open = &leaves[next];
    if !open.token.is_punctuation("(") {
        return None;
    }
    let group = open.parent().filter(|frame| frame.shape() == Shape::Parenthesis)?.group;

    Some(
        leaves[next + 1..]
            .iter()
            .take_while(|leaf| leaf.is_within(group))
            .filter(|leaf| is_column_name(leaf))
            .map(|leaf| leaf.value().into_owned())
            .collect(),
    )
}
