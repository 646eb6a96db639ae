//! Groups a flat token stream into a token tree.
//!
//! Grouping is shallow and clause-driven rather than grammar-driven. The
//! passes run innermost parenthesis first:
//!
//! 1. parentheses nest into [`Shape::Parenthesis`] groups;
//! 2. a name directly followed by a parenthesis becomes a
//!    [`Shape::FunctionCall`] (not at the root of `CREATE TABLE`, where the
//!    parenthesis holds the column definitions);
//! 3. every remaining name becomes a [`Shape::NameRef`];
//! 4. `operand operator operand` becomes a [`Shape::Comparison`];
//! 5. comma separated runs become a [`Shape::NameList`] (SELECT projections
//!    and VALUES tuples always do, even with a single item);
//! 6. `WHERE ...` at the root becomes a [`Shape::Where`].

use super::{Group, Node, ParseError, Shape};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Keywords that end a WHERE clause.
const WHERE_TERMINATORS: [Keyword; 4] = [
    Keyword::Order,
    Keyword::Group,
    Keyword::Having,
    Keyword::Limit,
];

/// Operators that form a comparison.
const COMPARISON_OPERATORS: [&str; 7] = ["=", "<>", "!=", "<", "<=", ">", ">="];

/// Builds the token tree of one SQL statement.
pub struct TreeBuilder<'a> {
    input: &'a str,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Builds the tree of the first statement in the input.
    ///
    /// Statements after the first top-level `;` are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input holds no statement, contains a
    /// token the lexer rejects, or has unbalanced parentheses.
    pub fn build(&self) -> Result<Group, ParseError> {
        let tokens = self.tokenize()?;
        let statement = first_statement(tokens)
            .ok_or_else(|| ParseError::new("Empty statement", Span::new(0, self.input.len())))?;
        let nodes = nest_parentheses(statement)?;
        let create_table = is_create_table(&nodes);
        Ok(Group::new(Shape::Statement, group_root(nodes, create_table)))
    }

    fn tokenize(&self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Lexer::new(self.input).tokenize();
        if let Some(error) = tokens.iter().find_map(|token| match &token.kind {
            TokenKind::Error(message) => Some(ParseError::new(message.clone(), token.span)),
            _ => None,
        }) {
            return Err(error);
        }
        tokens.retain(|token| token.kind != TokenKind::Eof);
        Ok(tokens)
    }
}

/// Returns the tokens of the first non-empty statement, terminator dropped.
fn first_statement(tokens: Vec<Token>) -> Option<Vec<Token>> {
    let mut depth = 0usize;
    let mut current = Vec::new();

    for token in tokens {
        if token.is_punctuation("(") {
            depth += 1;
        } else if token.is_punctuation(")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_punctuation(";") {
            if has_content(&current) {
                return Some(current);
            }
            current.clear();
            continue;
        }
        current.push(token);
    }

    has_content(&current).then_some(current)
}

fn has_content(tokens: &[Token]) -> bool {
    tokens.iter().any(|token| !token.is_whitespace())
}

/// Nests parenthesized runs into `Parenthesis` groups.
fn nest_parentheses(tokens: Vec<Token>) -> Result<Vec<Node>, ParseError> {
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];

    for token in tokens {
        if token.is_punctuation("(") {
            stack.push(vec![Node::Leaf(token)]);
        } else if token.is_punctuation(")") {
            if stack.len() < 2 {
                return Err(ParseError::new("Unbalanced ')'", token.span));
            }
            let mut children = stack.pop().unwrap_or_default();
            children.push(Node::Leaf(token));
            if let Some(parent) = stack.last_mut() {
                parent.push(Node::Group(Group::new(Shape::Parenthesis, children)));
            }
        } else if let Some(current) = stack.last_mut() {
            current.push(Node::Leaf(token));
        }
    }

    if stack.len() > 1 {
        let span = stack
            .last()
            .and_then(|open| open.first())
            .map(Node::span)
            .unwrap_or_default();
        return Err(ParseError::new("Unclosed '('", span));
    }

    Ok(stack.pop().unwrap_or_default())
}

fn is_create_table(nodes: &[Node]) -> bool {
    let keywords: Vec<Keyword> = nodes.iter().filter_map(Node::as_keyword).collect();
    keywords.first() == Some(&Keyword::Create)
        && keywords.contains(&Keyword::Table)
        && !keywords.contains(&Keyword::As)
}

fn group_root(nodes: Vec<Node>, create_table: bool) -> Vec<Node> {
    let nodes = regroup_parentheses(nodes, true);
    let nodes = if create_table {
        nodes
    } else {
        group_calls(nodes)
    };
    let nodes = group_comparisons(group_names(nodes));
    group_where(group_root_lists(nodes))
}

fn group_inner(nodes: Vec<Node>, force_list: bool) -> Vec<Node> {
    let nodes = regroup_parentheses(nodes, false);
    let nodes = group_comparisons(group_names(group_calls(nodes)));
    if force_list || nodes.iter().any(|node| node.is_punctuation(",")) {
        wrap_list(nodes)
    } else {
        nodes
    }
}

/// Regroups the inside of every parenthesis in `nodes`. At the root, the
/// tuples following `VALUES` always become lists.
fn regroup_parentheses(nodes: Vec<Node>, root: bool) -> Vec<Node> {
    let mut after_values = false;
    nodes
        .into_iter()
        .map(|node| {
            if let Some(keyword) = node.as_keyword() {
                after_values = keyword == Keyword::Values;
            }
            match node {
                Node::Group(group) if group.shape() == Shape::Parenthesis => {
                    Node::Group(regroup_parenthesis(group, root && after_values))
                }
                other => other,
            }
        })
        .collect()
}

fn regroup_parenthesis(group: Group, force_list: bool) -> Group {
    let mut children = group.into_children();
    let close = children.pop();
    let inner = children.split_off(children.len().min(1));
    children.extend(group_inner(inner, force_list));
    children.extend(close);
    Group::new(Shape::Parenthesis, children)
}

fn is_name(node: &Node) -> bool {
    node.as_leaf()
        .is_some_and(|token| token.kind == TokenKind::Name)
}

fn name_ref(node: Node) -> Node {
    Node::Group(Group::new(Shape::NameRef, vec![node]))
}

fn group_calls(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let callee = if node.is_group(Shape::Parenthesis) && out.last().is_some_and(is_name) {
            out.pop()
        } else {
            None
        };
        match callee {
            Some(name) => out.push(Node::Group(Group::new(
                Shape::FunctionCall,
                vec![name_ref(name), node],
            ))),
            None => out.push(node),
        }
    }
    out
}

fn group_names(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| if is_name(&node) { name_ref(node) } else { node })
        .collect()
}

fn is_operand(node: &Node) -> bool {
    match node {
        Node::Group(group) => matches!(group.shape(), Shape::NameRef | Shape::FunctionCall),
        Node::Leaf(token) => {
            token.is_literal()
                || matches!(
                    token.as_keyword(),
                    Some(Keyword::Null | Keyword::True | Keyword::False)
                )
        }
    }
}

fn is_comparison_operator(node: &Node) -> bool {
    node.as_leaf().is_some_and(|token| match token.kind {
        TokenKind::Operator => COMPARISON_OPERATORS.contains(&token.text.as_str()),
        TokenKind::Keyword(Keyword::Like) => true,
        _ => false,
    })
}

fn next_significant(nodes: &[Node], after: usize) -> Option<usize> {
    (after + 1..nodes.len()).find(|&i| !nodes[i].is_whitespace())
}

/// Returns the index of the right operand if a comparison starts at `start`.
fn comparison_end(nodes: &[Node], start: usize) -> Option<usize> {
    let operator = next_significant(nodes, start)?;
    if !is_comparison_operator(&nodes[operator]) {
        return None;
    }
    let operand = next_significant(nodes, operator)?;
    is_operand(&nodes[operand]).then_some(operand)
}

fn group_comparisons(mut nodes: Vec<Node>) -> Vec<Node> {
    let mut i = 0;
    while i < nodes.len() {
        if is_operand(&nodes[i]) {
            if let Some(end) = comparison_end(&nodes, i) {
                let children: Vec<Node> = nodes.drain(i..=end).collect();
                nodes.insert(i, Node::Group(Group::new(Shape::Comparison, children)));
            }
        }
        i += 1;
    }
    nodes
}

/// Wraps everything between the first and last non-whitespace node into a
/// `NameList`.
fn wrap_list(mut nodes: Vec<Node>) -> Vec<Node> {
    let Some(first) = nodes.iter().position(|node| !node.is_whitespace()) else {
        return nodes;
    };
    let last = nodes
        .iter()
        .rposition(|node| !node.is_whitespace())
        .unwrap_or(first);

    let trailing = nodes.split_off(last + 1);
    let items = nodes.split_off(first);
    nodes.push(Node::Group(Group::new(Shape::NameList, items)));
    nodes.extend(trailing);
    nodes
}

/// Groups the comma separated runs between root-level keywords.
fn group_root_lists(nodes: Vec<Node>) -> Vec<Node> {
    fn flush(out: &mut Vec<Node>, run: &mut Vec<Node>, projection: bool) {
        let nodes = std::mem::take(run);
        if projection || nodes.iter().any(|node| node.is_punctuation(",")) {
            out.extend(wrap_list(nodes));
        } else {
            out.extend(nodes);
        }
    }

    let mut out = Vec::with_capacity(nodes.len());
    let mut run = Vec::new();
    let mut projection = false;

    for node in nodes {
        if let Some(keyword) = node.as_keyword() {
            flush(&mut out, &mut run, projection);
            projection = matches!(keyword, Keyword::Select | Keyword::Distinct);
            out.push(node);
        } else {
            run.push(node);
        }
    }
    flush(&mut out, &mut run, projection);
    out
}

fn group_where(mut nodes: Vec<Node>) -> Vec<Node> {
    let Some(start) = nodes
        .iter()
        .position(|node| node.as_keyword() == Some(Keyword::Where))
    else {
        return nodes;
    };

    let end = nodes[start..]
        .iter()
        .position(|node| {
            node.as_keyword()
                .is_some_and(|keyword| WHERE_TERMINATORS.contains(&keyword))
        })
        .map_or(nodes.len(), |offset| start + offset);
    let end = (start..end)
        .rev()
        .find(|&i| !nodes[i].is_whitespace())
        .map_or(end, |i| i + 1);

    let tail = nodes.split_off(end);
    let clause = nodes.split_off(start);
    nodes.push(Node::Group(Group::new(Shape::Where, clause)));
    nodes.extend(tail);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(sql: &str) -> Group {
        TreeBuilder::new(sql)
            .build()
            .unwrap_or_else(|e| panic!("Failed to build: {sql}\nError: {e}"))
    }

    /// Shapes of the non-whitespace root children; leaves show their text.
    fn outline(group: &Group) -> Vec<String> {
        group
            .children()
            .iter()
            .filter(|node| !node.is_whitespace())
            .map(|node| match node {
                Node::Leaf(token) => token.text.clone(),
                Node::Group(group) => group.shape().as_str().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_create_database() {
        let root = build("CREATE DATABASE testDB;");
        assert_eq!(root.shape(), Shape::Statement);
        assert_eq!(outline(&root), vec!["CREATE", "DATABASE", "NameRef"]);
    }

    #[test]
    fn test_only_first_statement_is_kept() {
        let root = build(";; DROP TABLE a; DROP TABLE b;");
        assert_eq!(root.text(), " DROP TABLE a");
    }

    #[test]
    fn test_create_table_body_is_a_list() {
        let root = build("CREATE TABLE Persons (PersonID int, LastName varchar(255));");
        assert_eq!(
            outline(&root),
            vec!["CREATE", "TABLE", "NameRef", "Parenthesis"]
        );

        let body = root.find_group(Shape::Parenthesis).unwrap();
        let list = body.find_group(Shape::NameList).unwrap();
        assert_eq!(
            outline(list),
            vec!["NameRef", "int", ",", "NameRef", "FunctionCall"]
        );
        assert_eq!(
            list.find_group(Shape::FunctionCall).unwrap().text(),
            "varchar(255)"
        );
    }

    #[test]
    fn test_create_table_without_space_is_not_a_call() {
        let root = build("CREATE TABLE Persons(ID int)");
        assert_eq!(
            outline(&root),
            vec!["CREATE", "TABLE", "NameRef", "Parenthesis"]
        );
    }

    #[test]
    fn test_insert_target_written_as_call() {
        let root = build("INSERT INTO Persons(LastName) VALUES ('Doe')");
        assert_eq!(
            outline(&root),
            vec!["INSERT", "INTO", "FunctionCall", "VALUES", "Parenthesis"]
        );
        let tuple = root.find_group(Shape::Parenthesis).unwrap();
        assert!(tuple.find_group(Shape::NameList).is_some());
    }

    #[test]
    fn test_select_projection_is_always_a_list() {
        let root = build("SELECT City FROM Persons");
        assert_eq!(
            outline(&root),
            vec!["SELECT", "NameList", "FROM", "NameRef"]
        );
    }

    #[test]
    fn test_update_assignments() {
        let root = build("UPDATE Persons SET City = 'Oslo', Age = 30 WHERE ID = 1");
        assert_eq!(
            outline(&root),
            vec!["UPDATE", "NameRef", "SET", "NameList", "Where"]
        );
        let list = root.find_group(Shape::NameList).unwrap();
        assert_eq!(outline(list), vec!["Comparison", ",", "Comparison"]);
    }

    #[test]
    fn test_where_clause_nesting() {
        let root = build("SELECT a FROM t WHERE a = 1 AND (b = 'x' OR c <> 2) ORDER BY a");
        assert_eq!(
            outline(&root),
            vec!["SELECT", "NameList", "FROM", "NameRef", "Where", "ORDER", "BY", "NameRef"]
        );
        let clause = root.find_group(Shape::Where).unwrap();
        assert_eq!(
            outline(clause),
            vec!["WHERE", "Comparison", "AND", "Parenthesis"]
        );
        let group = clause.find_group(Shape::Parenthesis).unwrap();
        assert_eq!(
            outline(group),
            vec!["(", "Comparison", "OR", "Comparison", ")"]
        );
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(TreeBuilder::new("").build().is_err());
        assert!(TreeBuilder::new("  ;  ; ").build().is_err());
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = TreeBuilder::new("CREATE TABLE t (a int").build().unwrap_err();
        assert_eq!(err.message, "Unclosed '('");
        assert_eq!(err.span, Span::new(15, 16));

        let err = TreeBuilder::new("DROP TABLE t)").build().unwrap_err();
        assert_eq!(err.message, "Unbalanced ')'");
    }

    #[test]
    fn test_lexer_errors_surface() {
        let err = TreeBuilder::new("SELECT 'open FROM t").build().unwrap_err();
        assert_eq!(err.message, "Unterminated string literal");
    }
}
