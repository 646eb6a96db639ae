//! Token tree nodes.
//!
//! The tree is owned and immutable once built. Parent links are not stored
//! in the nodes; [`Group::flatten`] hands out each leaf together with the
//! borrowed path of groups leading to it, which is all the role predicates
//! need to look at ancestors and siblings.

use std::borrow::Cow;
use std::fmt;

use crate::lexer::{Keyword, Span, Token, TokenKind};

/// Structural shape of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// The root of one statement.
    Statement,
    /// A single name, e.g. a table or column reference.
    NameRef,
    /// A comma separated list.
    NameList,
    /// `( ... )`, parentheses included as leaves.
    Parenthesis,
    /// A name immediately followed by a parenthesis, e.g. `varchar(255)`.
    FunctionCall,
    /// `operand operator operand`.
    Comparison,
    /// `WHERE ...` up to the end of the condition.
    Where,
}

impl Shape {
    /// Returns the display name of the shape.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Statement => "Statement",
            Self::NameRef => "NameRef",
            Self::NameList => "NameList",
            Self::Parenthesis => "Parenthesis",
            Self::FunctionCall => "FunctionCall",
            Self::Comparison => "Comparison",
            Self::Where => "Where",
        }
    }
}

/// A node of the token tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single token.
    Leaf(Token),
    /// A composite node.
    Group(Group),
}

impl Node {
    /// Returns the token if this is a leaf.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&Token> {
        match self {
            Self::Leaf(token) => Some(token),
            Self::Group(_) => None,
        }
    }

    /// Returns the group if this is a composite node.
    #[must_use]
    pub const fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Leaf(_) => None,
            Self::Group(group) => Some(group),
        }
    }

    /// Returns the shape if this is a composite node.
    #[must_use]
    pub const fn shape(&self) -> Option<Shape> {
        match self {
            Self::Leaf(_) => None,
            Self::Group(group) => Some(group.shape),
        }
    }

    /// Returns true if this is a group of the given shape.
    #[must_use]
    pub fn is_group(&self, shape: Shape) -> bool {
        self.shape() == Some(shape)
    }

    /// Returns the keyword if this is a keyword leaf.
    #[must_use]
    pub fn as_keyword(&self) -> Option<Keyword> {
        self.as_leaf().and_then(Token::as_keyword)
    }

    /// Returns true if this is a keyword leaf.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        self.as_keyword().is_some()
    }

    /// Returns true if this is a whitespace leaf.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.as_leaf().is_some_and(Token::is_whitespace)
    }

    /// Returns true if this is the punctuation leaf `symbol`.
    #[must_use]
    pub fn is_punctuation(&self, symbol: &str) -> bool {
        self.as_leaf().is_some_and(|t| t.is_punctuation(symbol))
    }

    /// Returns the literal source text of the node.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Leaf(token) => Cow::Borrowed(&token.text),
            Self::Group(group) => Cow::Owned(group.text()),
        }
    }

    /// Returns the value the node denotes.
    ///
    /// A leaf yields [`Token::value`], a name reference the value of its
    /// name, any other group its literal text.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        match self {
            Self::Leaf(token) => token.value(),
            Self::Group(group) if group.shape == Shape::NameRef => group
                .children
                .iter()
                .find_map(Self::as_leaf)
                .map_or_else(|| Cow::Owned(group.text()), Token::value),
            Self::Group(group) => Cow::Owned(group.text()),
        }
    }

    /// Returns the span covered by the node.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Leaf(token) => token.span,
            Self::Group(group) => group.span(),
        }
    }
}

/// A composite node: a shape tag and an ordered child sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    shape: Shape,
    children: Vec<Node>,
}

impl Group {
    /// Creates a new group.
    #[must_use]
    pub const fn new(shape: Shape, children: Vec<Node>) -> Self {
        Self { shape, children }
    }

    /// Returns the shape tag.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Consumes the group and returns its children.
    #[must_use]
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Returns the index of `child` among this group's children.
    ///
    /// Matches by identity, not by equality.
    #[must_use]
    pub fn token_index(&self, child: &Node) -> Option<usize> {
        self.children.iter().position(|c| std::ptr::eq(c, child))
    }

    /// Returns the nearest non-whitespace child after `index`.
    #[must_use]
    pub fn next_sibling(&self, index: usize) -> Option<(usize, &Node)> {
        self.children
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, node)| !node.is_whitespace())
    }

    /// Returns the nearest non-whitespace child before `index`.
    #[must_use]
    pub fn prev_sibling(&self, index: usize) -> Option<(usize, &Node)> {
        self.children[..index.min(self.children.len())]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| !node.is_whitespace())
    }

    /// Returns the first direct child group of the given shape.
    #[must_use]
    pub fn find_group(&self, shape: Shape) -> Option<&Self> {
        self.children
            .iter()
            .filter_map(Node::as_group)
            .find(|group| group.shape == shape)
    }

    /// Returns the keyword leaves among the direct children, in order.
    pub fn keywords(&self) -> impl Iterator<Item = &Token> + '_ {
        self.children
            .iter()
            .filter_map(Node::as_leaf)
            .filter(|token| token.is_keyword())
    }

    /// Returns the literal source text of the group.
    #[must_use]
    pub fn text(&self) -> String {
        self.flatten()
            .iter()
            .map(|leaf| leaf.token.text.as_str())
            .collect()
    }

    /// Returns the span covered by the group.
    #[must_use]
    pub fn span(&self) -> Span {
        self.children
            .iter()
            .map(Node::span)
            .reduce(Span::merge)
            .unwrap_or_default()
    }

    /// Returns all descendant leaves in document order, each with its path
    /// from this group.
    #[must_use]
    pub fn flatten(&self) -> Vec<Leaf<'_>> {
        let mut leaves = Vec::new();
        let mut path = Vec::new();
        self.collect_leaves(&mut path, &mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, path: &mut Vec<Frame<'a>>, leaves: &mut Vec<Leaf<'a>>) {
        for (index, child) in self.children.iter().enumerate() {
            path.push(Frame { group: self, index });
            match child {
                Node::Leaf(token) => leaves.push(Leaf {
                    token,
                    path: path.clone(),
                }),
                Node::Group(group) => group.collect_leaves(path, leaves),
            }
            path.pop();
        }
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.shape.as_str(), indent = depth * 2)?;
        for child in &self.children {
            match child {
                Node::Leaf(token) if token.is_whitespace() => {}
                Node::Leaf(token) => writeln!(
                    f,
                    "{:indent$}{:?} {}",
                    "",
                    token.kind,
                    token.text,
                    indent = (depth + 1) * 2
                )?,
                Node::Group(group) => group.write_outline(f, depth + 1)?,
            }
        }
        Ok(())
    }
}

/// Renders the tree as an indented outline, one node per line, whitespace
/// omitted.
impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}

/// One step of a leaf's path: a group and the index of the child that
/// leads to the leaf.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// The ancestor group.
    pub group: &'a Group,
    /// Index of the path's next node within `group`.
    pub index: usize,
}

impl<'a> Frame<'a> {
    /// Returns the shape of the ancestor group.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.group.shape
    }

    /// Returns the nearest non-whitespace sibling after the path's node.
    #[must_use]
    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.group.next_sibling(self.index).map(|(_, node)| node)
    }

    /// Returns the nearest non-whitespace sibling before the path's node.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<&'a Node> {
        self.group.prev_sibling(self.index).map(|(_, node)| node)
    }
}

/// A leaf token together with its ancestor path.
#[derive(Debug, Clone)]
pub struct Leaf<'a> {
    /// The token.
    pub token: &'a Token,
    path: Vec<Frame<'a>>,
}

impl<'a> Leaf<'a> {
    /// Returns the kind of the token.
    #[must_use]
    pub const fn kind(&self) -> &TokenKind {
        &self.token.kind
    }

    /// Returns the value the token denotes.
    #[must_use]
    pub fn value(&self) -> Cow<'a, str> {
        self.token.value()
    }

    /// Returns the `n`th ancestor frame: 0 is the immediate parent, 1 the
    /// grandparent, and so on.
    #[must_use]
    pub fn ancestor(&self, n: usize) -> Option<&Frame<'a>> {
        self.path.len().checked_sub(n + 1).map(|i| &self.path[i])
    }

    /// Returns the immediate parent frame.
    #[must_use]
    pub fn parent(&self) -> Option<&Frame<'a>> {
        self.ancestor(0)
    }

    /// Returns the outermost frame: the root and the index of the top-level
    /// child containing this leaf.
    #[must_use]
    pub fn root(&self) -> Option<&Frame<'a>> {
        self.path.first()
    }

    /// Returns true if any ancestor has the given shape.
    #[must_use]
    pub fn has_ancestor(&self, shape: Shape) -> bool {
        self.path.iter().any(|frame| frame.shape() == shape)
    }

    /// Returns true if `group` is one of the leaf's ancestors. Compares by
    /// identity.
    #[must_use]
    pub fn is_within(&self, group: &Group) -> bool {
        self.path.iter().any(|frame| std::ptr::eq(frame.group, group))
    }

    /// Returns true if the ancestors nearest to the leaf have exactly the
    /// given shapes, parent first.
    #[must_use]
    pub fn ancestors_are(&self, shapes: &[Shape]) -> bool {
        shapes
            .iter()
            .enumerate()
            .all(|(n, shape)| self.ancestor(n).is_some_and(|frame| frame.shape() == *shape))
    }
}
