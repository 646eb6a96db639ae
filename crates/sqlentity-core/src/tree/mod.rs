//! Token tree
//!
//! Groups the lexer's flat token stream into a shallow tree of
//! [`Shape`]-tagged groups. The classifier and the extractors only ever look
//! at this tree.

mod builder;
mod error;
mod node;

pub use builder::TreeBuilder;
pub use error::ParseError;
pub use node::{Frame, Group, Leaf, Node, Shape};
