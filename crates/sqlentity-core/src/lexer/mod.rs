//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer producing a flat stream of tokens, whitespace
//! included. The [`crate::tree`] module groups the stream into a token tree.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{is_builtin_type, Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
