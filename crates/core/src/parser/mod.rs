//! Content stream tokenizing.
//!
//! - `lexer`: byte-level lexer (numbers, names, strings, keywords)
//! - `content`: groups lexemes into operations and inline images

pub mod content;
pub mod lexer;

pub use content::{ContentParser, ContentToken, InlineImage, Operands, Operation, parse_content};
pub use lexer::{ContentLexer, Lexeme};
