//! Pattern front end: text → tokens → segment syntax
//!
//! Both stages are pure functions over the pattern text and know nothing
//! about converters or specificity.

pub mod lexer;
pub mod parser;

// Re-export commonly used types
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{
    parse, parse_pattern, OptionSyntax, OptionValueSyntax, SegmentSyntax, Syntax,
};
