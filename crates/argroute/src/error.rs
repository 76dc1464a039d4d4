//! Error types for pattern compilation and argument matching
//!
//! Compile-time errors (`LexError`, `ParseError`, `CompileError`) surface while
//! the route table is assembled and are developer mistakes. `ConversionError`
//! is the only runtime error: it is handed back from matching so the caller
//! can report it to the user.

use thiserror::Error;

use crate::validate::Diagnostic;

/// Malformed pattern text, reported with the byte offset where scanning failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated '{{' opened at offset {offset}")]
    UnterminatedBrace { offset: usize },

    #[error("empty parameter name at offset {offset}")]
    EmptyParameterName { offset: usize },

    #[error("empty type name at offset {offset}")]
    EmptyTypeName { offset: usize },

    #[error("empty option name at offset {offset}")]
    EmptyOptionName { offset: usize },

    #[error("illegal character '{ch}' in option name at offset {offset}")]
    InvalidOptionName { offset: usize, ch: char },

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { offset: usize, ch: char },
}

impl LexError {
    /// Byte offset into the pattern where the error was detected
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedBrace { offset }
            | LexError::EmptyParameterName { offset }
            | LexError::EmptyTypeName { offset }
            | LexError::EmptyOptionName { offset }
            | LexError::InvalidOptionName { offset, .. }
            | LexError::UnexpectedCharacter { offset, .. } => *offset,
        }
    }
}

/// Grammar violation in an otherwise well-formed token stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("catch-all parameter '{name}' must be the last positional segment")]
    CatchAllNotLast { name: String },

    #[error("catch-all parameter '{name}' cannot be optional")]
    OptionalCatchAll { name: String },

    #[error("catch-all '{name}' cannot be used as an option value")]
    CatchAllOptionValue { name: String },

    #[error("option form '{form}' is declared more than once")]
    DuplicateOption { form: String },

    #[error("name '{name}' is bound more than once")]
    DuplicateName { name: String },

    #[error("required segment '{segment}' follows optional parameter '{optional}'")]
    RequiredAfterOptional { segment: String, optional: String },

    #[error("description at offset {offset} has no parameter or option to attach to")]
    DanglingDescription { offset: usize },

    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { offset: usize, found: String },

    #[error("unexpected end of pattern, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
}

/// Failure to resolve compiled segments against the converter registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("unknown type constraint '{type_name}' on '{name}'")]
    UnknownType { name: String, type_name: String },
}

/// Any error raised while turning a pattern into a route table
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    #[error("invalid pattern `{pattern}`: {source}")]
    Lex {
        pattern: String,
        #[source]
        source: LexError,
    },

    #[error("invalid pattern `{pattern}`: {source}")]
    Parse {
        pattern: String,
        #[source]
        source: ParseError,
    },

    #[error("cannot compile `{pattern}`: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: CompileError,
    },

    #[error("route table has {} overlapping route group(s)", .0.len())]
    Ambiguous(Vec<Diagnostic>),
}

impl RouteError {
    /// Pattern the error originated from, if it belongs to a single route
    pub fn pattern(&self) -> Option<&str> {
        match self {
            RouteError::Lex { pattern, .. }
            | RouteError::Parse { pattern, .. }
            | RouteError::Compile { pattern, .. } => Some(pattern),
            RouteError::Ambiguous(_) => None,
        }
    }
}

/// A present argument whose text does not satisfy its declared type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for '{name}' (expected {type_name}): {reason}")]
pub struct ConversionError {
    /// Parameter or option name the value was bound to
    pub name: String,
    /// Declared type constraint
    pub type_name: String,
    /// Raw argument text
    pub value: String,
    /// Converter's explanation
    pub reason: String,
}
