//! Compiled routes
//!
//! A [`CompiledRoute`] is produced once per pattern while the route table is
//! assembled and never changes afterwards. Segment matchers mirror the
//! parsed syntax, with type names already resolved to converters.

use serde::{Deserialize, Serialize};

use crate::convert::Converter;
use crate::pattern::Syntax;

pub mod compiler;
pub mod specificity;

// Re-export commonly used types
pub use compiler::{compile, RouteCompiler};
pub use specificity::calculate_specificity;

/// Classification tag carried for collaborators (help output, REPL policy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    #[default]
    Unspecified,
    /// Reads state only
    Query,
    /// Changes state
    Command,
    /// Changes state but is safe to retry
    IdempotentCommand,
}

/// Metadata attached to a route at registration time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteMetadata {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: RouteKind,
    /// Alternative patterns compiled into equivalent routes
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl RouteMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_kind(mut self, kind: RouteKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }
}

/// Positional parameter matcher: `{name}`, `{name:type}`, `{name?}`
#[derive(Debug, Clone)]
pub struct ParameterMatcher {
    pub name: String,
    /// `None` binds the raw text as [`Value::String`](crate::Value::String)
    pub converter: Option<Converter>,
    pub is_optional: bool,
    pub description: Option<String>,
}

/// Catch-all matcher: `{*name}`, optionally typed per element
#[derive(Debug, Clone)]
pub struct CatchAllMatcher {
    pub name: String,
    pub converter: Option<Converter>,
    pub description: Option<String>,
}

/// Value slot of a value-taking option
#[derive(Debug, Clone)]
pub struct OptionValueMatcher {
    pub name: String,
    pub converter: Option<Converter>,
    pub is_optional: bool,
}

/// Option matcher: `--long,-s [{value}]`
#[derive(Debug, Clone)]
pub struct OptionMatcher {
    /// Bound name: the long form, or the short form when there is no long one
    pub name: String,
    pub long_form: Option<String>,
    pub short_form: Option<String>,
    pub is_optional: bool,
    pub value: Option<OptionValueMatcher>,
    pub is_repeated: bool,
    pub description: Option<String>,
}

impl OptionMatcher {
    /// Checks `arg` against `--long` / `-s`, also accepting `--long=value`
    ///
    /// Returns the inline value (if any) on a match.
    pub fn match_flag<'a>(&self, arg: &'a str) -> Option<Option<&'a str>> {
        if let (Some(long), Some(rest)) = (&self.long_form, arg.strip_prefix("--")) {
            match rest.split_once('=') {
                Some((name, inline)) if name == long => return Some(Some(inline)),
                None if rest == long => return Some(None),
                _ => {}
            }
        }
        match (&self.short_form, arg.strip_prefix('-')) {
            (Some(short), Some(rest)) if !arg.starts_with("--") && rest == short => Some(None),
            _ => None,
        }
    }

    pub fn expects_value(&self) -> bool {
        self.value.is_some()
    }
}

/// Resolved segment, mirroring [`SegmentSyntax`](crate::pattern::SegmentSyntax)
#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Parameter(ParameterMatcher),
    Option(OptionMatcher),
    CatchAll(CatchAllMatcher),
}

/// A pattern compiled into matchers, with its ranking score and metadata
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    /// Pattern text as registered
    pub pattern: String,
    /// Parsed form, kept for signatures and usage text
    pub syntax: Syntax,
    /// Positional segments in order, then options
    pub segments: Vec<Segment>,
    /// Higher is more specific
    pub specificity: i64,
    /// Declaration index inside the table (tie-breaker)
    pub order: usize,
    pub metadata: RouteMetadata,
    /// Canonical pattern when this route was compiled from an alias
    pub alias_of: Option<String>,
    /// `order` of the canonical route, set for aliases when the table is built
    pub canonical_order: Option<usize>,
    /// Compiled alias patterns; flattened into the table on build
    pub alias_routes: Vec<CompiledRoute>,
}

impl CompiledRoute {
    pub fn positional(&self) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(|s| !matches!(s, Segment::Option(_)))
    }

    pub fn options(&self) -> impl Iterator<Item = &OptionMatcher> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Option(opt) => Some(opt),
            _ => None,
        })
    }

    pub fn has_catch_all(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::CatchAll(_)))
    }

    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    /// Pattern of the route this entry stands for
    pub fn canonical_pattern(&self) -> &str {
        self.alias_of.as_deref().unwrap_or(&self.pattern)
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.description.as_deref()
    }

    pub fn kind(&self) -> RouteKind {
        self.metadata.kind
    }

    /// Pattern text without descriptions
    pub fn usage(&self) -> String {
        self.syntax.usage()
    }
}
