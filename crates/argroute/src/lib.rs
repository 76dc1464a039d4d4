//! # argroute
//!
//! Command-line route patterns compiled into matchers. A route table selects
//! exactly one route for an argument vector, by specificity:
//!
//! - Literal words (`git status`)
//! - Parameters with optional type constraints (`{id:int}`, `{name?}`)
//! - Catch-all parameters (`{*args}`)
//! - Boolean and valued options with short aliases (`--force,-f`,
//!   `--out {dir}`, `--tag? {t}*`)
//! - Descriptions for help output (`{env|Target environment}`)
//!
//! ## Matching Model
//!
//! Routes are tried most specific first. A route is accepted on structure
//! alone (literals, arity, required options); values are converted only for
//! the accepted route. A value that fails its type is a [`ConversionError`]
//! and never falls through to a less specific route, so routes that differ
//! only by type constraint are reported by [`validate`].
//!
//! ## Logging
//!
//! The crate logs through `tracing` (table construction at `debug`, rejected
//! candidates at `trace`) and never installs a subscriber.
//!
//! ## Example
//!
//! ```
//! use argroute::{MatchResult, RouteTable};
//!
//! let mut builder = RouteTable::builder();
//! builder
//!     .route("git status")?
//!     .route("git {cmd} {*args}")?
//!     .route("wait {seconds:int}")?;
//! let table = builder.build();
//!
//! match table.match_args(&["git", "status"])? {
//!     MatchResult::Matched(m) => assert_eq!(m.pattern(), "git status"),
//!     MatchResult::NoMatch => unreachable!(),
//! }
//!
//! let err = table.match_args(&["wait", "soon"]).unwrap_err();
//! assert_eq!(err.type_name, "int");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod convert;
pub mod error;
pub mod help;
pub mod matcher;
pub mod pattern;
pub mod route;
pub mod table;
pub mod validate;
pub mod value;

// ============================================================================
// Public API
// ============================================================================

pub use convert::{Converter, ConverterRegistry, BUILTIN_TYPE_NAMES};
pub use error::{CompileError, ConversionError, LexError, ParseError, RouteError};
pub use help::HelpEntry;
pub use matcher::{match_args, MatchResult, RouteMatch};
pub use route::{compile, CompiledRoute, RouteCompiler, RouteKind, RouteMetadata};
pub use table::{RouteTable, RouteTableBuilder};
pub use validate::{validate, Diagnostic, StructureSignature};
pub use value::{FromValue, Value};
