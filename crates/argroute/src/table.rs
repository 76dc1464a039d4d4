//! Route table
//!
//! Holds compiled routes sorted by specificity (descending), ties broken by
//! declaration order. The table is immutable once built and can be shared
//! across threads.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::convert::ConverterRegistry;
use crate::error::{ConversionError, RouteError};
use crate::help::{self, HelpEntry};
use crate::matcher::{self, MatchResult};
use crate::route::{CompiledRoute, RouteCompiler, RouteMetadata};
use crate::validate::{self, Diagnostic};
use crate::value::Value;

/// Sorted, immutable collection of compiled routes
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Builds a table from compiled routes in declaration order
    ///
    /// Alias routes carried by each route are flattened in right after it and
    /// linked to it through `canonical_order`. Aliases passed in already
    /// flattened, as when rebuilding from another table's `routes()`, are
    /// relinked through their canonical route's previous `order`.
    pub fn build<I>(routes: I) -> Self
    where
        I: IntoIterator<Item = CompiledRoute>,
    {
        let mut flat: Vec<CompiledRoute> = Vec::new();
        let mut previous: HashMap<usize, usize> = HashMap::new();
        let mut unlinked = Vec::new();
        for mut route in routes {
            let order = flat.len();
            let aliases = std::mem::take(&mut route.alias_routes);
            if route.is_alias() {
                unlinked.push(order);
            } else {
                previous.entry(route.order).or_insert(order);
            }
            route.order = order;
            flat.push(route);

            for mut alias in aliases {
                alias.order = flat.len();
                alias.canonical_order = Some(order);
                flat.push(alias);
            }
        }
        for i in unlinked {
            let alias = &mut flat[i];
            alias.canonical_order = alias
                .canonical_order
                .and_then(|prev| previous.get(&prev).copied());
        }

        flat.sort_by_key(|r| (Reverse(r.specificity), r.order));

        tracing::debug!(routes = flat.len(), "built route table");

        Self { routes: flat }
    }

    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Routes in match order
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// See [`matcher::match_args`]
    pub fn match_args<S: AsRef<str>>(&self, args: &[S]) -> Result<MatchResult<'_>, ConversionError> {
        matcher::match_args(self, args)
    }

    /// See [`validate::validate`]
    pub fn validate(&self) -> Vec<Diagnostic> {
        validate::validate(self)
    }

    /// See [`help::help_entries`]
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        help::help_entries(self)
    }
}

/// Compiles patterns one by one and assembles a [`RouteTable`]
///
/// # Examples
///
/// ```
/// use argroute::{RouteKind, RouteMetadata, RouteTable};
///
/// let mut builder = RouteTable::builder();
/// builder
///     .route("status")?
///     .route_with(
///         "deploy {env} --force",
///         RouteMetadata::new().with_kind(RouteKind::Command),
///     )?;
/// let table = builder.build();
/// assert_eq!(table.len(), 2);
/// # Ok::<(), argroute::RouteError>(())
/// ```
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    compiler: RouteCompiler,
    routes: Vec<CompiledRoute>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self {
            compiler: RouteCompiler::with_registry(registry),
            routes: Vec::new(),
        }
    }

    /// Registers a converter; only routes added afterwards can use it
    pub fn register_converter<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.compiler.register(name, func);
        self
    }

    pub fn route(&mut self, pattern: &str) -> Result<&mut Self, RouteError> {
        self.route_with(pattern, RouteMetadata::default())
    }

    pub fn route_with(
        &mut self,
        pattern: &str,
        metadata: RouteMetadata,
    ) -> Result<&mut Self, RouteError> {
        let route = self.compiler.compile(pattern, metadata)?;
        self.routes.push(route);
        Ok(self)
    }

    /// Adds an already compiled route
    pub fn compiled(&mut self, route: CompiledRoute) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn build(self) -> RouteTable {
        RouteTable::build(self.routes)
    }

    /// Like [`build`](Self::build), but rejects tables with overlapping routes
    pub fn build_strict(self) -> Result<RouteTable, RouteError> {
        let table = self.build();
        let diagnostics = table.validate();
        if diagnostics.is_empty() {
            return Ok(table);
        }

        for diagnostic in &diagnostics {
            tracing::warn!(%diagnostic, "overlapping routes");
        }
        Err(RouteError::Ambiguous(diagnostics))
    }
}
