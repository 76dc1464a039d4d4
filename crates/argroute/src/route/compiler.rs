//! Pattern compiler
//!
//! Runs the lexer and parser, resolves every type constraint against a
//! converter registry, and scores the result. Aliases listed in the route
//! metadata are compiled the same way and travel with the canonical route.

use once_cell::sync::Lazy;

use super::specificity::calculate_specificity;
use super::{
    CatchAllMatcher, CompiledRoute, OptionMatcher, OptionValueMatcher, ParameterMatcher,
    RouteMetadata, Segment,
};
use crate::convert::{Converter, ConverterRegistry};
use crate::error::{CompileError, RouteError};
use crate::pattern::{parse_pattern, OptionSyntax, SegmentSyntax, Syntax};
use crate::value::Value;

static DEFAULT_COMPILER: Lazy<RouteCompiler> = Lazy::new(RouteCompiler::new);

/// Compiles a pattern against the built-in converters
///
/// # Examples
///
/// ```
/// use argroute::{compile, RouteMetadata};
///
/// let route = compile("wait {seconds:int}", RouteMetadata::default()).unwrap();
/// assert_eq!(route.pattern, "wait {seconds:int}");
/// ```
pub fn compile(pattern: &str, metadata: RouteMetadata) -> Result<CompiledRoute, RouteError> {
    DEFAULT_COMPILER.compile(pattern, metadata)
}

/// Compiles patterns against a specific converter registry
#[derive(Debug, Clone, Default)]
pub struct RouteCompiler {
    registry: ConverterRegistry,
}

impl RouteCompiler {
    /// Compiler with the built-in converters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Registers a converter for routes compiled after this call
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.registry.register(name, func);
        self
    }

    /// Compiles `pattern` and every alias in `metadata.aliases`
    pub fn compile(
        &self,
        pattern: &str,
        metadata: RouteMetadata,
    ) -> Result<CompiledRoute, RouteError> {
        let mut route = self.compile_one(pattern, metadata.clone(), None)?;

        route.alias_routes = metadata
            .aliases
            .iter()
            .map(|alias| {
                let alias_meta = RouteMetadata {
                    aliases: Vec::new(),
                    ..metadata.clone()
                };
                self.compile_one(alias, alias_meta, Some(pattern))
            })
            .collect::<Result<_, _>>()?;

        Ok(route)
    }

    fn compile_one(
        &self,
        pattern: &str,
        metadata: RouteMetadata,
        alias_of: Option<&str>,
    ) -> Result<CompiledRoute, RouteError> {
        let syntax = parse_pattern(pattern)?;
        let segments = self
            .resolve_segments(&syntax)
            .map_err(|source| RouteError::Compile {
                pattern: pattern.to_string(),
                source,
            })?;
        let specificity = calculate_specificity(&syntax);

        tracing::trace!(pattern, specificity, alias_of = ?alias_of, "compiled route");

        Ok(CompiledRoute {
            pattern: pattern.to_string(),
            syntax,
            segments,
            specificity,
            order: 0,
            metadata,
            alias_of: alias_of.map(str::to_string),
            canonical_order: None,
            alias_routes: Vec::new(),
        })
    }

    fn resolve_segments(&self, syntax: &Syntax) -> Result<Vec<Segment>, CompileError> {
        syntax
            .segments
            .iter()
            .map(|segment| self.resolve_segment(segment))
            .collect()
    }

    fn resolve_segment(&self, segment: &SegmentSyntax) -> Result<Segment, CompileError> {
        Ok(match segment {
            SegmentSyntax::Literal { text } => Segment::Literal(text.clone()),
            SegmentSyntax::Parameter {
                name,
                type_constraint,
                is_optional,
                description,
            } => Segment::Parameter(ParameterMatcher {
                name: name.clone(),
                converter: self.resolve(name, type_constraint.as_deref())?,
                is_optional: *is_optional,
                description: description.clone(),
            }),
            SegmentSyntax::CatchAll {
                name,
                type_constraint,
                description,
            } => Segment::CatchAll(CatchAllMatcher {
                name: name.clone(),
                converter: self.resolve(name, type_constraint.as_deref())?,
                description: description.clone(),
            }),
            SegmentSyntax::Option(opt) => Segment::Option(self.resolve_option(opt)?),
        })
    }

    fn resolve_option(&self, opt: &OptionSyntax) -> Result<OptionMatcher, CompileError> {
        let value = match &opt.value {
            Some(value) => Some(OptionValueMatcher {
                name: value.name.clone(),
                converter: self.resolve(opt.name(), value.type_constraint.as_deref())?,
                is_optional: value.is_optional,
            }),
            None => None,
        };

        Ok(OptionMatcher {
            name: opt.name().to_string(),
            long_form: opt.long_form.clone(),
            short_form: opt.short_form.clone(),
            is_optional: opt.is_optional,
            value,
            is_repeated: opt.is_repeated,
            description: opt.description.clone(),
        })
    }

    fn resolve(
        &self,
        name: &str,
        type_name: Option<&str>,
    ) -> Result<Option<Converter>, CompileError> {
        match type_name {
            None => Ok(None),
            Some(type_name) => self
                .registry
                .get(type_name)
                .cloned()
                .map(Some)
                .ok_or_else(|| CompileError::UnknownType {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::route::{specificity, RouteKind};

    #[test]
    fn test_compile_literal_route() {
        let route = compile("status", RouteMetadata::default()).unwrap();
        assert_eq!(route.pattern, "status");
        assert_eq!(route.specificity, specificity::LITERAL_WEIGHT);
        assert!(matches!(&route.segments[..], [Segment::Literal(t)] if t == "status"));
    }

    #[test]
    fn test_compile_resolves_converters() {
        let route = compile("wait {seconds:int} --timeout {ms:long}", RouteMetadata::default())
            .unwrap();
        match &route.segments[1] {
            Segment::Parameter(p) => {
                assert_eq!(p.name, "seconds");
                assert_eq!(p.converter.as_ref().map(|c| c.name()), Some("int"));
            }
            other => panic!("expected parameter, got {:?}", other),
        }
        let opt = route.options().next().unwrap();
        assert_eq!(opt.name, "timeout");
        let value = opt.value.as_ref().unwrap();
        assert_eq!(value.name, "ms");
        assert_eq!(value.converter.as_ref().map(|c| c.name()), Some("long"));
    }

    #[test]
    fn test_untyped_parameter_has_no_converter() {
        let route = compile("greet {name}", RouteMetadata::default()).unwrap();
        match &route.segments[1] {
            Segment::Parameter(p) => assert!(p.converter.is_none()),
            other => panic!("expected parameter, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_compile_error() {
        let err = compile("get {id:widget}", RouteMetadata::default()).unwrap_err();
        match err {
            RouteError::Compile { pattern, source } => {
                assert_eq!(pattern, "get {id:widget}");
                assert_eq!(
                    source,
                    CompileError::UnknownType {
                        name: "id".to_string(),
                        type_name: "widget".to_string(),
                    }
                );
            }
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors_propagate() {
        let err = compile("run {*args} extra", RouteMetadata::default()).unwrap_err();
        assert!(matches!(
            err,
            RouteError::Parse {
                source: ParseError::CatchAllNotLast { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_custom_converter() {
        let mut compiler = RouteCompiler::new();
        compiler.register("color", |raw| match raw {
            "red" | "green" | "blue" => Ok(Value::String(raw.to_string())),
            _ => Err("not a color".to_string()),
        });
        let route = compiler
            .compile("paint {c:color}", RouteMetadata::default())
            .unwrap();
        assert_eq!(
            route.specificity,
            specificity::LITERAL_WEIGHT
                + specificity::TYPED_WEIGHT
                + specificity::REQUIRED_WEIGHT
                + specificity::PARAMETER_WEIGHT
        );

        // The default compiler does not know about it
        assert!(compile("paint {c:color}", RouteMetadata::default()).is_err());
    }

    #[test]
    fn test_aliases_compile_into_alias_routes() {
        let meta = RouteMetadata::default()
            .with_description("Deploy an environment")
            .with_kind(RouteKind::Command)
            .with_alias("d {env}");
        let route = compile("deploy {env}", meta).unwrap();

        assert_eq!(route.alias_routes.len(), 1);
        let alias = &route.alias_routes[0];
        assert_eq!(alias.pattern, "d {env}");
        assert_eq!(alias.alias_of.as_deref(), Some("deploy {env}"));
        assert_eq!(alias.canonical_pattern(), "deploy {env}");
        assert_eq!(alias.description(), Some("Deploy an environment"));
        assert_eq!(alias.kind(), RouteKind::Command);
        assert!(alias.metadata.aliases.is_empty());
        assert!(!route.is_alias());
    }

    #[test]
    fn test_invalid_alias_fails_whole_route() {
        let meta = RouteMetadata::default().with_alias("d {env");
        let err = compile("deploy {env}", meta).unwrap_err();
        assert_eq!(err.pattern(), Some("d {env"));
    }
}
