//! Argument matching
//!
//! Candidates are tried in table order (most specific first). A candidate is
//! accepted on structure alone: option extraction, then positional
//! consumption. Only the accepted route has its captured text converted, so a
//! malformed value is reported as a [`ConversionError`] instead of silently
//! falling through to a less specific route.

use std::collections::{BTreeSet, HashMap};

use crate::convert::Converter;
use crate::error::ConversionError;
use crate::route::{CompiledRoute, OptionMatcher, Segment};
use crate::table::RouteTable;
use crate::value::{FromValue, Value};

/// Outcome of matching an argument vector against a table
#[derive(Debug)]
pub enum MatchResult<'t> {
    NoMatch,
    Matched(RouteMatch<'t>),
}

impl<'t> MatchResult<'t> {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn matched(&self) -> Option<&RouteMatch<'t>> {
        match self {
            MatchResult::Matched(m) => Some(m),
            MatchResult::NoMatch => None,
        }
    }

    pub fn into_match(self) -> Option<RouteMatch<'t>> {
        match self {
            MatchResult::Matched(m) => Some(m),
            MatchResult::NoMatch => None,
        }
    }
}

/// The winning route with every bound name converted
#[derive(Debug)]
pub struct RouteMatch<'t> {
    pub route: &'t CompiledRoute,
    /// Every parameter, catch-all and option of the route, present or not
    pub values: HashMap<String, Value>,
    /// Options whose flag appeared on the command line
    pub present_options: BTreeSet<String>,
}

impl RouteMatch<'_> {
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Typed lookup; `None` when the name is unbound or has another type
    pub fn get<T: FromValue>(&self, name: &str) -> Option<T> {
        self.values.get(name).and_then(T::from_value)
    }

    pub fn is_present(&self, option: &str) -> bool {
        self.present_options.contains(option)
    }

    pub fn pattern(&self) -> &str {
        &self.route.pattern
    }
}

/// Selects the first route in `table` that accepts `args`
///
/// # Examples
///
/// ```
/// use argroute::{match_args, RouteTable};
///
/// let mut builder = RouteTable::builder();
/// builder.route("deploy {env} --force").unwrap();
/// let table = builder.build();
///
/// let result = match_args(&table, &["deploy", "prod", "--force"]).unwrap();
/// let m = result.matched().unwrap();
/// assert_eq!(m.get::<String>("env").as_deref(), Some("prod"));
/// assert_eq!(m.get::<bool>("force"), Some(true));
/// ```
pub fn match_args<'t, S: AsRef<str>>(
    table: &'t RouteTable,
    args: &[S],
) -> Result<MatchResult<'t>, ConversionError> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

    for route in table.routes() {
        let Some(captures) = accept(route, &args) else {
            tracing::trace!(pattern = %route.pattern, "route rejected");
            continue;
        };

        let (values, present_options) = bind(route, captures).map_err(|err| {
            tracing::debug!(pattern = %route.pattern, error = %err, "conversion failed");
            err
        })?;
        tracing::debug!(pattern = %route.pattern, "matched route");

        return Ok(MatchResult::Matched(RouteMatch {
            route,
            values,
            present_options,
        }));
    }

    tracing::debug!(args = ?args, "no route matched");
    Ok(MatchResult::NoMatch)
}

/// Raw text captured for one segment before conversion
#[derive(Debug, Clone, PartialEq)]
enum Capture<'a> {
    Absent,
    One(&'a str),
    Many(Vec<&'a str>),
    /// Option flag present without a value
    Flag,
}

/// Positional argument left after option extraction
#[derive(Debug, Clone, Copy)]
struct Positional<'a> {
    text: &'a str,
    /// Came after a bare `--`
    escaped: bool,
}

/// `--word` or `-letter…`; negative numbers and a lone `-` are positional
fn looks_like_option(arg: &str) -> bool {
    if let Some(rest) = arg.strip_prefix("--") {
        return !rest.is_empty();
    }
    arg.strip_prefix('-')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_alphabetic())
}

fn is_declared_form(route: &CompiledRoute, arg: &str) -> bool {
    route.options().any(|opt| opt.match_flag(arg).is_some())
}

fn find_option<'r, 'a>(
    route: &'r CompiledRoute,
    arg: &'a str,
) -> Option<(usize, &'r OptionMatcher, Option<&'a str>)> {
    route
        .segments
        .iter()
        .enumerate()
        .find_map(|(index, segment)| match segment {
            Segment::Option(opt) => opt.match_flag(arg).map(|inline| (index, opt, inline)),
            _ => None,
        })
}

/// Structural check; captures are aligned with `route.segments`
fn accept<'a>(route: &CompiledRoute, args: &[&'a str]) -> Option<Vec<Capture<'a>>> {
    let mut captures = vec![Capture::Absent; route.segments.len()];
    let positional = extract_options(route, args, &mut captures)?;

    let missing_required = route
        .segments
        .iter()
        .zip(&captures)
        .any(|(segment, capture)| {
            matches!(segment, Segment::Option(opt) if !opt.is_optional)
                && *capture == Capture::Absent
        });
    if missing_required {
        return None;
    }

    consume_positional(route, &positional, &mut captures)?;
    Some(captures)
}

fn extract_options<'a>(
    route: &CompiledRoute,
    args: &[&'a str],
    captures: &mut [Capture<'a>],
) -> Option<Vec<Positional<'a>>> {
    let mut positional = Vec::new();
    let mut escaped = false;
    let mut i = 0;

    while i < args.len() {
        let arg = args[i];
        i += 1;

        if escaped {
            positional.push(Positional { text: arg, escaped });
            continue;
        }
        if arg == "--" {
            escaped = true;
            continue;
        }

        let Some((index, opt, inline)) = find_option(route, arg) else {
            positional.push(Positional { text: arg, escaped });
            continue;
        };

        let Some(value) = &opt.value else {
            // Boolean flags take no value
            if inline.is_some() {
                return None;
            }
            captures[index] = Capture::Flag;
            continue;
        };

        let raw = match inline {
            Some(raw) => Some(raw),
            None => {
                let next = args.get(i).copied().filter(|next| {
                    *next != "--"
                        && if value.is_optional {
                            !looks_like_option(next)
                        } else {
                            !is_declared_form(route, next)
                        }
                });
                if next.is_some() {
                    i += 1;
                }
                next
            }
        };

        let capture = &mut captures[index];
        match (raw, opt.is_repeated) {
            (Some(raw), true) => match capture {
                Capture::Many(values) => values.push(raw),
                _ => *capture = Capture::Many(vec![raw]),
            },
            (Some(raw), false) => *capture = Capture::One(raw),
            (None, _) if !value.is_optional => return None,
            (None, true) => {
                if !matches!(capture, Capture::Many(_)) {
                    *capture = Capture::Many(Vec::new());
                }
            }
            (None, false) => *capture = Capture::Flag,
        }
    }

    Some(positional)
}

fn consume_positional<'a>(
    route: &CompiledRoute,
    args: &[Positional<'a>],
    captures: &mut [Capture<'a>],
) -> Option<()> {
    let mut pos = 0;

    for (index, segment) in route.segments.iter().enumerate() {
        match segment {
            Segment::Literal(text) => match args.get(pos) {
                Some(arg) if arg.text == text.as_str() => pos += 1,
                _ => return None,
            },
            Segment::Parameter(param) => match args.get(pos) {
                Some(arg) if arg.escaped || !looks_like_option(arg.text) => {
                    captures[index] = Capture::One(arg.text);
                    pos += 1;
                }
                _ if param.is_optional => {}
                _ => return None,
            },
            Segment::CatchAll(_) => {
                let rest = args.get(pos..).unwrap_or_default();
                captures[index] = Capture::Many(rest.iter().map(|arg| arg.text).collect());
                pos = args.len();
            }
            Segment::Option(_) => {}
        }
    }

    // Leftover arguments reject the route
    (pos == args.len()).then_some(())
}

fn convert(name: &str, converter: Option<&Converter>, raw: &str) -> Result<Value, ConversionError> {
    match converter {
        None => Ok(Value::String(raw.to_string())),
        Some(converter) => converter.convert(raw).map_err(|reason| ConversionError {
            name: name.to_string(),
            type_name: converter.name().to_string(),
            value: raw.to_string(),
            reason,
        }),
    }
}

fn convert_all(
    name: &str,
    converter: Option<&Converter>,
    raws: &[&str],
) -> Result<Value, ConversionError> {
    raws.iter()
        .map(|raw| convert(name, converter, raw))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn bind(
    route: &CompiledRoute,
    captures: Vec<Capture<'_>>,
) -> Result<(HashMap<String, Value>, BTreeSet<String>), ConversionError> {
    let mut values = HashMap::new();
    let mut present = BTreeSet::new();

    for (segment, capture) in route.segments.iter().zip(captures) {
        let (name, value) = match segment {
            Segment::Literal(_) => continue,
            Segment::Parameter(param) => {
                let value = match capture {
                    Capture::One(raw) => convert(&param.name, param.converter.as_ref(), raw)?,
                    _ => Value::Null,
                };
                (&param.name, value)
            }
            Segment::CatchAll(catch_all) => {
                let raws = match capture {
                    Capture::Many(raws) => raws,
                    _ => Vec::new(),
                };
                let value = convert_all(&catch_all.name, catch_all.converter.as_ref(), &raws)?;
                (&catch_all.name, value)
            }
            Segment::Option(opt) => {
                let was_present = capture != Capture::Absent;
                if was_present {
                    present.insert(opt.name.clone());
                }
                let converter = opt.value.as_ref().and_then(|v| v.converter.as_ref());
                let value = match (&opt.value, capture) {
                    (None, _) => Value::Bool(was_present),
                    (Some(_), Capture::Many(raws)) => convert_all(&opt.name, converter, &raws)?,
                    (Some(_), _) if opt.is_repeated => Value::List(Vec::new()),
                    (Some(_), Capture::One(raw)) => convert(&opt.name, converter, raw)?,
                    (Some(_), _) => Value::Null,
                };
                (&opt.name, value)
            }
        };
        values.insert(name.clone(), value);
    }

    Ok((values, present))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteMetadata;

    fn table(patterns: &[&str]) -> RouteTable {
        let mut builder = RouteTable::builder();
        for pattern in patterns {
            builder.route(pattern).unwrap();
        }
        builder.build()
    }

    fn matched<'t>(table: &'t RouteTable, args: &[&str]) -> RouteMatch<'t> {
        match match_args(table, args).unwrap() {
            MatchResult::Matched(m) => m,
            MatchResult::NoMatch => panic!("expected a match for {:?}", args),
        }
    }

    fn no_match(table: &RouteTable, args: &[&str]) -> bool {
        matches!(match_args(table, args), Ok(MatchResult::NoMatch))
    }

    #[test]
    fn test_looks_like_option() {
        assert!(looks_like_option("--force"));
        assert!(looks_like_option("-f"));
        assert!(looks_like_option("-abc"));
        assert!(!looks_like_option("-5"));
        assert!(!looks_like_option("-1.5"));
        assert!(!looks_like_option("-"));
        assert!(!looks_like_option("--"));
        assert!(!looks_like_option("value"));
    }

    #[test]
    fn test_literal_exact_match() {
        let t = table(&["status"]);
        assert_eq!(matched(&t, &["status"]).pattern(), "status");
        assert!(no_match(&t, &["Status"]));
        assert!(no_match(&t, &["status", "extra"]));
        assert!(no_match(&t, &[]));
    }

    #[test]
    fn test_flag_present_and_absent() {
        let t = table(&["deploy {env} --force,-f"]);

        let m = matched(&t, &["deploy", "prod", "-f"]);
        assert_eq!(m.get::<bool>("force"), Some(true));
        assert!(m.is_present("force"));

        let m = matched(&t, &["deploy", "prod"]);
        assert_eq!(m.get::<bool>("force"), Some(false));
        assert!(!m.is_present("force"));
        assert!(m.present_options.is_empty());
    }

    #[test]
    fn test_options_anywhere_in_args() {
        let t = table(&["deploy {env} --force"]);
        let m = matched(&t, &["deploy", "--force", "prod"]);
        assert_eq!(m.get::<String>("env").as_deref(), Some("prod"));
    }

    #[test]
    fn test_flag_rejects_inline_value() {
        let t = table(&["deploy --force"]);
        assert!(no_match(&t, &["deploy", "--force=yes"]));
    }

    #[test]
    fn test_required_value_option() {
        let t = table(&["build --config {path}"]);
        let m = matched(&t, &["build", "--config", "app.toml"]);
        assert_eq!(m.get::<String>("config").as_deref(), Some("app.toml"));

        let m = matched(&t, &["build", "--config=alt.toml"]);
        assert_eq!(m.get::<String>("config").as_deref(), Some("alt.toml"));

        // Required option absent
        assert!(no_match(&t, &["build"]));
        // Value missing
        assert!(no_match(&t, &["build", "--config"]));
    }

    #[test]
    fn test_optional_value_option_absent_binds_null() {
        let t = table(&["build --config? {path}"]);
        let m = matched(&t, &["build"]);
        assert_eq!(m.value("config"), Some(&Value::Null));
        assert!(!m.is_present("config"));
    }

    #[test]
    fn test_optional_option_missing_value_is_no_match() {
        let t = table(&["build --config? {path}"]);
        assert!(no_match(&t, &["build", "--config"]));
    }

    #[test]
    fn test_optional_value_slot() {
        let t = table(&["log --level {lvl?} {*rest}"]);
        let m = matched(&t, &["log", "--level", "--", "x"]);
        assert_eq!(m.value("level"), Some(&Value::Null));
        assert!(m.is_present("level"));
        assert_eq!(m.get::<Vec<String>>("rest"), Some(vec!["x".to_string()]));

        let m = matched(&t, &["log", "--level", "debug"]);
        assert_eq!(m.get::<String>("level").as_deref(), Some("debug"));
    }

    #[test]
    fn test_required_value_can_look_like_a_number() {
        let t = table(&["move --offset {n:int}"]);
        let m = matched(&t, &["move", "--offset", "-3"]);
        assert_eq!(m.get::<i32>("offset"), Some(-3));
    }

    #[test]
    fn test_required_value_skips_declared_form() {
        let t = table(&["run --name {n} --force"]);
        assert!(no_match(&t, &["run", "--name", "--force"]));
    }

    #[test]
    fn test_repeated_option_collects_values() {
        let t = table(&["tag --label? {l}*"]);
        let m = matched(&t, &["tag", "--label", "a", "--label", "b"]);
        assert_eq!(
            m.get::<Vec<String>>("label"),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        let m = matched(&t, &["tag"]);
        assert_eq!(m.value("label"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_non_repeated_option_last_wins() {
        let t = table(&["build --target? {t}"]);
        let m = matched(&t, &["build", "--target", "a", "--target", "b"]);
        assert_eq!(m.get::<String>("target").as_deref(), Some("b"));
    }

    #[test]
    fn test_optional_parameter() {
        let t = table(&["greet {name?}"]);
        let m = matched(&t, &["greet"]);
        assert_eq!(m.value("name"), Some(&Value::Null));
        assert_eq!(m.get::<Option<String>>("name"), Some(None));

        let m = matched(&t, &["greet", "ada"]);
        assert_eq!(m.get::<String>("name").as_deref(), Some("ada"));
    }

    #[test]
    fn test_parameter_never_binds_option_text() {
        let t = table(&["greet {name}"]);
        assert!(no_match(&t, &["greet", "--loud"]));
        let m = matched(&t, &["greet", "--", "--loud"]);
        assert_eq!(m.get::<String>("name").as_deref(), Some("--loud"));
    }

    #[test]
    fn test_negative_number_parameter() {
        let t = table(&["add {a:int} {b:int}"]);
        let m = matched(&t, &["add", "-2", "5"]);
        assert_eq!(m.get::<i32>("a"), Some(-2));
        assert_eq!(m.get::<i32>("b"), Some(5));
    }

    #[test]
    fn test_catch_all_takes_rest() {
        let t = table(&["run {*args}"]);
        let m = matched(&t, &["run", "a", "--verbose", "b"]);
        assert_eq!(
            m.get::<Vec<String>>("args"),
            Some(vec!["a".to_string(), "--verbose".to_string(), "b".to_string()])
        );

        let m = matched(&t, &["run"]);
        assert_eq!(m.value("args"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_typed_catch_all_converts_each() {
        let t = table(&["sum {*n:int}"]);
        let m = matched(&t, &["sum", "1", "2", "3"]);
        assert_eq!(m.get::<Vec<i32>>("n"), Some(vec![1, 2, 3]));

        let err = match_args(&t, &["sum", "1", "x"]).unwrap_err();
        assert_eq!(err.name, "n");
        assert_eq!(err.value, "x");
    }

    #[test]
    fn test_conversion_error_does_not_fall_back() {
        let t = table(&["wait {seconds:int}", "wait {label}"]);
        let err = match_args(&t, &["wait", "soon"]).unwrap_err();
        assert_eq!(err.name, "seconds");
        assert_eq!(err.type_name, "int");
        assert_eq!(err.value, "soon");
    }

    #[test]
    fn test_option_value_conversion_error() {
        let t = table(&["serve --port {p:ushort}"]);
        let err = match_args(&t, &["serve", "--port", "99999"]).unwrap_err();
        assert_eq!(err.name, "port");
        assert_eq!(err.type_name, "ushort");
    }

    #[test]
    fn test_specific_route_wins() {
        let t = table(&["git {cmd}", "git status"]);
        assert_eq!(matched(&t, &["git", "status"]).pattern(), "git status");
        assert_eq!(matched(&t, &["git", "log"]).pattern(), "git {cmd}");
    }

    #[test]
    fn test_custom_converter_through_builder() {
        let mut builder = RouteTable::builder();
        builder.register_converter("upper", |raw| Ok(Value::String(raw.to_uppercase())));
        builder
            .route_with("shout {word:upper}", RouteMetadata::default())
            .unwrap();
        let t = builder.build();
        let m = matched(&t, &["shout", "hi"]);
        assert_eq!(m.get::<String>("word").as_deref(), Some("HI"));
    }
}
