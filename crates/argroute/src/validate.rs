//! Static overlap detection
//!
//! Two routes with the same structure (literals, parameter arity and
//! optionality, option set) compete for the same argument vectors. Matching
//! never falls back after a conversion failure, so such routes are reported
//! here instead of being resolved at run time.

use std::collections::HashMap;
use std::fmt;

use crate::pattern::{SegmentSyntax, Syntax};
use crate::route::CompiledRoute;
use crate::table::RouteTable;

/// Canonical shape of a pattern with names and type constraints erased
///
/// `get {id:int} --verbose` and `get {key:guid} --verbose` share the
/// signature `get {} --verbose`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructureSignature(String);

impl StructureSignature {
    pub fn of(syntax: &Syntax) -> Self {
        Self(render(syntax, false))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders the shape; with `typed` the type constraints are kept
fn render(syntax: &Syntax, typed: bool) -> String {
    let ty = |constraint: &Option<String>| match constraint {
        Some(name) if typed => format!(":{}", name),
        _ => String::new(),
    };

    let mut parts: Vec<String> = syntax
        .positional()
        .map(|segment| match segment {
            SegmentSyntax::Literal { text } => text.clone(),
            SegmentSyntax::Parameter {
                type_constraint,
                is_optional,
                ..
            } => format!(
                "{{{}{}}}",
                ty(type_constraint),
                if *is_optional { "?" } else { "" }
            ),
            SegmentSyntax::CatchAll {
                type_constraint, ..
            } => format!("{{*{}}}", ty(type_constraint)),
            SegmentSyntax::Option(_) => String::new(),
        })
        .collect();

    let mut options: Vec<_> = syntax.options().collect();
    options.sort_by(|a, b| a.name().cmp(b.name()));
    for opt in options {
        let mut part = match &opt.long_form {
            Some(long) => format!("--{}", long),
            None => format!("-{}", opt.name()),
        };
        if opt.is_optional && opt.expects_value() {
            part.push('?');
        }
        if let Some(value) = &opt.value {
            part.push_str(&format!(
                " {{{}{}}}",
                ty(&value.type_constraint),
                if value.is_optional { "?" } else { "" }
            ));
            if opt.is_repeated {
                part.push('*');
            }
        }
        parts.push(part);
    }

    parts.join(" ")
}

/// Advisory finding about a group of overlapping routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Same structure and the same type constraints: the later routes can
    /// never be selected
    DuplicateRoute {
        signature: StructureSignature,
        patterns: Vec<String>,
    },
    /// Same structure, different type constraints: a value that fails the
    /// first route's converter is an error, not a fallback
    AmbiguousTypedRoutes {
        signature: StructureSignature,
        patterns: Vec<String>,
    },
}

impl Diagnostic {
    pub fn signature(&self) -> &StructureSignature {
        match self {
            Diagnostic::DuplicateRoute { signature, .. }
            | Diagnostic::AmbiguousTypedRoutes { signature, .. } => signature,
        }
    }

    /// Patterns in the group, in declaration order
    pub fn patterns(&self) -> &[String] {
        match self {
            Diagnostic::DuplicateRoute { patterns, .. }
            | Diagnostic::AmbiguousTypedRoutes { patterns, .. } => patterns,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self
            .patterns()
            .iter()
            .map(|p| format!("`{}`", p))
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            Diagnostic::DuplicateRoute { signature, .. } => {
                write!(f, "duplicate routes {} (shape `{}`)", list, signature)
            }
            Diagnostic::AmbiguousTypedRoutes { signature, .. } => write!(
                f,
                "routes {} differ only by type constraints (shape `{}`)",
                list, signature
            ),
        }
    }
}

/// Splits `items` into groups of equal key, keeping first-seen order
fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + std::hash::Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

fn patterns_of(routes: &[&CompiledRoute]) -> Vec<String> {
    routes.iter().map(|r| r.pattern.clone()).collect()
}

/// Groups the table's routes by signature and reports every group of two or more
///
/// A group whose members carry different type constraints yields one
/// [`Diagnostic::AmbiguousTypedRoutes`] naming all of them. Inside a group,
/// every set of routes that also agree on type constraints yields a
/// [`Diagnostic::DuplicateRoute`], so an exact duplicate is reported even when
/// its group is ambiguous as well.
pub fn validate(table: &RouteTable) -> Vec<Diagnostic> {
    let mut declared: Vec<&CompiledRoute> = table.routes().iter().collect();
    declared.sort_by_key(|r| r.order);

    let mut diagnostics = Vec::new();
    for (signature, routes) in group_by(declared, |r| StructureSignature::of(&r.syntax)) {
        if routes.len() < 2 {
            continue;
        }

        let typed = group_by(routes.iter().copied(), |r| render(&r.syntax, true));
        if typed.len() > 1 {
            diagnostics.push(Diagnostic::AmbiguousTypedRoutes {
                signature: signature.clone(),
                patterns: patterns_of(&routes),
            });
        }
        for (_, same) in typed.into_iter().filter(|(_, same)| same.len() > 1) {
            diagnostics.push(Diagnostic::DuplicateRoute {
                signature: signature.clone(),
                patterns: patterns_of(&same),
            });
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;
    use pretty_assertions::assert_eq;

    fn signature(pattern: &str) -> String {
        StructureSignature::of(&parse_pattern(pattern).unwrap()).to_string()
    }

    fn table(patterns: &[&str]) -> RouteTable {
        let mut builder = RouteTable::builder();
        for pattern in patterns {
            builder.route(pattern).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_signature_erases_names_and_types() {
        assert_eq!(signature("get {id:int}"), "get {}");
        assert_eq!(signature("get {key:guid}"), "get {}");
        assert_eq!(signature("get {id?}"), "get {?}");
        assert_eq!(signature("run {*args:int}"), "run {*}");
    }

    #[test]
    fn test_signature_sorts_options() {
        assert_eq!(
            signature("build --verbose --release"),
            signature("build --release --verbose")
        );
        assert_eq!(signature("build --out {dir} -v"), "build --out {} -v");
        assert_eq!(signature("tag --label? {l}*"), "tag --label? {}*");
    }

    #[test]
    fn test_distinct_routes_have_no_diagnostics() {
        let t = table(&["status", "deploy {env}", "deploy {env} --force"]);
        assert!(validate(&t).is_empty());
    }

    #[test]
    fn test_typed_overlap_is_ambiguous() {
        let t = table(&["get {id:int}", "get {id:guid}"]);
        let diagnostics = validate(&t);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::AmbiguousTypedRoutes {
                signature: StructureSignature("get {}".to_string()),
                patterns: vec!["get {id:int}".to_string(), "get {id:guid}".to_string()],
            }]
        );
    }

    #[test]
    fn test_identical_routes_are_duplicates() {
        let t = table(&["greet {name}", "greet {who}"]);
        let diagnostics = validate(&t);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::DuplicateRoute { .. }));
        assert_eq!(diagnostics[0].patterns(), ["greet {name}", "greet {who}"]);
    }

    #[test]
    fn test_duplicate_inside_ambiguous_group_is_named() {
        let t = table(&["get {x:int}", "get {x:guid}", "get {y:int}"]);
        let signature = StructureSignature("get {}".to_string());
        assert_eq!(
            validate(&t),
            vec![
                Diagnostic::AmbiguousTypedRoutes {
                    signature: signature.clone(),
                    patterns: vec![
                        "get {x:int}".to_string(),
                        "get {x:guid}".to_string(),
                        "get {y:int}".to_string(),
                    ],
                },
                Diagnostic::DuplicateRoute {
                    signature,
                    patterns: vec!["get {x:int}".to_string(), "get {y:int}".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_groups_reported_in_declaration_order() {
        let t = table(&[
            "b {x:int}",
            "a {x}",
            "b {x:guid}",
            "a {y}",
            "b {x:double}",
        ]);
        let diagnostics = validate(&t);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].signature().as_str(), "b {}");
        assert_eq!(diagnostics[0].patterns().len(), 3);
        assert_eq!(diagnostics[1].signature().as_str(), "a {}");
    }

    #[test]
    fn test_display_lists_patterns() {
        let t = table(&["get {id:int}", "get {id:guid}"]);
        let text = validate(&t)[0].to_string();
        assert!(text.contains("`get {id:int}`"));
        assert!(text.contains("`get {id:guid}`"));
    }
}
