//! Pattern parser
//!
//! Turns the token stream into an ordered list of segment syntax nodes and
//! enforces the grammar rules that do not depend on the type system. Type
//! names are carried through as plain strings; the compiler resolves them.

use std::collections::HashSet;
use std::fmt;

use super::lexer::{tokenize, Token, TokenKind};
use crate::error::{ParseError, RouteError};

/// Parsed form of a whole pattern
///
/// Positional segments keep their declared order and come first; option
/// segments follow in declared order. Options are order-independent, so this
/// normalization does not change what a pattern means.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Syntax {
    pub segments: Vec<SegmentSyntax>,
}

/// One unit of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSyntax {
    /// Exact word: `deploy`
    Literal { text: String },
    /// `{name}`, `{name:type}`, `{name?}`
    Parameter {
        name: String,
        type_constraint: Option<String>,
        is_optional: bool,
        description: Option<String>,
    },
    /// `--long,-s`, optionally taking a value
    Option(OptionSyntax),
    /// `{*name}`: every remaining positional argument
    CatchAll {
        name: String,
        type_constraint: Option<String>,
        description: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSyntax {
    pub long_form: Option<String>,
    pub short_form: Option<String>,
    /// Flags without a value are always optional
    pub is_optional: bool,
    pub value: Option<OptionValueSyntax>,
    /// `{value}*`: the option may repeat and collects every value
    pub is_repeated: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValueSyntax {
    pub name: String,
    pub type_constraint: Option<String>,
    /// `{value?}`: the flag may appear without a value
    pub is_optional: bool,
    pub description: Option<String>,
}

impl OptionSyntax {
    /// Name the option's value is bound under: the long form when present
    pub fn name(&self) -> &str {
        self.long_form
            .as_deref()
            .or(self.short_form.as_deref())
            .unwrap_or_default()
    }

    pub fn expects_value(&self) -> bool {
        self.value.is_some()
    }

    /// Every spelling of this option as it appears on a command line
    pub fn forms(&self) -> impl Iterator<Item = String> + '_ {
        self.long_form
            .iter()
            .map(|l| format!("--{}", l))
            .chain(self.short_form.iter().map(|s| format!("-{}", s)))
    }
}

impl SegmentSyntax {
    pub fn is_positional(&self) -> bool {
        !matches!(self, SegmentSyntax::Option(_))
    }

    /// Name bound by this segment; literals bind nothing
    pub fn bound_name(&self) -> Option<&str> {
        match self {
            SegmentSyntax::Literal { .. } => None,
            SegmentSyntax::Parameter { name, .. } | SegmentSyntax::CatchAll { name, .. } => {
                Some(name)
            }
            SegmentSyntax::Option(opt) => Some(opt.name()),
        }
    }
}

impl Syntax {
    pub fn positional(&self) -> impl Iterator<Item = &SegmentSyntax> {
        self.segments.iter().filter(|s| s.is_positional())
    }

    pub fn options(&self) -> impl Iterator<Item = &OptionSyntax> {
        self.segments.iter().filter_map(|s| match s {
            SegmentSyntax::Option(opt) => Some(opt),
            _ => None,
        })
    }

    /// Pattern text without descriptions, for usage lines
    pub fn usage(&self) -> String {
        Render {
            syntax: self,
            descriptions: false,
        }
        .to_string()
    }
}

/// Renders the canonical pattern, descriptions included
impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Render {
            syntax: self,
            descriptions: true,
        }
        .fmt(f)
    }
}

struct Render<'a> {
    syntax: &'a Syntax,
    descriptions: bool,
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.syntax.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            self.write_segment(f, segment)?;
        }
        Ok(())
    }
}

impl Render<'_> {
    fn write_description(&self, f: &mut fmt::Formatter<'_>, desc: &Option<String>) -> fmt::Result {
        match desc {
            Some(text) if self.descriptions => write!(f, "|{}", text),
            _ => Ok(()),
        }
    }

    fn write_segment(&self, f: &mut fmt::Formatter<'_>, segment: &SegmentSyntax) -> fmt::Result {
        match segment {
            SegmentSyntax::Literal { text } => f.write_str(text),
            SegmentSyntax::Parameter {
                name,
                type_constraint,
                is_optional,
                description,
            } => {
                write!(f, "{{{}", name)?;
                if let Some(ty) = type_constraint {
                    write!(f, ":{}", ty)?;
                }
                if *is_optional {
                    f.write_str("?")?;
                }
                self.write_description(f, description)?;
                f.write_str("}")
            }
            SegmentSyntax::CatchAll {
                name,
                type_constraint,
                description,
            } => {
                write!(f, "{{*{}", name)?;
                if let Some(ty) = type_constraint {
                    write!(f, ":{}", ty)?;
                }
                self.write_description(f, description)?;
                f.write_str("}")
            }
            SegmentSyntax::Option(opt) => {
                match (&opt.long_form, &opt.short_form) {
                    (Some(long), Some(short)) => write!(f, "--{},-{}", long, short)?,
                    (Some(long), None) => write!(f, "--{}", long)?,
                    (None, Some(short)) => write!(f, "-{}", short)?,
                    (None, None) => {}
                }
                if let Some(value) = &opt.value {
                    if opt.is_optional {
                        f.write_str("?")?;
                    }
                    write!(f, " {{{}", value.name)?;
                    if let Some(ty) = &value.type_constraint {
                        write!(f, ":{}", ty)?;
                    }
                    if value.is_optional {
                        f.write_str("?")?;
                    }
                    self.write_description(f, &value.description)?;
                    f.write_str("}")?;
                    if opt.is_repeated {
                        f.write_str("*")?;
                    }
                }
                self.write_description(f, &opt.description)
            }
        }
    }
}

/// Lexes and parses a pattern, attaching the pattern text to any error
///
/// # Examples
///
/// ```
/// use argroute::pattern::parser::{parse_pattern, SegmentSyntax};
///
/// let syntax = parse_pattern("deploy {env} --force,-f").unwrap();
/// assert_eq!(syntax.segments.len(), 3);
/// assert!(matches!(syntax.segments[0], SegmentSyntax::Literal { .. }));
/// assert_eq!(syntax.to_string(), "deploy {env} --force,-f");
/// ```
pub fn parse_pattern(pattern: &str) -> Result<Syntax, RouteError> {
    let tokens = tokenize(pattern).map_err(|source| RouteError::Lex {
        pattern: pattern.to_string(),
        source,
    })?;
    parse(&tokens).map_err(|source| RouteError::Parse {
        pattern: pattern.to_string(),
        source,
    })
}

/// Builds segment syntax from a token stream
pub fn parse(tokens: &[Token]) -> Result<Syntax, ParseError> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut positional = Vec::new();
    let mut options = Vec::new();

    while let Some(token) = parser.skip_whitespace() {
        match &token.kind {
            TokenKind::Literal(text) => {
                parser.pos += 1;
                positional.push(SegmentSyntax::Literal { text: text.clone() });
            }
            TokenKind::LeftBrace => positional.push(parser.parse_positional()?),
            TokenKind::LongOption(_) | TokenKind::ShortOption(_) => {
                options.push(SegmentSyntax::Option(parser.parse_option()?))
            }
            TokenKind::DescriptionSeparator => {
                return Err(ParseError::DanglingDescription {
                    offset: token.offset,
                })
            }
            other => return Err(unexpected(token.offset, other)),
        }
        parser.expect_separator()?;
    }

    positional.extend(options);
    let syntax = Syntax {
        segments: positional,
    };
    check_rules(&syntax)?;
    Ok(syntax)
}

fn unexpected(offset: usize, kind: &TokenKind) -> ParseError {
    ParseError::UnexpectedToken {
        offset,
        found: kind.describe(),
    }
}

/// Contents of one `{...}` group
struct BraceGroup {
    catch_all: bool,
    name: String,
    type_constraint: Option<String>,
    is_optional: bool,
    description: Option<String>,
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> Option<&'t Token> {
        while self.peek_kind() == Some(&TokenKind::Whitespace) {
            self.pos += 1;
        }
        self.peek()
    }

    /// Segments must be separated by whitespace (or end the pattern)
    fn expect_separator(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(Token {
                kind: TokenKind::Whitespace,
                ..
            }) => {
                self.pos += 1;
                Ok(())
            }
            Some(Token {
                kind: TokenKind::DescriptionSeparator,
                offset,
            }) => Err(ParseError::DanglingDescription { offset: *offset }),
            Some(token) => Err(unexpected(token.offset, &token.kind)),
        }
    }

    fn expect_end(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => unexpected(token.offset, &token.kind),
            None => ParseError::UnexpectedEnd { expected },
        }
    }

    /// `|text` if present
    fn parse_description(&mut self) -> Result<Option<String>, ParseError> {
        if !self.eat(&TokenKind::DescriptionSeparator) {
            return Ok(None);
        }
        match self.next() {
            Some(Token {
                kind: TokenKind::Description(text),
                ..
            }) => Ok(Some(text.clone())),
            _ => Err(ParseError::UnexpectedEnd {
                expected: "description text",
            }),
        }
    }

    fn parse_brace_group(&mut self) -> Result<BraceGroup, ParseError> {
        if !self.eat(&TokenKind::LeftBrace) {
            return Err(self.expect_end("'{'"));
        }
        let catch_all = self.eat(&TokenKind::CatchAllMarker);

        let name = match self.peek_kind() {
            Some(TokenKind::ParameterName(name)) => {
                self.pos += 1;
                name.clone()
            }
            _ => return Err(self.expect_end("parameter name")),
        };

        let type_constraint = match self.peek_kind() {
            Some(TokenKind::TypeName(ty)) => {
                self.pos += 1;
                Some(ty.clone())
            }
            _ => None,
        };

        let is_optional = self.eat(&TokenKind::OptionalMarker);
        let description = self.parse_description()?;

        if !self.eat(&TokenKind::RightBrace) {
            return Err(self.expect_end("'}'"));
        }

        Ok(BraceGroup {
            catch_all,
            name,
            type_constraint,
            is_optional,
            description,
        })
    }

    fn parse_positional(&mut self) -> Result<SegmentSyntax, ParseError> {
        let group = self.parse_brace_group()?;
        let description = self.parse_description()?.or(group.description);

        if group.catch_all {
            if group.is_optional {
                return Err(ParseError::OptionalCatchAll { name: group.name });
            }
            return Ok(SegmentSyntax::CatchAll {
                name: group.name,
                type_constraint: group.type_constraint,
                description,
            });
        }

        Ok(SegmentSyntax::Parameter {
            name: group.name,
            type_constraint: group.type_constraint,
            is_optional: group.is_optional,
            description,
        })
    }

    fn parse_option(&mut self) -> Result<OptionSyntax, ParseError> {
        let (long_form, short_form) = match self.next().map(|t| &t.kind) {
            Some(TokenKind::LongOption(long)) => {
                let short = if self.eat(&TokenKind::Comma) {
                    match self.next().map(|t| &t.kind) {
                        Some(TokenKind::ShortOption(short)) => Some(short.clone()),
                        _ => {
                            return Err(ParseError::UnexpectedEnd {
                                expected: "short option after ','",
                            })
                        }
                    }
                } else {
                    None
                };
                (Some(long.clone()), short)
            }
            Some(TokenKind::ShortOption(short)) => (None, Some(short.clone())),
            _ => return Err(self.expect_end("option")),
        };

        let marked_optional = self.eat(&TokenKind::OptionalMarker);
        let mut description = self.parse_description()?;

        let takes_value = description.is_none()
            && self.peek_kind() == Some(&TokenKind::Whitespace)
            && self.tokens.get(self.pos + 1).map(|t| &t.kind) == Some(&TokenKind::LeftBrace);

        let mut value = None;
        let mut is_repeated = false;
        if takes_value {
            self.pos += 1;
            let group = self.parse_brace_group()?;
            if group.catch_all {
                return Err(ParseError::CatchAllOptionValue { name: group.name });
            }
            value = Some(OptionValueSyntax {
                name: group.name,
                type_constraint: group.type_constraint,
                is_optional: group.is_optional,
                description: group.description,
            });
            is_repeated = self.eat(&TokenKind::RepeatMarker);
            description = self.parse_description()?;
        }

        Ok(OptionSyntax {
            long_form,
            short_form,
            is_optional: marked_optional || value.is_none(),
            value,
            is_repeated,
            description,
        })
    }
}

/// Grammar rules that need the whole segment list
fn check_rules(syntax: &Syntax) -> Result<(), ParseError> {
    let mut catch_all: Option<&str> = None;
    let mut first_optional: Option<&str> = None;

    for segment in syntax.positional() {
        if let Some(name) = catch_all {
            return Err(ParseError::CatchAllNotLast {
                name: name.to_string(),
            });
        }
        match segment {
            SegmentSyntax::CatchAll { name, .. } => catch_all = Some(name.as_str()),
            SegmentSyntax::Parameter {
                name,
                is_optional: true,
                ..
            } => {
                first_optional.get_or_insert(name.as_str());
            }
            required => {
                if let Some(optional) = first_optional {
                    return Err(ParseError::RequiredAfterOptional {
                        segment: Syntax {
                            segments: vec![required.clone()],
                        }
                        .usage(),
                        optional: optional.to_string(),
                    });
                }
            }
        }
    }

    let mut forms = HashSet::new();
    for option in syntax.options() {
        for form in option.forms() {
            if !forms.insert(form.clone()) {
                return Err(ParseError::DuplicateOption { form });
            }
        }
    }

    let mut names = HashSet::new();
    for name in syntax.segments.iter().filter_map(SegmentSyntax::bound_name) {
        if !names.insert(name) {
            return Err(ParseError::DuplicateName {
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_str(pattern: &str) -> Result<Syntax, ParseError> {
        parse(&tokenize(pattern).unwrap())
    }

    fn param(name: &str, ty: Option<&str>, optional: bool) -> SegmentSyntax {
        SegmentSyntax::Parameter {
            name: name.to_string(),
            type_constraint: ty.map(str::to_string),
            is_optional: optional,
            description: None,
        }
    }

    #[test]
    fn test_parse_literals_and_parameters() {
        let syntax = parse_str("user get {id:int} {verbose?}").unwrap();
        assert_eq!(
            syntax.segments,
            vec![
                SegmentSyntax::Literal {
                    text: "user".to_string()
                },
                SegmentSyntax::Literal {
                    text: "get".to_string()
                },
                param("id", Some("int"), false),
                param("verbose", None, true),
            ]
        );
    }

    #[test]
    fn test_parse_option_forms() {
        let syntax = parse_str("deploy {env} --force,-f --config? {file} -v").unwrap();
        let options: Vec<&OptionSyntax> = syntax.options().collect();
        assert_eq!(options.len(), 3);

        assert_eq!(options[0].long_form.as_deref(), Some("force"));
        assert_eq!(options[0].short_form.as_deref(), Some("f"));
        assert!(options[0].is_optional);
        assert!(!options[0].expects_value());

        assert_eq!(options[1].name(), "config");
        assert!(options[1].is_optional);
        assert_eq!(options[1].value.as_ref().unwrap().name, "file");

        assert_eq!(options[2].name(), "v");
        assert_eq!(options[2].long_form, None);
    }

    #[test]
    fn test_value_option_is_required_without_marker() {
        let syntax = parse_str("build --target {t:int}").unwrap();
        let option = syntax.options().next().unwrap();
        assert!(!option.is_optional);
        assert_eq!(
            option.value.as_ref().unwrap().type_constraint.as_deref(),
            Some("int")
        );
    }

    #[test]
    fn test_repeated_option_and_optional_value() {
        let syntax = parse_str("tag --add {name}* --color {c?}").unwrap();
        let options: Vec<&OptionSyntax> = syntax.options().collect();
        assert!(options[0].is_repeated);
        assert!(!options[1].is_repeated);
        assert!(options[1].value.as_ref().unwrap().is_optional);
    }

    #[test]
    fn test_options_are_moved_after_positionals() {
        let syntax = parse_str("--verbose run {target}").unwrap();
        assert_eq!(syntax.to_string(), "run {target} --verbose");
    }

    #[test]
    fn test_descriptions_attach_to_preceding_segment() {
        let syntax =
            parse_str("deploy {env|Target environment} --force,-f|Skip checks --tag {t}|Tag").unwrap();
        match &syntax.segments[1] {
            SegmentSyntax::Parameter { description, .. } => {
                assert_eq!(description.as_deref(), Some("Target environment"))
            }
            other => panic!("unexpected segment {:?}", other),
        }
        let options: Vec<&OptionSyntax> = syntax.options().collect();
        assert_eq!(options[0].description.as_deref(), Some("Skip checks"));
        assert_eq!(options[1].description.as_deref(), Some("Tag"));
    }

    #[test]
    fn test_parse_is_idempotent_through_rendering() {
        for pattern in [
            "status",
            "",
            "deploy {env:string?|Where} --force,-f|Skip checks",
            "run {*args:int}",
            "tag --add,-a {name|Tag name}* --color? {c:int?}",
            "-v",
        ] {
            let first = parse_str(pattern).unwrap();
            let second = parse_str(pattern).unwrap();
            assert_eq!(first, second);

            let reparsed = parse_str(&first.to_string()).unwrap();
            assert_eq!(first, reparsed, "rendering of {:?}", pattern);
        }
    }

    #[test]
    fn test_usage_omits_descriptions() {
        let syntax = parse_str("deploy {env|Where} --force|Skip").unwrap();
        assert_eq!(syntax.usage(), "deploy {env} --force");
    }

    #[test]
    fn test_catch_all_must_be_last() {
        assert_eq!(
            parse_str("copy {*files} {dest}"),
            Err(ParseError::CatchAllNotLast {
                name: "files".to_string()
            })
        );
        assert!(parse_str("copy {*files} --force").is_ok());
    }

    #[test]
    fn test_optional_catch_all_rejected() {
        assert_eq!(
            parse_str("run {*args?}"),
            Err(ParseError::OptionalCatchAll {
                name: "args".to_string()
            })
        );
    }

    #[test]
    fn test_catch_all_option_value_rejected() {
        assert_eq!(
            parse_str("run --files {*f}"),
            Err(ParseError::CatchAllOptionValue {
                name: "f".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_option_forms() {
        assert_eq!(
            parse_str("x --force,-f --fast,-f"),
            Err(ParseError::DuplicateOption {
                form: "-f".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_names() {
        assert_eq!(
            parse_str("copy {src} {src}"),
            Err(ParseError::DuplicateName {
                name: "src".to_string()
            })
        );
        assert_eq!(
            parse_str("x {force} --force"),
            Err(ParseError::DuplicateName {
                name: "force".to_string()
            })
        );
    }

    #[test]
    fn test_required_after_optional() {
        assert_eq!(
            parse_str("x {a?} {b}"),
            Err(ParseError::RequiredAfterOptional {
                segment: "{b}".to_string(),
                optional: "a".to_string()
            })
        );
        assert!(parse_str("x {a?} {b?}").is_ok());
        assert!(parse_str("x {a?} {*rest}").is_ok());
    }

    #[test]
    fn test_segments_need_separators() {
        assert!(matches!(
            parse_str("abc{x}"),
            Err(ParseError::UnexpectedToken { offset: 3, .. })
        ));
        assert_eq!(
            parse_str("deploy|Deploy things"),
            Err(ParseError::DanglingDescription { offset: 6 })
        );
    }

    #[test]
    fn test_repeat_marker_on_positional_rejected() {
        assert!(matches!(
            parse_str("x {a}*"),
            Err(ParseError::UnexpectedToken { offset: 5, .. })
        ));
    }

    #[test]
    fn test_parse_pattern_wraps_errors() {
        let err = parse_pattern("get {id").unwrap_err();
        assert!(matches!(err, RouteError::Lex { .. }));
        assert_eq!(err.pattern(), Some("get {id"));

        let err = parse_pattern("run {*a} {b}").unwrap_err();
        assert!(matches!(err, RouteError::Parse { .. }));
    }
}
