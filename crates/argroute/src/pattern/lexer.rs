//! Pattern tokenizer
//!
//! Single left-to-right pass over the pattern text. Produces a flat token
//! stream; grammar rules are left to the parser.

use crate::error::LexError;

/// A classified lexical unit and the byte offset where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word outside braces: `deploy`
    Literal(String),
    LeftBrace,
    RightBrace,
    /// Name inside braces: `env` in `{env}`
    ParameterName(String),
    /// Constraint after `:` inside braces: `int` in `{id:int}`
    TypeName(String),
    /// `?` after a parameter name/type or after an option name
    OptionalMarker,
    /// `*` opening a brace group: `{*args}`
    CatchAllMarker,
    /// `--name`, stored without dashes
    LongOption(String),
    /// `-n`, stored without the dash
    ShortOption(String),
    /// `,` between the long and short form of an option
    Comma,
    /// `|`
    DescriptionSeparator,
    Description(String),
    /// `*` directly after an option's value group: `{tag}*`
    RepeatMarker,
    Whitespace,
}

impl TokenKind {
    /// Short human-readable name used in parse errors
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Literal(text) => format!("literal '{}'", text),
            TokenKind::LeftBrace => "'{'".to_string(),
            TokenKind::RightBrace => "'}'".to_string(),
            TokenKind::ParameterName(name) => format!("parameter name '{}'", name),
            TokenKind::TypeName(name) => format!("type '{}'", name),
            TokenKind::OptionalMarker => "'?'".to_string(),
            TokenKind::CatchAllMarker => "'*'".to_string(),
            TokenKind::LongOption(name) => format!("option '--{}'", name),
            TokenKind::ShortOption(name) => format!("option '-{}'", name),
            TokenKind::Comma => "','".to_string(),
            TokenKind::DescriptionSeparator => "'|'".to_string(),
            TokenKind::Description(_) => "description".to_string(),
            TokenKind::RepeatMarker => "'*'".to_string(),
            TokenKind::Whitespace => "whitespace".to_string(),
        }
    }
}

/// Splits a pattern into tokens
///
/// # Examples
///
/// ```
/// use argroute::pattern::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("get {id:int}").unwrap();
/// let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Literal("get".to_string()),
///         TokenKind::Whitespace,
///         TokenKind::LeftBrace,
///         TokenKind::ParameterName("id".to_string()),
///         TokenKind::TypeName("int".to_string()),
///         TokenKind::RightBrace,
///     ]
/// );
/// ```
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer {
        src: pattern,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Characters that end an option name
fn is_option_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '?' | '|' | '{' | '}')
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn push(&mut self, kind: TokenKind, offset: usize) {
        self.tokens.push(Token { kind, offset });
    }

    fn last_kind(&self) -> Option<&TokenKind> {
        self.tokens.last().map(|t| &t.kind)
    }

    fn run(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                c if c.is_whitespace() => {
                    self.take_while(char::is_whitespace);
                    self.push(TokenKind::Whitespace, start);
                }
                '{' => self.lex_brace()?,
                '}' => return Err(LexError::UnexpectedCharacter { offset: start, ch: c }),
                '|' => self.lex_trailing_description(),
                '*' if self.last_kind() == Some(&TokenKind::RightBrace) => {
                    self.bump();
                    self.push(TokenKind::RepeatMarker, start);
                }
                '-' if self.peek_second() == Some('-') => self.lex_long_option()?,
                '-' if self.peek_second().is_some_and(char::is_alphabetic) => {
                    self.lex_option_name(false)?;
                    self.lex_optional_marker();
                }
                _ => self.lex_literal(),
            }
        }
        Ok(())
    }

    fn lex_literal(&mut self) {
        let start = self.pos;
        let text = self.take_while(|c| !c.is_whitespace() && !matches!(c, '{' | '}' | '|'));
        self.push(TokenKind::Literal(text.to_string()), start);
    }

    /// `{[*]name[:type][?][|description]}`
    fn lex_brace(&mut self) -> Result<(), LexError> {
        let open = self.pos;
        self.bump();
        self.push(TokenKind::LeftBrace, open);

        if self.peek() == Some('*') {
            let at = self.pos;
            self.bump();
            self.push(TokenKind::CatchAllMarker, at);
        }

        let name_at = self.pos;
        let name = self.take_while(is_name_char);
        if name.is_empty() {
            return Err(match self.peek() {
                None => LexError::UnterminatedBrace { offset: open },
                Some('}' | ':' | '?' | '|') => LexError::EmptyParameterName { offset: name_at },
                Some(ch) => LexError::UnexpectedCharacter { offset: name_at, ch },
            });
        }
        self.push(TokenKind::ParameterName(name.to_string()), name_at);

        if self.peek() == Some(':') {
            self.bump();
            let type_at = self.pos;
            let type_name = self.take_while(is_name_char);
            if type_name.is_empty() {
                return Err(LexError::EmptyTypeName { offset: type_at });
            }
            self.push(TokenKind::TypeName(type_name.to_string()), type_at);
        }

        if self.peek() == Some('?') {
            let at = self.pos;
            self.bump();
            self.push(TokenKind::OptionalMarker, at);
        }

        if self.peek() == Some('|') {
            let at = self.pos;
            self.bump();
            self.push(TokenKind::DescriptionSeparator, at);
            let text_at = self.pos;
            let text = self.take_while(|c| c != '}');
            self.push(TokenKind::Description(text.trim().to_string()), text_at);
        }

        let close_at = self.pos;
        match self.bump() {
            Some('}') => {
                self.push(TokenKind::RightBrace, close_at);
                Ok(())
            }
            None => Err(LexError::UnterminatedBrace { offset: open }),
            Some(ch) => Err(LexError::UnexpectedCharacter { offset: close_at, ch }),
        }
    }

    /// `--long[,-s][?]`
    fn lex_long_option(&mut self) -> Result<(), LexError> {
        self.lex_option_name(true)?;

        if self.peek() == Some(',') {
            let at = self.pos;
            self.bump();
            self.push(TokenKind::Comma, at);

            let short_at = self.pos;
            match (self.peek(), self.peek_second()) {
                (Some('-'), Some(c)) if c != '-' => self.lex_option_name(false)?,
                (Some('-'), _) => return Err(LexError::EmptyOptionName { offset: short_at }),
                (Some(ch), _) => {
                    return Err(LexError::UnexpectedCharacter { offset: short_at, ch })
                }
                (None, _) => return Err(LexError::EmptyOptionName { offset: short_at }),
            }
        }

        self.lex_optional_marker();
        Ok(())
    }

    fn lex_option_name(&mut self, long: bool) -> Result<(), LexError> {
        let start = self.pos;
        self.bump();
        if long {
            self.bump();
        }

        let name_at = self.pos;
        let name = self.take_while(|c| !is_option_delimiter(c));
        if name.is_empty() {
            return Err(LexError::EmptyOptionName { offset: start });
        }

        let mut chars = name.char_indices();
        if let Some((_, first)) = chars.next() {
            if !first.is_alphanumeric() {
                return Err(LexError::InvalidOptionName { offset: name_at, ch: first });
            }
        }
        if let Some((i, ch)) = chars.find(|&(_, c)| !(c.is_alphanumeric() || c == '-' || c == '_')) {
            return Err(LexError::InvalidOptionName { offset: name_at + i, ch });
        }

        let kind = if long {
            TokenKind::LongOption(name.to_string())
        } else {
            TokenKind::ShortOption(name.to_string())
        };
        self.push(kind, start);
        Ok(())
    }

    fn lex_optional_marker(&mut self) {
        if self.peek() == Some('?') {
            let at = self.pos;
            self.bump();
            self.push(TokenKind::OptionalMarker, at);
        }
    }

    /// `|text` outside braces: runs until whitespace that is followed by `-`
    /// or `{`, or to the end of the pattern
    fn lex_trailing_description(&mut self) {
        let sep_at = self.pos;
        self.bump();
        self.push(TokenKind::DescriptionSeparator, sep_at);

        let text_at = self.pos;
        let rest = &self.src[self.pos..];
        let mut end = rest.len();
        for (i, c) in rest.char_indices() {
            if !c.is_whitespace() {
                continue;
            }
            let next = rest[i..].trim_start().chars().next();
            if matches!(next, Some('-' | '{')) {
                end = i;
                break;
            }
        }

        self.pos += end;
        let text = rest[..end].trim().to_string();
        self.push(TokenKind::Description(text), text_at);
    }
}
