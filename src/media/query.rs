//! Recursive descent media query parser and evaluator.
//!
//! Supports the subset breakpoint tables need: `only`/`not`, the `screen`,
//! `all` and `print` media types, and `and`-joined width/height/orientation
//! features. Comma-separated lists match when any member matches.

use std::str::FromStr;

use super::tokenizer::{tokenize, Token};
use crate::error::FoundationError;
use crate::geometry::Viewport;

/// Pixels per `em`/`rem` (the browser default root font size).
pub const BASE_FONT_SIZE: f64 = 16.0;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// The media type a query targets.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaType {
    All,
    Screen,
    Print,
    /// Any other type; never matches.
    Other(String),
}

impl MediaType {
    fn matches(&self) -> bool {
        matches!(self, MediaType::All | MediaType::Screen)
    }
}

/// `(orientation: ...)` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// A single media feature test, lengths already resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feature {
    MinWidth(f64),
    MaxWidth(f64),
    MinHeight(f64),
    MaxHeight(f64),
    Orientation(Orientation),
}

impl Feature {
    fn matches(self, viewport: &Viewport) -> bool {
        match self {
            Feature::MinWidth(px) => viewport.width >= px,
            Feature::MaxWidth(px) => viewport.width <= px,
            Feature::MinHeight(px) => viewport.height >= px,
            Feature::MaxHeight(px) => viewport.height <= px,
            Feature::Orientation(Orientation::Portrait) => viewport.height >= viewport.width,
            Feature::Orientation(Orientation::Landscape) => viewport.width > viewport.height,
        }
    }
}

/// One comma-separated member of a media query list.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    pub negated: bool,
    pub media_type: MediaType,
    pub features: Vec<Feature>,
}

impl MediaQuery {
    /// Evaluate against the current window state.
    pub fn matches(&self, viewport: &Viewport) -> bool {
        let hit = self.media_type.matches() && self.features.iter().all(|f| f.matches(viewport));
        hit != self.negated
    }
}

/// A parsed `window.matchMedia` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQueryList {
    pub queries: Vec<MediaQuery>,
}

impl MediaQueryList {
    /// Whether any member matches.
    pub fn matches(&self, viewport: &Viewport) -> bool {
        self.queries.iter().any(|q| q.matches(viewport))
    }
}

impl FromStr for MediaQueryList {
    type Err = FoundationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |message: String| FoundationError::MediaQuery {
            query: s.to_string(),
            message,
        };
        let tokens = tokenize(s).map_err(|at| error(format!("unexpected character at byte {at}")))?;
        let mut parser = Parser { tokens, cursor: 0 };
        parser.parse_list().map_err(error)
    }
}

/// Resolve a CSS length to pixels. Unitless values are only valid for zero.
pub fn parse_length(text: &str) -> Result<f64, String> {
    let number = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let unit = &text[number.len()..];
    let value: f64 = number
        .parse()
        .map_err(|_| format!("`{text}` is not a length"))?;
    match unit.to_ascii_lowercase().as_str() {
        "px" => Ok(value),
        "em" | "rem" => Ok(value * BASE_FONT_SIZE),
        "" if value == 0.0 => Ok(0.0),
        "" => Err(format!("`{text}` is missing a unit")),
        other => Err(format!("unsupported unit `{other}`")),
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<(Token, String)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, String)> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<String, String> {
        match self.advance() {
            Some((tok, text)) if tok == expected => Ok(text),
            Some((tok, text)) => Err(format!("expected {expected:?}, found {tok:?} `{text}`")),
            None => Err(format!("expected {expected:?}, found end of input")),
        }
    }

    fn parse_list(&mut self) -> Result<MediaQueryList, String> {
        let mut queries = vec![self.parse_query()?];
        while self.peek() == Some(&Token::Comma) {
            self.cursor += 1;
            queries.push(self.parse_query()?);
        }
        if let Some((tok, text)) = self.advance() {
            return Err(format!("unexpected {tok:?} `{text}`"));
        }
        Ok(MediaQueryList { queries })
    }

    fn parse_query(&mut self) -> Result<MediaQuery, String> {
        let mut negated = false;
        match self.peek() {
            Some(Token::Only) => self.cursor += 1,
            Some(Token::Not) => {
                negated = true;
                self.cursor += 1;
            }
            _ => {}
        }

        let mut features = Vec::new();
        let media_type = match self.peek() {
            Some(Token::ParenOpen) if !negated => {
                features.push(self.parse_feature()?);
                MediaType::All
            }
            _ => {
                let name = self.expect(Token::Ident)?.to_ascii_lowercase();
                match name.as_str() {
                    "all" => MediaType::All,
                    "screen" => MediaType::Screen,
                    "print" => MediaType::Print,
                    _ => MediaType::Other(name),
                }
            }
        };

        while self.peek() == Some(&Token::And) {
            self.cursor += 1;
            features.push(self.parse_feature()?);
        }

        Ok(MediaQuery {
            negated,
            media_type,
            features,
        })
    }

    fn parse_feature(&mut self) -> Result<Feature, String> {
        self.expect(Token::ParenOpen)?;
        let name = self.expect(Token::Ident)?.to_ascii_lowercase();
        self.expect(Token::Colon)?;
        let (value_tok, value) = self
            .advance()
            .ok_or_else(|| format!("missing value for `{name}`"))?;
        self.expect(Token::ParenClose)?;

        let feature = match (name.as_str(), value_tok) {
            ("min-width", Token::Length) => Feature::MinWidth(parse_length(&value)?),
            ("max-width", Token::Length) => Feature::MaxWidth(parse_length(&value)?),
            ("min-height", Token::Length) => Feature::MinHeight(parse_length(&value)?),
            ("max-height", Token::Length) => Feature::MaxHeight(parse_length(&value)?),
            ("orientation", Token::Ident) => match value.to_ascii_lowercase().as_str() {
                "portrait" => Feature::Orientation(Orientation::Portrait),
                "landscape" => Feature::Orientation(Orientation::Landscape),
                other => return Err(format!("unknown orientation `{other}`")),
            },
            _ => return Err(format!("unsupported feature `({name}: {value})`")),
        };
        Ok(feature)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
