//! logos-based media query tokenizer.
//!
//! Token priority follows logos rules: longest match wins, then the earlier
//! variant. Keywords are declared as `#[token]`s ahead of the generic
//! [`Token::Ident`] regex so `and` never lexes as an identifier, and
//! [`Token::Length`] swallows its unit so `640px` stays one token.

use logos::Logos;

/// Media query token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Keywords ─────────────────────────────────────────────────────

    #[token("only", ignore(ascii_case))]
    Only,

    #[token("not", ignore(ascii_case))]
    Not,

    #[token("and", ignore(ascii_case))]
    And,

    // ── Values ───────────────────────────────────────────────────────

    /// Number with an optional unit: `640px`, `40em`, `0`, `22.5rem`, `1e3px`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?([a-zA-Z]+)?")]
    #[regex(r"-?\.[0-9]+([eE][+-]?[0-9]+)?([a-zA-Z]+)?")]
    Length,

    /// Media types, feature names, feature values.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Punctuation ──────────────────────────────────────────────────

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,
}

/// Tokenize a media query into `(Token, text)` pairs.
///
/// Returns `Err` with the byte offset of the first character that does not
/// lex.
pub fn tokenize(input: &str) -> Result<Vec<(Token, String)>, usize> {
    let mut lexer = Token::lexer(input);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => out.push((token, lexer.slice().to_string())),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input)
            .map(|v| v.into_iter().map(|(t, _)| t).collect())
            .unwrap_or_default()
    }

    #[test]
    fn breakpoint_query() {
        let result = tokenize("only screen and (min-width: 40em)").unwrap();
        assert_eq!(
            result,
            vec![
                (Token::Only, "only".into()),
                (Token::Ident, "screen".into()),
                (Token::And, "and".into()),
                (Token::ParenOpen, "(".into()),
                (Token::Ident, "min-width".into()),
                (Token::Colon, ":".into()),
                (Token::Length, "40em".into()),
                (Token::ParenClose, ")".into()),
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(tokens("ONLY Not AND"), vec![Token::Only, Token::Not, Token::And]);
    }

    #[test]
    fn keyword_prefix_stays_an_ident() {
        // Longest match: `android` is an identifier, not `and` + `roid`.
        assert_eq!(tokens("android"), vec![Token::Ident]);
    }

    #[test]
    fn lengths() {
        let result = tokenize("0 640px 22.5rem .5em 1e3px 2E-1em").unwrap();
        let texts: Vec<_> = result.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(texts, vec!["0", "640px", "22.5rem", ".5em", "1e3px", "2E-1em"]);
        assert!(result.iter().all(|(t, _)| *t == Token::Length));
    }

    #[test]
    fn comma_separated_list() {
        assert_eq!(
            tokens("print, screen"),
            vec![Token::Ident, Token::Comma, Token::Ident]
        );
    }

    #[test]
    fn rejects_stray_characters() {
        assert_eq!(tokenize("screen & (min-width: 1px)"), Err(7));
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("  "), Ok(Vec::new()));
    }
}
