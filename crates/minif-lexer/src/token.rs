//! Token types for the minif lexer.
//!
//! A [`Token`] is a `(kind, text)` pair plus its source [`Span`]. The
//! parser matches on the kind and compares the text for keywords,
//! operators and punctuation.

use minif_types::Span;
use std::fmt;

/// The 12 reserved words. The lexer emits [`TokenKind::Keyword`] for
/// these instead of [`TokenKind::Identifier`].
pub const KEYWORDS: &[&str] = &[
    "program", "end", "var", "if", "else", "while", "do", "list", "concat", "and", "or", "enum",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// User-defined name: `total`, `Color`
    Identifier,
    /// Numeric literal; `text` has separators stripped: `1_000.5` → `1000.5`
    Number,
    /// String literal; `text` is the contents without quotes.
    String,
    /// `+ - * / = < > !` and `== != <= >=`
    Operator,
    /// `(` or `)`
    Paren,
    /// One of [`KEYWORDS`].
    Keyword,
    /// `[` or `]`
    Bracket,
    /// `{` or `}`
    Brace,
    /// `,`
    Comma,
    /// `.` between an enum name and a member.
    Access,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Operator => "operator",
            TokenKind::Paren => "parenthesis",
            TokenKind::Keyword => "keyword",
            TokenKind::Bracket => "bracket",
            TokenKind::Brace => "brace",
            TokenKind::Comma => "comma",
            TokenKind::Access => "access",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns `true` if this is the keyword `kw`.
    pub fn is_keyword(&self, kw: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == kw
    }

    /// Returns `true` if this token has the given kind and text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.text),
            _ => f.write_str(&self.text),
        }
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}
