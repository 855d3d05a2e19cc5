//! Core minif lexer: converts source text to a token stream.
//!
//! Whitespace (including newlines) only separates tokens. The first
//! malformed lexeme aborts lexing.

use minif_types::{ErrorCode, MinifError, Result, SourceFile, Span};

use crate::token::{is_keyword, Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    line: u32,
    col: u32,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self::from_source(&source_file.source)
    }

    pub fn from_source(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    /// Lex the entire source into a token stream.
    pub fn lex(mut self) -> Result<Vec<Token>> {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'0'..=b'9' => self.lex_number()?,
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_word(),
                b'"' | b'\'' => self.lex_string()?,
                b'=' | b'!' | b'<' | b'>' => self.lex_comparison(),
                b'+' | b'-' | b'*' | b'/' => self.single(TokenKind::Operator),
                b'(' | b')' => self.single(TokenKind::Paren),
                b'[' | b']' => self.single(TokenKind::Bracket),
                b'{' | b'}' => self.single(TokenKind::Brace),
                b',' => self.single(TokenKind::Comma),
                b'.' => self.single(TokenKind::Access),
                _ => {
                    let span = self.current_span();
                    let shown = self.current_char();
                    return Err(MinifError::new(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("unexpected character: '{shown}'"),
                        span,
                    ));
                }
            }
        }
        tracing::debug!(tokens = self.tokens.len(), "lexing finished");
        Ok(self.tokens)
    }

    // ── Character-level helpers ───────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    /// Consume one byte. Columns count characters, so UTF-8 continuation
    /// bytes do not move the column.
    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if !is_continuation_byte(ch) {
            self.col += 1;
        }
        Some(ch)
    }

    /// The (possibly multi-byte) character at the cursor, for messages.
    fn current_char(&self) -> char {
        std::str::from_utf8(&self.source[self.pos..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(start_line, start_col, self.line, self.col.saturating_sub(1).max(1))
    }

    fn push(&mut self, kind: TokenKind, text: String, span: Span) {
        self.tokens.push(Token::new(kind, text, span));
    }

    // ── Lexemes ───────────────────────────────────────────────────────────

    fn single(&mut self, kind: TokenKind) {
        let span = self.current_span();
        let ch = self.advance().map(char::from).unwrap_or_default();
        self.push(kind, ch.to_string(), span);
    }

    /// `=`, `!`, `<`, `>` and their `==`, `!=`, `<=`, `>=` forms.
    fn lex_comparison(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();
        if let Some(first) = self.advance() {
            text.push(char::from(first));
        }
        if self.peek() == Some(b'=') {
            self.advance();
            text.push('=');
        }
        let span = self.span_from(line, col);
        self.push(TokenKind::Operator, text, span);
    }

    fn lex_number(&mut self) -> Result<()> {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();
        let mut dot_seen = false;
        while let Some(ch) = self.peek() {
            match ch {
                b'0'..=b'9' => text.push(char::from(ch)),
                b'_' => {}
                // `.` only continues a number when a digit follows.
                b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    if dot_seen {
                        return Err(MinifError::new(
                            ErrorCode::INVALID_NUMBER,
                            "invalid number: multiple decimal points in numeric literal",
                            self.span_from(line, col),
                        ));
                    }
                    dot_seen = true;
                    text.push('.');
                }
                _ => break,
            }
            self.advance();
        }
        let span = self.span_from(line, col);
        self.push(TokenKind::Number, text, span);
        Ok(())
    }

    fn lex_word(&mut self) {
        let (line, col) = (self.line, self.col);
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let word = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        let kind = if is_keyword(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        let span = self.span_from(line, col);
        self.push(kind, word, span);
    }

    fn lex_string(&mut self) -> Result<()> {
        let (line, col) = (self.line, self.col);
        let quote = self.advance();
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(MinifError::new(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        self.span_from(line, col),
                    ));
                }
                Some(ch) if Some(ch) == quote => break,
                Some(_) => {
                    self.advance();
                }
            }
        }
        let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        self.advance(); // closing quote
        let span = self.span_from(line, col);
        self.push(TokenKind::String, text, span);
        Ok(())
    }
}

fn is_continuation_byte(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}
