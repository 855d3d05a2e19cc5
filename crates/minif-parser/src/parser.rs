//! Core parser infrastructure: token cursor, scope tracking, expect helpers.

use std::collections::HashMap;

use minif_lexer::{Token, TokenKind};
use minif_types::ast::{Ident, Program};
use minif_types::{ErrorCode, MinifError, Result, Span, SymbolError, SymbolTable};

/// The minif parser.
///
/// Consumes a token stream produced by the lexer and builds an AST while
/// tracking which variables are visible in each scope.
pub struct Parser {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Live variable bindings; drives undeclared/redeclared checks.
    pub(crate) symbols: SymbolTable,
    /// Declared enums and their members. Enums are global.
    pub(crate) enums: HashMap<String, Vec<String>>,
    /// Current expression nesting depth (max [`MAX_EXPR_DEPTH`]).
    pub(crate) expr_depth: u32,
    /// Current `do`/`if`/`while` body nesting depth (max [`MAX_BLOCK_DEPTH`]).
    pub(crate) block_depth: u32,
}

/// Deepest allowed nesting of parentheses and unary operators.
pub const MAX_EXPR_DEPTH: u32 = 64;
/// Deepest allowed nesting of statement bodies.
pub const MAX_BLOCK_DEPTH: u32 = 64;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            symbols: SymbolTable::new(),
            enums: HashMap::new(),
            expr_depth: 0,
            block_depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing, or `None` at end of input.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(1, 1))
    }

    /// Span of the current token; the end of the last token at end of input.
    pub(crate) fn current_span(&self) -> Span {
        match self.peek() {
            Some(tok) => tok.span,
            None => {
                let last = self.tokens.last().map(|t| t.span).unwrap_or_default();
                Span::point(last.end_line.max(1), last.end_col + 1)
            }
        }
    }

    pub(crate) fn check(&self, kind: TokenKind, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(kind, text))
    }

    pub(crate) fn check_keyword(&self, kw: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(kw))
    }

    /// `end program` starts at the cursor.
    pub(crate) fn at_end_program(&self) -> bool {
        self.check_keyword("end") && self.look_ahead(1).is_some_and(|t| t.is_keyword("program"))
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: TokenKind, text: &str) -> bool {
        if self.check(kind, text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_keyword(&mut self, kw: &str) -> bool {
        self.eat(TokenKind::Keyword, kw)
    }

    /// Describes the current token for messages.
    pub(crate) fn describe_current(&self) -> String {
        match self.peek() {
            Some(tok) => format!("'{tok}'"),
            None => "end of input".to_string(),
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a token with the given kind and text.
    pub(crate) fn expect(&mut self, kind: TokenKind, text: &str) -> Result<Token> {
        self.expect_with(kind, text, ErrorCode::UNEXPECTED_TOKEN)
    }

    /// Like [`expect`](Self::expect) but reports `code` on mismatch.
    pub(crate) fn expect_with(&mut self, kind: TokenKind, text: &str, code: ErrorCode) -> Result<Token> {
        if self.check(kind, text) {
            if let Some(tok) = self.advance() {
                return Ok(tok);
            }
        }
        Err(self.error_at_current(
            code,
            format!("expected '{text}', got {}", self.describe_current()),
        ))
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self) -> Result<Ident> {
        match self.peek() {
            Some(tok) if tok.kind == TokenKind::Identifier => {
                let ident = Ident::new(tok.text.clone(), tok.span);
                self.pos += 1;
                Ok(ident)
            }
            _ => Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected identifier, got {}", self.describe_current()),
            )),
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&self, code: ErrorCode, message: impl Into<String>) -> MinifError {
        MinifError::new(code, message, self.current_span())
    }

    pub(crate) fn nesting_too_deep(&self, what: &str, max: u32) -> MinifError {
        self.error_at_current(
            ErrorCode::NESTING_TOO_DEEP,
            format!("maximum {what} nesting depth is {max}"),
        )
    }

    // ── Scopes ────────────────────────────────────────────────────────────────

    pub(crate) fn scope_open(&mut self) {
        self.symbols.scope_open();
    }

    pub(crate) fn scope_close(&mut self) -> Result<()> {
        let span = self.previous_span();
        self.symbols
            .scope_close()
            .map_err(|e| symbol_error(e, span))
    }

    /// Bind `name` in the current scope.
    pub(crate) fn declare(&mut self, name: &Ident) -> Result<u16> {
        self.symbols
            .declare(&name.name)
            .map_err(|e| symbol_error(e, name.span))
    }

    /// Fails with "undeclared variable" unless `name` is live.
    pub(crate) fn require_declared(&self, name: &Ident) -> Result<()> {
        if self.symbols.is_declared(&name.name) {
            Ok(())
        } else {
            Err(MinifError::undeclared(&name.name, name.span))
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> Result<Program> {
        let program = self.parse_program()?;
        tracing::debug!(
            program = %program.name.name,
            statements = program.stmts.len(),
            enums = self.enums.len(),
            "parsing finished"
        );
        Ok(program)
    }
}

fn symbol_error(err: SymbolError, span: Span) -> MinifError {
    match err {
        SymbolError::AlreadyDeclared(name) => MinifError::redeclared(&name, span)
            .with_suggestion(format!("assign with `{name} = ...` instead")),
        SymbolError::NoOpenScope => MinifError::new(
            ErrorCode::UNEXPECTED_TOKEN,
            "'end' without an open block",
            span,
        ),
        SymbolError::SlotSpaceExhausted => MinifError::new(
            ErrorCode::CAPACITY_EXCEEDED,
            "too many live variables",
            span,
        ),
    }
}
