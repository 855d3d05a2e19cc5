//! Statement parsing.

use crate::parser::{Parser, MAX_BLOCK_DEPTH};
use minif_lexer::TokenKind;
use minif_types::ast::*;
use minif_types::{ErrorCode, Result};

impl Parser {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt> {
        let Some(tok) = self.peek() else {
            return Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                "expected statement, got end of input",
            ));
        };
        match (tok.kind, tok.text.as_str()) {
            (TokenKind::Keyword, "var") => self.parse_var_decl(),
            (TokenKind::Keyword, "list") => self.parse_list_stmt(),
            (TokenKind::Keyword, "if") => self.parse_if_stmt(),
            (TokenKind::Keyword, "while") => self.parse_while_stmt(),
            (TokenKind::Keyword, "do") => self.parse_block_stmt(),
            (TokenKind::Keyword, "enum") => self.parse_enum_decl(),
            (TokenKind::Keyword, "program") => Err(self.error_at_current(
                ErrorCode::DUPLICATE_PROGRAM,
                "only one program is allowed per file",
            )),
            (TokenKind::Identifier, _) => self.parse_assignment(),
            _ => Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected statement, got {}", self.describe_current()),
            )),
        }
    }

    /// Statements up to (not including) the closing `end`, or `else` when
    /// `stop_at_else` is set. The caller owns the scope.
    fn parse_body(&mut self, opener: &str, stop_at_else: bool) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            if self.at_end() || self.at_end_program() {
                return Err(self.error_at_current(
                    ErrorCode::MISSING_END,
                    format!("missing 'end' to close '{opener}'"),
                ));
            }
            if self.check_keyword("end") || (stop_at_else && self.check_keyword("else")) {
                return Ok(stmts);
            }
            stmts.push(self.parse_statement()?);
        }
    }

    /// Parse a body inside its own scope.
    fn parse_scoped_body(&mut self, opener: &str, stop_at_else: bool) -> Result<Vec<Stmt>> {
        if self.block_depth >= MAX_BLOCK_DEPTH {
            return Err(self.nesting_too_deep("block", MAX_BLOCK_DEPTH));
        }
        self.block_depth += 1;
        self.scope_open();
        let body = self.parse_body(opener, stop_at_else);
        self.block_depth -= 1;
        let body = body?;
        self.scope_close()?;
        Ok(body)
    }

    fn expect_do(&mut self, opener: &str) -> Result<()> {
        if self.eat_keyword("do") {
            return Ok(());
        }
        Err(self.error_at_current(
            ErrorCode::MISSING_DO,
            format!(
                "expected 'do' after '{opener}' condition, got {}",
                self.describe_current()
            ),
        ))
    }

    /// `var name = init`
    ///
    /// The initializer is parsed before `name` is bound, so `var x = x`
    /// reports `x` as undeclared.
    fn parse_var_decl(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.expect(TokenKind::Keyword, "var")?;
        let name = self.expect_identifier()?;
        self.expect_with(TokenKind::Operator, "=", ErrorCode::EXPECTED_ASSIGNMENT)?;
        let init = self.parse_expression()?;
        self.declare(&name)?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::VarDecl(VarDecl { name, init, span }))
    }

    /// `name = value` or `name[index] = value`
    fn parse_assignment(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        let name = self.expect_identifier()?;

        if self.eat(TokenKind::Bracket, "[") {
            self.require_declared(&name)?;
            let index = self.parse_expression()?;
            self.expect(TokenKind::Bracket, "]")?;
            self.expect_with(TokenKind::Operator, "=", ErrorCode::EXPECTED_ASSIGNMENT)?;
            let value = self.parse_expression()?;
            let span = start.merge(self.previous_span());
            return Ok(Stmt::ArrayAssign(ArrayAssign {
                name,
                index,
                value,
                span,
            }));
        }

        if !self.eat(TokenKind::Operator, "=") {
            return Err(self.error_at_current(
                ErrorCode::EXPECTED_ASSIGNMENT,
                format!(
                    "expected '=' after '{}', got {}",
                    name.name,
                    self.describe_current()
                ),
            ));
        }
        self.require_declared(&name)?;
        let value = self.parse_expression()?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::Assign(Assign { name, value, span }))
    }

    /// `list name`
    fn parse_list_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.expect(TokenKind::Keyword, "list")?;
        let name = self.expect_identifier()?;
        self.require_declared(&name)?;
        let span = start.merge(name.span);
        Ok(Stmt::List(ListStmt { name, span }))
    }

    /// `if cond do … [else …] end`
    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.expect(TokenKind::Keyword, "if")?;
        let condition = self.parse_expression()?;
        self.expect_do("if")?;
        let then_body = self.parse_scoped_body("if", true)?;
        let else_body = if self.eat_keyword("else") {
            Some(self.parse_scoped_body("else", false)?)
        } else {
            None
        };
        self.expect_with(TokenKind::Keyword, "end", ErrorCode::MISSING_END)?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::If(IfStmt {
            condition,
            then_body,
            else_body,
            span,
        }))
    }

    /// `while cond do … end`
    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.expect(TokenKind::Keyword, "while")?;
        let condition = self.parse_expression()?;
        self.expect_do("while")?;
        let body = self.parse_scoped_body("while", false)?;
        self.expect_with(TokenKind::Keyword, "end", ErrorCode::MISSING_END)?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    /// `do … end`
    fn parse_block_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.expect(TokenKind::Keyword, "do")?;
        let body = self.parse_scoped_body("do", false)?;
        self.expect_with(TokenKind::Keyword, "end", ErrorCode::MISSING_END)?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::Block(BlockStmt { body, span }))
    }
}
