//! Top-level declarations: the `program` wrapper and `enum` declarations.

use minif_lexer::TokenKind;
use minif_types::ast::*;
use minif_types::{ErrorCode, MinifError, Result};

use crate::parser::Parser;

impl Parser {
    /// `program Name stmt+ end program`
    pub(crate) fn parse_program(&mut self) -> Result<Program> {
        let start = self.current_span();
        if !self.eat_keyword("program") {
            return Err(self.error_at_current(
                ErrorCode::MISSING_PROGRAM,
                format!(
                    "expected 'program' at start of file, got {}",
                    self.describe_current()
                ),
            ));
        }
        let name = self.expect_identifier()?;

        let mut stmts = Vec::new();
        while !self.at_end_program() {
            if self.at_end() {
                return Err(self.error_at_current(
                    ErrorCode::MISSING_END_PROGRAM,
                    format!("missing 'end program' for program '{}'", name.name),
                ));
            }
            stmts.push(self.parse_statement()?);
        }

        if stmts.is_empty() {
            return Err(MinifError::new(
                ErrorCode::EMPTY_PROGRAM,
                format!("program '{}' has no statements", name.name),
                name.span,
            ));
        }

        self.expect(TokenKind::Keyword, "end")?;
        self.expect(TokenKind::Keyword, "program")?;
        let span = start.merge(self.previous_span());

        if !self.at_end() {
            return Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!(
                    "unexpected {} after 'end program'",
                    self.describe_current()
                ),
            ));
        }

        Ok(Program { name, stmts, span })
    }

    /// `enum Name { A, B, C }`
    pub(crate) fn parse_enum_decl(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.expect(TokenKind::Keyword, "enum")?;
        let name = self.expect_identifier()?;
        if self.enums.contains_key(&name.name) {
            return Err(MinifError::new(
                ErrorCode::ENUM_ALREADY_DECLARED,
                format!("enum already declared: {}", name.name),
                name.span,
            ));
        }

        self.expect(TokenKind::Brace, "{")?;
        let mut members: Vec<Ident> = Vec::new();
        while !self.check(TokenKind::Brace, "}") {
            let member = self.expect_identifier()?;
            if members.iter().any(|m| m.name == member.name) {
                return Err(MinifError::new(
                    ErrorCode::DUPLICATE_ENUM_MEMBER,
                    format!("duplicate member '{}' in enum {}", member.name, name.name),
                    member.span,
                ));
            }
            members.push(member);
            if !self.eat(TokenKind::Comma, ",") {
                break;
            }
        }
        self.expect(TokenKind::Brace, "}")?;

        if members.is_empty() {
            return Err(MinifError::new(
                ErrorCode::EMPTY_ENUM,
                format!("enum {} must declare at least one member", name.name),
                name.span,
            ));
        }

        self.enums.insert(
            name.name.clone(),
            members.iter().map(|m| m.name.clone()).collect(),
        );
        let span = start.merge(self.previous_span());
        Ok(Stmt::EnumDecl(EnumDecl {
            name,
            members,
            span,
        }))
    }
}
