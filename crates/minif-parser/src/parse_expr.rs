//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 6. `or`
//! 5. `and`
//! 4. `==`, `!=`, `<`, `<=`, `>`, `>=`
//! 3. `+`, `-`, `concat`
//! 2. `*`, `/`
//! 1. unary `+`, `-`, `!`
//!
//! All binary levels are left-associative.

use minif_lexer::TokenKind;
use minif_types::ast::*;
use minif_types::{ErrorCode, MinifError, Result};

use crate::parser::{Parser, MAX_EXPR_DEPTH};

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

impl Parser {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Result<Expr> {
        self.deeper(Self::parse_or)
    }

    /// Run `parse` one expression level deeper. Parentheses and unary
    /// operators both recurse through here.
    fn deeper(&mut self, parse: fn(&mut Self) -> Result<Expr>) -> Result<Expr> {
        if self.expr_depth >= MAX_EXPR_DEPTH {
            return Err(self.nesting_too_deep("expression", MAX_EXPR_DEPTH));
        }
        self.expr_depth += 1;
        let result = parse(self);
        self.expr_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `OrExpr = AndExpr { "or" AndExpr }`
    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = binary(left, BinOp::Or, right);
        }
        Ok(left)
    }

    /// `AndExpr = CompExpr { "and" CompExpr }`
    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat_keyword("and") {
            let right = self.parse_comparison()?;
            left = binary(left, BinOp::And, right);
        }
        Ok(left)
    }

    /// `CompExpr = AddExpr { CompOp AddExpr }`
    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_add()?;
        while let Some(op) = self.match_operator(&[
            ("==", BinOp::Eq),
            ("!=", BinOp::NotEq),
            ("<", BinOp::Less),
            ("<=", BinOp::LessEq),
            (">", BinOp::Greater),
            (">=", BinOp::GreaterEq),
        ]) {
            self.advance();
            let right = self.parse_add()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    /// If the current token is one of `table`'s operators, return its `BinOp`.
    fn match_operator(&self, table: &[(&str, BinOp)]) -> Option<BinOp> {
        let tok = self.peek().filter(|t| t.kind == TokenKind::Operator)?;
        table
            .iter()
            .find(|(text, _)| tok.text == *text)
            .map(|(_, op)| *op)
    }

    /// `AddExpr = MulExpr { ("+" | "-" | "concat") MulExpr }`
    ///
    /// `concat` is resolved at compile time and therefore only joins two
    /// string literals.
    fn parse_add(&mut self) -> Result<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = if self.check_keyword("concat") {
                BinOp::Concat
            } else if let Some(op) = self.match_operator(&[("+", BinOp::Add), ("-", BinOp::Sub)]) {
                op
            } else {
                break;
            };
            let op_span = self.current_span();
            self.advance();
            let right = self.parse_mul()?;
            if op == BinOp::Concat && !(left.is_string_literal() && right.is_string_literal()) {
                return Err(MinifError::new(
                    ErrorCode::CONCAT_REQUIRES_LITERALS,
                    "'concat' requires two string literals",
                    op_span,
                )
                .with_suggestion("write the joined text as a single string literal"));
            }
            left = binary(left, op, right);
        }
        Ok(left)
    }

    /// `MulExpr = UnaryExpr { ("*" | "/") UnaryExpr }`
    fn parse_mul(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.match_operator(&[("*", BinOp::Mul), ("/", BinOp::Div)]) {
            self.advance();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    /// `UnaryExpr = [ "+" | "-" | "!" ] UnaryExpr | Primary`
    fn parse_unary(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let op = match self.peek() {
            Some(t) if t.is(TokenKind::Operator, "+") => UnaryOp::Plus,
            Some(t) if t.is(TokenKind::Operator, "-") => UnaryOp::Neg,
            Some(t) if t.is(TokenKind::Operator, "!") => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.deeper(Self::parse_unary)?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                "expected expression, got end of input",
            ));
        };
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let value: f64 = tok.text.parse().map_err(|_| {
                    MinifError::new(
                        ErrorCode::INVALID_NUMBER,
                        format!("invalid number: {}", tok.text),
                        tok.span,
                    )
                })?;
                Ok(Expr::new(ExprKind::NumberLit(value), tok.span))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLit(tok.text), tok.span))
            }
            TokenKind::Identifier => self.parse_name_expr(),
            TokenKind::Bracket if tok.text == "[" => self.parse_array_literal(),
            TokenKind::Paren if tok.text == "(" => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::Paren, ")")?;
                let span = tok.span.merge(self.previous_span());
                Ok(Expr::new(inner.kind, span))
            }
            _ => Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected expression, got {}", self.describe_current()),
            )),
        }
    }

    /// `name`, `name[index]` or `Enum.Member`
    fn parse_name_expr(&mut self) -> Result<Expr> {
        let name = self.expect_identifier()?;

        if self.eat(TokenKind::Access, ".") {
            let member = self.expect_identifier()?;
            self.check_enum_member(&name, &member)?;
            let span = name.span.merge(member.span);
            return Ok(Expr::new(
                ExprKind::EnumAccess {
                    enum_name: name,
                    member,
                },
                span,
            ));
        }

        self.require_declared(&name)?;

        if self.eat(TokenKind::Bracket, "[") {
            let index = self.parse_expression()?;
            self.expect(TokenKind::Bracket, "]")?;
            let span = name.span.merge(self.previous_span());
            return Ok(Expr::new(
                ExprKind::ArrayAccess {
                    name,
                    index: Box::new(index),
                },
                span,
            ));
        }

        let span = name.span;
        Ok(Expr::new(ExprKind::Identifier(name.name), span))
    }

    fn check_enum_member(&self, enum_name: &Ident, member: &Ident) -> Result<()> {
        let Some(members) = self.enums.get(&enum_name.name) else {
            return Err(MinifError::new(
                ErrorCode::UNKNOWN_ENUM,
                format!("unknown enum: {}", enum_name.name),
                enum_name.span,
            ));
        };
        if !members.contains(&member.name) {
            return Err(MinifError::new(
                ErrorCode::UNKNOWN_ENUM_MEMBER,
                format!("enum {} has no member {}", enum_name.name, member.name),
                member.span,
            ));
        }
        Ok(())
    }

    /// `[a, b, c]`
    fn parse_array_literal(&mut self) -> Result<Expr> {
        let start = self.current_span();
        self.expect(TokenKind::Bracket, "[")?;
        let mut elements = Vec::new();
        if !self.check(TokenKind::Bracket, "]") {
            loop {
                elements.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma, ",") {
                    break;
                }
            }
        }
        self.expect(TokenKind::Bracket, "]")?;
        let span = start.merge(self.previous_span());
        Ok(Expr::new(ExprKind::ArrayLit(elements), span))
    }
}
