//! Expression code generation.
//!
//! Every expression leaves exactly one value on the operand stack. Operands
//! are emitted before their operator.

use minif_types::ast::*;
use minif_types::{ErrorCode, MinifError};

use crate::compiler::CodegenContext;
use crate::error::{CodegenError, CodegenResult};
use crate::instruction::Instruction;

/// Emit instructions for an expression.
pub fn emit_expr(expr: &Expr, ctx: &mut CodegenContext) -> CodegenResult<()> {
    match &expr.kind {
        // ── Literals ──────────────────────────────────────────────────────
        ExprKind::NumberLit(n) => ctx.emit(Instruction::Push(*n)),
        ExprKind::StringLit(s) => {
            let id = ctx.strings.intern(s);
            ctx.emit(Instruction::LoadString(id));
        }
        ExprKind::ArrayLit(elements) => {
            let array = ctx.alloc_array()?;
            emit_array_lit(array, elements, ctx)?;
        }

        // ── Names ─────────────────────────────────────────────────────────
        ExprKind::Identifier(name) => {
            let binding = ctx.lookup(name, expr.span)?;
            ctx.emit(Instruction::Load(binding.slot));
        }
        ExprKind::ArrayAccess { name, index } => {
            let array = array_id(name, ctx)?;
            emit_expr(index, ctx)?;
            ctx.emit(Instruction::LoadArrayAt(array));
        }
        ExprKind::EnumAccess { enum_name, member } => {
            let (type_id, member_id) = ctx.resolve_enum(enum_name, member)?;
            ctx.emit(Instruction::Push(f64::from(type_id)));
            ctx.emit(Instruction::PushEnumValue(member_id));
        }

        // ── Operators ────────────────────────────────────────────────────
        ExprKind::Unary { op, operand } => {
            emit_expr(operand, ctx)?;
            match op {
                UnaryOp::Plus => {}
                UnaryOp::Neg => ctx.emit(Instruction::Neg),
                UnaryOp::Not => ctx.emit(Instruction::Not),
            }
        }
        ExprKind::Binary { left, op, right } => emit_binary(left, *op, right, ctx)?,
    }
    Ok(())
}

fn emit_binary(left: &Expr, op: BinOp, right: &Expr, ctx: &mut CodegenContext) -> CodegenResult<()> {
    if op == BinOp::Concat {
        return emit_concat(left, right, ctx);
    }
    emit_expr(left, ctx)?;
    emit_expr(right, ctx)?;
    let instr = match op {
        BinOp::And => Instruction::And,
        BinOp::Or => Instruction::Or,
        other => match other.selector() {
            Some(c) => Instruction::Op(c),
            None => {
                return Err(CodegenError::Internal(format!(
                    "operator '{}' has no selector",
                    other.symbol()
                )))
            }
        },
    };
    ctx.emit(instr);
    Ok(())
}

/// `"a" concat "b"` is folded into one interned literal.
fn emit_concat(left: &Expr, right: &Expr, ctx: &mut CodegenContext) -> CodegenResult<()> {
    match (&left.kind, &right.kind) {
        (ExprKind::StringLit(l), ExprKind::StringLit(r)) => {
            let id = ctx.strings.intern(&format!("{l}{r}"));
            ctx.emit(Instruction::LoadString(id));
            Ok(())
        }
        _ => Err(MinifError::new(
            ErrorCode::CONCAT_REQUIRES_LITERALS,
            "'concat' requires two string literals",
            left.span.merge(right.span),
        )
        .into()),
    }
}

/// Emit the elements of an array literal and build row `array` from them.
pub fn emit_array_lit(array: u16, elements: &[Expr], ctx: &mut CodegenContext) -> CodegenResult<()> {
    let max = ctx.limits().array_len;
    let len = u16::try_from(elements.len())
        .ok()
        .filter(|&n| usize::from(n) <= max)
        .ok_or_else(|| {
            CodegenError::LimitExceeded(format!(
                "array literal has {} elements, maximum is {max}",
                elements.len()
            ))
        })?;
    for element in elements {
        emit_expr(element, ctx)?;
    }
    ctx.emit(Instruction::LoadArray { array, len });
    Ok(())
}

/// The array id bound to `name`; fails unless `name` is a live array.
pub fn array_id(name: &Ident, ctx: &CodegenContext) -> CodegenResult<u16> {
    let binding = ctx.lookup(&name.name, name.span)?;
    binding.array.ok_or_else(|| {
        MinifError::new(
            ErrorCode::NOT_AN_ARRAY,
            format!("not an array: {}", name.name),
            name.span,
        )
        .into()
    })
}
