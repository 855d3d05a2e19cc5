//! Statement code generation.
//!
//! Statements leave the operand stack as they found it. Nested bodies run in
//! their own scope so slots are recycled exactly as in the parser.

use minif_types::ast::*;
use minif_types::{ErrorCode, MinifError};

use crate::compiler::CodegenContext;
use crate::error::CodegenResult;
use crate::expr::{array_id, emit_array_lit, emit_expr};
use crate::instruction::Instruction;

/// Emit a slice of statements.
pub fn emit_stmts(stmts: &[Stmt], ctx: &mut CodegenContext) -> CodegenResult<()> {
    for stmt in stmts {
        emit_stmt(stmt, ctx)?;
    }
    Ok(())
}

/// Emit a body inside a nested scope.
fn emit_scoped(stmts: &[Stmt], ctx: &mut CodegenContext) -> CodegenResult<()> {
    ctx.scope_open();
    emit_stmts(stmts, ctx)?;
    ctx.scope_close()
}

/// Emit a single statement.
pub fn emit_stmt(stmt: &Stmt, ctx: &mut CodegenContext) -> CodegenResult<()> {
    let start = ctx.next_address();
    ctx.source_map.push(start, stmt.span());
    match stmt {
        Stmt::VarDecl(decl) => emit_var_decl(decl, ctx),
        Stmt::Assign(assign) => emit_assign(assign, ctx),
        Stmt::ArrayAssign(assign) => emit_array_assign(assign, ctx),
        Stmt::List(list) => {
            let binding = ctx.lookup(&list.name.name, list.name.span)?;
            ctx.emit(Instruction::List(binding.slot));
            Ok(())
        }
        Stmt::If(if_stmt) => emit_if(if_stmt, ctx),
        Stmt::While(while_stmt) => emit_while(while_stmt, ctx),
        Stmt::Block(block) => emit_scoped(&block.body, ctx),
        Stmt::EnumDecl(decl) => emit_enum_decl(decl, ctx),
    }?;
    ctx.check_stack()
}

// ══════════════════════════════════════════════════════════════════════════════
// Variables
// ══════════════════════════════════════════════════════════════════════════════

/// `var name = init`
///
/// The initializer is emitted before `name` is bound. An array literal or
/// an array variable binds `name` to that array id.
fn emit_var_decl(decl: &VarDecl, ctx: &mut CodegenContext) -> CodegenResult<()> {
    if ctx.symbols.is_declared(&decl.name.name) {
        return Err(MinifError::redeclared(&decl.name.name, decl.name.span).into());
    }
    let array = match &decl.init.kind {
        ExprKind::ArrayLit(elements) => {
            let id = ctx.alloc_array()?;
            emit_array_lit(id, elements, ctx)?;
            Some(id)
        }
        ExprKind::Identifier(name) => {
            let binding = ctx.lookup(name, decl.init.span)?;
            ctx.emit(Instruction::Load(binding.slot));
            binding.array
        }
        _ => {
            emit_expr(&decl.init, ctx)?;
            None
        }
    };
    let slot = ctx.declare(&decl.name)?;
    if let Some(id) = array {
        ctx.symbols.bind_array(&decl.name.name, id);
    }
    ctx.emit(Instruction::Store(slot));
    Ok(())
}

/// `name = value`
///
/// An array variable can only take a new array literal, which is written
/// into its existing row. A scalar variable cannot take an array.
fn emit_assign(assign: &Assign, ctx: &mut CodegenContext) -> CodegenResult<()> {
    let binding = ctx.lookup(&assign.name.name, assign.name.span)?;
    match (binding.array, &assign.value.kind) {
        (Some(id), ExprKind::ArrayLit(elements)) => emit_array_lit(id, elements, ctx)?,
        (Some(_), _) => {
            return Err(MinifError::new(
                ErrorCode::ARRAY_KIND_MISMATCH,
                format!(
                    "array variable {} can only be assigned an array literal",
                    assign.name.name
                ),
                assign.value.span,
            )
            .into())
        }
        (None, kind) if is_array_valued(kind, ctx) => {
            return Err(MinifError::new(
                ErrorCode::ARRAY_KIND_MISMATCH,
                format!("cannot assign an array to scalar variable {}", assign.name.name),
                assign.value.span,
            )
            .into())
        }
        (None, _) => emit_expr(&assign.value, ctx)?,
    }
    ctx.emit(Instruction::Store(binding.slot));
    Ok(())
}

fn is_array_valued(kind: &ExprKind, ctx: &CodegenContext) -> bool {
    match kind {
        ExprKind::ArrayLit(_) => true,
        ExprKind::Identifier(name) => ctx
            .symbols
            .lookup(name)
            .is_some_and(|b| b.array.is_some()),
        _ => false,
    }
}

/// `name[index] = value`
fn emit_array_assign(assign: &ArrayAssign, ctx: &mut CodegenContext) -> CodegenResult<()> {
    let array = array_id(&assign.name, ctx)?;
    emit_expr(&assign.value, ctx)?;
    emit_expr(&assign.index, ctx)?;
    ctx.emit(Instruction::SetArrayAt(array));
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow
// ══════════════════════════════════════════════════════════════════════════════

/// ```text
///     <cond>                      <cond>
///     GOTO_IF_FALSE end           GOTO_IF_FALSE else
///     <then>                      <then>
/// end:                            GOTO end
///                             else:
///                                 <else>
///                             end:
/// ```
fn emit_if(stmt: &IfStmt, ctx: &mut CodegenContext) -> CodegenResult<()> {
    emit_expr(&stmt.condition, ctx)?;
    match &stmt.else_body {
        None => {
            let end = ctx.alloc_label();
            ctx.emit(Instruction::GotoIfFalse(end));
            emit_scoped(&stmt.then_body, ctx)?;
            ctx.emit(Instruction::Label(end));
        }
        Some(else_body) => {
            let else_label = ctx.alloc_label();
            let end = ctx.alloc_label();
            ctx.emit(Instruction::GotoIfFalse(else_label));
            emit_scoped(&stmt.then_body, ctx)?;
            ctx.emit(Instruction::Goto(end));
            ctx.emit(Instruction::Label(else_label));
            emit_scoped(else_body, ctx)?;
            ctx.emit(Instruction::Label(end));
        }
    }
    Ok(())
}

/// ```text
/// start:
///     <cond>
///     GOTO_IF_FALSE end
///     <body>
///     GOTO start
/// end:
/// ```
fn emit_while(stmt: &WhileStmt, ctx: &mut CodegenContext) -> CodegenResult<()> {
    let start = ctx.alloc_label();
    let end = ctx.alloc_label();
    ctx.emit(Instruction::Label(start));
    emit_expr(&stmt.condition, ctx)?;
    ctx.emit(Instruction::GotoIfFalse(end));
    emit_scoped(&stmt.body, ctx)?;
    ctx.emit(Instruction::Goto(start));
    ctx.emit(Instruction::Label(end));
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// Enums
// ══════════════════════════════════════════════════════════════════════════════

/// Each member is written into the enum table: `PUSH type_id;
/// STORE_ENUM_VALUE member`.
fn emit_enum_decl(decl: &EnumDecl, ctx: &mut CodegenContext) -> CodegenResult<()> {
    let type_id = ctx.declare_enum(&decl.name, &decl.members)?;
    for member_id in 0..decl.members.len() as u32 {
        ctx.emit(Instruction::Push(f64::from(type_id)));
        ctx.emit(Instruction::StoreEnumValue(member_id));
    }
    Ok(())
}
