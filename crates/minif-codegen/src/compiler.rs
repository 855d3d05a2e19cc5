//! Bytecode program assembler.
//!
//! Orchestrates code generation:
//! 1. Walk the statements, emitting into one stream ([`crate::stmt`])
//! 2. Link labels to addresses ([`crate::labels::link`])
//! 3. Package the stream with its string, label and enum tables

use minif_types::ast::{Ident, Program};
use minif_types::{Binding, ErrorCode, Limits, MinifError, Span, SymbolError, SymbolTable};

use crate::error::{CodegenError, CodegenResult};
use crate::instruction::{CompiledProgram, EnumInfo, Instruction};
use crate::interner::StringInterner;
use crate::labels::{link, LabelAllocator};
use crate::source_map::SourceMap;
use crate::stmt::emit_stmts;

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a parsed minif [`Program`] into linked bytecode with default
/// [`Limits`].
pub fn generate(program: &Program) -> CodegenResult<CompiledProgram> {
    generate_with_limits(program, Limits::default())
}

/// Compile against explicit memory limits.
pub fn generate_with_limits(program: &Program, limits: Limits) -> CodegenResult<CompiledProgram> {
    let mut ctx = CodegenContext::new(limits);
    emit_stmts(&program.stmts, &mut ctx)?;
    ctx.finish(&program.name.name)
}

// ══════════════════════════════════════════════════════════════════════════════
// Context
// ══════════════════════════════════════════════════════════════════════════════

/// Mutable state threaded through expression and statement emission.
pub struct CodegenContext {
    pub instructions: Vec<Instruction>,
    pub strings: StringInterner,
    pub labels: LabelAllocator,
    /// Name → slot (and array id) bindings, scoped like the parser's.
    pub symbols: SymbolTable,
    /// Declared enums; index = type id.
    pub enums: Vec<EnumInfo>,
    pub source_map: SourceMap,
    limits: Limits,
    /// Array ids handed out so far.
    arrays: u16,
    /// Operand stack depth after the last emitted instruction.
    stack_depth: usize,
    /// Deepest the operand stack gets anywhere in the program.
    stack_peak: usize,
}

impl CodegenContext {
    pub fn new(limits: Limits) -> Self {
        Self {
            instructions: Vec::new(),
            strings: StringInterner::new(),
            labels: LabelAllocator::new(),
            symbols: SymbolTable::new(),
            enums: Vec::new(),
            source_map: SourceMap::new(),
            limits,
            arrays: 0,
            stack_depth: 0,
            stack_peak: 0,
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn emit(&mut self, instr: Instruction) {
        self.stack_depth = self.stack_depth.saturating_add_signed(instr.stack_delta());
        self.stack_peak = self.stack_peak.max(self.stack_depth);
        self.instructions.push(instr);
    }

    /// Fail once any emitted code needs more operand stack than the VM has.
    pub fn check_stack(&self) -> CodegenResult<()> {
        if self.stack_peak > self.limits.stack {
            return Err(CodegenError::LimitExceeded(format!(
                "expression needs {} operand stack entries but the stack holds {}",
                self.stack_peak, self.limits.stack
            )));
        }
        Ok(())
    }

    /// Address the next emitted instruction will get.
    pub fn next_address(&self) -> u32 {
        self.instructions.len() as u32
    }

    pub fn alloc_label(&mut self) -> u32 {
        self.labels.alloc()
    }

    // ── Variables ────────────────────────────────────────────────────────

    pub fn scope_open(&mut self) {
        self.symbols.scope_open();
    }

    pub fn scope_close(&mut self) -> CodegenResult<()> {
        self.symbols
            .scope_close()
            .map_err(|e| CodegenError::Internal(e.to_string()))
    }

    /// Resolve a live variable.
    pub fn lookup(&self, name: &str, span: Span) -> CodegenResult<Binding> {
        self.symbols
            .lookup(name)
            .ok_or_else(|| MinifError::undeclared(name, span).into())
    }

    /// Bind `name` to the next slot, checking the slot capacity.
    pub fn declare(&mut self, name: &Ident) -> CodegenResult<u16> {
        let slot = self.symbols.declare(&name.name).map_err(|e| match e {
            SymbolError::AlreadyDeclared(n) => MinifError::redeclared(&n, name.span).into(),
            other => CodegenError::LimitExceeded(other.to_string()),
        })?;
        if usize::from(slot) >= self.limits.slots {
            return Err(CodegenError::LimitExceeded(format!(
                "variable '{}' needs slot {slot} but only {} slots exist",
                name.name, self.limits.slots
            )));
        }
        Ok(slot)
    }

    // ── Arrays ───────────────────────────────────────────────────────────

    /// A fresh array id.
    pub fn alloc_array(&mut self) -> CodegenResult<u16> {
        if usize::from(self.arrays) >= self.limits.arrays {
            return Err(CodegenError::LimitExceeded(format!(
                "more than {} array literals",
                self.limits.arrays
            )));
        }
        let id = self.arrays;
        self.arrays += 1;
        Ok(id)
    }

    // ── Enums ────────────────────────────────────────────────────────────

    /// Register an enum and return its type id.
    pub fn declare_enum(&mut self, name: &Ident, members: &[Ident]) -> CodegenResult<u32> {
        if self.enums.iter().any(|e| e.name == name.name) {
            return Err(MinifError::new(
                ErrorCode::ENUM_ALREADY_DECLARED,
                format!("enum already declared: {}", name.name),
                name.span,
            )
            .into());
        }
        let type_id = self.enums.len() as u32;
        self.enums.push(EnumInfo {
            name: name.name.clone(),
            members: members.iter().map(|m| m.name.clone()).collect(),
        });
        Ok(type_id)
    }

    /// Resolve `Enum.Member` to `(type_id, member_id)`.
    pub fn resolve_enum(&self, enum_name: &Ident, member: &Ident) -> CodegenResult<(u32, u32)> {
        let type_id = self
            .enums
            .iter()
            .position(|e| e.name == enum_name.name)
            .ok_or_else(|| {
                MinifError::new(
                    ErrorCode::UNKNOWN_ENUM,
                    format!("unknown enum: {}", enum_name.name),
                    enum_name.span,
                )
            })?;
        let member_id = self.enums[type_id]
            .members
            .iter()
            .position(|m| *m == member.name)
            .ok_or_else(|| {
                MinifError::new(
                    ErrorCode::UNKNOWN_ENUM_MEMBER,
                    format!("enum {} has no member {}", enum_name.name, member.name),
                    member.span,
                )
            })?;
        Ok((type_id as u32, member_id as u32))
    }

    // ── Finish ───────────────────────────────────────────────────────────

    /// Link labels and package the program.
    fn finish(self, name: &str) -> CodegenResult<CompiledProgram> {
        let labels = link(&self.instructions, self.labels.count())?;
        tracing::debug!(
            program = name,
            instructions = self.instructions.len(),
            labels = labels.len(),
            strings = self.strings.len(),
            enums = self.enums.len(),
            arrays = self.arrays,
            stack_peak = self.stack_peak,
            "codegen finished"
        );
        Ok(CompiledProgram {
            name: name.to_string(),
            instructions: self.instructions,
            strings: self.strings.into_strings(),
            labels,
            enums: self.enums,
            arrays: self.arrays,
            source_map: self.source_map,
        })
    }
}
