//! minif compiler: orchestrates the full pipeline.
//!
//! ```text
//! source → Lexer → Parser → Codegen + Linker → CompiledProgram → Vm
//! ```
//!
//! Every stage stops at its first error; nothing downstream of a failed
//! stage runs.

mod artifact;
mod diagnostic;
mod error;

pub use artifact::{fingerprint, CompileResult};
pub use diagnostic::render_diagnostic;
pub use error::PipelineError;

use minif_codegen::{generate_with_limits, CompiledProgram};
use minif_lexer::Lexer;
use minif_parser::Parser;
use minif_types::ast::Program;
use minif_types::{Limits, MinifError, SourceFile};
use minif_vm::{Listing, MemorySnapshot, Vm};
use serde::{Deserialize, Serialize};

/// Everything observable after a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub program: CompiledProgram,
    pub listings: Vec<Listing>,
    pub memory: MemorySnapshot,
    /// Instructions executed.
    pub steps: u64,
}

/// Scan and parse `source` into a syntax tree.
pub fn parse_source(source: &str, name: &str) -> Result<Program, MinifError> {
    let file = SourceFile::new(name, source);
    let tokens = Lexer::new(&file).lex()?;
    Parser::new(tokens).parse()
}

/// Compile `source` to linked bytecode with the default limits.
pub fn compile(source: &str, name: &str) -> Result<CompiledProgram, PipelineError> {
    compile_with_limits(source, name, Limits::default())
}

pub fn compile_with_limits(
    source: &str,
    name: &str,
    limits: Limits,
) -> Result<CompiledProgram, PipelineError> {
    let ast = parse_source(source, name)?;
    let program = generate_with_limits(&ast, limits)?;
    tracing::debug!(
        file = name,
        instructions = program.instructions.len(),
        strings = program.strings.len(),
        labels = program.labels.len(),
        "compiled"
    );
    Ok(program)
}

/// Compile and execute `source` with the default limits.
pub fn run(source: &str, name: &str) -> Result<RunOutcome, PipelineError> {
    run_with_limits(source, name, Limits::default())
}

pub fn run_with_limits(
    source: &str,
    name: &str,
    limits: Limits,
) -> Result<RunOutcome, PipelineError> {
    let program = compile_with_limits(source, name, limits)?;
    execute(program, limits)
}

/// Execute an already compiled program on a fresh VM.
///
/// A fault is reported with the span of the statement that emitted the
/// faulting instruction.
pub fn execute(program: CompiledProgram, limits: Limits) -> Result<RunOutcome, PipelineError> {
    let mut vm = Vm::with_limits(&program, limits);
    if let Err(fault) = vm.run() {
        let ip = vm.ip();
        let span = program.source_map.find(ip).map(|entry| entry.span);
        return Err(PipelineError::Runtime { fault, ip, span });
    }
    let listings = vm.listings().to_vec();
    let memory = vm.snapshot();
    let steps = vm.steps();
    Ok(RunOutcome {
        program,
        listings,
        memory,
        steps,
    })
}

/// Compile `source` and package the outcome as a [`CompileResult`].
pub fn compile_to_result(source: &str, name: &str) -> CompileResult {
    let compiled = compile(source, name).and_then(|program| {
        let hash = fingerprint(&program)?;
        Ok((program, hash))
    });
    match compiled {
        Ok((program, hash)) => CompileResult::ok(program, hash),
        Err(err) => {
            tracing::debug!(file = name, error = %err, "compilation failed");
            CompileResult::failed(&err)
        }
    }
}
