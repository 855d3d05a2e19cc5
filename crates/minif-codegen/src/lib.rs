//! minif code generator: lowers a parsed [`minif_types::ast::Program`] to a
//! linked stack-bytecode [`CompiledProgram`].
//!
//! # Architecture
//!
//! Code generation is a single deterministic walk of the tree that appends
//! to one instruction stream. Along the way it
//!
//! - re-runs the scope discipline of the parser to assign variable slots,
//! - interns string literals in first-occurrence order ([`StringInterner`]),
//! - allocates symbolic jump targets ([`LabelAllocator`]).
//!
//! After emission, [`link`] scans the stream once and resolves every label
//! id to the index of its `LABEL` instruction. The VM jumps through that
//! table; addresses are never patched into the stream.

pub mod compiler;
pub mod error;
pub mod expr;
pub mod instruction;
pub mod interner;
pub mod labels;
pub mod source_map;
pub mod stmt;

pub use compiler::{generate, generate_with_limits};
pub use error::{CodegenError, CodegenResult};
pub use instruction::{CompiledProgram, EnumInfo, Instruction};
pub use interner::StringInterner;
pub use labels::{link, LabelAllocator};
pub use source_map::{SourceMap, SourceMapEntry};
