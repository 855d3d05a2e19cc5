//! Shared types for the minif toolchain.
//!
//! This crate defines the AST node types, source spans, error types, the
//! scope-aware symbol table and the memory limits used across all stages.

mod error;
mod limits;
mod span;
pub mod ast;
pub mod number;
pub mod symbols;

pub use error::{ErrorCategory, ErrorCode, MinifError};
pub use limits::Limits;
pub use span::{SourceFile, Span};
pub use symbols::{Binding, SymbolError, SymbolTable};

/// Result type used throughout the minif front end.
pub type Result<T> = std::result::Result<T, MinifError>;
