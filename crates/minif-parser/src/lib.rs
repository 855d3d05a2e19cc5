//! minif parser: converts a token stream into an AST.
//!
//! Parsing is fail-fast. The first grammar or name-resolution violation is
//! returned as a [`MinifError`](minif_types::MinifError) and no partial
//! tree is produced.

mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{Parser, MAX_BLOCK_DEPTH, MAX_EXPR_DEPTH};
