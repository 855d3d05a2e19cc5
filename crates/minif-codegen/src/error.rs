//! Codegen error types.

use minif_types::{ErrorCategory, ErrorCode, MinifError};
use thiserror::Error;

/// Errors that can occur while lowering or linking.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A name or operand-kind violation found during lowering.
    #[error(transparent)]
    Semantic(#[from] MinifError),

    /// Slot, array or array-length capacity would be exceeded at run time.
    #[error("capacity exceeded: {0}")]
    LimitExceeded(String),

    /// A jump targets a label that no `LABEL` instruction defines.
    #[error("unresolved label: L{0}")]
    UnresolvedLabel(u32),

    /// Two `LABEL` instructions define the same label.
    #[error("duplicate label: L{0}")]
    DuplicateLabel(u32),

    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),
}

impl CodegenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CodegenError::Semantic(e) => e.code,
            CodegenError::LimitExceeded(_) => ErrorCode::CAPACITY_EXCEEDED,
            CodegenError::UnresolvedLabel(_) => ErrorCode::UNRESOLVED_LABEL,
            CodegenError::DuplicateLabel(_) => ErrorCode::DUPLICATE_LABEL,
            CodegenError::Internal(_) => ErrorCode::INTERNAL,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CodegenError::Semantic(e) => e.category,
            _ => ErrorCategory::Link,
        }
    }
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
