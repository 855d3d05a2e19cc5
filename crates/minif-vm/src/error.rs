//! Runtime faults raised by the VM.

use minif_types::{ErrorCategory, ErrorCode};
use thiserror::Error;

/// A violation detected while executing. Every fault ends the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("stack overflow: more than {0} values")]
    StackOverflow(usize),

    #[error("slot {0} is out of range")]
    SlotOutOfRange(usize),

    #[error("array id {0} is out of range")]
    ArrayOutOfRange(usize),

    #[error("array of {len} elements exceeds capacity {max}")]
    ArrayTooLong { len: usize, max: usize },

    /// Index is not an integral number within the array bounds.
    #[error("invalid array index: {0}")]
    InvalidIndex(String),

    #[error("invalid operand for {op}: {found}")]
    KindMismatch { op: String, found: String },

    /// `AND`/`OR` applied to a string.
    #[error("string operand to {0}")]
    StringOperand(&'static str),

    #[error("cannot compare enums of different types")]
    EnumTypeMismatch,

    #[error("enum type {type_id} has no member {member_id}")]
    EnumOutOfRange { type_id: String, member_id: u32 },

    #[error("unknown operator: '{0}'")]
    UnknownOperator(char),

    #[error("unknown string id: {0}")]
    UnknownString(u32),

    #[error("unresolved label: L{0}")]
    UnresolvedLabel(u32),
}

impl Fault {
    pub fn kind_mismatch(op: impl Into<String>, found: impl Into<String>) -> Self {
        Fault::KindMismatch {
            op: op.into(),
            found: found.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Fault::StackUnderflow => ErrorCode::STACK_UNDERFLOW,
            Fault::StackOverflow(_) => ErrorCode::STACK_OVERFLOW,
            Fault::SlotOutOfRange(_)
            | Fault::ArrayOutOfRange(_)
            | Fault::ArrayTooLong { .. }
            | Fault::EnumOutOfRange { .. } => ErrorCode::OUT_OF_CAPACITY,
            Fault::InvalidIndex(_) => ErrorCode::INVALID_INDEX,
            Fault::KindMismatch { .. } => ErrorCode::INVALID_OPERAND,
            Fault::StringOperand(_) => ErrorCode::STRING_LOGIC_OPERAND,
            Fault::EnumTypeMismatch => ErrorCode::ENUM_TYPE_MISMATCH,
            Fault::UnknownOperator(_) => ErrorCode::UNKNOWN_OPERATOR,
            Fault::UnknownString(_) => ErrorCode::UNKNOWN_STRING,
            Fault::UnresolvedLabel(_) => ErrorCode::UNRESOLVED_LABEL,
        }
    }

    /// Operand-kind violations are semantic; the rest are runtime faults.
    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }
}

/// Result alias for VM operations.
pub type VmResult<T> = Result<T, Fault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_codes() {
        assert_eq!(Fault::EnumTypeMismatch.category(), ErrorCategory::Semantic);
        assert_eq!(Fault::StringOperand("AND").category(), ErrorCategory::Semantic);
        assert_eq!(
            Fault::InvalidIndex("-1".into()).category(),
            ErrorCategory::Semantic
        );
        assert_eq!(Fault::StackUnderflow.category(), ErrorCategory::Runtime);
        assert_eq!(Fault::UnknownOperator('%').category(), ErrorCategory::Runtime);
        assert_eq!(Fault::UnresolvedLabel(0).category(), ErrorCategory::Link);
    }

    #[test]
    fn enum_mismatch_message() {
        assert_eq!(
            Fault::EnumTypeMismatch.to_string(),
            "cannot compare enums of different types"
        );
    }
}
