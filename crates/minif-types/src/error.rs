use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Grammar violation: missing `do`/`end`, duplicate `program`, malformed declaration.
    Syntax,
    /// Name or operand-kind violation: undeclared/redeclared variable, bad index, enum mismatch.
    Semantic,
    /// Label or capacity violation found while linking.
    Link,
    /// Fault raised by the virtual machine that is not a semantic violation.
    Runtime,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Semantic => write!(f, "semantic"),
            Self::Link => write!(f, "link"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNEXPECTED_CHARACTER: Self = Self(101);
    pub const UNTERMINATED_STRING: Self = Self(102);
    pub const INVALID_NUMBER: Self = Self(103);
    pub const MISSING_PROGRAM: Self = Self(110);
    pub const DUPLICATE_PROGRAM: Self = Self(111);
    pub const EMPTY_PROGRAM: Self = Self(112);
    pub const MISSING_END_PROGRAM: Self = Self(113);
    pub const MISSING_END: Self = Self(114);
    pub const MISSING_DO: Self = Self(115);
    pub const EXPECTED_ASSIGNMENT: Self = Self(116);
    pub const EMPTY_ENUM: Self = Self(117);
    pub const NESTING_TOO_DEEP: Self = Self(118);

    // ── Semantic errors (E200–E299) ──
    pub const UNDECLARED_VARIABLE: Self = Self(200);
    pub const VARIABLE_ALREADY_DECLARED: Self = Self(201);
    pub const CONCAT_REQUIRES_LITERALS: Self = Self(202);
    pub const UNKNOWN_ENUM: Self = Self(203);
    pub const UNKNOWN_ENUM_MEMBER: Self = Self(204);
    pub const ENUM_ALREADY_DECLARED: Self = Self(205);
    pub const DUPLICATE_ENUM_MEMBER: Self = Self(206);
    pub const NOT_AN_ARRAY: Self = Self(207);
    pub const ARRAY_KIND_MISMATCH: Self = Self(208);
    pub const INVALID_OPERAND: Self = Self(210);
    pub const ENUM_TYPE_MISMATCH: Self = Self(211);
    pub const INVALID_INDEX: Self = Self(212);
    pub const STRING_LOGIC_OPERAND: Self = Self(213);

    // ── Link errors (E300–E399) ──
    pub const UNRESOLVED_LABEL: Self = Self(300);
    pub const DUPLICATE_LABEL: Self = Self(301);
    pub const CAPACITY_EXCEEDED: Self = Self(310);
    pub const INTERNAL: Self = Self(399);

    // ── Runtime faults (E400–E499) ──
    pub const STACK_UNDERFLOW: Self = Self(400);
    pub const STACK_OVERFLOW: Self = Self(401);
    pub const OUT_OF_CAPACITY: Self = Self(402);
    pub const UNKNOWN_OPERATOR: Self = Self(403);
    pub const UNKNOWN_STRING: Self = Self(404);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Semantic,
            300..=399 => ErrorCategory::Link,
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured front-end error.
///
/// Produced by the scanner, parser and code generator. The first error
/// aborts the stage that raised it; nothing downstream runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinifError {
    pub code: ErrorCode,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suggestion: Option<String>,
}

impl MinifError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            span,
            suggestion: None,
        }
    }

    pub fn undeclared(name: &str, span: Span) -> Self {
        Self::new(
            ErrorCode::UNDECLARED_VARIABLE,
            format!("undeclared variable: {name}"),
            span,
        )
    }

    pub fn redeclared(name: &str, span: Span) -> Self {
        Self::new(
            ErrorCode::VARIABLE_ALREADY_DECLARED,
            format!("variable already declared: {name}"),
            span,
        )
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for MinifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for MinifError {}
