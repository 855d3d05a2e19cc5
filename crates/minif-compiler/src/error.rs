use minif_codegen::CodegenError;
use minif_types::{ErrorCategory, ErrorCode, MinifError, Span};
use minif_vm::Fault;
use thiserror::Error;

/// The first error raised by any stage of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Scanner or parser rejected the source.
    #[error(transparent)]
    Front(#[from] MinifError),

    /// Lowering or linking failed.
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// The VM faulted. `span` is the statement that emitted the
    /// faulting instruction, when the source map knows it.
    #[error("fault at instruction {ip}: {fault}")]
    Runtime {
        fault: Fault,
        ip: usize,
        span: Option<Span>,
    },

    #[error("failed to serialize compiled program: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::Front(e) => e.code,
            PipelineError::Codegen(e) => e.code(),
            PipelineError::Runtime { fault, .. } => fault.code(),
            PipelineError::Serialize(_) => ErrorCode::INTERNAL,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Front(e) => e.category,
            PipelineError::Codegen(e) => e.category(),
            PipelineError::Runtime { fault, .. } => fault.category(),
            PipelineError::Serialize(_) => ErrorCategory::Link,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            PipelineError::Front(e) => Some(e.span),
            PipelineError::Codegen(CodegenError::Semantic(e)) => Some(e.span),
            PipelineError::Runtime { span, .. } => *span,
            _ => None,
        }
    }

    /// Flatten into the structured error used in result artifacts.
    /// Errors without a location get a default span.
    pub fn to_minif_error(&self) -> MinifError {
        match self {
            PipelineError::Front(e) | PipelineError::Codegen(CodegenError::Semantic(e)) => {
                e.clone()
            }
            PipelineError::Runtime { fault, span, .. } => {
                MinifError::new(fault.code(), fault.to_string(), span.unwrap_or_default())
            }
            other => MinifError::new(other.code(), other.to_string(), Span::default()),
        }
    }
}
