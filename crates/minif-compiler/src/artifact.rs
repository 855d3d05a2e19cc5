//! Serializable compile result and program fingerprinting.

use minif_codegen::CompiledProgram;
use minif_types::MinifError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::PipelineError;

/// Outcome of [`compile_to_result`](crate::compile_to_result), suitable for
/// handing to tools as JSON.
///
/// On failure `program` and `fingerprint` are `None` and `error` holds the
/// first error raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    pub program: Option<CompiledProgram>,
    pub error: Option<MinifError>,
    /// Lowercase hex SHA-256 of the program's JSON encoding.
    pub fingerprint: Option<String>,
}

impl CompileResult {
    pub fn ok(program: CompiledProgram, fingerprint: String) -> Self {
        Self {
            success: true,
            program: Some(program),
            error: None,
            fingerprint: Some(fingerprint),
        }
    }

    pub fn failed(error: &PipelineError) -> Self {
        Self {
            success: false,
            program: None,
            error: Some(error.to_minif_error()),
            fingerprint: None,
        }
    }
}

/// SHA-256 over the JSON encoding of `program`. Identical programs always
/// produce identical fingerprints.
pub fn fingerprint(program: &CompiledProgram) -> Result<String, PipelineError> {
    let bytes = serde_json::to_vec(program)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
