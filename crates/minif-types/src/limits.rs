use serde::{Deserialize, Serialize};

/// Fixed capacities of the value memory.
///
/// The code generator rejects programs that would exceed them; the VM
/// enforces the same bounds at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Scalar slots.
    pub slots: usize,
    /// Distinct array ids.
    pub arrays: usize,
    /// Elements per array.
    pub array_len: usize,
    /// Operand stack depth.
    pub stack: usize,
}

impl Limits {
    pub const DEFAULT_CAPACITY: usize = 256;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            slots: Self::DEFAULT_CAPACITY,
            arrays: Self::DEFAULT_CAPACITY,
            array_len: Self::DEFAULT_CAPACITY,
            stack: Self::DEFAULT_CAPACITY,
        }
    }
}
