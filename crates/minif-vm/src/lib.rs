//! minif virtual machine.
//!
//! Executes a linked [`minif_codegen::CompiledProgram`] with a
//! fetch-decode-execute loop over a fixed-capacity [`ValueMemory`]. The
//! first [`Fault`] stops the run; nothing after the faulting instruction
//! executes.

pub mod error;
pub mod machine;
pub mod memory;
pub mod value;

pub use error::{Fault, VmResult};
pub use machine::{Listing, Vm};
pub use memory::{MemorySnapshot, ValueMemory};
pub use value::Value;
