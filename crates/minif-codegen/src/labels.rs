//! Label allocation and the link pass.
//!
//! Code generation only hands out label ids and emits `LABEL`/`GOTO`
//! instructions that name them. [`link`] runs once after emission and
//! builds the dense label → address table.

use crate::error::{CodegenError, CodegenResult};
use crate::instruction::Instruction;

/// Hands out dense label ids in allocation order.
#[derive(Debug, Default, Clone)]
pub struct LabelAllocator {
    next: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of labels allocated so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}

/// Resolve every label id in `0..label_count` to the index of its `LABEL`.
///
/// Every allocated label must be defined exactly once and every jump must
/// name a defined label.
pub fn link(instructions: &[Instruction], label_count: u32) -> CodegenResult<Vec<u32>> {
    let mut addresses: Vec<Option<u32>> = vec![None; label_count as usize];

    for (addr, instr) in instructions.iter().enumerate() {
        if let Instruction::Label(id) = *instr {
            let entry = addresses
                .get_mut(id as usize)
                .ok_or(CodegenError::UnresolvedLabel(id))?;
            if entry.is_some() {
                return Err(CodegenError::DuplicateLabel(id));
            }
            *entry = Some(addr as u32);
        }
    }

    if let Some(id) = instructions
        .iter()
        .filter_map(Instruction::jump_target)
        .find(|&id| addresses.get(id as usize).copied().flatten().is_none())
    {
        return Err(CodegenError::UnresolvedLabel(id));
    }

    let table = addresses
        .into_iter()
        .enumerate()
        .map(|(id, addr)| addr.ok_or(CodegenError::UnresolvedLabel(id as u32)))
        .collect::<CodegenResult<Vec<u32>>>()?;

    tracing::debug!(labels = table.len(), "linking finished");
    Ok(table)
}
