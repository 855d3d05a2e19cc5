//! Fixed-capacity value memory: scalar slots, array rows, the enum table
//! and the operand stack.

use std::collections::BTreeMap;

use minif_codegen::EnumInfo;
use minif_types::Limits;
use serde::{Deserialize, Serialize};

use crate::error::{Fault, VmResult};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct ValueMemory {
    limits: Limits,
    slots: Vec<Value>,
    /// Rows are allocated on first use, each `limits.array_len` long.
    arrays: BTreeMap<u16, Vec<Value>>,
    /// One row per enum type, one entry per member.
    enums: Vec<Vec<Value>>,
    stack: Vec<Value>,
}

/// Final memory contents, used to compare runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub slots: Vec<Value>,
    pub arrays: BTreeMap<u16, Vec<Value>>,
    pub enums: Vec<Vec<Value>>,
}

impl ValueMemory {
    pub fn new(limits: Limits, enums: &[EnumInfo]) -> Self {
        Self {
            limits,
            slots: vec![Value::None; limits.slots],
            arrays: BTreeMap::new(),
            enums: enums
                .iter()
                .map(|e| vec![Value::None; e.members.len()])
                .collect(),
            stack: Vec::with_capacity(limits.stack),
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    // ── Operand stack ────────────────────────────────────────────────────

    pub fn push(&mut self, value: Value) -> VmResult<()> {
        if self.stack.len() >= self.limits.stack {
            return Err(Fault::StackOverflow(self.limits.stack));
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or(Fault::StackUnderflow)
    }

    /// Pop the top `n` values, returned bottom-to-top.
    pub fn pop_n(&mut self, n: usize) -> VmResult<Vec<Value>> {
        let at = self
            .stack
            .len()
            .checked_sub(n)
            .ok_or(Fault::StackUnderflow)?;
        Ok(self.stack.split_off(at))
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    // ── Slots ────────────────────────────────────────────────────────────

    pub fn load(&self, slot: u16) -> VmResult<Value> {
        self.slots
            .get(usize::from(slot))
            .copied()
            .ok_or(Fault::SlotOutOfRange(usize::from(slot)))
    }

    pub fn store(&mut self, slot: u16, value: Value) -> VmResult<()> {
        let cell = self
            .slots
            .get_mut(usize::from(slot))
            .ok_or(Fault::SlotOutOfRange(usize::from(slot)))?;
        *cell = value;
        Ok(())
    }

    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    // ── Arrays ───────────────────────────────────────────────────────────

    fn row_mut(&mut self, array: u16) -> VmResult<&mut Vec<Value>> {
        if usize::from(array) >= self.limits.arrays {
            return Err(Fault::ArrayOutOfRange(usize::from(array)));
        }
        let len = self.limits.array_len;
        Ok(self
            .arrays
            .entry(array)
            .or_insert_with(|| vec![Value::None; len]))
    }

    /// Replace a row: `values` fill indices `0..n`, the rest become `None`.
    pub fn fill_row(&mut self, array: u16, values: &[Value]) -> VmResult<()> {
        let max = self.limits.array_len;
        if values.len() > max {
            return Err(Fault::ArrayTooLong {
                len: values.len(),
                max,
            });
        }
        let row = self.row_mut(array)?;
        row.fill(Value::None);
        row[..values.len()].copy_from_slice(values);
        Ok(())
    }

    pub fn element(&mut self, array: u16, index: usize) -> VmResult<Value> {
        let row = self.row_mut(array)?;
        row.get(index)
            .copied()
            .ok_or_else(|| Fault::InvalidIndex(index.to_string()))
    }

    pub fn set_element(&mut self, array: u16, index: usize, value: Value) -> VmResult<()> {
        let row = self.row_mut(array)?;
        let cell = row
            .get_mut(index)
            .ok_or_else(|| Fault::InvalidIndex(index.to_string()))?;
        *cell = value;
        Ok(())
    }

    /// A row, if it has been touched.
    pub fn array(&self, array: u16) -> Option<&[Value]> {
        self.arrays.get(&array).map(Vec::as_slice)
    }

    // ── Enums ────────────────────────────────────────────────────────────

    /// Number of members of an enum type, if it exists.
    pub fn enum_len(&self, type_id: u32) -> Option<usize> {
        self.enums.get(type_id as usize).map(Vec::len)
    }

    pub fn set_enum_value(&mut self, type_id: u32, member_id: u32, value: Value) -> VmResult<()> {
        let cell = self
            .enums
            .get_mut(type_id as usize)
            .and_then(|row| row.get_mut(member_id as usize))
            .ok_or(Fault::EnumOutOfRange {
                type_id: type_id.to_string(),
                member_id,
            })?;
        *cell = value;
        Ok(())
    }

    pub fn enum_value(&self, type_id: u32, member_id: u32) -> Option<Value> {
        self.enums
            .get(type_id as usize)
            .and_then(|row| row.get(member_id as usize))
            .copied()
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            slots: self.slots.clone(),
            arrays: self.arrays.clone(),
            enums: self.enums.clone(),
        }
    }
}
