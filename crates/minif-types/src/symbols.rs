//! Scope-aware variable → slot allocator.
//!
//! A new declaration receives the slot equal to the number of bindings
//! visible at that instant. Closing a scope drops every binding whose slot
//! is at or above the count recorded when the scope opened, so sibling and
//! later scopes reuse the same slots.

use std::collections::HashMap;
use thiserror::Error;

/// What a variable name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub slot: u16,
    /// Array id, when the variable was bound to an array at compile time.
    pub array: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("variable already declared: {0}")]
    AlreadyDeclared(String),
    #[error("no open scope to end")]
    NoOpenScope,
    #[error("too many live variables")]
    SlotSpaceExhausted,
}

#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    bindings: HashMap<String, Binding>,
    /// Visible-binding count recorded at each open scope.
    floors: Vec<usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to the next slot.
    ///
    /// Fails if `name` is live in this or any enclosing scope.
    pub fn declare(&mut self, name: &str) -> Result<u16, SymbolError> {
        if self.bindings.contains_key(name) {
            return Err(SymbolError::AlreadyDeclared(name.to_string()));
        }
        let slot = self.next_slot()?;
        self.bindings
            .insert(name.to_string(), Binding { slot, array: None });
        Ok(slot)
    }

    /// The slot the next declaration would receive.
    pub fn next_slot(&self) -> Result<u16, SymbolError> {
        u16::try_from(self.bindings.len()).map_err(|_| SymbolError::SlotSpaceExhausted)
    }

    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).copied()
    }

    pub fn slot(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|b| b.slot)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Record that `name` holds array `array`. Returns `false` if `name`
    /// is not live.
    pub fn bind_array(&mut self, name: &str, array: u16) -> bool {
        match self.bindings.get_mut(name) {
            Some(binding) => {
                binding.array = Some(array);
                true
            }
            None => false,
        }
    }

    /// Number of currently visible bindings.
    pub fn visible(&self) -> usize {
        self.bindings.len()
    }

    /// Number of open nested scopes.
    pub fn depth(&self) -> usize {
        self.floors.len()
    }

    pub fn scope_open(&mut self) {
        self.floors.push(self.bindings.len());
    }

    pub fn scope_close(&mut self) -> Result<(), SymbolError> {
        let floor = self.floors.pop().ok_or(SymbolError::NoOpenScope)?;
        self.bindings.retain(|_, b| usize::from(b.slot) < floor);
        Ok(())
    }
}
