//! Source mapping: instruction address → minif source location.
//!
//! One entry is recorded per statement at the address of its first
//! instruction. A runtime fault at address `ip` is attributed to the last
//! statement that started at or before `ip`.

use minif_types::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    pub entries: Vec<SourceMapEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceMapEntry {
    /// Address of the statement's first instruction.
    pub instruction: u32,
    pub span: Span,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a statement starting at `instruction`. Addresses must be
    /// pushed in non-decreasing order.
    pub fn push(&mut self, instruction: u32, span: Span) {
        self.entries.push(SourceMapEntry { instruction, span });
    }

    /// The statement responsible for the instruction at `addr`.
    pub fn find(&self, addr: usize) -> Option<&SourceMapEntry> {
        let idx = self
            .entries
            .partition_point(|e| e.instruction as usize <= addr);
        idx.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_enclosing_statement() {
        let mut map = SourceMap::new();
        map.push(0, Span::point(1, 1));
        map.push(3, Span::point(2, 1));
        map.push(3, Span::point(3, 1));
        map.push(7, Span::point(4, 1));

        assert_eq!(map.find(0).map(|e| e.span.start_line), Some(1));
        assert_eq!(map.find(2).map(|e| e.span.start_line), Some(1));
        // An empty statement at the same address is shadowed by the next one.
        assert_eq!(map.find(3).map(|e| e.span.start_line), Some(3));
        assert_eq!(map.find(100).map(|e| e.span.start_line), Some(4));
    }

    #[test]
    fn empty_map_finds_nothing() {
        assert!(SourceMap::new().find(0).is_none());
    }
}
