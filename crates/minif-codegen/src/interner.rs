//! String literal pool.

use std::collections::HashMap;

/// Deduplicates literal text into dense ids, assigned in first-occurrence
/// order. Ids never change once handed out.
#[derive(Debug, Default, Clone)]
pub struct StringInterner {
    ids: HashMap<String, u32>,
    strings: Vec<String>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> u32 {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.ids.insert(text.to_string(), id);
        id
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// The pool, indexed by id.
    pub fn into_strings(self) -> Vec<String> {
        self.strings
    }
}
