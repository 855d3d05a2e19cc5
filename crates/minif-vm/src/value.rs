use serde::{Deserialize, Serialize};

/// A runtime value.
///
/// String, array and enum payloads are ids into the program's side tables,
/// so values are `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Number(#[serde(with = "minif_types::number")] f64),
    /// Interned string id.
    StringRef(u32),
    /// Array row id.
    ArrayRef(u16),
    EnumRef { type_id: u32, member_id: u32 },
    /// Contents of memory that was never written.
    #[default]
    None,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::StringRef(_) => "string",
            Value::ArrayRef(_) => "array",
            Value::EnumRef { .. } => "enum",
            Value::None => "none",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub(crate) fn from_bool(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }
}
