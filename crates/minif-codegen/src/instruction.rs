//! Bytecode instructions and the linked program artifact.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source_map::SourceMap;

/// One stack-machine instruction. Operands are slot, string, array, enum
/// member or label ids; `Op` carries a one-character operator selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    /// Push `Number(n)`.
    Push(#[serde(with = "minif_types::number")] f64),
    /// Push a copy of the value in a slot.
    Load(u16),
    /// Pop into a slot.
    Store(u16),
    /// Binary operator: `+ - * /` or a comparison selector `= ~ < > [ ]`.
    Op(char),
    Neg,
    Not,
    And,
    Or,
    /// Push `StringRef(id)`.
    LoadString(u32),
    /// Pop `len` values into array row `array`, push `ArrayRef(array)`.
    LoadArray { array: u16, len: u16 },
    /// Pop index, pop value, store into the array row.
    SetArrayAt(u16),
    /// Pop index, push the element.
    LoadArrayAt(u16),
    /// Pop a type id and record member `member` in the enum table.
    StoreEnumValue(u32),
    /// Pop a type id and push `EnumRef(type_id, member)`.
    PushEnumValue(u32),
    /// Pop a condition; jump to the label when it is false.
    GotoIfFalse(u32),
    Goto(u32),
    /// Jump target; a no-op when executed.
    Label(u32),
    /// Record the value in a slot as a listing.
    List(u16),
}

impl Instruction {
    /// Label id a jump refers to.
    pub fn jump_target(&self) -> Option<u32> {
        match self {
            Instruction::Goto(label) | Instruction::GotoIfFalse(label) => Some(*label),
            _ => None,
        }
    }

    /// Net change in operand stack depth when this instruction runs.
    pub fn stack_delta(&self) -> isize {
        match self {
            Instruction::Push(_) | Instruction::Load(_) | Instruction::LoadString(_) => 1,
            Instruction::Store(_)
            | Instruction::Op(_)
            | Instruction::And
            | Instruction::Or
            | Instruction::StoreEnumValue(_)
            | Instruction::GotoIfFalse(_) => -1,
            Instruction::SetArrayAt(_) => -2,
            Instruction::LoadArray { len, .. } => 1 - *len as isize,
            Instruction::Neg
            | Instruction::Not
            | Instruction::LoadArrayAt(_)
            | Instruction::PushEnumValue(_)
            | Instruction::Goto(_)
            | Instruction::Label(_)
            | Instruction::List(_) => 0,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "PUSH",
            Instruction::Load(_) => "LOAD",
            Instruction::Store(_) => "STORE",
            Instruction::Op(_) => "OP",
            Instruction::Neg => "NEG",
            Instruction::Not => "NOT",
            Instruction::And => "AND",
            Instruction::Or => "OR",
            Instruction::LoadString(_) => "LOADSTRING",
            Instruction::LoadArray { .. } => "LOAD_ARRAY",
            Instruction::SetArrayAt(_) => "SET_ARRAY_AT",
            Instruction::LoadArrayAt(_) => "LOAD_ARRAY_AT",
            Instruction::StoreEnumValue(_) => "STORE_ENUM_VALUE",
            Instruction::PushEnumValue(_) => "PUSH_ENUM_VALUE",
            Instruction::GotoIfFalse(_) => "GOTO_IF_FALSE",
            Instruction::Goto(_) => "GOTO",
            Instruction::Label(_) => "LABEL",
            Instruction::List(_) => "LIST",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.mnemonic();
        match self {
            Instruction::Push(n) => write!(f, "{name} {n}"),
            Instruction::Load(slot) | Instruction::Store(slot) | Instruction::List(slot) => {
                write!(f, "{name} {slot}")
            }
            Instruction::Op(c) => write!(f, "{name} {c}"),
            Instruction::LoadString(id)
            | Instruction::StoreEnumValue(id)
            | Instruction::PushEnumValue(id) => write!(f, "{name} {id}"),
            Instruction::LoadArray { array, len } => write!(f, "{name} {array} {len}"),
            Instruction::SetArrayAt(array) | Instruction::LoadArrayAt(array) => {
                write!(f, "{name} {array}")
            }
            Instruction::GotoIfFalse(label)
            | Instruction::Goto(label)
            | Instruction::Label(label) => write!(f, "{name} L{label}"),
            Instruction::Neg | Instruction::Not | Instruction::And | Instruction::Or => {
                f.write_str(name)
            }
        }
    }
}

/// A compiled enum: its type id is its index in [`CompiledProgram::enums`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInfo {
    pub name: String,
    pub members: Vec<String>,
}

/// Linked bytecode plus the side tables needed to execute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledProgram {
    pub name: String,
    pub instructions: Vec<Instruction>,
    /// Interned string pool; index = string id.
    pub strings: Vec<String>,
    /// Resolved addresses; index = label id.
    pub labels: Vec<u32>,
    /// Declared enums; index = type id.
    pub enums: Vec<EnumInfo>,
    /// Number of array ids in use.
    pub arrays: u16,
    pub source_map: SourceMap,
}

impl CompiledProgram {
    /// Address of a label, if it was linked.
    pub fn label_address(&self, label: u32) -> Option<usize> {
        self.labels.get(label as usize).map(|&addr| addr as usize)
    }

    pub fn string(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(String::as_str)
    }

    /// One instruction per line, prefixed with its address.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (addr, instr) in self.instructions.iter().enumerate() {
            out.push_str(&format!("{addr:04}  {instr}\n"));
        }
        out
    }
}
