//! The fetch-decode-execute loop.

use minif_codegen::{CompiledProgram, Instruction};
use minif_types::Limits;
use serde::{Deserialize, Serialize};

use crate::error::{Fault, VmResult};
use crate::memory::{MemorySnapshot, ValueMemory};
use crate::value::Value;

/// Output of one executed `LIST` instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub slot: u16,
    pub value: Value,
    pub rendered: String,
}

/// A VM instance bound to one compiled program.
///
/// Starts with the instruction pointer at 0 and an empty stack. Halts when
/// the pointer runs past the last instruction, or on the first fault, in
/// which case [`ip`](Vm::ip) is left on the faulting instruction.
pub struct Vm<'p> {
    program: &'p CompiledProgram,
    memory: ValueMemory,
    ip: usize,
    steps: u64,
    listings: Vec<Listing>,
}

impl<'p> Vm<'p> {
    pub fn new(program: &'p CompiledProgram) -> Self {
        Self::with_limits(program, Limits::default())
    }

    pub fn with_limits(program: &'p CompiledProgram, limits: Limits) -> Self {
        Self {
            program,
            memory: ValueMemory::new(limits, &program.enums),
            ip: 0,
            steps: 0,
            listings: Vec::new(),
        }
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Run to completion or to the first fault.
    pub fn run(&mut self) -> VmResult<()> {
        while !self.is_halted() {
            if let Err(fault) = self.step() {
                tracing::warn!(ip = self.ip, %fault, "execution faulted");
                return Err(fault);
            }
        }
        tracing::debug!(
            program = %self.program.name,
            steps = self.steps,
            listings = self.listings.len(),
            "execution finished"
        );
        Ok(())
    }

    /// Execute one instruction. Does nothing once halted.
    pub fn step(&mut self) -> VmResult<()> {
        let Some(&instr) = self.program.instructions.get(self.ip) else {
            return Ok(());
        };
        tracing::trace!(ip = self.ip, %instr, depth = self.memory.stack().len());
        let next = self.execute(instr)?;
        self.ip = next;
        self.steps += 1;
        Ok(())
    }

    /// Execute `instr` and return the address of the next instruction.
    fn execute(&mut self, instr: Instruction) -> VmResult<usize> {
        let mut next = self.ip + 1;
        match instr {
            Instruction::Push(n) => self.memory.push(Value::Number(n))?,
            Instruction::Load(slot) => {
                let value = self.memory.load(slot)?;
                self.memory.push(value)?;
            }
            Instruction::Store(slot) => {
                let value = self.memory.pop()?;
                self.memory.store(slot, value)?;
            }
            Instruction::Op(op) => {
                let rhs = self.memory.pop()?;
                let lhs = self.memory.pop()?;
                let result = self.binary_op(op, lhs, rhs)?;
                self.memory.push(result)?;
            }
            Instruction::Neg => {
                let v = self.pop_number("NEG")?;
                self.memory.push(Value::Number(-v))?;
            }
            Instruction::Not => {
                let v = self.pop_number("NOT")?;
                self.memory.push(Value::from_bool(v == 0.0))?;
            }
            Instruction::And | Instruction::Or => {
                let name = instr.mnemonic();
                let rhs = self.memory.pop()?;
                let lhs = self.memory.pop()?;
                let (l, r) = (logic_operand(name, lhs)?, logic_operand(name, rhs)?);
                let result = if instr == Instruction::And {
                    l && r
                } else {
                    l || r
                };
                self.memory.push(Value::from_bool(result))?;
            }
            Instruction::LoadString(id) => {
                self.string(id)?;
                self.memory.push(Value::StringRef(id))?;
            }
            Instruction::LoadArray { array, len } => {
                let values = self.memory.pop_n(usize::from(len))?;
                self.memory.fill_row(array, &values)?;
                self.memory.push(Value::ArrayRef(array))?;
            }
            Instruction::SetArrayAt(array) => {
                let index = self.pop_index()?;
                let value = self.memory.pop()?;
                self.memory.set_element(array, index, value)?;
            }
            Instruction::LoadArrayAt(array) => {
                let index = self.pop_index()?;
                let value = self.memory.element(array, index)?;
                self.memory.push(value)?;
            }
            Instruction::StoreEnumValue(member_id) => {
                let type_id = self.pop_enum_type(member_id)?;
                let value = Value::EnumRef { type_id, member_id };
                self.memory.set_enum_value(type_id, member_id, value)?;
            }
            Instruction::PushEnumValue(member_id) => {
                let type_id = self.pop_enum_type(member_id)?;
                self.memory.push(Value::EnumRef { type_id, member_id })?;
            }
            Instruction::GotoIfFalse(label) => {
                let cond = self.memory.pop()?;
                if !self.truthy(cond)? {
                    next = self.resolve(label)?;
                }
            }
            Instruction::Goto(label) => next = self.resolve(label)?,
            Instruction::Label(_) => {}
            Instruction::List(slot) => {
                let value = self.memory.load(slot)?;
                let rendered = self.render(&value);
                tracing::info!(slot, value = %rendered, "list");
                self.listings.push(Listing {
                    slot,
                    value,
                    rendered,
                });
            }
        }
        Ok(next)
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn binary_op(&self, op: char, lhs: Value, rhs: Value) -> VmResult<Value> {
        if !matches!(op, '+' | '-' | '*' | '/' | '=' | '~' | '<' | '>' | '[' | ']') {
            return Err(Fault::UnknownOperator(op));
        }
        match (lhs, rhs) {
            (Value::Number(l), Value::Number(r)) => Ok(match op {
                '+' => Value::Number(l + r),
                '-' => Value::Number(l - r),
                '*' => Value::Number(l * r),
                '/' => Value::Number(l / r),
                '=' => Value::from_bool(l == r),
                '~' => Value::from_bool(l != r),
                '<' => Value::from_bool(l < r),
                '>' => Value::from_bool(l > r),
                '[' => Value::from_bool(l <= r),
                _ => Value::from_bool(l >= r),
            }),
            (Value::StringRef(l), Value::StringRef(r)) if matches!(op, '=' | '~') => {
                let equal = self.string(l)? == self.string(r)?;
                Ok(Value::from_bool(equal == (op == '=')))
            }
            (
                Value::EnumRef {
                    type_id: lt,
                    member_id: lm,
                },
                Value::EnumRef {
                    type_id: rt,
                    member_id: rm,
                },
            ) => {
                if lt != rt {
                    return Err(Fault::EnumTypeMismatch);
                }
                match op {
                    '=' => Ok(Value::from_bool(lm == rm)),
                    '~' => Ok(Value::from_bool(lm != rm)),
                    _ => Err(operand_mismatch(op, lhs, rhs)),
                }
            }
            _ => Err(operand_mismatch(op, lhs, rhs)),
        }
    }

    fn pop_number(&mut self, op: &str) -> VmResult<f64> {
        let value = self.memory.pop()?;
        value
            .as_number()
            .ok_or_else(|| Fault::kind_mismatch(op, value.kind_name()))
    }

    /// Pop an index: an integral number in `0..array_len`.
    fn pop_index(&mut self) -> VmResult<usize> {
        let value = self.memory.pop()?;
        let max = self.memory.limits().array_len;
        match value {
            Value::Number(n) if n.fract() == 0.0 && n >= 0.0 && n < max as f64 => Ok(n as usize),
            other => Err(Fault::InvalidIndex(self.render(&other))),
        }
    }

    /// Pop a type id that has a member `member_id` in the enum table.
    fn pop_enum_type(&mut self, member_id: u32) -> VmResult<u32> {
        let value = self.memory.pop()?;
        let Value::Number(n) = value else {
            return Err(Fault::kind_mismatch("enum type id", value.kind_name()));
        };
        let out_of_range = || Fault::EnumOutOfRange {
            type_id: n.to_string(),
            member_id,
        };
        if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
            return Err(out_of_range());
        }
        let type_id = n as u32;
        match self.memory.enum_len(type_id) {
            Some(len) if (member_id as usize) < len => Ok(type_id),
            _ => Err(out_of_range()),
        }
    }

    /// `Number(0)` and the empty string are false; other numbers and
    /// strings are true. Anything else cannot be a condition.
    fn truthy(&self, value: Value) -> VmResult<bool> {
        match value {
            Value::Number(n) => Ok(n != 0.0),
            Value::StringRef(id) => Ok(!self.string(id)?.is_empty()),
            other => Err(Fault::kind_mismatch("GOTO_IF_FALSE", other.kind_name())),
        }
    }

    fn resolve(&self, label: u32) -> VmResult<usize> {
        self.program
            .label_address(label)
            .ok_or(Fault::UnresolvedLabel(label))
    }

    fn string(&self, id: u32) -> VmResult<&'p str> {
        self.program.string(id).ok_or(Fault::UnknownString(id))
    }

    // ── Inspection ───────────────────────────────────────────────────────

    /// Human-readable form of a value: `7`, `"text"`, `array#0`,
    /// `Color.Red` or `none`.
    pub fn render(&self, value: &Value) -> String {
        match *value {
            Value::Number(n) => n.to_string(),
            Value::StringRef(id) => match self.program.string(id) {
                Some(s) => format!("\"{s}\""),
                None => format!("string#{id}"),
            },
            Value::ArrayRef(id) => format!("array#{id}"),
            Value::EnumRef { type_id, member_id } => {
                let info = self.program.enums.get(type_id as usize);
                match info.and_then(|e| Some((&e.name, e.members.get(member_id as usize)?))) {
                    Some((name, member)) => format!("{name}.{member}"),
                    None => format!("enum#{type_id}.{member_id}"),
                }
            }
            Value::None => "none".to_string(),
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn is_halted(&self) -> bool {
        self.ip >= self.program.instructions.len()
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn memory(&self) -> &ValueMemory {
        &self.memory
    }

    pub fn slot(&self, slot: u16) -> Option<Value> {
        self.memory.load(slot).ok()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        self.memory.snapshot()
    }

    pub fn program(&self) -> &'p CompiledProgram {
        self.program
    }
}

fn operand_mismatch(op: char, lhs: Value, rhs: Value) -> Fault {
    Fault::kind_mismatch(
        format!("OP {op}"),
        format!("{} and {}", lhs.kind_name(), rhs.kind_name()),
    )
}

/// Operand of `AND`/`OR`: nonzero numbers are true, strings are rejected.
fn logic_operand(op: &'static str, value: Value) -> VmResult<bool> {
    match value {
        Value::Number(n) => Ok(n != 0.0),
        Value::StringRef(_) => Err(Fault::StringOperand(op)),
        other => Err(Fault::kind_mismatch(op, other.kind_name())),
    }
}
