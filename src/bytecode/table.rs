/*!
  The opcode table maps an opcode number to a `Descriptor`: how many operands the operation
  reads, and what it does with them. The table is declared statically; arity and write-back
  are fields of the descriptor.

  A `Computer` shares its table through an `Arc`. The canonical table is built once; a
  modified copy (see `OpcodeTable::without`) exists only to exercise the invalid opcode path.
*/

use std::collections::HashMap;
use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::bytecode::Opcode;
use crate::value::{from_bool, is_true, Value};

/// What an operation does once its read operands are resolved.
#[derive(Clone, Copy)]
pub enum Effect {
  /// Combines two operands into a value that is written back.
  Compute(fn(&Value, &Value) -> Value),
  /// Takes a value from the input provider and writes it back.
  Input,
  /// Appends the operand to the output queue.
  Output,
  /// If the predicate holds for the first operand, the pointer becomes the second.
  JumpIf(fn(&Value) -> bool),
  /// Adds the operand to the relative base.
  AdjustRelativeBase,
  Halt,
}

#[derive(Clone, Copy)]
pub struct Descriptor {
  pub opcode : Opcode,
  /// Count of read operands.
  pub arity  : usize,
  pub effect : Effect,
}

impl Descriptor {
  /// Whether a value is stored through the operand that follows the read operands.
  pub fn writes_back(&self) -> bool {
    match self.effect {
      Effect::Compute(_) | Effect::Input => true,
      _                                  => false
    }
  }

  pub fn redirects(&self) -> bool {
    match self.effect {
      Effect::JumpIf(_) => true,
      _                 => false
    }
  }

  /// Words occupied by the instruction: the opcode word, the read operands, and the write target.
  pub fn width(&self) -> usize {
    1 + self.arity + self.writes_back() as usize
  }
}

fn add(a: &Value, b: &Value) -> Value { a + b }
fn multiply(a: &Value, b: &Value) -> Value { a * b }
fn less_than(a: &Value, b: &Value) -> Value { from_bool(a < b) }
fn equals(a: &Value, b: &Value) -> Value { from_bool(a == b) }
fn is_false(a: &Value) -> bool { !is_true(a) }

/// The canonical descriptor of each opcode.
pub fn descriptor(opcode: Opcode) -> Descriptor {
  let (arity, effect) =
    match opcode {
      Opcode::Add                => (2, Effect::Compute(add)),
      Opcode::Multiply           => (2, Effect::Compute(multiply)),
      Opcode::Input              => (0, Effect::Input),
      Opcode::Output             => (1, Effect::Output),
      Opcode::JumpIfTrue         => (2, Effect::JumpIf(is_true)),
      Opcode::JumpIfFalse        => (2, Effect::JumpIf(is_false)),
      Opcode::LessThan           => (2, Effect::Compute(less_than)),
      Opcode::Equals             => (2, Effect::Compute(equals)),
      Opcode::AdjustRelativeBase => (1, Effect::AdjustRelativeBase),
      Opcode::Halt               => (0, Effect::Halt),
    };
  Descriptor { opcode, arity, effect }
}

#[derive(Clone)]
pub struct OpcodeTable {
  entries: HashMap<u8, Descriptor>
}

impl OpcodeTable {

  pub fn canonical() -> Arc<OpcodeTable> {
    CANONICAL_TABLE.clone()
  }

  fn build() -> OpcodeTable {
    OpcodeTable {
      entries: Opcode::iter().map(|opcode| (opcode.code(), descriptor(opcode))).collect()
    }
  }

  pub fn get(&self, opcode: u8) -> Option<&Descriptor> {
    self.entries.get(&opcode)
  }

  /// A copy of this table with `opcode` removed.
  pub fn without(&self, opcode: u8) -> Arc<OpcodeTable> {
    let mut table = self.clone();
    table.entries.remove(&opcode);
    Arc::new(table)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

lazy_static! {
  static ref CANONICAL_TABLE: Arc<OpcodeTable> = Arc::new(OpcodeTable::build());
}
