use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use num_traits::{Signed, ToPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::address::{advance_address, AddressNumberType};
use crate::fault::Fault;
use crate::value::Value;

/// The opcode is the instruction word modulo `OPCODE_RADIX`.
pub const OPCODE_RADIX: u32 = 100;
/// An instruction word has room for the modes of this many operands.
pub const MAX_OPERANDS: usize = 3;

/**
  Opcodes of the canonical machine. The discriminant of each variant is its number in the
  instruction set, so `Opcode::try_from(n)` is the decoder and `u8::from(opcode)` the encoder.
  The names are the mnemonics used by the disassembler.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Opcode {
  Add                = 1,  // add(a, b) -> c
  Multiply           = 2,  // multiply(a, b) -> c
  Input              = 3,  // input() -> a
  Output             = 4,  // output(a)
  JumpIfTrue         = 5,  // jump_if_true(a, target)
  JumpIfFalse        = 6,  // jump_if_false(a, target)
  LessThan           = 7,  // less_than(a, b) -> c
  Equals             = 8,  // equals(a, b) -> c
  AdjustRelativeBase = 9,  // adjust_relative_base(a)
  Halt               = 99, // halt
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }
}

/// How an operand is turned into a value or a write address.
#[derive(
  StrumDisplay, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,             Eq,            PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum ParameterMode {
  /// The operand is the address of the value.
  Position  = 0,
  /// The operand is the value. Never valid as a write target.
  Immediate = 1,
  /// The operand plus the relative base is the address of the value.
  Relative  = 2,
}

/**
  A decoded instruction word. Only the opcode is validated on decode; mode digits are checked
  when the operand they describe is resolved, since digits beyond an instruction's operands
  are meaningless.
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
  /// Address of the instruction word.
  pub address : AddressNumberType,
  pub opcode  : u8,
  /// The mode digits, least significant first, before validation.
  mode_digits : [u8; MAX_OPERANDS],
}

impl Instruction {

  /**
    Splits `word` into `opcode = word % 100` and `mode_n = (word / 10^(n+2)) % 10`. A negative
    word has no valid opcode.
  */
  pub fn decode(word: &Value, address: AddressNumberType) -> Result<Instruction, Fault> {
    let invalid = || Fault::InvalidOpcode { opcode: word.clone(), address };
    if word.is_negative() {
      return Err(invalid());
    }

    let radix     = Value::from(OPCODE_RADIX);
    let ten       = Value::from(10u32);
    let opcode    = (word % &radix).to_u8().ok_or_else(invalid)?;
    let mut rest  = word / &radix;
    let mut mode_digits = [0u8; MAX_OPERANDS];
    for digit in mode_digits.iter_mut() {
      // The remainder of a non-negative value by ten always fits.
      *digit = (&rest % &ten).to_u8().unwrap_or(0);
      rest   = rest / &ten;
    }

    Ok(Instruction { address, opcode, mode_digits })
  }

  /// The mode of the `n`-th operand, counting from zero.
  pub fn mode(&self, n: usize) -> Result<ParameterMode, Fault> {
    let digit = self.mode_digits.get(n).copied().unwrap_or(0);
    ParameterMode::try_from(digit).map_err(|_| Fault::InvalidParameterMode {
      mode    : digit,
      address : self.address
    })
  }

  /// The canonical opcode, if the number names one.
  pub fn canonical_opcode(&self) -> Option<Opcode> {
    Opcode::try_from(self.opcode).ok()
  }

  /// Address of the `n`-th operand of this instruction.
  pub fn operand_address(&self, n: usize) -> Result<AddressNumberType, Fault> {
    advance_address(self.address, 1 + n)
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.canonical_opcode() {
      Some(opcode) => write!(f, "{}", opcode),
      None         => write!(f, "opcode({})", self.opcode)
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn decode(word: i64) -> Result<Instruction, Fault> {
    Instruction::decode(&Value::from(word), 0)
  }

  #[test]
  fn opcode_numbers(){
    assert_eq!(Opcode::try_from(99u8).ok(), Some(Opcode::Halt));
    assert_eq!(Opcode::Multiply.code(), 2);
    assert!(Opcode::try_from(10u8).is_err());
  }

  #[test]
  fn mnemonics(){
    assert_eq!(Opcode::AdjustRelativeBase.to_string(), "adjust_relative_base");
    assert_eq!(Opcode::from_str("jump_if_false").ok(), Some(Opcode::JumpIfFalse));
  }

  #[test]
  fn split_word(){
    let instruction = decode(1002).unwrap();
    assert_eq!(instruction.opcode, 2);
    assert_eq!(instruction.mode(0), Ok(ParameterMode::Position));
    assert_eq!(instruction.mode(1), Ok(ParameterMode::Immediate));
    assert_eq!(instruction.mode(2), Ok(ParameterMode::Position));
  }

  #[test]
  fn relative_modes(){
    let instruction = decode(21101).unwrap();
    assert_eq!(instruction.canonical_opcode(), Some(Opcode::Add));
    assert_eq!(instruction.mode(0), Ok(ParameterMode::Immediate));
    assert_eq!(instruction.mode(1), Ok(ParameterMode::Immediate));
    assert_eq!(instruction.mode(2), Ok(ParameterMode::Relative));
  }

  #[test]
  fn bad_mode_digit(){
    let instruction = decode(301).unwrap();
    assert_eq!(
      instruction.mode(0),
      Err(Fault::InvalidParameterMode { mode: 3, address: 0 })
    );
  }

  #[test]
  fn negative_word(){
    assert_eq!(
      decode(-99),
      Err(Fault::InvalidOpcode { opcode: Value::from(-99), address: 0 })
    );
  }

  #[test]
  fn unknown_opcode_still_decodes(){
    let instruction = decode(42).unwrap();
    assert_eq!(instruction.opcode, 42);
    assert_eq!(instruction.canonical_opcode(), None);
  }

  #[test]
  fn operands_past_the_last_address(){
    let instruction = Instruction::decode(&Value::from(2), usize::max_value() - 1).unwrap();
    assert_eq!(instruction.operand_address(0), Ok(usize::max_value()));
    assert_eq!(
      instruction.operand_address(1),
      Err(Fault::AddressOutOfRange { address: Value::from(usize::max_value()) + 1u32 })
    );
  }

}
