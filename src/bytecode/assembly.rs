/*!
  Program text is comma-separated decimal integers, optionally negative, surrounded by
  optional whitespace. This module parses it with `nom`, serializes it back, and renders a
  human readable listing of a program for tracing and the command line.
*/

use std::fmt::{Display, Formatter};

use nom::{
  character::complete::{
    char as one_char,
    digit1,
    multispace0,
    space0
  },
  combinator::{all_consuming, map_res, opt, recognize},
  multi::separated_nonempty_list,
  sequence::{delimited, pair, tuple},
  Err as NomErr,
  IResult
};
use thiserror::Error;

use crate::address::AddressNumberType;
use crate::bytecode::{Instruction, OpcodeTable, ParameterMode};
use crate::value::Value;

#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[error("malformed program text at offset {offset}: {found:?}")]
pub struct ProgramTextError {
  /// Byte offset of the first character that could not be parsed.
  pub offset : usize,
  /// A short excerpt of the text starting at `offset`.
  pub found  : String,
}

fn integer(input: &str) -> IResult<&str, Value> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |text: &str| text.parse::<Value>()
  )(input)
}

fn separator(input: &str) -> IResult<&str, (&str, char, &str)> {
  tuple((space0, one_char(','), multispace0))(input)
}

fn program(input: &str) -> IResult<&str, Vec<Value>> {
  all_consuming(
    delimited(
      multispace0,
      separated_nonempty_list(separator, integer),
      multispace0
    )
  )(input)
}

/// Parses program text into the integers that occupy addresses `0..n`.
pub fn parse_program(text: &str) -> Result<Vec<Value>, ProgramTextError> {
  match program(text) {
    Ok((_rest, values)) => Ok(values),
    Err(NomErr::Error((rest, _kind))) | Err(NomErr::Failure((rest, _kind))) => {
      Err(ProgramTextError {
        offset : text.len() - rest.len(),
        found  : rest.chars().take(16).collect()
      })
    }
    Err(NomErr::Incomplete(_)) => {
      Err(ProgramTextError { offset: text.len(), found: String::new() })
    }
  }
}

/// Serializes a program so that `parse_program` gives back the same integers.
pub fn program_text(program: &[Value]) -> String {
  program
    .iter()
    .map(Value::to_string)
    .collect::<Vec<String>>()
    .join(",")
}

/// One line of a listing: either an instruction with its raw operands, or a word that does
/// not begin a known instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Listing {
  Instruction {
    address     : AddressNumberType,
    instruction : Instruction,
    operands    : Vec<(ParameterMode, Value)>
  },
  Data {
    address : AddressNumberType,
    value   : Value
  }
}

impl Listing {
  pub fn address(&self) -> AddressNumberType {
    match self {
      Listing::Instruction { address, .. } | Listing::Data { address, .. } => *address
    }
  }
}

/// Formats an operand the way it is resolved: `[n]` for Position, `n` for Immediate, and
/// `[rb+n]` for Relative.
pub fn format_operand(mode: ParameterMode, operand: &Value) -> String {
  match mode {
    ParameterMode::Position  => format!("[{}]", operand),
    ParameterMode::Immediate => format!("{}", operand),
    ParameterMode::Relative  => format!("[rb{:+}]", operand)
  }
}

impl Display for Listing {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Listing::Instruction { address, instruction, operands } => {
        write!(
          f,
          "{:>5}: {}({})",
          address,
          instruction,
          operands
            .iter()
            .map(|(mode, operand)| format_operand(*mode, operand))
            .collect::<Vec<String>>()
            .join(", ")
        )
      }

      Listing::Data { address, value } => {
        write!(f, "{:>5}: data {}", address, value)
      }

    }
  }
}

/**
  Decodes the instruction whose word is `window[0]` and lives at `address`. Words that are not a
  known opcode, that carry an invalid mode, or whose operands run off the end of the window are
  listed as data.
*/
pub fn disassemble_window(window: &[Value], address: AddressNumberType, table: &OpcodeTable)
  -> Option<Listing>
{
  let word = window.first()?;
  let data = || Some(Listing::Data { address, value: word.clone() });

  let instruction = match Instruction::decode(word, address) {
    Ok(instruction) => instruction,
    Err(_)          => return data()
  };
  let descriptor = match table.get(instruction.opcode) {
    Some(descriptor) => *descriptor,
    None             => return data()
  };
  if descriptor.width() > window.len() {
    return data();
  }

  let mut operands = Vec::with_capacity(descriptor.width() - 1);
  for n in 0..descriptor.width() - 1 {
    match instruction.mode(n) {
      Ok(mode) => operands.push((mode, window[1 + n].clone())),
      Err(_)   => return data()
    }
  }

  Some(Listing::Instruction { address, instruction, operands })
}

/// Decodes the instruction at `address` of `program`.
pub fn disassemble_at(program: &[Value], address: AddressNumberType, table: &OpcodeTable)
  -> Option<Listing>
{
  disassemble_window(program.get(address..)?, address, table)
}

/**
  A linear sweep listing of `program`. Programs mix code and data freely, so the listing is a
  best effort: data that happens to look like an instruction is listed as one.
*/
pub fn disassemble(program: &[Value], table: &OpcodeTable) -> Vec<Listing> {
  let mut listing = Vec::new();
  let mut address = 0;
  while let Some(line) = disassemble_at(program, address, table) {
    address += match &line {
      Listing::Instruction { operands, .. } => 1 + operands.len(),
      Listing::Data { .. }                  => 1
    };
    listing.push(line);
  }
  listing
}


#[cfg(test)]
mod tests {
  use super::*;

  fn values(v: &[i64]) -> Vec<Value> {
    v.iter().map(|&x| Value::from(x)).collect()
  }

  #[test]
  fn parse_simple(){
    let program = parse_program("1,9,10,3,2,3,11,0,99,30,40,50").unwrap();
    assert_eq!(program, values(&[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]));
  }

  #[test]
  fn parse_negative_and_whitespace(){
    let program = parse_program("  109, -1,\n204,-1 \n").unwrap();
    assert_eq!(program, values(&[109, -1, 204, -1]));
  }

  #[test]
  fn parse_big_literal(){
    let program = parse_program("104,1125899906842624,99").unwrap();
    assert_eq!(program[1], Value::from(1125899906842624i64));

    let program = parse_program("104,123456789012345678901234567890,99").unwrap();
    assert_eq!(program[1].to_string(), "123456789012345678901234567890");
  }

  #[test]
  fn text_round_trip(){
    let text = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";
    let program = parse_program(text).unwrap();
    assert_eq!(program_text(&program), text);
    assert_eq!(parse_program(&program_text(&program)).unwrap(), program);
  }

  #[test]
  fn malformed(){
    let error = parse_program("1,2,x,4").unwrap_err();
    // The list stops before the separator that precedes the bad element.
    assert_eq!(error.offset, 3);
    assert_eq!(error.found, ",x,4");

    assert!(parse_program("").is_err());
    assert!(parse_program("1,,2").is_err());
    assert!(parse_program("1;2").is_err());
    assert!(parse_program("--1").is_err());
  }

  #[test]
  fn listing(){
    let program = values(&[1002, 4, 3, 4, 33, 109, -2, 99]);
    let lines: Vec<String> =
      disassemble(&program, &OpcodeTable::canonical())
        .iter()
        .map(|l| l.to_string())
        .collect();
    assert_eq!(
      lines,
      vec![
        "    0: multiply([4], 3, [4])",
        "    4: data 33",
        "    5: adjust_relative_base(-2)",
        "    7: halt()",
      ]
    );
  }

  #[test]
  fn truncated_instruction_is_data(){
    let program = values(&[1, 0, 0]);
    let listing = disassemble(&program, &OpcodeTable::canonical());
    assert_eq!(listing.len(), 3);
    assert_eq!(listing[0], Listing::Data { address: 0, value: Value::from(1) });
  }

  #[test]
  fn relative_operands(){
    assert_eq!(format_operand(ParameterMode::Relative, &Value::from(-1)), "[rb-1]");
    assert_eq!(format_operand(ParameterMode::Relative, &Value::from(3)), "[rb+3]");
  }

}
