//! Faults raised by the machine. Every fault is terminal for the `Computer` that raised it.

use thiserror::Error;

use crate::address::AddressNumberType;
use crate::value::Value;

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum Fault {
  /// The low two digits of the instruction word are not a key of the opcode table.
  #[error("invalid opcode {opcode} at address {address}")]
  InvalidOpcode {
    opcode  : Value,
    address : AddressNumberType
  },

  #[error("invalid parameter mode {mode} in instruction at address {address}")]
  InvalidParameterMode {
    mode    : u8,
    address : AddressNumberType
  },

  /// A resolved read or write address was negative.
  #[error("negative address {address}")]
  NegativeAddress {
    address : Value
  },

  /// A resolved address does not fit in a host address.
  #[error("address {address} is out of range")]
  AddressOutOfRange {
    address : Value
  },

  #[error("immediate mode used as a write target in instruction at address {address}")]
  ImmediateWriteTarget {
    address : AddressNumberType
  },

  /// Strict input was read while the input queue was empty.
  #[error("input queue empty when reading input at address {address}")]
  InputUnderflow {
    address : AddressNumberType
  },

  #[error("step called on a machine that has already halted or faulted")]
  StepAfterTerminal,
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_culprit(){
    let fault = Fault::InvalidOpcode { opcode: Value::from(42), address: 7 };
    assert_eq!(fault.to_string(), "invalid opcode 42 at address 7");

    let fault = Fault::NegativeAddress { address: Value::from(-5) };
    assert_eq!(fault.to_string(), "negative address -5");
  }

}
