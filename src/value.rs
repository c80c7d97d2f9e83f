//! Memory cells, operands, and the relative base all hold a `Value`, an unbounded signed integer.
//! Products in real programs exceed 64 bits, so no fixed width type is ever used for a cell.

use num_bigint::BigInt;
use num_traits::{One, Zero};

pub type Value = BigInt;

/// The encoding of a comparison result written back by `less_than` and `equals`.
pub fn from_bool(b: bool) -> Value {
  match b {
    true  => Value::one(),
    false => Value::zero()
  }
}

/// Nonzero is true.
pub fn is_true(value: &Value) -> bool {
  !value.is_zero()
}
