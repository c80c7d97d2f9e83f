//! Conversion between `Value`s and host addresses into memory, with the checks every resolved
//! address has to pass.

use num_traits::{Signed, ToPrimitive};

use crate::fault::Fault;
use crate::value::Value;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

/**
  Converts a resolved value into an address. Negative values fault with
  `Fault::NegativeAddress`; values too large for the host fault with
  `Fault::AddressOutOfRange`.
*/
pub fn to_address(value: &Value) -> Result<AddressNumberType, Fault> {
  if value.is_negative() {
    return Err(Fault::NegativeAddress { address: value.clone() });
  }
  match value.to_usize() {
    Some(address) => Ok(address),
    None          => Err(Fault::AddressOutOfRange { address: value.clone() })
  }
}

/// Computes `base + offset` and converts the sum into an address. Used for Relative mode.
pub fn offset_address(base: &Value, offset: &Value) -> Result<AddressNumberType, Fault> {
  to_address(&(base + offset))
}

/// `address + offset`, faulting with `Fault::AddressOutOfRange` past the last host address.
pub fn advance_address(address: AddressNumberType, offset: usize)
  -> Result<AddressNumberType, Fault>
{
  address.checked_add(offset).ok_or_else(|| Fault::AddressOutOfRange {
    address: Value::from(address) + Value::from(offset)
  })
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_negative_values_are_addresses(){
    assert_eq!(to_address(&Value::from(0)), Ok(0));
    assert_eq!(to_address(&Value::from(1234)), Ok(1234));
  }

  #[test]
  fn negative_values_fault(){
    assert_eq!(
      to_address(&Value::from(-1)),
      Err(Fault::NegativeAddress { address: Value::from(-1) })
    );
  }

  #[test]
  fn huge_values_fault(){
    let huge = Value::from(u64::max_value()) * Value::from(u64::max_value());
    assert_eq!(
      to_address(&huge),
      Err(Fault::AddressOutOfRange { address: huge.clone() })
    );
  }

  #[test]
  fn relative_offsets(){
    assert_eq!(offset_address(&Value::from(10), &Value::from(-3)), Ok(7));
    assert_eq!(
      offset_address(&Value::from(-5), &Value::from(2)),
      Err(Fault::NegativeAddress { address: Value::from(-3) })
    );
  }

  #[test]
  fn advancing_past_the_last_address(){
    assert_eq!(advance_address(7, 4), Ok(11));
    assert_eq!(advance_address(usize::max_value() - 1, 1), Ok(usize::max_value()));
    assert_eq!(
      advance_address(usize::max_value(), 2),
      Err(Fault::AddressOutOfRange { address: Value::from(usize::max_value()) + 2u32 })
    );
  }

}
