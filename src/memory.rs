/*!
  Memory is a sparse store of `Value`s indexed by non-negative addresses. Every address reads
  as zero until it is first written.

  Programs keep their code and most of their data near address zero, so the low region is a
  vector that grows on demand the way a heap grows. Writes far beyond it go to a hash map, so a
  single store to a huge address does not allocate everything below it.
*/

use std::collections::HashMap;

use num_traits::Zero;

use crate::address::AddressNumberType;
use crate::value::Value;

/// Writes below this address grow the dense region. Writes at or above it are stored sparsely.
pub const DENSE_LIMIT: AddressNumberType = 1 << 16;

#[derive(Clone, Debug, Default)]
pub struct Memory {
  dense  : Vec<Value>,
  sparse : HashMap<AddressNumberType, Value>,
}

impl Memory {

  /// The program occupies addresses `0..program.len()`.
  pub fn new(program: &[Value]) -> Memory {
    Memory {
      dense  : program.to_vec(),
      sparse : HashMap::new(),
    }
  }

  pub fn read(&self, address: AddressNumberType) -> Value {
    match self.dense.get(address) {
      Some(value) => value.clone(),
      None        => self.sparse.get(&address).cloned().unwrap_or_else(Value::zero)
    }
  }

  /**
    Sets the value at the given address, growing the dense region if the address is
    within `DENSE_LIMIT` and larger than the region's max index.
  */
  pub fn write(&mut self, address: AddressNumberType, value: Value) {
    if address < self.dense.len() {
      self.dense[address] = value;
    } else if address < DENSE_LIMIT {
      // Sparse cells all lie at or above `DENSE_LIMIT`, so nothing needs to move over.
      self.dense.resize(address + 1, Value::zero());
      self.dense[address] = value;
    } else {
      self.sparse.insert(address, value);
    }
  }

  /// One past the highest address of the dense region.
  pub fn dense_len(&self) -> AddressNumberType {
    self.dense.len()
  }

  /// The number of addresses holding a value that was loaded or written.
  pub fn touched(&self) -> usize {
    self.dense.len() + self.sparse.len()
  }

}


#[cfg(test)]
mod tests {
  use super::*;

  fn values(v: &[i64]) -> Vec<Value> {
    v.iter().map(|&x| Value::from(x)).collect()
  }

  #[test]
  fn program_occupies_low_addresses(){
    let memory = Memory::new(&values(&[1, 9, 10]));
    assert_eq!(memory.read(0), Value::from(1));
    assert_eq!(memory.read(2), Value::from(10));
  }

  #[test]
  fn unset_addresses_read_zero(){
    let memory = Memory::new(&values(&[1, 2]));
    assert_eq!(memory.read(2), Value::zero());
    assert_eq!(memory.read(1_000_000_000), Value::zero());
  }

  #[test]
  fn writes_grow_dense_region(){
    let mut memory = Memory::new(&values(&[99]));
    memory.write(100, Value::from(7));
    assert_eq!(memory.dense_len(), 101);
    assert_eq!(memory.read(100), Value::from(7));
    assert_eq!(memory.read(50), Value::zero());
  }

  #[test]
  fn far_writes_are_sparse(){
    let mut memory = Memory::new(&values(&[99]));
    memory.write(10_000_000_000, Value::from(-4));
    assert_eq!(memory.dense_len(), 1);
    assert_eq!(memory.touched(), 2);
    assert_eq!(memory.read(10_000_000_000), Value::from(-4));
  }

  #[test]
  fn overwrite_in_place(){
    let mut memory = Memory::new(&values(&[1, 2, 3]));
    memory.write(1, Value::from(20));
    assert_eq!(memory.read(1), Value::from(20));
    assert_eq!(memory.dense_len(), 3);
  }

}
