/*!
  The `input` operation is the only operation whose behavior a driver may replace. A
  `Computer` owns its input queue and hands it to its `InputProvider` every time `input`
  executes; the provider decides what value the operation writes.

  `StrictInput` is the canonical behavior and the default. `PollingInput` never faults: an
  empty queue yields a sentinel and counts toward idleness, which networked drivers use to
  detect quiescence. Any `FnMut(&mut VecDeque<Value>) -> Result<Value, Fault>` is also a
  provider, for drivers that compute the value from outside state.
*/

use std::collections::VecDeque;

use crate::address::AddressNumberType;
use crate::fault::Fault;
use crate::value::Value;

/// Consecutive empty polls beyond which a `PollingInput` reports idle.
pub const IDLE_POLL_THRESHOLD: usize = 2;

pub trait InputProvider {
  /// Produces the value for the `input` instruction at `address`.
  fn provide(&mut self, queue: &mut VecDeque<Value>, address: AddressNumberType)
    -> Result<Value, Fault>;

  /// Whether the provider has seen the machine wait on input for long enough to call it idle.
  fn is_idle(&self) -> bool {
    false
  }

  /// Whether `provide` fails on an empty queue, so that a driver has to push input first.
  fn blocks_on_empty(&self) -> bool {
    true
  }
}

/// Pops the front of the queue, faulting with `Fault::InputUnderflow` when it is empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictInput;

impl InputProvider for StrictInput {
  fn provide(&mut self, queue: &mut VecDeque<Value>, address: AddressNumberType)
    -> Result<Value, Fault>
  {
    queue.pop_front().ok_or(Fault::InputUnderflow { address })
  }
}

/// Pops the front of the queue, or yields `sentinel` and counts an empty poll.
#[derive(Clone, Debug)]
pub struct PollingInput {
  sentinel    : Value,
  empty_polls : usize,
}

impl PollingInput {
  pub fn new(sentinel: Value) -> PollingInput {
    PollingInput { sentinel, empty_polls: 0 }
  }

  pub fn empty_polls(&self) -> usize {
    self.empty_polls
  }
}

impl Default for PollingInput {
  /// Polls with the sentinel `-1`.
  fn default() -> PollingInput {
    PollingInput::new(Value::from(-1))
  }
}

impl InputProvider for PollingInput {
  fn provide(&mut self, queue: &mut VecDeque<Value>, _address: AddressNumberType)
    -> Result<Value, Fault>
  {
    match queue.pop_front() {
      Some(value) => {
        self.empty_polls = 0;
        Ok(value)
      }
      None => {
        self.empty_polls += 1;
        Ok(self.sentinel.clone())
      }
    }
  }

  fn is_idle(&self) -> bool {
    self.empty_polls > IDLE_POLL_THRESHOLD
  }

  fn blocks_on_empty(&self) -> bool {
    false
  }
}

impl<F> InputProvider for F
  where F: FnMut(&mut VecDeque<Value>) -> Result<Value, Fault>
{
  fn provide(&mut self, queue: &mut VecDeque<Value>, _address: AddressNumberType)
    -> Result<Value, Fault>
  {
    self(queue)
  }

  /// A closure answers from its own state, whatever the queue holds.
  fn blocks_on_empty(&self) -> bool {
    false
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn queue(v: &[i64]) -> VecDeque<Value> {
    v.iter().map(|&x| Value::from(x)).collect()
  }

  #[test]
  fn strict_pops_in_order(){
    let mut q = queue(&[4, 5]);
    let mut input = StrictInput;
    assert_eq!(input.provide(&mut q, 0), Ok(Value::from(4)));
    assert_eq!(input.provide(&mut q, 0), Ok(Value::from(5)));
    assert_eq!(input.provide(&mut q, 12), Err(Fault::InputUnderflow { address: 12 }));
    assert!(!input.is_idle());
    assert!(input.blocks_on_empty());
  }

  #[test]
  fn polling_counts_empty_polls(){
    let mut q = queue(&[]);
    let mut input = PollingInput::default();
    for _ in 0..IDLE_POLL_THRESHOLD {
      assert_eq!(input.provide(&mut q, 0), Ok(Value::from(-1)));
    }
    assert!(!input.is_idle());
    assert_eq!(input.provide(&mut q, 0), Ok(Value::from(-1)));
    assert!(input.is_idle());

    q.push_back(Value::from(8));
    assert_eq!(input.provide(&mut q, 0), Ok(Value::from(8)));
    assert_eq!(input.empty_polls(), 0);
    assert!(!input.is_idle());
  }

  #[test]
  fn closures_are_providers(){
    let mut q = queue(&[]);
    let mut calls = 0;
    let mut input = |_: &mut VecDeque<Value>| -> Result<Value, Fault> {
      calls += 1;
      Ok(Value::from(calls))
    };
    assert_eq!(input.provide(&mut q, 0), Ok(Value::from(1)));
    assert_eq!(input.provide(&mut q, 0), Ok(Value::from(2)));
    assert!(!input.blocks_on_empty());
    assert!(!PollingInput::default().blocks_on_empty());
  }

}
