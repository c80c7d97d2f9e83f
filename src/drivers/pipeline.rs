//! A chain of machines running the same program, where each stage's output is the next
//! stage's input. Each stage is primed with its own phase setting before the first signal.

use crate::computer::{Blocked, Computer};
use crate::drivers::DriverError;
use crate::value::Value;

pub struct Pipeline {
  stages: Vec<Computer>,
}

impl Pipeline {

  /// One stage per phase, in order. Stage `i` starts with `phases[i]` in its input queue.
  pub fn new(program: &[Value], phases: &[Value]) -> Pipeline {
    let stages =
      phases
        .iter()
        .map(|phase| {
          let mut computer = Computer::new(program);
          computer.push_input(phase.clone());
          computer
        })
        .collect();
    Pipeline { stages }
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  pub fn stage(&self, index: usize) -> Option<&Computer> {
    self.stages.get(index)
  }

  /**
    Runs the signal through every stage once. Every value a stage emits before it blocks or
    halts is passed on, and the returned value is the last one emitted by the final stage.
  */
  pub fn run(&mut self, signal: Value) -> Result<Value, DriverError> {
    let mut signals = vec![signal];
    for (index, stage) in self.stages.iter_mut().enumerate() {
      stage.push_inputs(signals);
      stage.run_until_blocked()?;
      signals = stage.drain_output();
      if signals.is_empty() {
        return Err(DriverError::NoOutput { stage: index });
      }
    }
    let last_stage = self.stages.len().saturating_sub(1);
    signals.pop().ok_or(DriverError::NoOutput { stage: last_stage })
  }

  /**
    Feeds the final stage's output back into the first stage until the final stage halts.
    Returns the last value the final stage emitted.
  */
  pub fn run_feedback(&mut self, signal: Value) -> Result<Value, DriverError> {
    if self.stages.is_empty() {
      return Ok(signal);
    }
    let last_stage = self.stages.len().saturating_sub(1);
    let mut signals = vec![signal];
    let mut last: Option<Value> = None;

    loop {
      for (index, stage) in self.stages.iter_mut().enumerate() {
        stage.push_inputs(signals);
        let blocked = stage.run_until_blocked()?;
        signals = stage.drain_output();

        if index == last_stage {
          if let Some(value) = signals.last() {
            last = Some(value.clone());
          }
          if blocked == Blocked::Halted {
            return last.ok_or(DriverError::NoOutput { stage: index });
          }
        }
      }

      // Nothing to feed back; the first stage would wait forever.
      if signals.is_empty() {
        return Err(DriverError::NoOutput { stage: last_stage });
      }
    }
  }

}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::parse_program;
  use crate::fault::Fault;

  fn values(v: &[i64]) -> Vec<Value> {
    v.iter().map(|&x| Value::from(x)).collect()
  }

  #[test]
  fn single_pass(){
    let program = parse_program("3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0").unwrap();
    let mut pipeline = Pipeline::new(&program, &values(&[4, 3, 2, 1, 0]));
    assert_eq!(pipeline.len(), 5);
    assert_eq!(pipeline.run(Value::from(0)), Ok(Value::from(43210)));
    assert!(pipeline.stage(4).map(|s| s.is_halted()).unwrap_or(false));
  }

  #[test]
  fn single_pass_other_order(){
    let program = parse_program(
      "3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0"
    ).unwrap();
    let mut pipeline = Pipeline::new(&program, &values(&[0, 1, 2, 3, 4]));
    assert_eq!(pipeline.run(Value::from(0)), Ok(Value::from(54321)));
  }

  #[test]
  fn feedback_loop(){
    let program = parse_program(
      "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5"
    ).unwrap();
    let mut pipeline = Pipeline::new(&program, &values(&[9, 8, 7, 6, 5]));
    assert_eq!(pipeline.run_feedback(Value::from(0)), Ok(Value::from(139629729)));
  }

  #[test]
  fn silent_stage(){
    let program = parse_program("3,0,3,0,99").unwrap();
    let mut pipeline = Pipeline::new(&program, &values(&[1, 2]));
    assert_eq!(pipeline.run(Value::from(0)), Err(DriverError::NoOutput { stage: 0 }));
  }

  #[test]
  fn stage_fault(){
    let program = parse_program("3,0,4,-1,99").unwrap();
    let mut pipeline = Pipeline::new(&program, &values(&[1]));
    assert_eq!(
      pipeline.run(Value::from(0)),
      Err(DriverError::Fault(Fault::NegativeAddress { address: Value::from(-1) }))
    );
  }

}
