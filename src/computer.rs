//! The execution engine: a `Computer` owns its memory, its registers, and its I/O queues, and
//! executes one instruction per `step`.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use num_traits::{ToPrimitive, Zero};
use prettytable::{format as TableFormat, Table};

use crate::address::{advance_address, offset_address, to_address, AddressNumberType};
use crate::bytecode::{
  disassemble_window, Descriptor, Effect, Instruction, Listing, OpcodeTable, ParameterMode,
  MAX_OPERANDS
};
use crate::fault::Fault;
use crate::input::{InputProvider, StrictInput};
use crate::memory::Memory;
use crate::value::Value;

/// Lifecycle of a `Computer`. `Halted` and `Faulted` are terminal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum State {
  Running,
  Halted,
  Faulted(Fault),
}

impl Display for State {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      State::Running        => write!(f, "Running"),
      State::Halted         => write!(f, "Halted"),
      State::Faulted(fault) => write!(f, "Faulted: {}", fault)
    }
  }
}

/// The outcome of a successful `step`. A fault is returned as the `Err` of the step instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepResult {
  Running,
  Halted,
}

/// Why `run_until_blocked` stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Blocked {
  Halted,
  /// The next instruction reads input and the input queue is empty.
  NeedsInput,
}

/// Everything the machine output before halting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunResult {
  pub output: Vec<Value>,
}

pub struct Computer {
  memory         : Memory,
  pointer        : AddressNumberType,
  relative_base  : Value,
  state          : State,
  /// Count of instructions that ran to completion. A faulting instruction is not counted.
  steps          : u64,

  input          : VecDeque<Value>,
  output         : VecDeque<Value>,
  input_provider : Box<dyn InputProvider>,
  table          : Arc<OpcodeTable>,
}

impl Computer {

  // region Construction

  /// A machine with the canonical opcode table and strict input.
  pub fn new(program: &[Value]) -> Computer {
    Computer::with_table(program, OpcodeTable::canonical(), Box::new(StrictInput))
  }

  /// A machine with the canonical opcode table whose `input` operation is served by `provider`.
  pub fn with_input_provider<P>(program: &[Value], provider: P) -> Computer
    where P: InputProvider + 'static
  {
    Computer::with_table(program, OpcodeTable::canonical(), Box::new(provider))
  }

  pub fn with_table(
    program  : &[Value],
    table    : Arc<OpcodeTable>,
    provider : Box<dyn InputProvider>
  ) -> Computer {
    Computer {
      memory         : Memory::new(program),
      pointer        : 0,
      relative_base  : Value::zero(),
      state          : State::Running,
      steps          : 0,
      input          : VecDeque::new(),
      output         : VecDeque::new(),
      input_provider : provider,
      table,
    }
  }

  // endregion

  // region Inspection

  pub fn state(&self) -> &State {
    &self.state
  }

  pub fn is_halted(&self) -> bool {
    self.state == State::Halted
  }

  pub fn is_running(&self) -> bool {
    self.state == State::Running
  }

  pub fn pointer(&self) -> AddressNumberType {
    self.pointer
  }

  pub fn relative_base(&self) -> &Value {
    &self.relative_base
  }

  pub fn steps(&self) -> u64 {
    self.steps
  }

  /// Reads memory without executing anything. Drivers may look but never write.
  pub fn peek_memory(&self, address: AddressNumberType) -> Value {
    self.memory.read(address)
  }

  /// The instruction at the pointer, as the disassembler would list it.
  pub fn current_instruction(&self) -> Option<Listing> {
    let window: Vec<Value> =
      (self.pointer..=self.pointer.saturating_add(MAX_OPERANDS))
        .map(|address| self.memory.read(address))
        .collect();
    disassemble_window(&window, self.pointer, &self.table)
  }

  /**
    Whether the next instruction reads input while the input queue is empty, and the input
    provider would fail on it. Providers that never block, such as `PollingInput`, are never
    awaiting input.
  */
  pub fn awaiting_input(&self) -> bool {
    if !self.is_running() || !self.input.is_empty() {
      return false;
    }
    if !self.input_provider.blocks_on_empty() {
      return false;
    }
    match Instruction::decode(&self.memory.read(self.pointer), self.pointer) {
      Ok(instruction) => {
        match self.table.get(instruction.opcode) {
          Some(Descriptor { effect: Effect::Input, .. }) => true,
          _                                               => false
        }
      }
      Err(_) => false
    }
  }

  /// The input queue is empty and the input provider has been polled dry for a while.
  pub fn is_idle(&self) -> bool {
    self.input.is_empty() && self.input_provider.is_idle()
  }

  // endregion

  // region I/O channels

  pub fn push_input(&mut self, value: Value) {
    self.input.push_back(value);
  }

  pub fn push_inputs<I>(&mut self, values: I)
    where I: IntoIterator<Item = Value>
  {
    self.input.extend(values);
  }

  /// Pushes the code of each byte of `text`.
  pub fn push_ascii(&mut self, text: &str) {
    self.input.extend(text.bytes().map(Value::from));
  }

  pub fn input_len(&self) -> usize {
    self.input.len()
  }

  /// Output produced since the last drain, oldest first.
  pub fn peek_output(&self) -> &VecDeque<Value> {
    &self.output
  }

  pub fn output_len(&self) -> usize {
    self.output.len()
  }

  pub fn drain_output(&mut self) -> Vec<Value> {
    self.output.drain(..).collect()
  }

  /// Removes and returns the oldest output value.
  pub fn pop_output(&mut self) -> Option<Value> {
    self.output.pop_front()
  }

  /// Removes and returns the oldest `n` output values, if that many are available.
  pub fn take_output(&mut self, n: usize) -> Option<Vec<Value>> {
    match self.output.len() >= n {
      true  => Some(self.output.drain(..n).collect()),
      false => None
    }
  }

  /**
    Drains the output as text. Values in the ASCII range become characters; anything else, such
    as a final numeric answer after a text prompt, is rendered in decimal.
  */
  pub fn drain_ascii(&mut self) -> String {
    self
      .drain_output()
      .iter()
      .map(|value| {
        match value.to_u8() {
          Some(byte) if byte.is_ascii() => (byte as char).to_string(),
          _                             => value.to_string()
        }
      })
      .collect()
  }

  // endregion

  // region Operand resolution

  /// The value of an operand: the cell it addresses in Position and Relative mode, or the
  /// operand itself in Immediate mode.
  pub fn resolve(&self, mode: ParameterMode, operand: &Value) -> Result<Value, Fault> {
    match mode {
      ParameterMode::Immediate => Ok(operand.clone()),
      _                        => Ok(self.memory.read(self.resolve_address(mode, operand)?))
    }
  }

  /// The address an operand refers to. Immediate operands have no address.
  pub fn resolve_address(&self, mode: ParameterMode, operand: &Value)
    -> Result<AddressNumberType, Fault>
  {
    match mode {
      ParameterMode::Position  => to_address(operand),
      ParameterMode::Relative  => offset_address(&self.relative_base, operand),
      ParameterMode::Immediate => Err(Fault::ImmediateWriteTarget { address: self.pointer })
    }
  }

  fn read_operand(&self, instruction: &Instruction, n: usize) -> Result<Value, Fault> {
    let mode    = instruction.mode(n)?;
    let operand = self.memory.read(instruction.operand_address(n)?);
    self.resolve(mode, &operand)
  }

  /// The write target of an instruction is the operand following its `arity` read operands.
  fn write_address(&self, instruction: &Instruction, arity: usize)
    -> Result<AddressNumberType, Fault>
  {
    let mode    = instruction.mode(arity)?;
    let operand = self.memory.read(instruction.operand_address(arity)?);
    self.resolve_address(mode, &operand)
  }

  // endregion

  // region Execution

  /**
    Executes exactly one instruction. Stepping a machine that has halted or faulted is a caller
    error reported as `Fault::StepAfterTerminal`; the machine keeps its terminal state.
  */
  pub fn step(&mut self) -> Result<StepResult, Fault> {
    if !self.is_running() {
      return Err(Fault::StepAfterTerminal);
    }

    match self.execute() {

      Ok(StepResult::Halted) => {
        self.state = State::Halted;
        Ok(StepResult::Halted)
      }

      Ok(StepResult::Running) => Ok(StepResult::Running),

      Err(fault) => {
        #[cfg(feature = "trace_computation")]
          println!("{:>8}  fault: {}", self.pointer, fault);
        self.state = State::Faulted(fault.clone());
        Err(fault)
      }

    }
  }

  fn execute(&mut self) -> Result<StepResult, Fault> {
    let instruction = Instruction::decode(&self.memory.read(self.pointer), self.pointer)?;
    let descriptor  = match self.table.get(instruction.opcode) {
      Some(descriptor) => *descriptor,
      None             => {
        return Err(Fault::InvalidOpcode {
          opcode  : Value::from(instruction.opcode),
          address : self.pointer
        });
      }
    };

    let mut operands = Vec::with_capacity(descriptor.arity);
    for n in 0..descriptor.arity {
      operands.push(self.read_operand(&instruction, n)?);
    }

    #[cfg(feature = "trace_computation")]
      {
        if let Some(listing) = self.current_instruction() {
          println!(
            "{}    <- {}",
            listing,
            operands.iter().map(Value::to_string).collect::<Vec<String>>().join(", ")
          );
        }
      }

    // The address after the instruction. Only a taken jump runs without it.
    let next = advance_address(self.pointer, descriptor.width());

    match descriptor.effect {

      Effect::Compute(f) => {
        let target = self.write_address(&instruction, descriptor.arity)?;
        let next   = next?;
        let result = f(&operands[0], &operands[1]);
        #[cfg(feature = "trace_computation")] println!("          [{}] = {}", target, result);
        self.memory.write(target, result);
        self.pointer = next;
      }

      Effect::Input => {
        let target = self.write_address(&instruction, descriptor.arity)?;
        let next   = next?;
        let value  = self.input_provider.provide(&mut self.input, self.pointer)?;
        #[cfg(feature = "trace_computation")] println!("          [{}] = {}", target, value);
        self.memory.write(target, value);
        self.pointer = next;
      }

      Effect::Output => {
        self.pointer = next?;
        self.output.extend(operands.into_iter().take(1));
      }

      Effect::JumpIf(condition) => {
        match condition(&operands[0]) {
          true  => self.pointer = to_address(&operands[1])?,
          false => self.pointer = next?
        }
      }

      Effect::AdjustRelativeBase => {
        self.pointer = next?;
        self.relative_base += &operands[0];
      }

      Effect::Halt => {
        self.steps += 1;
        return Ok(StepResult::Halted);
      }

    }

    self.steps += 1;
    Ok(StepResult::Running)
  }

  /// Steps until the machine halts, returning the output it has not yet drained.
  pub fn run_until_halt(&mut self) -> Result<RunResult, Fault> {
    while self.step()? == StepResult::Running {}
    Ok(RunResult { output: self.drain_output() })
  }

  /**
    Steps until the machine halts or would read from an empty input queue. This is how a driver
    waits for input: it stops stepping, pushes a value, and resumes.
  */
  pub fn run_until_blocked(&mut self) -> Result<Blocked, Fault> {
    loop {
      if self.is_halted() {
        return Ok(Blocked::Halted);
      }
      if self.awaiting_input() {
        return Ok(Blocked::NeedsInput);
      }
      self.step()?;
    }
  }

  /// Steps until at least `n` output values are pending. Returns `false` if the machine halts
  /// first.
  pub fn run_until_output(&mut self, n: usize) -> Result<bool, Fault> {
    while self.output.len() < n {
      if self.is_halted() {
        return Ok(false);
      }
      self.step()?;
    }
    Ok(true)
  }

  // endregion

  // region Display methods

  fn make_memory_table(&self, start: AddressNumberType, end: AddressNumberType) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for address in start..end {
      let value = self.memory.read(address);
      match address == self.pointer {

        true  => {
          table.add_row(row![r->format!("* --> [{}] =", address), format!("{}", value)]);
        }

        false => {
          table.add_row(row![r->format!("[{}] =", address), format!("{}", value)]);
        }

      }
    }
    table
  }

  fn make_register_table(&self) -> Table {
    let instruction = match self.current_instruction() {
      Some(listing) => listing.to_string().trim_start().to_string(),
      None          => String::new()
    };

    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.add_row(row![r->"pointer", format!("{}", self.pointer)]);
    table.add_row(row![r->"relative base", format!("{}", self.relative_base)]);
    table.add_row(row![r->"steps", format!("{}", self.steps)]);
    table.add_row(row![r->"next", instruction]);
    table
  }

  fn make_queue_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.add_row(row![r->"input", join_values(self.input.iter())]);
    table.add_row(row![r->"output", join_values(self.output.iter())]);
    table
  }

  // endregion

}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

fn join_values<'a, I>(values: I) -> String
  where I: Iterator<Item = &'a Value>
{
  values.map(Value::to_string).collect::<Vec<String>>().join(", ")
}

/// Rows of memory shown before the pointer in the state dump.
const WINDOW_BEFORE: usize = 4;
/// Rows of memory shown from the pointer onward in the state dump.
const WINDOW_AFTER: usize = 8;

impl Display for Computer {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let start = self.pointer.saturating_sub(WINDOW_BEFORE);
    let end   = self.pointer.saturating_add(WINDOW_AFTER);

    let m_table = self.make_memory_table(start, end);
    let r_table = self.make_register_table();
    let q_table = self.make_queue_table();

    let mut combined_table = table!([m_table, r_table, q_table]);

    combined_table.set_titles(row![ub->"Memory", ub->"Registers", ub->"Queues"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "State: {}\n{}", self.state, combined_table)
  }
}
