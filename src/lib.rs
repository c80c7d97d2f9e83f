/*!
  A virtual machine for the Intcode instruction set.

  A `Computer` is built from a program, a sequence of integers loaded at address zero. It
  executes one instruction per `step`, reading input from a queue the driver fills and
  appending output to a queue the driver drains. Instructions may rewrite any cell of memory,
  including instructions that have not run yet.

  Machines are independent values. Several of them are composed by a driver that relays values
  between their queues; see `drivers` for a chained pipeline and a packet network.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod computer;
pub mod drivers;
pub mod fault;
pub mod input;
pub mod memory;
pub mod value;

pub use bytecode::{parse_program, program_text, Opcode, OpcodeTable, ParameterMode};
pub use computer::{Blocked, Computer, RunResult, State, StepResult};
pub use fault::Fault;
pub use input::{InputProvider, PollingInput, StrictInput};
pub use value::Value;
