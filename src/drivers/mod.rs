/*!
  Drivers compose several independently owned `Computer`s. The machines know nothing about
  each other; a driver interleaves their steps and relays values from one machine's output to
  another's input.
*/

mod mesh;
mod pipeline;

use thiserror::Error;

use crate::fault::Fault;

pub use mesh::{Mesh, Packet};
pub use pipeline::Pipeline;

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum DriverError {
  #[error(transparent)]
  Fault(#[from] Fault),

  /// A stage halted without producing any output for the next stage.
  #[error("stage {stage} halted without output")]
  NoOutput {
    stage: usize
  },

  /// A node of a mesh faulted. `outbound` holds the packets that left the network earlier in
  /// the same tick.
  #[error("node {node} faulted: {fault}")]
  NodeFault {
    node     : usize,
    fault    : Fault,
    outbound : Vec<Packet>,
  },
}
