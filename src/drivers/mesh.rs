/*!
  A network of machines running the same program. Each node is booted with its own address and
  reads input without blocking: an empty queue yields `-1`. Nodes send packets by emitting
  three values, `destination, x, y`. Packets to another node are appended to that node's input
  queue; packets addressed outside the network are handed back to the caller.

  A node that keeps polling an empty queue becomes idle. When every node is idle the network
  is quiescent, and only a packet from outside can wake it.
*/

use std::fmt::{Display, Formatter};

use num_traits::ToPrimitive;

use crate::address::AddressNumberType;
use crate::computer::Computer;
use crate::drivers::DriverError;
use crate::input::PollingInput;
use crate::value::Value;

/// Values a node emits per packet.
pub const PACKET_LENGTH: usize = 3;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
  pub source      : AddressNumberType,
  pub destination : Value,
  pub x           : Value,
  pub y           : Value,
}

impl Display for Packet {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} -> {}: ({}, {})", self.source, self.destination, self.x, self.y)
  }
}

pub struct Mesh {
  nodes: Vec<Computer>,
}

impl Mesh {

  /// Boots `size` nodes. Node `i` finds `i` in its input queue.
  pub fn new(program: &[Value], size: usize) -> Mesh {
    let nodes =
      (0..size)
        .map(|address| {
          let mut node = Computer::with_input_provider(program, PollingInput::default());
          node.push_input(Value::from(address));
          node
        })
        .collect();
    Mesh { nodes }
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn node(&self, address: AddressNumberType) -> Option<&Computer> {
    self.nodes.get(address)
  }

  /// The node at `destination`, if the value names one.
  fn address_of(&self, destination: &Value) -> Option<AddressNumberType> {
    destination.to_usize().filter(|&address| address < self.nodes.len())
  }

  /// Delivers a packet from outside the network. Returns `false` if no node has that address.
  pub fn send(&mut self, destination: AddressNumberType, x: Value, y: Value) -> bool {
    match self.nodes.get_mut(destination) {
      Some(node) => {
        node.push_inputs(vec![x, y]);
        true
      }
      None => false
    }
  }

  /**
    Steps every running node once, in address order. After each node's step, every complete
    packet it has emitted is routed. Packets addressed outside the network are returned, oldest
    first. If a node faults, the tick stops there and the error carries the packets that left
    the network before it.
  */
  pub fn tick(&mut self) -> Result<Vec<Packet>, DriverError> {
    let mut outbound = Vec::new();

    for source in 0..self.nodes.len() {
      if !self.nodes[source].is_running() {
        continue;
      }
      if let Err(fault) = self.nodes[source].step() {
        return Err(DriverError::NodeFault { node: source, fault, outbound });
      }

      while let Some(values) = self.nodes[source].take_output(PACKET_LENGTH) {
        let mut values = values.into_iter();
        let packet = Packet {
          source,
          destination : values.next().unwrap_or_default(),
          x           : values.next().unwrap_or_default(),
          y           : values.next().unwrap_or_default(),
        };

        #[cfg(feature = "trace_computation")] println!("packet {}", packet);

        match self.address_of(&packet.destination) {
          Some(destination) => {
            self.nodes[destination].push_inputs(vec![packet.x, packet.y]);
          }
          None => outbound.push(packet)
        }
      }
    }

    Ok(outbound)
  }

  /// Every node is idle: nothing is queued and each has polled an empty queue repeatedly.
  pub fn is_idle(&self) -> bool {
    self.nodes.iter().all(Computer::is_idle)
  }

}
