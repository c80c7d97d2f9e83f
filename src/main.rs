use std::env;
use std::fs;
use std::process;

use intcode::bytecode::{disassemble, parse_program};
use intcode::{Computer, OpcodeTable, Value};

const USAGE: &str = "\
Usage:
  intcode [--dump] <program-file> [input ...]
  intcode --disassemble <program-file>

Runs the program until it halts and prints each output value on its own line.";

fn main() {
  let mut args: Vec<String> = env::args().skip(1).collect();

  let disassemble_only = take_flag(&mut args, "--disassemble");
  let dump             = take_flag(&mut args, "--dump");

  if args.is_empty() {
    eprintln!("{}", USAGE);
    process::exit(2);
  }

  let path = args.remove(0);
  let text = match fs::read_to_string(&path) {
    Ok(text) => text,
    Err(e)   => {
      eprintln!("Could not read {}: {}", path, e);
      process::exit(2);
    }
  };
  let program = match parse_program(&text) {
    Ok(program) => program,
    Err(e)      => {
      eprintln!("{}: {}", path, e);
      process::exit(2);
    }
  };

  if disassemble_only {
    for line in disassemble(&program, &OpcodeTable::canonical()) {
      println!("{}", line);
    }
    return;
  }

  let mut inputs = Vec::with_capacity(args.len());
  for arg in &args {
    match arg.parse::<Value>() {
      Ok(value) => inputs.push(value),
      Err(_)    => {
        eprintln!("Input is not an integer: {}", arg);
        process::exit(2);
      }
    }
  }

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let mut computer = Computer::new(&program);
  computer.push_inputs(inputs);
  let result = computer.run_until_halt();

  if dump {
    println!("{}", computer);
  }

  match result {
    Ok(result) => {
      for value in result.output {
        println!("{}", value);
      }
    }
    Err(fault) => {
      // Whatever was output before the fault is still worth seeing.
      for value in computer.drain_output() {
        println!("{}", value);
      }
      eprintln!("Fault: {}", fault);
      process::exit(1);
    }
  }
}

/// Removes every occurrence of `flag` from `args`, returning whether there was one.
fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
  let before = args.len();
  args.retain(|arg| arg != flag);
  args.len() != before
}
