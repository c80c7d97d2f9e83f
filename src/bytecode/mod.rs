/*!

  An instruction is a run of consecutive memory cells: the instruction word followed by its
  operands. The instruction word packs the opcode into its two low decimal digits and one
  parameter mode digit per operand above them:

    word = opcode + 100 * mode_0 + 1_000 * mode_1 + 10_000 * mode_2

  Nothing distinguishes code from data. A program may overwrite any cell, including the word
  of the next instruction to run, and the change takes effect on the next fetch.

*/

mod assembly;
mod instruction;
mod table;

pub use assembly::{
  disassemble, disassemble_at, disassemble_window, format_operand, parse_program, program_text,
  Listing, ProgramTextError
};
pub use instruction::{Instruction, Opcode, ParameterMode, MAX_OPERANDS, OPCODE_RADIX};
pub use table::{descriptor, Descriptor, Effect, OpcodeTable};
