//! Pinkie virtual machine: executes loaded instruction listings.
//!
//! The machine has:
//! - A global variable store with call frames that restore it on return
//! - An operand stack and an auxiliary stack
//! - A fixed-size byte heap with a first-fit, coalescing allocator
//! - A registry of host functions reachable through INT
//!
//! # Usage
//!
//! ```
//! use pinkie_common::{Instruction, Opcode, Program};
//! use pinkie_vm::{run, NativeRegistry, Outcome, RunOptions};
//!
//! let mut program = Program::with_bootstrap("Fmain");
//! program.define_label("Fmain");
//! program.push(Instruction::new(Opcode::Mov, "*main", "42"));
//! program.push(Instruction::new(Opcode::Ret, "", ""));
//!
//! let outcome = run(&program, NativeRegistry::new(), RunOptions::default()).unwrap();
//! assert_eq!(outcome, Outcome::Halted);
//! ```

pub mod builtins;
pub mod error;
pub mod execute;
pub mod frame;
pub mod heap;
pub mod machine;
pub mod native;

pub use error::RuntimeError;
pub use heap::Heap;
pub use machine::{Machine, Outcome, RunOptions, State, DEFAULT_HEAP_SIZE};
pub use native::{NativeFlow, NativeRegistry};

use pinkie_common::Program;

/// Execute a program from its bootstrap until END or a native exit.
///
/// # Errors
///
/// Returns [`RuntimeError`] on a missing label, unregistered native, guarded
/// store into free heap memory, failed allocation, or an instruction
/// pointer that runs off the program.
pub fn run(
    program: &Program,
    natives: NativeRegistry,
    options: RunOptions,
) -> Result<Outcome, RuntimeError> {
    let mut vm = Machine::new(program, natives, options);
    vm.execute()
}
