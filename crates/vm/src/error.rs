//! Runtime errors for the Pinkie VM.
//!
//! Every error is fatal to the run. The host decides how to report it and
//! which exit status to use.

use pinkie_common::Instruction;
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// No free region could satisfy an allocation.
    #[error("not enough memory, requiring {requested} bytes")]
    OutOfMemory { requested: usize },

    /// A guarded heap store targeted an address inside a free region. The
    /// address is the raw variable value, which need not be a whole number.
    #[error("trying to access an unallocated address in heap: {address}")]
    AccessUnallocatedHeap { address: f64 },

    /// The instruction pointer left the program without reaching END.
    #[error("unexpected end of instructions, EIP={eip}")]
    InstrNotFound { eip: usize },

    /// A jump or call named a label missing from the label table.
    #[error("cannot find label, required by {instruction}")]
    LabelNotFound { instruction: Instruction },

    /// INT named a native function that was never registered.
    #[error("cannot find INT call to {name}")]
    IntNotFound { name: String },
}
