//! Errors for Pinkie common types.

use thiserror::Error;

/// A mnemonic that is not part of the instruction set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown opcode '{0}'")]
pub struct ParseOpcodeError(pub String);
