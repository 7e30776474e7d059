//! A single Pinkie instruction: a mnemonic plus two operand strings.
//!
//! Operands stay textual. Whether an operand is an immediate or a variable
//! name is decided by the engine at execution time with [`is_immediate`].

use std::fmt;

use crate::opcode::Opcode;

/// One instruction of a program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The mnemonic as written in the source listing.
    pub mnemonic: String,
    /// The decoded opcode, `None` for mnemonics outside the instruction set.
    pub opcode: Option<Opcode>,
    /// First operand, empty when absent.
    pub operand1: String,
    /// Second operand, empty when absent.
    pub operand2: String,
}

impl Instruction {
    /// Create an instruction from a known opcode.
    pub fn new(opcode: Opcode, operand1: impl Into<String>, operand2: impl Into<String>) -> Self {
        Self {
            mnemonic: opcode.mnemonic().to_string(),
            opcode: Some(opcode),
            operand1: operand1.into(),
            operand2: operand2.into(),
        }
    }

    /// Create an instruction from raw source tokens, decoding the mnemonic.
    pub fn parse_parts(
        mnemonic: impl Into<String>,
        operand1: impl Into<String>,
        operand2: impl Into<String>,
    ) -> Self {
        let mnemonic = mnemonic.into();
        let opcode = Opcode::from_mnemonic(&mnemonic);
        Self {
            mnemonic,
            opcode,
            operand1: operand1.into(),
            operand2: operand2.into(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic)?;
        if !self.operand1.is_empty() {
            write!(f, " {}", self.operand1)?;
        }
        if !self.operand2.is_empty() {
            write!(f, " {}", self.operand2)?;
        }
        Ok(())
    }
}

/// True iff `operand` is a non-empty run of ASCII digits.
///
/// Signs, decimal points and exponents are not immediates; such operands
/// are treated as variable names.
pub fn is_immediate(operand: &str) -> bool {
    !operand.is_empty() && operand.bytes().all(|b| b.is_ascii_digit())
}

/// Parse `operand` as an immediate, or `None` if it names a variable.
pub fn immediate_value(operand: &str) -> Option<f64> {
    if is_immediate(operand) {
        operand.parse().ok()
    } else {
        None
    }
}
