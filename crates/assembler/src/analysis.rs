//! Static checks over a loaded program.

use std::fmt;

use pinkie_common::Program;

/// A problem found by [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A jump or call names a label that is never defined. Fatal at run time
    /// if the instruction executes.
    UnresolvedLabel { index: usize, label: String },
    /// A mnemonic outside the instruction set. Skipped at run time.
    UnknownOpcode { index: usize, mnemonic: String },
}

impl Diagnostic {
    /// True for diagnostics that would abort a run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Diagnostic::UnresolvedLabel { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedLabel { index, label } => {
                write!(f, "instruction {index}: label '{label}' is not defined")
            }
            Diagnostic::UnknownOpcode { index, mnemonic } => {
                write!(f, "instruction {index}: unknown opcode '{mnemonic}'")
            }
        }
    }
}

/// Report unresolved labels and unknown mnemonics, in instruction order.
///
/// The bootstrap is included, so a missing entry label shows up at index 0.
pub fn check(program: &Program) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (index, instr) in program.instructions.iter().enumerate() {
        match instr.opcode {
            Some(op) if op.takes_label() => {
                if program.label(&instr.operand1).is_none() {
                    diagnostics.push(Diagnostic::UnresolvedLabel {
                        index,
                        label: instr.operand1.clone(),
                    });
                }
            }
            Some(_) => {}
            None => diagnostics.push(Diagnostic::UnknownOpcode {
                index,
                mnemonic: instr.mnemonic.clone(),
            }),
        }
    }
    diagnostics
}
