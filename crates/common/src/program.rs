//! Program image: instructions, label table and metadata.
//!
//! Every image starts with a two-instruction bootstrap, `CALL <entry>`
//! followed by `END`, so returning from the entry function halts the
//! machine. Label indices are recorded against the full image, bootstrap
//! included.

use std::collections::{BTreeMap, HashMap};

use crate::instruction::Instruction;
use crate::opcode::Opcode;

/// Number of synthesized instructions in front of user code.
pub const BOOTSTRAP_LEN: usize = 2;

/// A loaded Pinkie program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream, bootstrap first.
    pub instructions: Vec<Instruction>,
    /// Label name to instruction index.
    pub labels: HashMap<String, usize>,
    /// `#key value` pairs from the listing. Not interpreted by the engine.
    pub meta: BTreeMap<String, String>,
}

impl Program {
    /// Create an image holding only the bootstrap for `entry`.
    pub fn with_bootstrap(entry: &str) -> Self {
        Self {
            instructions: vec![
                Instruction::new(Opcode::Call, entry, ""),
                Instruction::new(Opcode::End, "", ""),
            ],
            labels: HashMap::new(),
            meta: BTreeMap::new(),
        }
    }

    /// Append an instruction, returning its index.
    pub fn push(&mut self, instr: Instruction) -> usize {
        self.instructions.push(instr);
        self.instructions.len() - 1
    }

    /// Bind `name` to the index of the next instruction to be pushed.
    ///
    /// A later definition of the same name replaces the earlier one.
    pub fn define_label(&mut self, name: impl Into<String>) {
        self.labels.insert(name.into(), self.instructions.len());
    }

    /// Resolve a label to its instruction index.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// The instruction at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Number of instructions, bootstrap included.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the image has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions after the bootstrap.
    pub fn body(&self) -> &[Instruction] {
        self.instructions
            .get(BOOTSTRAP_LEN..)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_calls_entry_then_ends() {
        let program = Program::with_bootstrap("Fmain");
        assert_eq!(program.len(), BOOTSTRAP_LEN);
        assert_eq!(program.instructions[0], Instruction::new(Opcode::Call, "Fmain", ""));
        assert_eq!(program.instructions[1].opcode, Some(Opcode::End));
        assert!(program.body().is_empty());
    }

    #[test]
    fn labels_account_for_bootstrap() {
        let mut program = Program::with_bootstrap("Fmain");
        program.define_label("Fmain");
        program.push(Instruction::new(Opcode::Ret, "", ""));
        assert_eq!(program.label("Fmain"), Some(2));
        assert_eq!(program.get(2).and_then(|i| i.opcode), Some(Opcode::Ret));
    }

    #[test]
    fn redefined_label_wins() {
        let mut program = Program::with_bootstrap("Fmain");
        program.define_label("x");
        program.push(Instruction::new(Opcode::Nop, "", ""));
        program.define_label("x");
        assert_eq!(program.label("x"), Some(3));
    }

    #[test]
    fn missing_label_and_instruction() {
        let program = Program::with_bootstrap("Fmain");
        assert_eq!(program.label("nowhere"), None);
        assert!(program.get(2).is_none());
        assert!(!program.is_empty());
    }
}
