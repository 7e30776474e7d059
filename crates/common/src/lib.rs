//! Pinkie common types.
//!
//! This crate provides the data structures shared by the loader and the
//! virtual machine:
//!
//! - [`Opcode`]: the closed set of 29 mnemonics
//! - [`Instruction`]: a mnemonic plus two textual operands
//! - [`Program`]: the bootstrap-prefixed instruction image with its label table
//! - [`ParseOpcodeError`]: rejection of mnemonics outside the set
//!
//! # Dependencies
//!
//! This crate uses `thiserror` and has no other dependencies.

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::ParseOpcodeError;
pub use instruction::{immediate_value, is_immediate, Instruction};
pub use opcode::Opcode;
pub use program::{Program, BOOTSTRAP_LEN};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_opcode() -> impl Strategy<Value = Opcode> {
        prop::sample::select(&opcode::ALL_OPCODES[..])
    }

    proptest! {
        /// Every digit string is an immediate and parses to a finite value.
        #[test]
        fn digit_strings_are_immediates(s in "[0-9]{1,30}") {
            prop_assert!(is_immediate(&s));
            let v = immediate_value(&s).unwrap();
            prop_assert!(v.is_finite() && v >= 0.0);
        }

        /// A string with any non-digit character names a variable.
        #[test]
        fn non_digit_strings_are_names(s in "[0-9]{0,5}[a-zA-Z_$*.-][0-9a-z]{0,5}") {
            prop_assert!(!is_immediate(&s));
            prop_assert_eq!(immediate_value(&s), None);
        }

        /// Displaying an instruction and splitting it on whitespace recovers
        /// the mnemonic and operands.
        #[test]
        fn display_splits_back(op in arb_opcode(), a in "[a-z]{1,8}", b in "[0-9]{1,4}") {
            let instr = Instruction::new(op, a.clone(), b.clone());
            let text = instr.to_string();
            let parts: Vec<&str> = text.split_whitespace().collect();
            prop_assert_eq!(parts, vec![op.mnemonic(), a.as_str(), b.as_str()]);
        }
    }
}
