//! Pinkie loader: instruction listing text to program image.
//!
//! The listing format is one instruction per line, `OPCODE arg1 arg2`.
//! `;` starts a comment, `name:` declares a label at the next instruction,
//! and `#key value` records metadata. Blank lines take no slot.
//!
//! Loading never fails. Unknown mnemonics are kept for the engine to skip,
//! and unresolved labels surface when a jump or call tries to use them.
//! [`check`] reports both ahead of time.
//!
//! # Usage
//!
//! ```
//! use pinkie_assembler::load;
//!
//! let program = load("Fmain:\n  MOV *main 42\n  RET\n", "Fmain");
//! assert_eq!(program.len(), 4); // CALL Fmain, END, MOV, RET
//! assert_eq!(program.label("Fmain"), Some(2));
//! ```

mod analysis;
mod lexer;

pub use analysis::{check, Diagnostic};

use lexer::{tokenize_line, Line};
use pinkie_common::{Instruction, Program};
use tracing::debug;

/// Load listing text into a bootstrap-prefixed program calling `entry`.
pub fn load(source: &str, entry: &str) -> Program {
    let mut program = Program::with_bootstrap(entry);

    for line in source.lines() {
        match tokenize_line(line) {
            Line::Blank => {}
            Line::Meta { key, value } => {
                program.meta.insert(key.to_string(), value.to_string());
            }
            Line::Label(name) => program.define_label(name),
            Line::Instr {
                mnemonic,
                operand1,
                operand2,
            } => {
                program.push(Instruction::parse_parts(mnemonic, operand1, operand2));
            }
        }
    }

    debug!(
        "loaded {} instructions, {} labels, entry {entry}",
        program.len(),
        program.labels.len()
    );
    program
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinkie_common::{Opcode, BOOTSTRAP_LEN};

    #[test]
    fn load_empty_source_is_bootstrap_only() {
        let program = load("", "Fmain");
        assert_eq!(program.len(), BOOTSTRAP_LEN);
        assert_eq!(
            program.instructions[0],
            Instruction::new(Opcode::Call, "Fmain", "")
        );
        assert_eq!(program.instructions[1].opcode, Some(Opcode::End));
    }

    #[test]
    fn labels_point_past_bootstrap() {
        let program = load("Fmain:\nMOV x 1\nloop:\nJMP loop\n", "Fmain");
        assert_eq!(program.label("Fmain"), Some(2));
        assert_eq!(program.label("loop"), Some(3));
    }

    #[test]
    fn comments_and_blanks_take_no_slot() {
        let text = "\
; header comment

Fmain:      ; entry
  MOV x 1   ; one

  RET
";
        let program = load(text, "Fmain");
        assert_eq!(program.body().len(), 2);
        assert_eq!(program.body()[0], Instruction::new(Opcode::Mov, "x", "1"));
    }

    #[test]
    fn metadata_is_recorded() {
        let program = load("#name demo\n#version 2\n#name final\n#flag\n", "Fmain");
        assert_eq!(program.meta.get("name").map(String::as_str), Some("final"));
        assert_eq!(program.meta.get("version").map(String::as_str), Some("2"));
        assert_eq!(program.meta.get("flag").map(String::as_str), Some(""));
        assert_eq!(program.len(), BOOTSTRAP_LEN);
    }

    #[test]
    fn unknown_mnemonics_are_kept() {
        let program = load("Fmain:\nHALT\nRET\n", "Fmain");
        assert_eq!(program.body()[0].opcode, None);
        assert_eq!(program.body()[0].mnemonic, "HALT");
    }

    #[test]
    fn consecutive_labels_share_an_index() {
        let program = load("a:\nb:\nNOP\n", "a");
        assert_eq!(program.label("a"), Some(2));
        assert_eq!(program.label("b"), Some(2));
    }

    #[test]
    fn trailing_label_points_past_end() {
        let program = load("Fmain:\nRET\nend:\n", "Fmain");
        assert_eq!(program.label("end"), Some(program.len()));
    }
}
