//! Opcode definitions for the Pinkie instruction set.
//!
//! Mnemonics are matched case-sensitively. Anything outside this set is not
//! an error at load time: the instruction keeps its raw mnemonic and the
//! engine skips over it with a warning.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseOpcodeError;

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Variables
    /// `MOV dst src`: copy a literal or a variable into `dst`.
    Mov,
    /// `DEL name`: remove a variable entirely.
    Del,

    // Arithmetic
    /// `ADD a b`: `a = a + b`.
    Add,
    /// `SUB a b`: `a = a - b`.
    Sub,
    /// `MUL a b`: `a = a * b`.
    Mul,
    /// `DIV a b`: `a = a / b`, real division.
    Div,

    // Comparison and logic
    /// `CMP a b`: set the comparison flag from `a` against a literal or variable `b`.
    Cmp,
    /// `AND a b`: logical AND of truthiness, result 0 or 1.
    And,
    /// `OR a b`: logical OR of truthiness, result 0 or 1.
    Or,
    /// `XOR a b`: logical XOR of truthiness, result 0 or 1.
    Xor,
    /// `NOT a`: logical negation, result 0 or 1.
    Not,

    // Control flow
    /// Return to the caller, restoring its variables.
    Ret,
    /// `CALL label`: save variables and return address, jump to `label`.
    Call,
    /// `JMP label`: unconditional jump.
    Jmp,
    /// Jump if the flag is `Equal`.
    Je,
    /// Jump if the flag is not `Equal`.
    Jne,
    /// Jump if the flag is `Less`.
    Jb,
    /// Jump if the flag is `Less` or `Equal`.
    Jbe,
    /// Jump if the flag is `Greater`.
    Ja,
    /// Jump if the flag is `Greater` or `Equal`.
    Jae,

    // Stacks
    /// Push a variable onto the operand stack.
    Push,
    /// Push a variable onto the auxiliary stack.
    Push0,
    /// Pop the operand stack into a variable (0 when empty).
    Pop,
    /// Pop the auxiliary stack into a variable (0 when empty).
    Pop0,

    // Host and machine control
    /// `INT name`: invoke a registered native function.
    Int,
    /// No operation.
    Nop,
    /// Stop execution.
    End,

    // Heap
    /// `OUT addr value`: store a byte at the address held in `addr`.
    Out,
    /// `IN dst addr`: load the byte at the address held in `addr`.
    In,
}

/// All valid opcodes, in definition order.
pub const ALL_OPCODES: [Opcode; 29] = [
    Opcode::Mov,
    Opcode::Del,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Cmp,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Not,
    Opcode::Ret,
    Opcode::Call,
    Opcode::Jmp,
    Opcode::Je,
    Opcode::Jne,
    Opcode::Jb,
    Opcode::Jbe,
    Opcode::Ja,
    Opcode::Jae,
    Opcode::Push,
    Opcode::Push0,
    Opcode::Pop,
    Opcode::Pop0,
    Opcode::Int,
    Opcode::Nop,
    Opcode::End,
    Opcode::Out,
    Opcode::In,
];

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Mov => "MOV",
            Opcode::Del => "DEL",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Cmp => "CMP",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Not => "NOT",
            Opcode::Ret => "RET",
            Opcode::Call => "CALL",
            Opcode::Jmp => "JMP",
            Opcode::Je => "JE",
            Opcode::Jne => "JNE",
            Opcode::Jb => "JB",
            Opcode::Jbe => "JBE",
            Opcode::Ja => "JA",
            Opcode::Jae => "JAE",
            Opcode::Push => "PUSH",
            Opcode::Push0 => "PUSH0",
            Opcode::Pop => "POP",
            Opcode::Pop0 => "POP0",
            Opcode::Int => "INT",
            Opcode::Nop => "NOP",
            Opcode::End => "END",
            Opcode::Out => "OUT",
            Opcode::In => "IN",
        }
    }

    /// Look up an opcode by its exact (case-sensitive) mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == mnemonic)
            .copied()
    }

    /// True for JMP and the six conditional jumps.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Opcode::Jmp
                | Opcode::Je
                | Opcode::Jne
                | Opcode::Jb
                | Opcode::Jbe
                | Opcode::Ja
                | Opcode::Jae
        )
    }

    /// True for every opcode whose first operand names a label.
    pub fn takes_label(&self) -> bool {
        self.is_jump() || *self == Opcode::Call
    }
}

impl FromStr for Opcode {
    type Err = ParseOpcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::from_mnemonic(s).ok_or_else(|| ParseOpcodeError(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
