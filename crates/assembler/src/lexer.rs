//! Line classifier for Pinkie instruction listings.

/// What a single source line contributes to the program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line<'s> {
    /// Blank or comment-only. Takes no instruction slot.
    Blank,
    /// `#key value` metadata. A missing value is empty.
    Meta { key: &'s str, value: &'s str },
    /// `name:` binds `name` to the next instruction.
    Label(&'s str),
    /// `OPCODE arg1 arg2`. Missing operands are empty, extra tokens dropped.
    Instr {
        mnemonic: &'s str,
        operand1: &'s str,
        operand2: &'s str,
    },
}

/// Classify one line of listing text.
///
/// Everything from the first `;` is discarded and the remainder trimmed
/// before classification.
pub(crate) fn tokenize_line(line: &str) -> Line<'_> {
    let line = line.trim();
    let line = match line.find(';') {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    };
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(rest) = line.strip_prefix('#') {
        let mut words = rest.split_whitespace();
        let key = words.next().unwrap_or("");
        let value = words.next().unwrap_or("");
        return Line::Meta { key, value };
    }

    if let Some(name) = line.strip_suffix(':') {
        return Line::Label(name);
    }

    let mut words = line.split_whitespace();
    Line::Instr {
        mnemonic: words.next().unwrap_or(""),
        operand1: words.next().unwrap_or(""),
        operand2: words.next().unwrap_or(""),
    }
}
