//! Source text to executable instruction stream.
//!
//! Parsing is a pure function of the source text. Anything outside the seven
//! recognized symbols `+ - > < [ ] .` is a comment and is discarded. The
//! parser walks the remaining symbols once, optionally coalescing runs of
//! `+ - > <` into a single instruction carrying the run length, resolving
//! every bracket pair into a bidirectional jump table as it goes, and
//! finally appends a synthetic [`Instruction::Halt`] so the machine has an
//! explicit terminal instruction.
//!
//! Unbalanced brackets are the only way parsing can fail; no partial
//! program is ever returned.
//!
//! Quick start:
//!
//! ```
//! use bfvm::parser::parse;
//!
//! let program = parse("++[->+<]>.").expect("balanced program");
//! assert!(program.len() > 0);
//! ```

use std::fmt;

/// One executable operation in the instruction stream.
///
/// The count carried by the four simple operations is always >= 1; it is 1
/// unless run-length coalescing merged a run of identical source symbols.
/// `.`, `[` and `]` are never coalesced: each output is independently
/// observable and each bracket is a distinct control-flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `+` — add `n` to the current cell, wrapping mod 256.
    IncCell(usize),
    /// `-` — subtract `n` from the current cell, wrapping mod 256.
    DecCell(usize),
    /// `>` — move the data pointer right by `n`.
    MoveRight(usize),
    /// `<` — move the data pointer left by `n`.
    MoveLeft(usize),
    /// `[` — jump past the matching `]` when the current cell is zero.
    LoopOpen,
    /// `]` — jump back past the matching `[` when the current cell is non-zero.
    LoopClose,
    /// `.` — emit the current cell to the output sink.
    Output,
    /// Synthetic end-of-program sentinel, appended once by the parser.
    Halt,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::IncCell(n) => write!(f, "+ x{n}"),
            Instruction::DecCell(n) => write!(f, "- x{n}"),
            Instruction::MoveRight(n) => write!(f, "> x{n}"),
            Instruction::MoveLeft(n) => write!(f, "< x{n}"),
            Instruction::LoopOpen => write!(f, "["),
            Instruction::LoopClose => write!(f, "]"),
            Instruction::Output => write!(f, "."),
            Instruction::Halt => write!(f, "halt"),
        }
    }
}

/// Which side of a loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// The single parse-time failure mode: mismatched loop brackets.
///
/// `position` is the character index of the offending bracket in the
/// original (unfiltered) source, so callers can point at it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unmatched bracket {kind} at source position {position}")]
pub struct UnbalancedBracketsError {
    pub position: usize,
    pub kind: BracketKind,
}

/// Parser knobs.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Merge runs of identical `+ - > <` symbols into one counted
    /// instruction. Semantically equivalent to leaving them single-step;
    /// fewer dispatch cycles at run time.
    pub coalesce: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { coalesce: true }
    }
}

/// A parsed program: the instruction stream plus its jump table.
///
/// Immutable after parsing. `jump_table[i]` holds the matching index for
/// the `LoopOpen` or `LoopClose` at index `i` and `None` everywhere else.
/// A `Program` carries no execution state and may be run any number of
/// times from independent machines.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    jump_table: Vec<Option<usize>>,
}

impl Program {
    /// The instruction stream, `Halt` sentinel included.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions, `Halt` sentinel included.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true in practice: parse always appends Halt.
        self.instructions.is_empty()
    }

    /// Matching bracket index for the instruction at `index`, if it is a
    /// bracket.
    pub fn jump_target(&self, index: usize) -> Option<usize> {
        self.jump_table.get(index).copied().flatten()
    }
}

/// Parse `source` with run-length coalescing enabled.
pub fn parse(source: &str) -> Result<Program, UnbalancedBracketsError> {
    parse_with_options(source, ParseOptions::default())
}

/// Parse `source` into a [`Program`].
///
/// Single left-to-right walk over the source. Comment characters emit
/// nothing, so a run of `+` interrupted only by comments still coalesces.
/// Bracket matching uses an explicit stack of open-bracket indices; both
/// directions of each pair are recorded in the jump table as soon as the
/// close is seen.
pub fn parse_with_options(
    source: &str,
    options: ParseOptions,
) -> Result<Program, UnbalancedBracketsError> {
    let mut instructions: Vec<Instruction> = Vec::new();
    let mut jump_table: Vec<Option<usize>> = Vec::new();
    // (instruction index, source char position) per unmatched '['
    let mut open_brackets: Vec<(usize, usize)> = Vec::new();

    for (pos, ch) in source.chars().enumerate() {
        let instr = match ch {
            '+' => Instruction::IncCell(1),
            '-' => Instruction::DecCell(1),
            '>' => Instruction::MoveRight(1),
            '<' => Instruction::MoveLeft(1),
            '[' => Instruction::LoopOpen,
            ']' => Instruction::LoopClose,
            '.' => Instruction::Output,
            _ => continue, // comment
        };

        match instr {
            Instruction::LoopOpen => {
                open_brackets.push((instructions.len(), pos));
                instructions.push(instr);
                jump_table.push(None);
            }
            Instruction::LoopClose => {
                let Some((open_index, _)) = open_brackets.pop() else {
                    return Err(UnbalancedBracketsError {
                        position: pos,
                        kind: BracketKind::Close,
                    });
                };
                let close_index = instructions.len();
                instructions.push(instr);
                jump_table.push(Some(open_index));
                jump_table[open_index] = Some(close_index);
            }
            _ => {
                if options.coalesce {
                    if let Some(merged) = coalesce_with_last(instructions.last_mut(), instr) {
                        *merged += 1;
                        continue;
                    }
                }
                instructions.push(instr);
                jump_table.push(None);
            }
        }
    }

    if let Some(&(_, pos)) = open_brackets.last() {
        return Err(UnbalancedBracketsError {
            position: pos,
            kind: BracketKind::Open,
        });
    }

    instructions.push(Instruction::Halt);
    jump_table.push(None);

    Ok(Program {
        instructions,
        jump_table,
    })
}

/// If `last` is the same countable operation as `incoming`, hand back its
/// count for bumping. Brackets and output never coalesce.
fn coalesce_with_last<'a>(
    last: Option<&'a mut Instruction>,
    incoming: Instruction,
) -> Option<&'a mut usize> {
    match (last?, incoming) {
        (Instruction::IncCell(n), Instruction::IncCell(_))
        | (Instruction::DecCell(n), Instruction::DecCell(_))
        | (Instruction::MoveRight(n), Instruction::MoveRight(_))
        | (Instruction::MoveLeft(n), Instruction::MoveLeft(_)) => Some(n),
        _ => None,
    }
}
