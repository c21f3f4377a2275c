//! A tiny Brainfuck-style virtual machine library.
//!
//! This crate parses programs in a seven-symbol instruction language
//! (`+ - > < [ ] .`; everything else is a comment) into a flat instruction
//! stream with a precomputed jump table, then executes that stream against
//! a fixed-size memory tape (default 65,536 cells) with a single data
//! pointer.
//!
//! Features and behaviors:
//! - Runs of `+ - > <` are coalesced into counted instructions at parse
//!   time; observable behavior is identical to single-step execution.
//! - Loop brackets are matched once, at parse time; jumps resolve in O(1).
//! - Cell arithmetic wraps mod 256 in both directions.
//! - Strict pointer bounds: moving left of cell 0 or right past the end of
//!   the tape returns an error.
//! - No input instruction: `,` is a comment character like any other
//!   non-instruction byte.
//! - Output `.` delivers one byte per instruction to an [`OutputSink`], in
//!   program order.
//!
//! Quick start:
//!
//! ```
//! use bfvm::{parser::parse, machine::Machine};
//!
//! // Classic "Hello World!"
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let program = parse(code).expect("balanced program");
//! let mut out: Vec<u8> = Vec::new();
//! Machine::new().run(&program, &mut out).expect("program runs");
//! assert_eq!(out, b"Hello World!\n");
//! ```

pub mod cli_util;
pub mod config;
pub mod machine;
pub mod parser;
pub mod repl;
pub mod theme;

pub use machine::{Machine, OutOfBoundsError, OutputSink, DEFAULT_TAPE_LEN};
pub use parser::{
    parse, parse_with_options, BracketKind, Instruction, ParseOptions, Program,
    UnbalancedBracketsError,
};
