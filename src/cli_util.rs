use crate::machine::{OutOfBoundsError, OutputSink};
use crate::parser::UnbalancedBracketsError;
use std::io::{self, Write};

/// Immediate-flush stdout sink used by the CLI and REPL.
///
/// Writes each output byte as a character and flushes right away, so
/// program output interleaves correctly with prompts and stderr. The core
/// engine knows nothing about this policy.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&mut self, byte: u8) {
        print!("{}", byte as char);
        let _ = io::stdout().flush();
    }
}

/// Pretty-print a parse error with caret positioning into the source.
/// If `program` is `Some("bfvm")`, prefix messages with "bfvm: ..." for CLI run mode
pub fn print_parse_error(program: Option<&str>, source: &str, err: &UnbalancedBracketsError) {
    let msg = prefix_program(program, &format!("Parse error: unmatched bracket {}", err.kind));
    print_error_with_context(&msg, source, err.position);
}

/// Print a runtime error as a one-line message. The instruction pointer
/// indexes the compiled instruction stream, not the source text, so no
/// caret window is shown.
pub fn print_runtime_error(program: Option<&str>, err: &OutOfBoundsError) {
    let msg = prefix_program(
        program,
        &format!(
            "Runtime error: data pointer out of bounds (ptr={}, instruction={})",
            err.data_pointer, err.instruction_pointer
        ),
    );
    eprintln!("{msg}");
    let _ = io::stderr().flush();
}

fn prefix_program(program: Option<&str>, msg: &str) -> String {
    if let Some(p) = program {
        format!("{p}: {msg}")
    } else {
        msg.to_string()
    }
}

/// Print a concise error with source position and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, source: &str, pos: usize) {
    eprintln!("{prefix} at source position {pos}");

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = source.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(source, start_char);
    let end_byte = char_to_byte_index(source, end_char);
    let slice = &source[start_byte..end_byte];

    eprintln!("  {}", slice);

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    let mut underline = String::new();
    for _ in 0..caret_offset_chars {
        underline.push(' ');
    }
    underline.push('^');
    eprintln!("  {}", underline);
    let _ = io::stderr().flush();
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    if char_idx == 0 { return 0; }

    let mut count = 0usize;
    let mut byte_idx = 0usize;

    for ch in s.chars() {
        if count == char_idx {
            break;
        }
        byte_idx += ch.len_utf8();
        count += 1;
    }

    byte_idx
}
