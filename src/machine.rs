//! The execution engine: a fixed-size byte tape, a data pointer, and the
//! dispatch loop over a parsed [`Program`].
//!
//! A [`Machine`] owns all mutable run state (tape, instruction pointer,
//! data pointer). The program is read-only, so one parsed program can be
//! executed any number of times from fresh machines and always produces the
//! same output sequence.
//!
//! Cell arithmetic wraps mod 256 in both directions; programs rely on that
//! for counters and comparisons. The tape itself does not wrap: moving the
//! data pointer outside `[0, tape_len)` is an [`OutOfBoundsError`].
//!
//! The engine performs no I/O of its own. Every `.` instruction makes one
//! [`OutputSink::write`] call, in program order.
//!
//! Quick start:
//!
//! ```
//! use bfvm::{parser::parse, machine::Machine};
//!
//! let program = parse("++++++++[>++++++++<-]>.").unwrap();
//! let mut out: Vec<u8> = Vec::new();
//! Machine::new().run(&program, &mut out).unwrap();
//! assert_eq!(out, [64]);
//! ```

use crate::parser::{Instruction, Program};

/// Default tape length in cells.
pub const DEFAULT_TAPE_LEN: usize = 65536;

/// The single run-time failure mode: the data pointer left the tape.
///
/// The tape neither grows nor wraps at its ends, so any move that would
/// land outside `[0, tape_len)` terminates the run.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "data pointer out of bounds at instruction {instruction_pointer} (data pointer {data_pointer})"
)]
pub struct OutOfBoundsError {
    /// Index of the offending move instruction.
    pub instruction_pointer: usize,
    /// Data pointer value before the offending move.
    pub data_pointer: usize,
}

/// Destination for program output, one byte per `.` instruction.
///
/// The engine imposes no buffering or flushing contract beyond in-order
/// delivery; that policy belongs to the implementor.
pub trait OutputSink {
    fn write(&mut self, byte: u8);
}

/// Collecting sink for tests and library callers.
impl OutputSink for Vec<u8> {
    fn write(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Execution state for one run: tape plus both pointers.
///
/// Created zeroed, mutated every cycle, discarded when the run halts.
pub struct Machine {
    tape: Vec<u8>,
    instruction_pointer: usize,
    data_pointer: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// A fresh machine with the default 65,536-cell tape.
    pub fn new() -> Self {
        Self::with_tape_len(DEFAULT_TAPE_LEN)
    }

    /// A fresh machine with a custom tape length.
    pub fn with_tape_len(tape_len: usize) -> Self {
        Self {
            tape: vec![0; tape_len],
            instruction_pointer: 0,
            data_pointer: 0,
        }
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn data_pointer(&self) -> usize {
        self.data_pointer
    }

    /// Read-only view of the tape.
    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    /// The cell under the data pointer.
    pub fn current_cell(&self) -> u8 {
        self.tape[self.data_pointer]
    }

    /// Execute one instruction cycle.
    ///
    /// Returns `Ok(true)` while the program is still running and
    /// `Ok(false)` once the `Halt` sentinel is reached. Callers wanting a
    /// step ceiling or cooperative cancellation drive this directly instead
    /// of [`run`](Self::run) and count cycles themselves; exhausting such a
    /// ceiling is a caller-level abort, not an engine error.
    pub fn step(
        &mut self,
        program: &Program,
        sink: &mut dyn OutputSink,
    ) -> Result<bool, OutOfBoundsError> {
        let ip = self.instruction_pointer;
        match program.instructions()[ip] {
            Instruction::IncCell(n) => {
                let cell = &mut self.tape[self.data_pointer];
                *cell = cell.wrapping_add((n % 256) as u8);
                self.instruction_pointer = ip + 1;
            }
            Instruction::DecCell(n) => {
                let cell = &mut self.tape[self.data_pointer];
                *cell = cell.wrapping_sub((n % 256) as u8);
                self.instruction_pointer = ip + 1;
            }
            Instruction::MoveRight(n) => {
                if n > self.tape.len() - 1 - self.data_pointer {
                    return Err(self.out_of_bounds());
                }
                self.data_pointer += n;
                self.instruction_pointer = ip + 1;
            }
            Instruction::MoveLeft(n) => {
                if n > self.data_pointer {
                    return Err(self.out_of_bounds());
                }
                self.data_pointer -= n;
                self.instruction_pointer = ip + 1;
            }
            Instruction::LoopOpen => {
                if self.tape[self.data_pointer] == 0 {
                    let close = program.jump_target(ip).expect("parser matched bracket");
                    self.instruction_pointer = close + 1;
                } else {
                    self.instruction_pointer = ip + 1;
                }
            }
            Instruction::LoopClose => {
                if self.tape[self.data_pointer] != 0 {
                    let open = program.jump_target(ip).expect("parser matched bracket");
                    self.instruction_pointer = open + 1;
                } else {
                    self.instruction_pointer = ip + 1;
                }
            }
            Instruction::Output => {
                sink.write(self.tape[self.data_pointer]);
                self.instruction_pointer = ip + 1;
            }
            Instruction::Halt => return Ok(false),
        }
        Ok(true)
    }

    /// Execute `program` to completion.
    ///
    /// Halts only at the synthetic `Halt` sentinel; a program whose loop
    /// conditions never become false runs forever, which is intentional.
    pub fn run(
        &mut self,
        program: &Program,
        sink: &mut dyn OutputSink,
    ) -> Result<(), OutOfBoundsError> {
        while self.step(program, sink)? {}
        Ok(())
    }

    fn out_of_bounds(&self) -> OutOfBoundsError {
        OutOfBoundsError {
            instruction_pointer: self.instruction_pointer,
            data_pointer: self.data_pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, parse_with_options, ParseOptions};

    fn run_collect(source: &str) -> (Machine, Vec<u8>) {
        let program = parse(source).unwrap();
        let mut machine = Machine::with_tape_len(64);
        let mut out: Vec<u8> = Vec::new();
        machine.run(&program, &mut out).expect("program runs");
        (machine, out)
    }

    #[test]
    fn increments_then_outputs_byte_two() {
        let (machine, out) = run_collect("++.");
        assert_eq!(out, [2]);
        assert_eq!(machine.tape()[0], 2);
    }

    #[test]
    fn loop_drains_cell_then_outputs_zero() {
        let (machine, out) = run_collect("+[-].");
        assert_eq!(out, [0]);
        assert_eq!(machine.tape()[0], 0);
    }

    #[test]
    fn eight_times_eight_is_sixty_four() {
        let (_, out) = run_collect("++++++++[>++++++++<-]>.");
        assert_eq!(out, [64]);
    }

    #[test]
    fn increment_wraps_past_255() {
        let (machine, _) = run_collect(&"+".repeat(256));
        assert_eq!(machine.tape()[0], 0);
    }

    #[test]
    fn decrement_wraps_below_zero() {
        let (machine, out) = run_collect("-.");
        assert_eq!(machine.tape()[0], 255);
        assert_eq!(out, [255]);
    }

    #[test]
    fn coalesced_count_wraps_mod_256() {
        // 300 coalesces into a single IncCell(300); 300 mod 256 == 44.
        let (machine, _) = run_collect(&"+".repeat(300));
        assert_eq!(machine.tape()[0], 44);
    }

    #[test]
    fn move_left_of_cell_zero_is_rejected() {
        let program = parse("<").unwrap();
        let err = Machine::with_tape_len(8)
            .run(&program, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.instruction_pointer, 0);
        assert_eq!(err.data_pointer, 0);
    }

    #[test]
    fn move_past_last_cell_is_rejected() {
        let program = parse(&">".repeat(8)).unwrap();
        let err = Machine::with_tape_len(8)
            .run(&program, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.data_pointer, 0); // single coalesced move of 8
    }

    #[test]
    fn move_to_last_cell_is_allowed() {
        let program = parse(&">".repeat(7)).unwrap();
        let mut machine = Machine::with_tape_len(8);
        machine.run(&program, &mut Vec::new()).unwrap();
        assert_eq!(machine.data_pointer(), 7);
    }

    #[test]
    fn coalesced_and_single_step_runs_agree() {
        let source = "+++[>++++<-]>--.<++.";
        let coalesced = parse(source).unwrap();
        let single = parse_with_options(source, ParseOptions { coalesce: false }).unwrap();
        assert!(coalesced.len() < single.len());

        let mut m1 = Machine::with_tape_len(64);
        let mut m2 = Machine::with_tape_len(64);
        let (mut out1, mut out2) = (Vec::new(), Vec::new());
        m1.run(&coalesced, &mut out1).unwrap();
        m2.run(&single, &mut out2).unwrap();

        assert_eq!(out1, out2);
        assert_eq!(m1.tape(), m2.tape());
        assert_eq!(m1.data_pointer(), m2.data_pointer());
    }

    #[test]
    fn same_program_reruns_identically_from_fresh_machines() {
        let program = parse("++++[>+++<-]>.+.").unwrap();
        let (mut out1, mut out2) = (Vec::new(), Vec::new());
        Machine::new().run(&program, &mut out1).unwrap();
        Machine::new().run(&program, &mut out2).unwrap();
        assert_eq!(out1, out2);
        assert_eq!(out1, [12, 13]);
    }

    #[test]
    fn outputs_arrive_in_program_order() {
        let (_, out) = run_collect("+.+.+.");
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn empty_program_halts_immediately() {
        let program = parse("just a comment").unwrap();
        let mut machine = Machine::with_tape_len(8);
        let mut out: Vec<u8> = Vec::new();
        assert!(!machine.step(&program, &mut out).unwrap());
        assert!(out.is_empty());
        assert_eq!(machine.instruction_pointer(), 0);
    }

    #[test]
    fn step_reports_running_until_halt() {
        let program = parse("+.").unwrap();
        let mut machine = Machine::with_tape_len(8);
        let mut out: Vec<u8> = Vec::new();
        assert!(machine.step(&program, &mut out).unwrap());
        assert!(machine.step(&program, &mut out).unwrap());
        assert!(!machine.step(&program, &mut out).unwrap());
        // Halt is sticky: stepping again still reports halted.
        assert!(!machine.step(&program, &mut out).unwrap());
        assert_eq!(out, [1]);
    }
}
