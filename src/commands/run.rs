use bfvm::cli_util::{print_parse_error, print_runtime_error, StdoutSink};
use bfvm::config;
use bfvm::machine::{Machine, OutOfBoundsError};
use bfvm::parser::{parse_with_options, Instruction, ParseOptions, Program, UnbalancedBracketsError};
use clap::Args;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use std::{fs, thread};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of producing output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Disable run-length coalescing of repeated instructions
    #[arg(long = "no-coalesce")]
    pub no_coalesce: bool,

    /// Tape length in cells (default from config, then 65536)
    #[arg(long = "tape-size", value_name = "CELLS")]
    pub tape_size: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BFVM_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum machine cycles before abort (fallback BFVM_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// How one CLI execution ended. Step-limit and timeout aborts exist only at
/// this layer; the engine itself knows nothing about them.
enum Outcome {
    Done,
    Parse(UnbalancedBracketsError),
    Runtime(OutOfBoundsError),
    StepLimit(usize),
    Canceled,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        code,
        no_coalesce,
        tape_size,
        timeout_ms,
        max_steps,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    let settings = config::settings();
    let options = ParseOptions {
        coalesce: settings.coalesce && !no_coalesce,
    };
    let tape_len = tape_size.unwrap_or(settings.tape_len);
    if tape_len == 0 {
        eprintln!("{program}: tape size must be at least 1 cell");
        let _ = io::stderr().flush();
        return 2;
    }

    // Resolve limits: flags -> env -> defaults
    let timeout_ms = timeout_ms
        .or_else(|| std::env::var("BFVM_TIMEOUT_MS").ok().and_then(|s| s.parse::<u64>().ok()))
        .unwrap_or(2_000);
    let max_steps = max_steps
        .or_else(|| std::env::var("BFVM_MAX_STEPS").ok().and_then(|s| s.parse::<u64>().ok()))
        .map(|n| n as usize);

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Outcome>();
    let source = code_str.clone();
    let cancel_clone = cancel.clone();

    thread::spawn(move || {
        let outcome = match parse_with_options(&source, options) {
            Ok(compiled) => execute(&compiled, tape_len, debug, max_steps, &cancel_clone),
            Err(e) => Outcome::Parse(e),
        };
        let _ = tx.send(outcome);
    });

    let timeout = Duration::from_millis(timeout_ms);
    let exit_code = match rx.recv_timeout(timeout) {
        Ok(Outcome::Done) => 0,
        Ok(Outcome::Parse(err)) => {
            print_parse_error(Some(program), &code_str, &err);
            1
        }
        Ok(Outcome::Runtime(err)) => {
            print_runtime_error(Some(program), &err);
            1
        }
        Ok(Outcome::StepLimit(limit)) => {
            eprintln!("Execution aborted: step limit exceeded ({limit})");
            let _ = io::stderr().flush();
            1
        }
        Ok(Outcome::Canceled) => {
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    println!();
    let _ = io::stdout().flush();
    exit_code
}

/// Drive the machine one cycle at a time so the step ceiling and the cancel
/// flag are enforced outside the engine.
fn execute(
    program: &Program,
    tape_len: usize,
    debug: bool,
    max_steps: Option<usize>,
    cancel: &AtomicBool,
) -> Outcome {
    let mut machine = Machine::with_tape_len(tape_len);
    let mut step: usize = 0;

    if debug {
        println!("STEP | IP  | PTR | CELL | INSTR  | ACTION");
        println!("-----+-----+-----+------+--------+------------------------------------------------");
    }

    loop {
        if cancel.load(Ordering::Relaxed) {
            return Outcome::Canceled;
        }
        if let Some(max) = max_steps {
            if step >= max {
                return Outcome::StepLimit(max);
            }
        }

        let running = if debug {
            debug_step(&mut machine, program, step)
        } else {
            machine.step(program, &mut StdoutSink)
        };

        match running {
            Ok(true) => step += 1,
            Ok(false) => return Outcome::Done,
            Err(err) => return Outcome::Runtime(err),
        }
    }
}

/// One traced cycle: advance the machine with output suppressed, then print
/// a table row describing what the instruction did.
fn debug_step(
    machine: &mut Machine,
    program: &Program,
    step: usize,
) -> Result<bool, OutOfBoundsError> {
    let ip = machine.instruction_pointer();
    let instr = program.instructions()[ip];
    let (ptr_before, cell_before) = (machine.data_pointer(), machine.current_cell());

    let mut suppressed: Vec<u8> = Vec::new();
    let running = machine.step(program, &mut suppressed)?;
    if !running {
        return Ok(false);
    }

    let action = match instr {
        Instruction::IncCell(_) => format!(
            "Increment cell[{ptr_before}] from {cell_before} to {}",
            machine.tape()[ptr_before]
        ),
        Instruction::DecCell(_) => format!(
            "Decrement cell[{ptr_before}] from {cell_before} to {}",
            machine.tape()[ptr_before]
        ),
        Instruction::MoveRight(_) | Instruction::MoveLeft(_) => {
            format!("Moved pointer head to index {}", machine.data_pointer())
        }
        Instruction::LoopOpen => {
            if cell_before == 0 {
                format!(
                    "Cell is 0; jump forward past matching ']' to IP {}",
                    machine.instruction_pointer()
                )
            } else {
                "Enter loop (cell != 0)".to_string()
            }
        }
        Instruction::LoopClose => {
            if cell_before != 0 {
                format!(
                    "Cell != 0; jump back past matching '[' to IP {}",
                    machine.instruction_pointer()
                )
            } else {
                "Exit loop (cell is 0)".to_string()
            }
        }
        Instruction::Output => {
            format!("Output byte '{}' (suppressed in debug)", cell_before as char)
        }
        Instruction::Halt => String::new(),
    };

    println!(
        "{:<4} | {:<3} | {:<3} | {:<4} | {:<6} | {}",
        step,
        ip,
        ptr_before,
        cell_before,
        instr.to_string(),
        action
    );

    Ok(true)
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--debug|-d] "<code>"
  {0} run [--debug|-d] --file <PATH>

Options:
  --file,  -f <PATH>  Read code from PATH instead of positional "<code>"
  --debug, -d         Print a step-by-step table of operations instead of producing output
  --no-coalesce       Disable run-length coalescing of repeated instructions
  --tape-size <CELLS> Tape length in cells (default from config, then 65536)
  --timeout <MS>      Wall-clock timeout in milliseconds (fallback BFVM_TIMEOUT_MS; default 2000)
  --max-steps <N>     Maximum machine cycles before abort (fallback BFVM_MAX_STEPS)
  --help,  -h         Show this help

Notes:
- The instruction set is ><+-.[]; every other character is a comment.
- There is no input instruction; programs only produce output.
- Moving the data pointer outside the tape is a runtime error.

Examples:
- Load code from a file:
    {0} run --file ./program.bf
- Abort a runaway loop after a million cycles:
    {0} run --max-steps 1000000 "+[]"
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
