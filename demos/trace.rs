use bfvm::machine::Machine;
use bfvm::parser::parse;

// Steps a small program by hand and prints the machine state after every
// cycle. The same external-stepping shape is how the CLI imposes its
// --max-steps ceiling.
fn main() {
    let program = parse("++[->+<]>.").expect("balanced program");

    let mut machine = Machine::with_tape_len(16);
    let mut out: Vec<u8> = Vec::new();
    let mut cycle = 0usize;

    loop {
        match machine.step(&program, &mut out) {
            Ok(true) => {
                println!(
                    "cycle {:>3}: ip={:<3} dp={:<2} cell={}",
                    cycle,
                    machine.instruction_pointer(),
                    machine.data_pointer(),
                    machine.current_cell()
                );
                cycle += 1;
            }
            Ok(false) => break,
            Err(err) => {
                eprintln!("runtime error: {err}");
                std::process::exit(1);
            }
        }
    }

    println!("halted after {cycle} cycles; output bytes: {out:?}");
}
