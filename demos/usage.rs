use bfvm::machine::Machine;
use bfvm::parser::parse;

fn main() {
    // Classic "Hello World!" program
    let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";

    let program = match parse(code) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("parse error: {err}");
            std::process::exit(1);
        }
    };

    let mut out: Vec<u8> = Vec::new();
    if let Err(err) = Machine::new().run(&program, &mut out) {
        eprintln!("runtime error: {err}");
        std::process::exit(1);
    }

    // The sink collected raw bytes; render them as text
    print!("{}", String::from_utf8_lossy(&out));
}
