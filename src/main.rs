use std::env;
use monkey_interpreter::runner::{run_file, run_prompt};

pub fn main() -> std::io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    // args always includes the program name in args[0]
    match args.len() {
        1 => {
            run_prompt();
        }
        2 => {
            run_file(&args[1]);
        }
        _ => {
            println!("Usage: monkey [script]");
            std::process::exit(64); // EX_USAGE
        }
    }
    Ok(())
}
