mod runner;

pub use runner::{run_file, run_prompt};
