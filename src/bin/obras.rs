use std::{env, process};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = obras::cli::run_cli(&args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
