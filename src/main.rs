use std::env;
use std::process;

use datasheets::cli;

fn main() {
    pretty_env_logger::init();
    let args: Vec<String> = env::args().collect();
    process::exit(cli::run_with_args(&args));
}
