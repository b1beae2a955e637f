//! Submodule Aliases CLI - submodule-aliases
//!
//! Main entry point
use std::process;

use submodule_aliases_cli::{build_command, log_level, run};

fn main() {
    let matches = build_command().get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level(&matches)))
        .init();

    let mut stdout = std::io::stdout();
    match run(&matches, &mut stdout) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
