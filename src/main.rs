//! Wiki Store - edit a block-based documentation wiki from the command line

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = wiki_store::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
