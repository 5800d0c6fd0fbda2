//! lodgely entry point
//!
//! Minimal: parse arguments, run the selected command, print errors to
//! stderr and exit non-zero on failure. All boot logic lives in the CLI
//! module.

use lodgely::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
