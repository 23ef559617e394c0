//! stackbench CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero on
//! failure. All bootstrap work lives in `cli`.

use stackbench::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
