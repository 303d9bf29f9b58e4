//! Custom decode policy example.
//!
//! Demonstrates the difference between `DecodePolicy::Lenient` (the
//! default: degrade and warn on a forward-compatible surprise) and
//! `DecodePolicy::Strict` (treat the same surprise as fatal).
//!
//! # Usage
//!
//! ```bash
//! cargo run --example decode_policy -- path/to/module.bef
//! ```

use std::path::PathBuf;

use bef::{DecodePolicy, SourceLoc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = parse_args()?;
    let data = std::fs::read(&path)?;
    let origin = SourceLoc::new(path.display().to_string(), 0, 0);

    match bef::decode(&data, origin.clone(), DecodePolicy::Lenient) {
        Ok(outcome) => {
            println!(
                "lenient: decoded {} function(s), {} warning(s)",
                outcome.module.functions.len(),
                outcome.diagnostics.len()
            );
            for warning in outcome.diagnostics.warnings() {
                println!("  {warning}");
            }
        }
        Err(failure) => println!("lenient: failed: {failure}"),
    }

    match bef::decode(&data, origin, DecodePolicy::Strict) {
        Ok(outcome) => {
            println!("strict: decoded {} function(s)", outcome.module.functions.len());
        }
        Err(failure) => println!("strict: failed: {failure}"),
    }

    Ok(())
}

fn parse_args() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <module.bef>", args[0]);
        std::process::exit(1);
    }
    Ok(PathBuf::from(&args[1]))
}
