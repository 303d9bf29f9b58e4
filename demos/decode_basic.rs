//! Basic decode example.
//!
//! Demonstrates decoding a BEF file and walking the resulting module.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example decode_basic -- path/to/module.bef
//! ```

use std::path::PathBuf;

use bef::SourceLoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = parse_args()?;
    let data = std::fs::read(&path)?;

    let origin = SourceLoc::new(path.display().to_string(), 0, 0);
    let outcome = bef::decode_lenient(&data, origin)?;

    println!("functions: {}", outcome.module.functions.len());
    for function in &outcome.module.functions {
        let op_count = function
            .body
            .as_ref()
            .map_or(0, |region| region.block.operations.len());
        println!("  {} ({} ops)", function.name, op_count);
    }

    for warning in outcome.diagnostics.warnings() {
        eprintln!("warning: {warning}");
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
