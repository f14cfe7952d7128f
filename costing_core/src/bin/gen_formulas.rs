//! Generate FORMULAS.md from the formula registry.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-formulas
//! ```
//!
//! The generated file is written to `costing_core/FORMULAS.md`.

use std::fs;
use std::path::Path;

use costing_core::formulas::generate_formulas_markdown;

fn main() {
    println!("Generating FORMULAS.md...");

    let markdown = generate_formulas_markdown();
    let output_path = Path::new("costing_core/FORMULAS.md");

    match fs::write(output_path, &markdown) {
        Ok(()) => {
            println!("Successfully wrote {} bytes to {}", markdown.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing file: {}", e);
            std::process::exit(1);
        }
    }
}
