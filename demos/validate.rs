//! Validate a BIF container and display the report.
//!
//! Usage:
//!   cargo run --example validate -- <input_file>

use std::error::Error;

use bif2gif::{BifFile, ExtractOptions};

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "thumbnails.bif".to_string());

    let bif = BifFile::open(&input_path)?;

    let report = bif.validate();
    println!("Validation report for {input_path}:");
    println!("{report}");
    println!("Valid: {}", report.is_valid());
    println!("Total issues: {}", report.issue_count());

    if !report.errors.is_empty() {
        println!("\nErrors ({}):", report.errors.len());
        for item in &report.errors {
            println!("  {item}");
        }
    }

    let strict = bif.validate_with_options(&ExtractOptions::new().with_strict_version(true));
    println!("\nStrict version check: {}", if strict.is_valid() { "pass" } else { "fail" });

    Ok(())
}
