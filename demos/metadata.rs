//! Print the header fields and derived metadata of a BIF container.
//!
//! Usage:
//!   cargo run --example metadata -- <input_file>

use std::error::Error;

use bif2gif::BifFile;

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "thumbnails.bif".to_string());

    let bif = BifFile::open(&input_path)?;
    let metadata = bif.metadata()?;

    println!("=== {input_path} ===");
    println!("Version:          {}", metadata.version);
    println!("Frames:           {}", metadata.frame_count);
    println!("Multiplier:       {}", metadata.timestamp_multiplier);
    println!("Timing:           {}", metadata.timing_mode);
    println!("Duration:         {:.2}s", metadata.duration.as_secs_f64());
    println!("File size:        {} bytes", metadata.file_size);
    println!("Terminal entry:   {}", metadata.has_terminal_entry);

    for warning in &metadata.warnings {
        println!("Warning:          {warning}");
    }

    // ── Raw index table ────────────────────────────────────────────
    let index = bif.index()?;
    for entry in index.entries().take(5) {
        println!("  ts={:<10} offset={}", entry.timestamp, entry.byte_offset);
    }

    Ok(())
}
