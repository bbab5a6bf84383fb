//! Export a GIF with frames decoded in parallel (feature = "rayon").
//!
//! Usage:
//!   cargo run --features=rayon --example rayon -- <input_file>

use std::error::Error;
use std::time::Instant;

use bif2gif::{BifFile, GifOptions};

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "thumbnails.bif".to_string());

    let bif = BifFile::open(&input_path)?;
    println!(
        "Decoding {} frames on {} threads...",
        bif.header().frame_count,
        rayon::current_num_threads(),
    );

    let start = Instant::now();
    let summary = bif.export_gif("rayon.gif", &GifOptions::new().width(320))?;
    println!(
        "Wrote rayon.gif: {} frames, {}x{} in {:.2?}",
        summary.frame_count,
        summary.width,
        summary.height,
        start.elapsed(),
    );

    Ok(())
}
