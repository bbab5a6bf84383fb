//! Convert a BIF thumbnail container to an animated GIF (feature = "gif").
//!
//! Usage:
//!   cargo run --example convert -- <input_file> [output_file]

use std::error::Error;

#[cfg(feature = "gif")]
fn main() -> Result<(), Box<dyn Error>> {
    use bif2gif::{BifFile, GifOptions};

    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "thumbnails.bif".to_string());
    let output_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "animated.gif".to_string());

    println!("Opening {input_path}...");
    let bif = BifFile::open(&input_path)?;
    for warning in bif.warnings() {
        println!("  warning: {warning}");
    }

    // ── Full-size export ───────────────────────────────────────────
    let summary = bif.export_gif(&output_path, &GifOptions::default())?;
    println!(
        "Wrote {output_path}: {} frames, {}x{}, {:.1}s",
        summary.frame_count,
        summary.width,
        summary.height,
        summary.duration.as_secs_f64(),
    );

    // ── Scaled export, played once ─────────────────────────────────
    let options = GifOptions::new().width(160).repeat(Some(0)).speed(20);
    let bytes = bif.export_gif_to_memory(&options)?;
    std::fs::write("animated_small.gif", &bytes)?;
    println!("Wrote animated_small.gif ({} bytes)", bytes.len());

    Ok(())
}

#[cfg(not(feature = "gif"))]
fn main() -> Result<(), Box<dyn Error>> {
    eprintln!("This example requires the `gif` feature.");
    Ok(())
}
