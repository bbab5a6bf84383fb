//! Walk the frames of a BIF container and save the raw payloads.
//!
//! Usage:
//!   cargo run --example frames -- <input_file>

use std::error::Error;

use bif2gif::{BifFile, ExtractOptions, LastFrameEnd, TimingSelection};

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "thumbnails.bif".to_string());

    let bif = BifFile::open(&input_path)?;
    let mode = bif.timing_mode(&ExtractOptions::default())?;
    println!("{input_path}: {} frames, {mode}", bif.header().frame_count);

    // ── Borrowed frame walk ────────────────────────────────────────
    for frame in bif.frames()? {
        let frame = frame?;
        let size = frame
            .dimensions()
            .map_or("?".to_string(), |(w, h)| format!("{w}x{h}"));
        println!(
            "  #{:<4} {:>8}..{:<8} {:>6} ms  {size} .{}",
            frame.index,
            frame.range.start,
            frame.range.end,
            frame.delay_ms,
            frame.extension(),
        );
    }

    // ── Roku terminal entry, fixed interval ────────────────────────
    let options = ExtractOptions::new()
        .with_timing(TimingSelection::FixedInterval)
        .with_last_frame_end(LastFrameEnd::TerminalEntry);
    if bif.header().frame_count > 0 {
        let last = bif.frame_with_options(bif.header().frame_count - 1, &options)?;
        println!(
            "Last frame with terminal bound: {} bytes, {} ms",
            last.data.len(),
            last.delay_ms,
        );
    }

    // ── Raw payloads on disk ───────────────────────────────────────
    let written = bif.save_frames("frames", &ExtractOptions::default())?;
    println!("Saved {} payloads to frames/", written.len());

    Ok(())
}
