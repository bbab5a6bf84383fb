//! Demonstrate progress reporting and cancellation during GIF export
//! (feature = "gif").
//!
//! Usage:
//!   cargo run --example progress -- <input_file>

use std::error::Error;

#[cfg(feature = "gif")]
fn main() -> Result<(), Box<dyn Error>> {
    use std::sync::Arc;

    use bif2gif::{
        BifError, BifFile, CancellationToken, ExtractOptions, GifOptions, ProgressCallback,
        ProgressInfo,
    };

    /// Prints each report to stdout.
    struct PrintProgress;

    impl ProgressCallback for PrintProgress {
        fn on_progress(&self, info: &ProgressInfo) {
            let remaining = info
                .estimated_remaining()
                .map_or("???".to_string(), |r| format!("{:.1}s", r.as_secs_f64()));
            let frame = info
                .last_frame
                .as_ref()
                .map_or("done".to_string(), |f| format!("#{} {} ms", f.index, f.delay_ms));
            println!(
                "[{:?}] {}/{} ({:.1}%) {} bytes, {:.1}s played, eta {remaining}, {frame}",
                info.operation,
                info.frames_done,
                info.frame_count,
                info.fraction() * 100.0,
                info.bytes_done,
                info.playback_done.as_secs_f64(),
            );
        }
    }

    /// Cancels its token after a number of frames.
    struct StopAfter {
        token: CancellationToken,
        frames: u32,
    }

    impl ProgressCallback for StopAfter {
        fn on_progress(&self, info: &ProgressInfo) {
            if info.frames_done >= self.frames {
                self.token.cancel();
            }
        }
    }

    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "thumbnails.bif".to_string());
    let bif = BifFile::open(&input_path)?;

    // ── Progress callback ──────────────────────────────────────────
    println!("Exporting with progress reporting...");
    let options = ExtractOptions::new()
        .with_progress(Arc::new(PrintProgress))
        .with_batch_size(5);
    let summary = bif.export_gif_with_options("progress.gif", &GifOptions::default(), &options)?;
    println!("Exported {} frames\n", summary.frame_count);

    // ── Cancellation token ─────────────────────────────────────────
    println!("Cancelling after 3 frames...");
    let token = CancellationToken::new();
    let options = ExtractOptions::new()
        .with_cancellation(token.clone())
        .with_progress(Arc::new(StopAfter { token, frames: 3 }));

    match bif.export_gif_to_memory_with_options(&GifOptions::default(), &options) {
        Err(BifError::Cancelled) => println!("Operation was cancelled as expected."),
        Err(e) => println!("Unexpected error: {e}"),
        Ok(bytes) => println!("Got {} bytes (cancel was too late)", bytes.len()),
    }

    Ok(())
}

#[cfg(not(feature = "gif"))]
fn main() -> Result<(), Box<dyn Error>> {
    eprintln!("This example requires the `gif` feature.");
    Ok(())
}
