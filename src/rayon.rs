//! Parallel frame decoding.
//!
//! Frame payloads occupy disjoint, read-only byte ranges, so their JPEG
//! decoding can run on [`rayon`] threads. The GIF encoder, however, must see
//! frames in index order. Frames are therefore pulled from the iterator in
//! bounded windows, decoded in parallel, and written back in the order they
//! were pulled.
//!
//! The public API is unchanged when the `rayon` feature is enabled:
//! [`BifFile::export_gif`](crate::BifFile::export_gif) picks this path up
//! automatically.

use std::io::Write;

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use image::RgbaImage;

use crate::error::BifError;
use crate::frames::{Frame, FrameIterator};
use crate::gif::{RenderSession, decode_frame};
use crate::progress::ProgressTracker;

/// Decode and encode every remaining frame of `frames`.
///
/// At most `2 × threads` decoded frames are held in memory at once.
pub(crate) fn encode_remaining<W: Write>(
    session: &mut RenderSession<W>,
    frames: FrameIterator<'_>,
    tracker: &mut ProgressTracker,
) -> Result<(), BifError> {
    let window = ::rayon::current_num_threads().max(1) * 2;
    log::debug!("Decoding frames in parallel windows of {window}");

    let mut pending: Vec<Frame<'_>> = Vec::with_capacity(window);
    for frame in frames {
        pending.push(frame?);
        if pending.len() == window {
            flush_window(session, &mut pending, tracker)?;
        }
    }
    flush_window(session, &mut pending, tracker)
}

fn flush_window<W: Write>(
    session: &mut RenderSession<W>,
    pending: &mut Vec<Frame<'_>>,
    tracker: &mut ProgressTracker,
) -> Result<(), BifError> {
    if pending.is_empty() {
        return Ok(());
    }

    let (width, height) = (session.width(), session.height());
    // Indexed collect keeps the rasters in the same order as `pending`.
    let rasters: Vec<RgbaImage> = pending
        .par_iter()
        .map(|frame| decode_frame(frame, width, height))
        .collect::<Result<_, _>>()?;

    for (frame, raster) in pending.drain(..).zip(rasters) {
        session.push_raster(&frame, &raster)?;
        tracker.record(&frame);
    }
    Ok(())
}
