//! Animated GIF export.
//!
//! This module provides [`GifOptions`] for configuring the output animation,
//! [`RenderSession`], which owns the canvas and GIF encoder for one export,
//! and the `export_gif*` methods on [`BifFile`].
//!
//! A session is created once the first frame's dimensions are known. Every
//! frame is then decoded, drawn onto the canvas, and written with its own
//! delay. File exports encode into memory first, so a failed export never
//! leaves a partial file behind.
//!
//! # Example
//!
//! ```no_run
//! use bif2gif::{BifError, BifFile, GifOptions};
//!
//! let bif = BifFile::open("thumbnails.bif")?;
//! let summary = bif.export_gif("animated.gif", &GifOptions::new().width(320))?;
//! println!("{} frames, {:?}", summary.frame_count, summary.duration);
//! # Ok::<(), BifError>(())
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use ::gif::{Encoder, Frame as GifFrame, Repeat};
use image::{RgbaImage, imageops, imageops::FilterType};

use crate::bif::BifFile;
use crate::configuration::ExtractOptions;
use crate::error::BifError;
use crate::frames::{Frame, FrameIterator};
use crate::progress::{OperationType, ProgressTracker};

#[cfg(feature = "rayon")]
use crate::rayon::encode_remaining;

/// Default quantizer speed (1 = best quality, 30 = fastest).
pub const DEFAULT_SPEED: i32 = 10;

/// Configuration for animated GIF export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifOptions {
    /// Target width in pixels. Height is computed to preserve aspect ratio.
    /// `None` means use the source resolution.
    pub width: Option<u32>,
    /// How many times the GIF should repeat. `None` means loop forever.
    pub repeat: Option<u16>,
    /// Quantizer speed passed to the GIF encoder, in `1..=30`.
    pub speed: i32,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            width: None,
            repeat: None,
            speed: DEFAULT_SPEED,
        }
    }
}

impl GifOptions {
    /// Create a new [`GifOptions`] with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target width (height is auto-scaled to preserve aspect ratio).
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width.max(1));
        self
    }

    /// Set the target width (height is auto-scaled to preserve aspect ratio).
    ///
    /// Alias for [`width`](GifOptions::width).
    pub fn with_width(self, width: u32) -> Self {
        self.width(width)
    }

    /// Set the repeat count. `None` means loop forever.
    pub fn repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the repeat count. `None` means loop forever.
    ///
    /// Alias for [`repeat`](GifOptions::repeat).
    pub fn with_repeat(self, repeat: Option<u16>) -> Self {
        self.repeat(repeat)
    }

    /// Set the quantizer speed. Clamped to `1..=30`.
    pub fn speed(mut self, speed: i32) -> Self {
        self.speed = speed.clamp(1, 30);
        self
    }

    /// Set the quantizer speed. Clamped to `1..=30`.
    ///
    /// Alias for [`speed`](GifOptions::speed).
    pub fn with_speed(self, speed: i32) -> Self {
        self.speed(speed)
    }

    /// Output dimensions for a source image of the given size.
    pub(crate) fn target_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match self.width {
            Some(width) if source_width > 0 => {
                let ratio = width as f64 / source_width as f64;
                let height = (source_height as f64 * ratio).round() as u32;
                (width, height.max(1))
            }
            _ => (source_width, source_height),
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of frames written.
    pub frame_count: u32,
    /// Canvas width in pixels (0 if nothing was written).
    pub width: u16,
    /// Canvas height in pixels (0 if nothing was written).
    pub height: u16,
    /// Sum of all frame delays.
    pub duration: Duration,
}

impl ExportSummary {
    fn empty() -> Self {
        Self {
            frame_count: 0,
            width: 0,
            height: 0,
            duration: Duration::ZERO,
        }
    }
}

/// The canvas and encoder of one GIF export.
///
/// Built from the first frame's dimensions and fed every frame in index
/// order. [`finish`](RenderSession::finish) flushes the trailer and returns
/// the writer.
pub struct RenderSession<W: Write> {
    encoder: Encoder<W>,
    canvas: RgbaImage,
    speed: i32,
    frames_written: u32,
    total_delay_ms: u64,
}

impl<W: Write> RenderSession<W> {
    /// Start an animation of `width` × `height` pixels on `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`BifError::GifEncodeError`] if the dimensions do not fit in
    /// a GIF (65535 pixels per side) or the header cannot be written.
    pub fn new(writer: W, width: u32, height: u32, options: &GifOptions) -> Result<Self, BifError> {
        let (gif_width, gif_height) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(BifError::GifEncodeError(format!(
                    "Canvas size {width}x{height} cannot be stored in a GIF",
                )));
            }
        };

        let mut encoder = Encoder::new(writer, gif_width, gif_height, &[])
            .map_err(|e| BifError::GifEncodeError(format!("Failed to create GIF encoder: {e}")))?;

        let repeat = match options.repeat {
            None => Repeat::Infinite,
            Some(n) => Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| BifError::GifEncodeError(format!("Failed to set GIF repeat: {e}")))?;

        log::debug!("Started GIF session {width}x{height} (repeat={repeat:?})");

        Ok(Self {
            encoder,
            canvas: RgbaImage::new(width, height),
            speed: options.speed.clamp(1, 30),
            frames_written: 0,
            total_delay_ms: 0,
        })
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Decode `frame` and append it to the animation.
    pub fn add_frame(&mut self, frame: &Frame<'_>) -> Result<(), BifError> {
        let raster = decode_frame(frame, self.width(), self.height())?;
        self.push_raster(frame, &raster)
    }

    /// Draw an already decoded raster for `frame` and append it.
    pub(crate) fn push_raster(
        &mut self,
        frame: &Frame<'_>,
        raster: &RgbaImage,
    ) -> Result<(), BifError> {
        imageops::overlay(&mut self.canvas, raster, 0, 0);

        let mut pixels = self.canvas.as_raw().clone();
        let mut gif_frame = GifFrame::from_rgba_speed(
            self.canvas.width() as u16,
            self.canvas.height() as u16,
            &mut pixels,
            self.speed,
        );
        gif_frame.delay = frame.delay_centiseconds();

        self.encoder.write_frame(&gif_frame).map_err(|e| {
            BifError::GifEncodeError(format!("Failed to write GIF frame {}: {e}", frame.index))
        })?;

        self.frames_written += 1;
        self.total_delay_ms += u64::from(frame.delay_ms);
        Ok(())
    }

    /// Write the GIF trailer and hand back the writer.
    pub fn finish(self) -> Result<(W, ExportSummary), BifError> {
        let summary = ExportSummary {
            frame_count: self.frames_written,
            width: self.canvas.width() as u16,
            height: self.canvas.height() as u16,
            duration: Duration::from_millis(self.total_delay_ms),
        };
        let writer = self
            .encoder
            .into_inner()
            .map_err(|e| BifError::GifEncodeError(format!("Failed to finish GIF: {e}")))?;
        Ok((writer, summary))
    }
}

/// Decode a frame payload into an RGBA raster of exactly `width` × `height`.
pub fn decode_frame(frame: &Frame<'_>, width: u32, height: u32) -> Result<RgbaImage, BifError> {
    let image = image::load_from_memory(&frame.data).map_err(|error| {
        BifError::FrameDecodeFailure {
            frame_index: frame.index,
            reason: error.to_string(),
        }
    })?;

    if image.width() == width && image.height() == height {
        Ok(image.into_rgba8())
    } else {
        Ok(imageops::resize(&image, width, height, FilterType::Triangle))
    }
}

/// Encode every frame of `frames` onto `writer`.
///
/// Returns `None`, without touching the encoder, when there are no frames.
pub(crate) fn encode_frames<W: Write>(
    mut frames: FrameIterator<'_>,
    writer: W,
    gif_options: &GifOptions,
    options: &ExtractOptions,
) -> Result<Option<(W, ExportSummary)>, BifError> {
    let mut tracker =
        ProgressTracker::new(options, OperationType::GifExport, frames.frame_count());

    let first = match frames.next() {
        Some(first) => first?,
        None => {
            log::debug!("No frames to encode");
            return Ok(None);
        }
    };

    let (source_width, source_height) = first.dimensions()?;
    let (width, height) = gif_options.target_dimensions(source_width, source_height);
    let mut session = RenderSession::new(writer, width, height, gif_options)?;

    session.add_frame(&first)?;
    tracker.record(&first);

    encode_remaining(&mut session, frames, &mut tracker)?;
    tracker.finish();

    session.finish().map(Some)
}

#[cfg(not(feature = "rayon"))]
fn encode_remaining<W: Write>(
    session: &mut RenderSession<W>,
    frames: FrameIterator<'_>,
    tracker: &mut ProgressTracker,
) -> Result<(), BifError> {
    for frame in frames {
        let frame = frame?;
        session.add_frame(&frame)?;
        tracker.record(&frame);
    }
    Ok(())
}

impl BifFile {
    /// Export every frame as an animated GIF at `path`.
    pub fn export_gif<P: AsRef<Path>>(
        &self,
        path: P,
        gif_options: &GifOptions,
    ) -> Result<ExportSummary, BifError> {
        self.export_gif_with_options(path, gif_options, &ExtractOptions::default())
    }

    /// Export every frame as an animated GIF at `path`.
    ///
    /// The file is written only after every frame has been encoded. A
    /// container with no frames writes nothing and returns an empty summary.
    pub fn export_gif_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        gif_options: &GifOptions,
        options: &ExtractOptions,
    ) -> Result<ExportSummary, BifError> {
        let path = path.as_ref();
        log::debug!(
            "Encoding GIF file {:?} (width={:?}, speed={})",
            path,
            gif_options.width,
            gif_options.speed,
        );

        let frames = self.frames_with_options(options)?;
        match encode_frames(frames, Vec::new(), gif_options, options)? {
            Some((bytes, summary)) => {
                fs::write(path, bytes)?;
                Ok(summary)
            }
            None => Ok(ExportSummary::empty()),
        }
    }

    /// Export every frame as an animated GIF into memory.
    ///
    /// Returns empty bytes for a container with no frames.
    pub fn export_gif_to_memory(&self, gif_options: &GifOptions) -> Result<Vec<u8>, BifError> {
        self.export_gif_to_memory_with_options(gif_options, &ExtractOptions::default())
    }

    /// Export every frame as an animated GIF into memory.
    pub fn export_gif_to_memory_with_options(
        &self,
        gif_options: &GifOptions,
        options: &ExtractOptions,
    ) -> Result<Vec<u8>, BifError> {
        log::debug!("Encoding GIF in memory (width={:?})", gif_options.width);
        let frames = self.frames_with_options(options)?;
        Ok(encode_frames(frames, Vec::new(), gif_options, options)?
            .map(|(bytes, _)| bytes)
            .unwrap_or_default())
    }
}
