//! # bif2gif
//!
//! Parse Roku BIF (Base Index Frame) trick-mode containers and re-encode
//! their thumbnails as an animated GIF.
//!
//! A BIF file is a 64-byte header, an index table of `(timestamp, offset)`
//! pairs, and a run of concatenated JPEG thumbnails. `bif2gif` reads the
//! header, walks the index with checked offset arithmetic, works out each
//! frame's display delay from either a fixed interval or per-frame
//! timestamps, and hands the frames to an
//! [`image`](https://crates.io/crates/image) +
//! [`gif`](https://crates.io/crates/gif) encoding pipeline.
//!
//! ## Quick Start
//!
//! ### Convert a BIF File
//!
//! ```no_run
//! use bif2gif::{BifError, BifFile, GifOptions};
//!
//! let bif = BifFile::open("thumbnails.bif")?;
//! bif.export_gif("animated.gif", &GifOptions::default())?;
//! # Ok::<(), BifError>(())
//! ```
//!
//! ### Walk the Frames
//!
//! ```no_run
//! use bif2gif::{BifError, BifFile};
//!
//! let bif = BifFile::open("thumbnails.bif")?;
//! for frame in bif.frames()? {
//!     let frame = frame?;
//!     println!("#{} {:?} {} ms", frame.index, frame.range, frame.delay_ms);
//! }
//! # Ok::<(), BifError>(())
//! ```
//!
//! ### Choose the Timing Interpretation
//!
//! ```no_run
//! use bif2gif::{BifError, BifFile, ExtractOptions, LastFrameEnd, TimingSelection};
//!
//! let bif = BifFile::open("thumbnails.bif")?;
//! let options = ExtractOptions::new()
//!     .with_timing(TimingSelection::FixedInterval)
//!     .with_last_frame_end(LastFrameEnd::TerminalEntry);
//! let frames: Vec<_> = bif.frames_with_options(&options)?.collect();
//! # Ok::<(), BifError>(())
//! ```
//!
//! ## Features
//!
//! - **Header parsing** with non-fatal version and magic checks
//! - **Index walking** that rejects out-of-bounds, empty, and overlapping
//!   payload ranges
//! - **Two timing modes**: fixed interval and variable timestamp, detected
//!   once per file or chosen explicitly
//! - **Lazy frame iteration** over borrowed payloads, no copies
//! - **GIF export** to a file or to memory
//! - **Validation** reports for inspecting a file before export
//! - **Progress & cancellation** for long exports
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `gif` | Animated GIF export (enabled by default) |
//! | `rayon` | Decode frames on rayon threads while encoding in order |
//! | `full` | Enables all of the above |

pub mod bif;
pub mod configuration;
pub mod error;
pub mod frames;
#[cfg(feature = "gif")]
pub mod gif;
pub mod header;
pub mod index;
pub mod metadata;
pub mod progress;
#[cfg(feature = "rayon")]
mod rayon;
pub mod timing;
pub mod validation;

pub use bif::BifFile;
pub use configuration::ExtractOptions;
pub use error::{BifError, BifWarning};
pub use frames::{Frame, FrameIterator, probe_dimensions};
#[cfg(feature = "gif")]
pub use self::gif::{ExportSummary, GifOptions, RenderSession, decode_frame};
pub use header::{BifHeader, HEADER_SIZE, MAGIC, SUPPORTED_VERSION};
pub use index::{INDEX_ENTRY_SIZE, IndexEntry, IndexTable, LastFrameEnd, SENTINEL_TIMESTAMP};
pub use metadata::BifMetadata;
pub use progress::{
    CancellationToken, FrameReport, OperationType, ProgressCallback, ProgressInfo,
};
pub use timing::{
    DEFAULT_TIMESTAMP_MULTIPLIER, FALLBACK_DELAY_MS, MIN_DELAY_MS, TimingMode, TimingResolver,
    TimingSelection,
};
pub use validation::ValidationReport;
