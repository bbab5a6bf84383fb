//! Core [`BifFile`] implementation.
//!
//! `BifFile` is the main entry point for the crate. It loads a whole BIF
//! container into memory, reads and caches its header, and hands out
//! [`FrameIterator`]s, metadata, validation reports, and GIF exports over
//! the buffer it owns.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    configuration::ExtractOptions,
    error::{BifError, BifWarning},
    frames::{Frame, FrameIterator},
    header::{BifHeader, SUPPORTED_VERSION},
    index::IndexTable,
    metadata::BifMetadata,
    progress::{OperationType, ProgressTracker},
    timing::{TimingMode, TimingResolver},
    validation::{ValidationReport, validate_buffer},
};

/// A BIF container loaded into memory.
///
/// The format places the header, then the index, then the image blobs, so
/// parsing needs random access to the whole file. Every frame handed out
/// borrows from the buffer owned here.
///
/// # Example
///
/// ```no_run
/// use bif2gif::{BifError, BifFile};
///
/// let bif = BifFile::open("thumbnails.bif")?;
/// println!("{} frames", bif.header().frame_count);
///
/// let first = bif.frame(0)?;
/// std::fs::write("first.jpg", &first.data)?;
/// # Ok::<(), BifError>(())
/// ```
pub struct BifFile {
    /// The full container.
    pub(crate) buffer: Vec<u8>,
    /// Header read at open time.
    pub(crate) header: BifHeader,
    /// Header findings that did not stop parsing.
    pub(crate) warnings: Vec<BifWarning>,
    /// Path the container was loaded from, if any.
    pub(crate) file_path: Option<PathBuf>,
}

impl Debug for BifFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BifFile")
            .field("header", &self.header)
            .field("warnings", &self.warnings)
            .field("file_path", &self.file_path)
            .field("buffer_len", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl BifFile {
    /// Load and parse a BIF file.
    ///
    /// # Errors
    ///
    /// Returns [`BifError::FileNotFound`] if `path` does not exist,
    /// [`BifError::IoError`] if it cannot be read, and
    /// [`BifError::TruncatedFile`] if it is shorter than the header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BifError> {
        let path = path.as_ref();
        log::debug!("Opening BIF file: {}", path.display());

        if !path.exists() {
            return Err(BifError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let buffer = fs::read(path)?;
        let mut bif = Self::from_bytes(buffer)?;
        bif.file_path = Some(path.to_path_buf());
        Ok(bif)
    }

    /// Parse a container that is already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`BifError::TruncatedFile`] if `buffer` is shorter than the
    /// header.
    pub fn from_bytes(buffer: impl Into<Vec<u8>>) -> Result<Self, BifError> {
        let buffer = buffer.into();
        let header = BifHeader::read(&buffer)?;
        let warnings = header.warnings();
        for warning in &warnings {
            log::warn!("{warning}");
        }

        Ok(Self {
            buffer,
            header,
            warnings,
            file_path: None,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &BifHeader {
        &self.header
    }

    /// Non-fatal header findings.
    pub fn warnings(&self) -> &[BifWarning] {
        &self.warnings
    }

    /// Path the container was loaded from, if it came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// The raw container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// A bounds-checked view of the index table.
    ///
    /// # Errors
    ///
    /// Returns [`BifError::MalformedIndex`] if the table runs past the end of
    /// the buffer.
    pub fn index(&self) -> Result<IndexTable<'_>, BifError> {
        IndexTable::new(&self.buffer, &self.header)
    }

    /// The timing mode `options` resolves to for this file.
    pub fn timing_mode(&self, options: &ExtractOptions) -> Result<TimingMode, BifError> {
        let table = self.index()?;
        Ok(TimingMode::select(options.timing, &self.header, &table))
    }

    /// Iterate over every frame with default options.
    pub fn frames(&self) -> Result<FrameIterator<'_>, BifError> {
        self.frames_with_options(&ExtractOptions::default())
    }

    /// Iterate over every frame.
    ///
    /// # Errors
    ///
    /// Fails up front with [`BifError::MalformedIndex`] if the index table
    /// does not fit, or [`BifError::UnsupportedVersion`] under strict version
    /// checking. Per-frame range errors are yielded by the iterator.
    pub fn frames_with_options(
        &self,
        options: &ExtractOptions,
    ) -> Result<FrameIterator<'_>, BifError> {
        self.check_version(options)?;
        let table = self.index()?;
        let resolver = self.resolver(&table, options);
        log::debug!(
            "Emitting {} frames ({}, last frame end {:?})",
            table.len(),
            resolver.mode(),
            options.last_frame_end,
        );
        Ok(FrameIterator::new(&self.buffer, table, resolver, options.clone()))
    }

    /// A single frame, with default options.
    pub fn frame(&self, index: u32) -> Result<Frame<'_>, BifError> {
        self.frame_with_options(index, &ExtractOptions::default())
    }

    /// A single frame.
    pub fn frame_with_options(
        &self,
        index: u32,
        options: &ExtractOptions,
    ) -> Result<Frame<'_>, BifError> {
        self.check_version(options)?;
        let table = self.index()?;
        let resolver = self.resolver(&table, options);
        Frame::from_table(&self.buffer, &table, &resolver, options.last_frame_end, index)
    }

    /// Summarize the container with default options.
    pub fn metadata(&self) -> Result<BifMetadata, BifError> {
        self.metadata_with_options(&ExtractOptions::default())
    }

    /// Summarize the container.
    pub fn metadata_with_options(&self, options: &ExtractOptions) -> Result<BifMetadata, BifError> {
        let table = self.index()?;
        let resolver = self.resolver(&table, options);
        let total_ms: u64 = (0..table.len())
            .map(|index| u64::from(resolver.resolve_delay(&table, index)))
            .sum();

        Ok(BifMetadata {
            version: self.header.version,
            frame_count: self.header.frame_count,
            timestamp_multiplier: self.header.timestamp_multiplier,
            timing_mode: resolver.mode(),
            duration: Duration::from_millis(total_ms),
            file_size: self.buffer.len() as u64,
            has_terminal_entry: table.terminal_entry().is_some(),
            warnings: self.warnings.clone(),
        })
    }

    /// Validate the whole container with default options.
    pub fn validate(&self) -> ValidationReport {
        self.validate_with_options(&ExtractOptions::default())
    }

    /// Validate the whole container.
    pub fn validate_with_options(&self, options: &ExtractOptions) -> ValidationReport {
        log::debug!("Validating {} byte BIF buffer", self.buffer.len());
        validate_buffer(&self.buffer, options)
    }

    /// Write every frame payload, unmodified, into `directory` as
    /// `frame_NNNNNN.<ext>`, the extension guessed from the payload.
    ///
    /// Returns the written paths in index order.
    pub fn save_frames<P: AsRef<Path>>(
        &self,
        directory: P,
        options: &ExtractOptions,
    ) -> Result<Vec<PathBuf>, BifError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;

        let frames = self.frames_with_options(options)?;
        let mut tracker =
            ProgressTracker::new(options, OperationType::FrameExtraction, frames.frame_count());

        let mut written = Vec::with_capacity(frames.frame_count() as usize);
        for frame in frames {
            let frame = frame?;
            let path = directory.join(format!(
                "frame_{:06}.{}",
                frame.index,
                frame.extension()
            ));
            fs::write(&path, &frame.data)?;
            tracker.record(&frame);
            written.push(path);
        }
        tracker.finish();

        Ok(written)
    }

    fn resolver(&self, table: &IndexTable<'_>, options: &ExtractOptions) -> TimingResolver {
        let mode = TimingMode::select(options.timing, &self.header, table);
        TimingResolver::new(mode, options.fallback_delay_ms)
    }

    fn check_version(&self, options: &ExtractOptions) -> Result<(), BifError> {
        if options.strict_version && !self.header.is_supported_version() {
            return Err(BifError::UnsupportedVersion {
                found: self.header.version,
                supported: SUPPORTED_VERSION,
            });
        }
        Ok(())
    }
}
