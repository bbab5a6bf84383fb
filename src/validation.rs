//! Container validation.
//!
//! Provides [`BifFile::validate`](crate::BifFile::validate), which walks the
//! whole index eagerly and returns a [`ValidationReport`] describing the
//! container's structure and any problems, without stopping at the first
//! one.
//!
//! # Example
//!
//! ```no_run
//! use bif2gif::BifFile;
//!
//! let bif = BifFile::open("thumbnails.bif")?;
//! let report = bif.validate();
//! if report.is_valid() {
//!     println!("File is valid");
//! } else {
//!     for error in &report.errors {
//!         println!("Error: {error}");
//!     }
//! }
//! # Ok::<(), bif2gif::BifError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::configuration::ExtractOptions;
use crate::error::BifWarning;
use crate::header::BifHeader;
use crate::index::{IndexTable, LastFrameEnd};
use crate::timing::{TimingMode, delay_between};

const JPEG_START_OF_IMAGE: [u8; 2] = [0xff, 0xd8];

/// Summary of container validation.
///
/// Contains lists of informational notices, warnings, and errors found during
/// validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Non-fatal issues that may affect the exported animation.
    pub warnings: Vec<String>,
    /// Fatal issues that will prevent export.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    ///
    /// Warnings do not affect this result. Only errors make the report
    /// invalid.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of issues (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Run every structural check against `buffer`.
pub(crate) fn validate_buffer(buffer: &[u8], options: &ExtractOptions) -> ValidationReport {
    let mut report = ValidationReport::default();

    // ── Header ─────────────────────────────────────────────────────
    let header = match BifHeader::read(buffer) {
        Ok(header) => header,
        Err(error) => {
            report.errors.push(error.to_string());
            return report;
        }
    };

    report.info.push(format!(
        "BIF version {}, {} frames, {} bytes",
        header.version,
        header.frame_count,
        buffer.len(),
    ));
    for warning in header.warnings() {
        let fatal =
            options.strict_version && matches!(warning, BifWarning::UnsupportedVersion { .. });
        if fatal {
            report.errors.push(warning.to_string());
        } else {
            report.warnings.push(warning.to_string());
        }
    }

    // ── Index table ────────────────────────────────────────────────
    let table = match IndexTable::new(buffer, &header) {
        Ok(table) => table,
        Err(error) => {
            report.errors.push(error.to_string());
            return report;
        }
    };

    if table.is_empty() {
        report
            .warnings
            .push("Container holds no frames; nothing will be exported".to_string());
        return report;
    }

    match table.terminal_entry() {
        Some(terminal) => report.info.push(format!(
            "Terminal entry marks end of last image at byte {}",
            terminal.byte_offset,
        )),
        None if options.last_frame_end == LastFrameEnd::TerminalEntry => {}
        None => report
            .info
            .push("No terminal entry; last image runs to end of file".to_string()),
    }

    // ── Timing ─────────────────────────────────────────────────────
    let mode = TimingMode::select(options.timing, &header, &table);
    report.info.push(format!("Timing: {mode}"));
    match mode {
        TimingMode::FixedInterval(interval) if interval <= 0 => {
            report.warnings.push(format!(
                "Fixed interval of {interval} ms is not positive; every delay will be clamped",
            ));
        }
        TimingMode::VariableTimestamp(multiplier) => {
            if header.timestamp_multiplier == 0 {
                report.info.push(format!(
                    "Timestamp multiplier is 0; using {multiplier} ms per unit",
                ));
            }
            let entries: Vec<_> = table.entries().collect();
            let clamped = entries
                .windows(2)
                .filter_map(|pair| delay_between(pair[0].timestamp, pair[1].timestamp, multiplier))
                .filter(|&delay| delay <= 0)
                .count();
            if clamped > 0 {
                report.warnings.push(format!(
                    "{clamped} frame(s) have non-increasing timestamps; their delays will be clamped",
                ));
            }
        }
        TimingMode::FixedInterval(_) => {}
    }

    // ── Payload ranges ─────────────────────────────────────────────
    let mut not_jpeg = 0_usize;
    for index in 0..table.len() {
        match table.payload(index, options.last_frame_end) {
            Ok(payload) => {
                if !payload.starts_with(&JPEG_START_OF_IMAGE) {
                    not_jpeg += 1;
                }
            }
            Err(error) => {
                report.errors.push(error.to_string());
                break;
            }
        }
    }
    if not_jpeg > 0 {
        report.warnings.push(format!(
            "{not_jpeg} frame payload(s) do not start with a JPEG marker",
        ));
    }

    report
}
