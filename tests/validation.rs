//! Validation integration tests.

mod common;

use bif2gif::{BifFile, ExtractOptions, LastFrameEnd, ValidationReport};

use common::{BifBuilder, SENTINEL, raw_container, three_frame_layout};

#[test]
fn validate_well_formed_container() {
    let buffer = BifBuilder::new().jpeg_frames(3, 8, 8).terminal_entry(true).build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let report = bif.validate();

    assert!(report.is_valid(), "Report should be valid: {report}");
    assert!(report.warnings.is_empty(), "No warnings expected: {report}");
    assert!(report.info.iter().any(|s| s.contains("3 frames")));
    assert!(report.info.iter().any(|s| s.contains("Terminal entry")));
    assert!(report.info.iter().any(|s| s.contains("variable timestamp")));
}

#[test]
fn validate_reports_overlapping_ranges() {
    let mut buffer = raw_container(3, 1000, &[(0, 200), (1, 600), (2, 400)], &[]);
    buffer.resize(1200, 0);
    let report = BifFile::from_bytes(buffer).expect("Failed to parse").validate();

    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("frame 1"), "{report}");
}

#[test]
fn validate_reports_index_overrun() {
    let buffer = raw_container(100, 1000, &[], &[0; 32]);
    let report = BifFile::from_bytes(buffer).expect("Failed to parse").validate();

    assert!(!report.is_valid());
    assert!(report.errors[0].contains("Malformed BIF index"));
}

#[test]
fn validate_warns_about_non_jpeg_payloads() {
    let report = BifFile::from_bytes(three_frame_layout())
        .expect("Failed to parse")
        .validate();

    assert!(report.is_valid());
    assert!(
        report.warnings.iter().any(|s| s.contains("3 frame payload(s)")),
        "{report}"
    );
}

#[test]
fn validate_warns_about_clamped_timestamps() {
    let mut buffer = raw_container(3, 1000, &[(0, 200), (5, 300), (5, 400), (SENTINEL, 500)], &[]);
    buffer.resize(500, 0);
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let options = ExtractOptions::new().with_timing(bif2gif::TimingSelection::VariableTimestamp);
    let report = bif.validate_with_options(&options);

    assert!(
        report.warnings.iter().any(|s| s.contains("1 frame(s) have non-increasing")),
        "{report}"
    );
}

#[test]
fn validate_empty_container() {
    let report = BifFile::from_bytes(BifBuilder::new().build())
        .expect("Failed to parse")
        .validate();

    assert!(report.is_valid());
    assert!(report.warnings.iter().any(|s| s.contains("no frames")));
}

#[test]
fn validate_missing_terminal_entry_under_terminal_convention() {
    let buffer = BifBuilder::new().jpeg_frames(2, 8, 8).build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let options = ExtractOptions::new().with_last_frame_end(LastFrameEnd::TerminalEntry);

    assert!(bif.validate().is_valid());
    assert!(!bif.validate_with_options(&options).is_valid());
}

#[test]
fn validate_strict_version() {
    let buffer = BifBuilder::new().version(2).jpeg_frames(1, 8, 8).build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");

    let lenient = bif.validate();
    assert!(lenient.is_valid());
    assert!(lenient.warnings.iter().any(|s| s.contains("version 2")));

    let strict = bif.validate_with_options(&ExtractOptions::new().with_strict_version(true));
    assert!(!strict.is_valid());
}

#[test]
fn strict_version_does_not_escalate_magic() {
    let buffer = BifBuilder::new().magic(*b"XXXXXXXX").jpeg_frames(1, 8, 8).build();
    let report = BifFile::from_bytes(buffer)
        .expect("Failed to parse")
        .validate_with_options(&ExtractOptions::new().with_strict_version(true));

    assert!(report.is_valid(), "{report}");
    assert!(report.warnings.iter().any(|s| s.contains("magic")));
}

#[test]
fn report_display() {
    let report = ValidationReport {
        info: vec!["hello".to_string()],
        warnings: vec!["careful".to_string()],
        errors: vec!["broken".to_string()],
    };
    let text = report.to_string();

    assert!(text.contains("[INFO] hello"));
    assert!(text.contains("[WARN] careful"));
    assert!(text.contains("[ERROR] broken"));
    assert_eq!(report.issue_count(), 3);
    assert_eq!(ValidationReport::default().to_string(), "No issues found.\n");
}
