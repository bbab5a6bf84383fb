//! Frame emission integration tests.

mod common;

use std::borrow::Cow;

use bif2gif::{
    BifError, BifFile, CancellationToken, ExtractOptions, FALLBACK_DELAY_MS, Frame, LastFrameEnd,
    probe_dimensions,
};

use common::{BifBuilder, SENTINEL, jpeg, raw_container, three_frame_layout};

#[test]
fn emits_spec_layout_in_order() {
    let buffer = three_frame_layout();
    let bif = BifFile::from_bytes(buffer.clone()).expect("Failed to parse");
    let frames: Vec<Frame<'_>> = bif
        .frames()
        .expect("Failed to create iterator")
        .collect::<Result<_, _>>()
        .expect("Frames should be valid");

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].range, 200..500);
    assert_eq!(frames[1].range, 500..900);
    assert_eq!(frames[2].range, 900..1200);
    assert_eq!(&*frames[2].data, &buffer[900..1200]);
    assert_eq!(frames[2].delay_ms, FALLBACK_DELAY_MS);
    for (expected, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index, expected as u32);
        assert!(matches!(frame.data, Cow::Borrowed(_)));
    }
}

#[test]
fn zero_frames_emit_nothing() {
    let bif = BifFile::from_bytes(BifBuilder::new().build()).expect("Failed to parse");
    let mut frames = bif.frames().expect("Failed to create iterator");

    assert_eq!(frames.frame_count(), 0);
    assert!(frames.next().is_none());
    assert!(frames.next().is_none());
}

#[test]
fn single_frame_runs_to_end_of_buffer() {
    let buffer = BifBuilder::new().jpeg_frames(1, 16, 16).build();
    let start = BifBuilder::new().jpeg_frames(1, 16, 16).payload_start();
    let bif = BifFile::from_bytes(buffer.clone()).expect("Failed to parse");
    let frames: Vec<_> = bif.frames().expect("Failed to create iterator").collect();

    assert_eq!(frames.len(), 1);
    let frame = frames[0].as_ref().expect("Frame should be valid");
    assert_eq!(frame.range, start..buffer.len());
    assert_eq!(frame.delay_ms, FALLBACK_DELAY_MS);
}

#[test]
fn repeated_parses_are_identical() {
    let buffer = BifBuilder::new().jpeg_frames(5, 12, 12).build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");

    let first: Vec<_> = bif
        .frames()
        .expect("Failed to create iterator")
        .collect::<Result<_, _>>()
        .expect("Frames should be valid");
    let second: Vec<_> = bif
        .frames()
        .expect("Failed to create iterator")
        .collect::<Result<_, _>>()
        .expect("Frames should be valid");
    assert_eq!(first, second);
}

#[test]
fn iterator_is_finished_after_last_frame() {
    let bif = BifFile::from_bytes(three_frame_layout()).expect("Failed to parse");
    let mut frames = bif.frames().expect("Failed to create iterator");

    assert_eq!(frames.size_hint(), (0, Some(3)));
    for _ in 0..3 {
        assert!(frames.next().is_some());
    }
    assert_eq!(frames.size_hint(), (0, Some(0)));
    assert!(frames.next().is_none());
    assert!(frames.next().is_none());
}

#[test]
fn error_ends_the_sequence() {
    // Frame 1 points past the end of the file.
    let mut buffer = raw_container(3, 1000, &[(0, 200), (1, 500), (2, 9000)], &[]);
    buffer.resize(1200, 0);
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let mut frames = bif.frames().expect("Failed to create iterator");

    assert!(frames.next().is_some_and(|frame| frame.is_ok()));
    assert!(matches!(
        frames.next(),
        Some(Err(BifError::MalformedIndex(_)))
    ));
    assert!(frames.next().is_none());
}

#[test]
fn terminal_convention_applies_to_iteration() {
    let mut buffer = raw_container(2, 1000, &[(0, 200), (1, 500), (SENTINEL, 800)], &[]);
    buffer.resize(1000, 0);
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let options = ExtractOptions::new().with_last_frame_end(LastFrameEnd::TerminalEntry);

    let last = bif.frame_with_options(1, &options).expect("Frame should be valid");
    assert_eq!(last.range, 500..800);
    assert_eq!(bif.frame(1).expect("Frame should be valid").range, 500..1000);
}

#[test]
fn cancelled_token_stops_before_next_frame() {
    let bif = BifFile::from_bytes(three_frame_layout()).expect("Failed to parse");
    let token = CancellationToken::new();
    let options = ExtractOptions::new().with_cancellation(token.clone());
    let mut frames = bif.frames_with_options(&options).expect("Failed to create iterator");

    assert!(frames.next().is_some_and(|frame| frame.is_ok()));
    token.cancel();
    assert!(matches!(frames.next(), Some(Err(BifError::Cancelled))));
    assert!(frames.next().is_none());
}

#[test]
fn owned_frame_outlives_buffer() {
    let owned = {
        let bif = BifFile::from_bytes(three_frame_layout()).expect("Failed to parse");
        bif.frame(0).expect("Frame should be valid").into_owned()
    };
    assert!(matches!(owned.data, Cow::Owned(_)));
    assert_eq!(owned.data.len(), 300);
}

#[test]
fn delay_centiseconds_round_and_floor_at_one() {
    let mut frame = Frame {
        index: 0,
        range: 0..1,
        data: Cow::Borrowed(&[0_u8][..]),
        delay_ms: 1000,
        timestamp: None,
    };
    assert_eq!(frame.delay_centiseconds(), 100);
    frame.delay_ms = 15;
    assert_eq!(frame.delay_centiseconds(), 2);
    frame.delay_ms = 1;
    assert_eq!(frame.delay_centiseconds(), 1);
}

#[test]
fn probes_jpeg_dimensions() {
    assert_eq!(probe_dimensions(&jpeg(40, 24, 0)).expect("Valid JPEG"), (40, 24));

    let bif = BifFile::from_bytes(BifBuilder::new().jpeg_frames(2, 32, 18).build())
        .expect("Failed to parse");
    let frame = bif.frame(1).expect("Frame should be valid");
    assert_eq!(frame.dimensions().expect("Valid JPEG"), (32, 18));
    assert_eq!(frame.extension(), "jpg");
}

#[test]
fn garbage_payload_fails_dimension_probe() {
    let bif = BifFile::from_bytes(three_frame_layout()).expect("Failed to parse");
    let frame = bif.frame(0).expect("Frame should be valid");

    assert!(matches!(
        frame.dimensions(),
        Err(BifError::FrameDecodeFailure { frame_index: 0, .. })
    ));
    assert_eq!(frame.extension(), "bin");
}
