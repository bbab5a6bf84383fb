//! GIF export integration tests.

#![cfg(feature = "gif")]

mod common;

use bif2gif::{BifError, BifFile, ExtractOptions, GifOptions, RenderSession, TimingSelection};

use common::{BifBuilder, jpeg, three_frame_layout};

fn gif_frame_delays(bytes: &[u8]) -> Vec<u16> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(bytes).expect("Output should be a GIF");
    let mut delays = Vec::new();
    while let Some(frame) = decoder.read_next_frame().expect("Frame should decode") {
        delays.push(frame.delay);
    }
    delays
}

#[test]
fn exports_every_frame_to_file() {
    let buffer = BifBuilder::new().multiplier(500).jpeg_frames(4, 24, 16).build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("animated.gif");

    let summary = bif
        .export_gif(&path, &GifOptions::default())
        .expect("Export should succeed");

    assert_eq!(summary.frame_count, 4);
    assert_eq!((summary.width, summary.height), (24, 16));
    // 3 × 500 ms, then the 10 ms fallback.
    assert_eq!(summary.duration.as_millis(), 1510);

    let bytes = std::fs::read(&path).expect("GIF should be written");
    assert!(bytes.starts_with(b"GIF89a"));
    assert_eq!(gif_frame_delays(&bytes), vec![50, 50, 50, 1]);
}

#[test]
fn memory_export_matches_file_export() {
    let buffer = BifBuilder::new().jpeg_frames(3, 16, 16).build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("out.gif");

    bif.export_gif(&path, &GifOptions::default()).expect("Export should succeed");
    let memory = bif
        .export_gif_to_memory(&GifOptions::default())
        .expect("Export should succeed");

    assert_eq!(std::fs::read(&path).expect("GIF should be written"), memory);
}

#[test]
fn width_option_preserves_aspect_ratio() {
    let buffer = BifBuilder::new().jpeg_frames(2, 64, 32).build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let summary = bif
        .export_gif(dir.path().join("small.gif"), &GifOptions::new().width(32))
        .expect("Export should succeed");
    assert_eq!((summary.width, summary.height), (32, 16));
}

#[test]
fn fixed_interval_delays_in_output() {
    let buffer = BifBuilder::new()
        .multiplier(250)
        .frame(0, jpeg(8, 8, 10))
        .frame(0, jpeg(8, 8, 90))
        .build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let options = ExtractOptions::new().with_timing(TimingSelection::FixedInterval);

    let bytes = bif
        .export_gif_to_memory_with_options(&GifOptions::default(), &options)
        .expect("Export should succeed");
    assert_eq!(gif_frame_delays(&bytes), vec![25, 25]);
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_decode_keeps_frame_order() {
    // More frames than one decode window, each with its own delay.
    let count = rayon::current_num_threads() * 2 + 5;
    let deltas: Vec<u16> = (1..=count as u16).collect();
    let mut builder = BifBuilder::new().multiplier(10);
    let mut timestamp = 0_u32;
    for (index, delta) in deltas.iter().enumerate() {
        builder = builder.frame(timestamp, jpeg(8, 8, (index * 7 % 256) as u8));
        timestamp += u32::from(*delta);
    }
    let bif = BifFile::from_bytes(builder.build()).expect("Failed to parse");

    let bytes = bif
        .export_gif_to_memory(&GifOptions::default())
        .expect("Export should succeed");

    // Frame i lasts delta_i * 10 ms; the last frame gets the 10 ms fallback.
    let mut expected = deltas[..count - 1].to_vec();
    expected.push(1);
    assert_eq!(gif_frame_delays(&bytes), expected);
}

#[test]
fn empty_container_writes_nothing() {
    let bif = BifFile::from_bytes(BifBuilder::new().build()).expect("Failed to parse");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.gif");

    let summary = bif
        .export_gif(&path, &GifOptions::default())
        .expect("Empty export should succeed");

    assert_eq!(summary.frame_count, 0);
    assert!(!path.exists(), "No file should be written for zero frames");
    assert!(
        bif.export_gif_to_memory(&GifOptions::default())
            .expect("Empty export should succeed")
            .is_empty()
    );
}

#[test]
fn undecodable_frame_aborts_without_output() {
    let buffer = BifBuilder::new()
        .frame(0, jpeg(8, 8, 0))
        .frame(1, b"definitely not a jpeg".to_vec())
        .frame(2, jpeg(8, 8, 200))
        .build();
    let bif = BifFile::from_bytes(buffer).expect("Failed to parse");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.gif");

    let result = bif.export_gif(&path, &GifOptions::default());
    assert!(
        matches!(result, Err(BifError::FrameDecodeFailure { frame_index: 1, .. })),
        "Expected FrameDecodeFailure for frame 1, got {result:?}"
    );
    assert!(!path.exists(), "A failed export must not leave a file behind");
}

#[test]
fn undecodable_first_frame_fails_probe() {
    let bif = BifFile::from_bytes(three_frame_layout()).expect("Failed to parse");
    let result = bif.export_gif_to_memory(&GifOptions::default());
    assert!(matches!(
        result,
        Err(BifError::FrameDecodeFailure { frame_index: 0, .. })
    ));
}

#[test]
fn render_session_accepts_frames_directly() {
    let bif = BifFile::from_bytes(BifBuilder::new().jpeg_frames(2, 10, 10).build())
        .expect("Failed to parse");
    let mut session =
        RenderSession::new(Vec::new(), 10, 10, &GifOptions::new().repeat(Some(2)))
            .expect("Session should start");

    for frame in bif.frames().expect("Failed to create iterator") {
        session
            .add_frame(&frame.expect("Frame should be valid"))
            .expect("Frame should encode");
    }
    let (bytes, summary) = session.finish().expect("Session should finish");

    assert_eq!(summary.frame_count, 2);
    assert_eq!(gif_frame_delays(&bytes).len(), 2);
}

#[test]
fn render_session_rejects_oversized_canvas() {
    let result = RenderSession::new(Vec::new(), 70_000, 10, &GifOptions::default());
    assert!(matches!(result, Err(BifError::GifEncodeError(_))));
}

#[test]
fn gif_options_clamp_speed() {
    assert_eq!(GifOptions::new().speed(0).speed, 1);
    assert_eq!(GifOptions::new().with_speed(99).speed, 30);
    assert_eq!(GifOptions::default().width, None);
}
