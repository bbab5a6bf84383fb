//! Shared fixtures for the integration tests.
//!
//! BIF containers are assembled in memory so the tests need no fixture files
//! on disk. Payloads are real JPEGs produced by the `image` crate.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub const MAGIC: [u8; 8] = [0x89, 0x42, 0x49, 0x46, 0x0d, 0x0a, 0x1a, 0x0a];
pub const HEADER_SIZE: usize = 64;
pub const ENTRY_SIZE: usize = 8;
pub const SENTINEL: u32 = u32::MAX;

/// Encode a solid-color JPEG of the given size.
pub fn jpeg(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([shade, 255 - shade, shade / 2]));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut bytes, ImageFormat::Jpeg)
        .expect("Failed to encode JPEG fixture");
    bytes.into_inner()
}

/// Builder for in-memory BIF containers.
#[derive(Debug, Clone)]
pub struct BifBuilder {
    magic: [u8; 8],
    version: u32,
    multiplier: i32,
    frames: Vec<(u32, Vec<u8>)>,
    terminal_entry: bool,
}

impl Default for BifBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BifBuilder {
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            version: 0,
            multiplier: 1000,
            frames: Vec::new(),
            terminal_entry: false,
        }
    }

    pub fn magic(mut self, magic: [u8; 8]) -> Self {
        self.magic = magic;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn multiplier(mut self, multiplier: i32) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn frame(mut self, timestamp: u32, payload: Vec<u8>) -> Self {
        self.frames.push((timestamp, payload));
        self
    }

    /// Add `count` JPEG frames with timestamps `0, 1, 2, ...`.
    pub fn jpeg_frames(mut self, count: u32, width: u32, height: u32) -> Self {
        for index in 0..count {
            let timestamp = self.frames.len() as u32;
            let shade = (index * 40 % 256) as u8;
            self.frames.push((timestamp, jpeg(width, height, shade)));
        }
        self
    }

    pub fn terminal_entry(mut self, enabled: bool) -> Self {
        self.terminal_entry = enabled;
        self
    }

    /// Byte offset at which the first payload lands.
    pub fn payload_start(&self) -> usize {
        let entries = self.frames.len() + usize::from(self.terminal_entry);
        HEADER_SIZE + ENTRY_SIZE * entries
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&self.magic);
        buffer.extend_from_slice(&self.version.to_le_bytes());
        buffer.extend_from_slice(&(self.frames.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&self.multiplier.to_le_bytes());
        buffer.resize(HEADER_SIZE, 0);

        let mut offset = self.payload_start();
        for (timestamp, payload) in &self.frames {
            buffer.extend_from_slice(&timestamp.to_le_bytes());
            buffer.extend_from_slice(&(offset as u32).to_le_bytes());
            offset += payload.len();
        }
        if self.terminal_entry {
            buffer.extend_from_slice(&SENTINEL.to_le_bytes());
            buffer.extend_from_slice(&(offset as u32).to_le_bytes());
        }

        for (_, payload) in &self.frames {
            buffer.extend_from_slice(payload);
        }
        buffer
    }
}

/// Assemble a container from raw index entries and a payload region, with
/// full control over every offset.
pub fn raw_container(
    frame_count: u32,
    multiplier: i32,
    entries: &[(u32, u32)],
    tail: &[u8],
) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&MAGIC);
    buffer.extend_from_slice(&0_u32.to_le_bytes());
    buffer.extend_from_slice(&frame_count.to_le_bytes());
    buffer.extend_from_slice(&multiplier.to_le_bytes());
    buffer.resize(HEADER_SIZE, 0);
    for (timestamp, offset) in entries {
        buffer.extend_from_slice(&timestamp.to_le_bytes());
        buffer.extend_from_slice(&offset.to_le_bytes());
    }
    buffer.extend_from_slice(tail);
    buffer
}

/// The container used throughout the index tests: three frames with
/// timestamps 0, 1, 2 at offsets 200, 500, 900 in a 1200-byte file.
pub fn three_frame_layout() -> Vec<u8> {
    let mut buffer = raw_container(3, 1000, &[(0, 200), (1, 500), (2, 900)], &[]);
    buffer.resize(1200, 0xAB);
    buffer
}
