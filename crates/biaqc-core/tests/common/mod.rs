#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use biaqc_core::io::ser::{SER_HEADER_SIZE, SER_MAGIC};
use ndarray::Array2;

/// Build a SER file header.
///
/// `color_id`: 0=MONO, 100=RGB, 101=BGR.
pub fn build_ser_header(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
    instrument: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    buf.extend_from_slice(SER_MAGIC);
    // LuID
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0 (little-endian per Siril convention)
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer
    buf.extend_from_slice(&[0u8; 40]);
    // Instrument
    let mut field = [0u8; 40];
    let n = instrument.len().min(40);
    field[..n].copy_from_slice(&instrument.as_bytes()[..n]);
    buf.extend_from_slice(&field);
    // Telescope
    buf.extend_from_slice(&[0u8; 40]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Mono 8-bit SER with the given frames and an optional timestamp trailer
/// (100 ns ticks per frame).
pub fn build_mono_ser(
    width: u32,
    height: u32,
    frames: &[Vec<u8>],
    instrument: &str,
    timestamps: Option<&[u64]>,
) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, 8, frames.len(), 0, instrument);
    for frame in frames {
        assert_eq!(frame.len(), (width * height) as usize);
        buf.extend_from_slice(frame);
    }
    if let Some(ts) = timestamps {
        for t in ts {
            buf.extend_from_slice(&t.to_le_bytes());
        }
    }
    buf
}

/// Write bytes to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).expect("create file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    path
}

/// Deterministic textured 8-bit frame.
pub fn textured_frame(width: u32, height: u32, seed: u32) -> Vec<u8> {
    (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            ((x * 37 + y * 91 + seed * 53 + (x * y) % 17) % 251) as u8
        })
        .collect()
}

/// Deterministic textured plane with values in `[0, scale)`.
pub fn textured_plane(height: usize, width: usize, scale: f32) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(r, c)| {
        let v = ((r * 37 + c * 91 + (r * c) % 17) % 251) as f32 / 251.0;
        v * scale
    })
}
