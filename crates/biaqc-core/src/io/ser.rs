use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;
use serde_json::{json, Map, Value};

use crate::error::{QcError, Result};
use crate::series::{Dimensions, SeriesPath, SeriesSource};

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Trailer timestamps count 100 ns ticks.
const TICKS_PER_MILLISECOND: f64 = 10_000.0;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame, `None` if the header extents overflow.
    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_pixel_plane() * self.planes_per_pixel())
    }

    /// End of the frame data, where the timestamp trailer begins.
    pub fn data_end(&self) -> Option<usize> {
        self.frame_byte_size()?
            .checked_mul(self.frame_count as usize)?
            .checked_add(SER_HEADER_SIZE)
    }
}

/// Memory-mapped SER video exposed as a `T × C × 1 × Y × X` series.
///
/// Frames map to T, colour planes to C. Bayer data is kept as a single raw
/// mosaic channel. Samples are returned as stored, without scaling.
pub struct SerSeries {
    mmap: Mmap,
    path: SeriesPath,
    dims: Dimensions,
    frame_size: usize,
    data_end: usize,
    pub header: SerHeader,
}

impl std::fmt::Debug for SerSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerSeries")
            .field("path", &self.path)
            .field("dims", &self.dims)
            .field("header", &self.header)
            .finish()
    }
}

impl SerSeries {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the file is only read; concurrent truncation by another
        // process is outside what this reader supports.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(QcError::InvalidSer("File too small for SER header".into()));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(QcError::InvalidSer("Missing LUCAM-RECORDER magic".into()));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let (frame_size, data_end) = header
            .frame_byte_size()
            .zip(header.data_end())
            .ok_or_else(|| QcError::InvalidSer("frame size overflow".into()))?;
        if mmap.len() < data_end {
            return Err(QcError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                data_end,
                mmap.len()
            )));
        }

        let dims = Dimensions::new(
            "TCZYX",
            &[
                header.frame_count as usize,
                header.planes_per_pixel(),
                1,
                header.height as usize,
                header.width as usize,
            ],
        )?;

        tracing::debug!(
            path = %path.display(),
            frames = header.frame_count,
            bit_depth = header.pixel_depth,
            "opened SER series"
        );

        Ok(Self {
            mmap,
            path: SeriesPath::new(path),
            dims,
            frame_size,
            data_end,
            header,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Raw bytes of a single frame (zero-copy from the mapping).
    fn frame_raw(&self, index: usize) -> &[u8] {
        let offset = SER_HEADER_SIZE + index * self.frame_size;
        &self.mmap[offset..offset + self.frame_size]
    }

    /// Per-frame timestamp from the optional trailer.
    pub fn timestamp(&self, index: usize) -> Option<u64> {
        let ts_offset = self.data_end + index * 8;
        if ts_offset + 8 <= self.mmap.len() {
            let mut bytes = &self.mmap[ts_offset..ts_offset + 8];
            bytes.read_u64::<LittleEndian>().ok()
        } else {
            None
        }
    }

    fn pixels_node(&self) -> Value {
        let planes = self.header.planes_per_pixel();
        let first = self.timestamp(0);

        let mut plane_list = Vec::with_capacity(self.frame_count() * planes);
        for t in 0..self.frame_count() {
            let delta_ms = match (first, self.timestamp(t)) {
                (Some(t0), Some(ts)) => Some(ts.saturating_sub(t0) as f64 / TICKS_PER_MILLISECOND),
                _ => None,
            };
            for c in 0..planes {
                let mut plane = Map::new();
                plane.insert("the_t".into(), json!(t));
                plane.insert("the_c".into(), json!(c));
                plane.insert("the_z".into(), json!(0));
                if let Some(ms) = delta_ms {
                    plane.insert("delta_t".into(), json!(ms));
                    plane.insert("delta_t_unit".into(), json!("millisecond"));
                }
                plane_list.push(Value::Object(plane));
            }
        }

        json!({
            "significant_bits": self.header.pixel_depth,
            "size_x": self.header.width,
            "size_y": self.header.height,
            "size_z": 1,
            "size_c": planes,
            "size_t": self.frame_count(),
            "planes": plane_list,
        })
    }
}

impl SeriesSource for SerSeries {
    fn path(&self) -> &SeriesPath {
        &self.path
    }

    fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    fn read_plane(&self, t: usize, c: usize, z: usize) -> Result<Array2<f32>> {
        let planes = self.header.planes_per_pixel();
        if t >= self.frame_count() || c >= planes || z != 0 {
            return Err(QcError::PlaneOutOfRange {
                t,
                c,
                z,
                extents: [self.frame_count(), planes, 1],
            });
        }

        // BGR stores blue first; present channels in RGB order.
        let plane_index = if self.header.color_id == 101 {
            planes - 1 - c
        } else {
            c
        };

        Ok(decode_plane(
            self.frame_raw(t),
            self.header.height as usize,
            self.header.width as usize,
            self.header.bytes_per_pixel_plane(),
            planes,
            plane_index,
            self.header.little_endian,
        ))
    }

    fn metadata_tree(&self) -> Option<Value> {
        let mut detector = Map::new();
        if !self.header.instrument.is_empty() {
            detector.insert("model".into(), json!(self.header.instrument));
        }
        Some(json!({
            "instruments": [{ "detectors": [Value::Object(detector)] }],
            "images": [{ "pixels": self.pixels_node() }],
        }))
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(QcError::InvalidDimensions { width, height });
    }

    // Many writers store 0 for little-endian pixel data; treat only 1 as big-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn decode_plane(
    raw: &[u8],
    height: usize,
    width: usize,
    bytes_per_sample: usize,
    planes: usize,
    plane_index: usize,
    little_endian: bool,
) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(row, col)| {
        let idx = ((row * width + col) * planes + plane_index) * bytes_per_sample;
        if bytes_per_sample == 1 {
            raw[idx] as f32
        } else {
            let pair = [raw[idx], raw[idx + 1]];
            if little_endian {
                u16::from_le_bytes(pair) as f32
            } else {
                u16::from_be_bytes(pair) as f32
            }
        }
    })
}
