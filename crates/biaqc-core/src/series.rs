use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayD, Axis, Ix2};
use num_traits::ToPrimitive;

use crate::error::{QcError, Result};

/// Identity of one image file: where it lives and how rows refer to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SeriesPath {
    pub file_path: PathBuf,
    /// File name up to the first `.`.
    pub image_name: String,
    /// Text after the last `.`, empty when the name has none.
    pub extension: String,
}

impl SeriesPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let image_name = file_name
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string();
        let extension = match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_string(),
            None => String::new(),
        };
        Self {
            file_path: path.to_path_buf(),
            image_name,
            extension,
        }
    }

    pub fn display_path(&self) -> String {
        self.file_path.to_string_lossy().into_owned()
    }
}

/// Axis order and extents of a multi-dimensional image.
///
/// Axes are single upper-case letters from `T`, `C`, `Z`, `Y`, `X`; the last
/// two are always `Y` then `X`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dimensions {
    order: Vec<char>,
    shape: Vec<usize>,
}

impl Dimensions {
    pub fn new(order: &str, shape: &[usize]) -> Result<Self> {
        let order: Vec<char> = order.chars().map(|c| c.to_ascii_uppercase()).collect();
        if order.len() != shape.len() {
            return Err(QcError::DimensionMapping(format!(
                "axis order has {} axes but shape has {}",
                order.len(),
                shape.len()
            )));
        }
        if order.len() < 2 || order[order.len() - 2..] != ['Y', 'X'] {
            return Err(QcError::DimensionMapping(format!(
                "last two axes must be Y and X, got '{}'",
                order.iter().collect::<String>()
            )));
        }
        for (i, axis) in order.iter().enumerate() {
            if !matches!(axis, 'T' | 'C' | 'Z' | 'Y' | 'X') {
                return Err(QcError::DimensionMapping(format!("unknown axis '{axis}'")));
            }
            if order[..i].contains(axis) {
                return Err(QcError::DimensionMapping(format!("axis '{axis}' repeated")));
            }
        }
        Ok(Self {
            order,
            shape: shape.to_vec(),
        })
    }

    pub fn order(&self) -> String {
        self.order.iter().collect()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn position(&self, axis: char) -> Option<usize> {
        self.order.iter().position(|&a| a == axis)
    }

    pub fn size(&self, axis: char) -> Option<usize> {
        self.position(axis).map(|p| self.shape[p])
    }

    pub fn height(&self) -> usize {
        self.shape[self.shape.len() - 2]
    }

    pub fn width(&self) -> usize {
        self.shape[self.shape.len() - 1]
    }

    /// `[T, C, Z]` extents. Every one of the three axes must be present.
    pub fn tcz(&self) -> Result<[usize; 3]> {
        let get = |axis: char| {
            self.size(axis).ok_or_else(|| {
                QcError::DimensionMapping(format!(
                    "series with axes '{}' has no {axis} axis",
                    self.order()
                ))
            })
        };
        Ok([get('T')?, get('C')?, get('Z')?])
    }
}

/// A multi-dimensional image that can hand out single 2D planes.
///
/// Implementors own the container format; the rest of the crate only sees
/// extents, planes and an optional OME-style metadata tree.
pub trait SeriesSource: Send + Sync {
    fn path(&self) -> &SeriesPath;

    fn dimensions(&self) -> &Dimensions;

    /// Raw (un-normalized) sample values of one plane.
    fn read_plane(&self, t: usize, c: usize, z: usize) -> Result<Array2<f32>>;

    /// Mapping-of-mappings metadata (`instruments`, `images[].pixels.planes`).
    fn metadata_tree(&self) -> Option<serde_json::Value> {
        None
    }
}

/// (T, C, Z) coordinate of a plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SliceCoord {
    pub t: usize,
    pub c: usize,
    pub z: usize,
}

/// One plane pulled out of a series for a single feature pass.
#[derive(Clone, Debug)]
pub struct Slice {
    pub coord: SliceCoord,
    pub data: Array2<f32>,
}

/// In-memory series backed by an N-d array.
#[derive(Clone, Debug)]
pub struct ArraySeries {
    path: SeriesPath,
    dims: Dimensions,
    data: ArrayD<f32>,
    metadata: Option<serde_json::Value>,
}

impl ArraySeries {
    pub fn new(path: impl AsRef<Path>, order: &str, data: ArrayD<f32>) -> Result<Self> {
        let dims = Dimensions::new(order, data.shape())?;
        Ok(Self {
            path: SeriesPath::new(path),
            dims,
            data,
            metadata: None,
        })
    }

    /// Build from any primitive sample type (u8, u16, i32, f64, ...).
    pub fn from_samples<T: ToPrimitive + Copy>(
        path: impl AsRef<Path>,
        order: &str,
        data: &ArrayD<T>,
    ) -> Result<Self> {
        let converted = data.mapv(|v| v.to_f32().unwrap_or(f32::NAN));
        Self::new(path, order, converted)
    }

    pub fn with_metadata(mut self, tree: serde_json::Value) -> Self {
        self.metadata = Some(tree);
        self
    }
}

impl SeriesSource for ArraySeries {
    fn path(&self) -> &SeriesPath {
        &self.path
    }

    fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    fn read_plane(&self, t: usize, c: usize, z: usize) -> Result<Array2<f32>> {
        let mut picks: Vec<(usize, usize)> = Vec::with_capacity(3);
        for (axis, index) in [('T', t), ('C', c), ('Z', z)] {
            let (pos, size) = match self.dims.position(axis) {
                Some(p) => (Some(p), self.dims.shape()[p]),
                None => (None, 1),
            };
            if index >= size {
                return Err(QcError::PlaneOutOfRange {
                    t,
                    c,
                    z,
                    extents: [
                        self.dims.size('T').unwrap_or(1),
                        self.dims.size('C').unwrap_or(1),
                        self.dims.size('Z').unwrap_or(1),
                    ],
                });
            }
            if let Some(p) = pos {
                picks.push((p, index));
            }
        }

        // Highest axis first so the remaining positions stay valid.
        picks.sort_by(|a, b| b.0.cmp(&a.0));
        let mut view = self.data.view();
        for (pos, index) in picks {
            view = view.index_axis_move(Axis(pos), index);
        }
        let plane = view
            .into_dimensionality::<Ix2>()
            .map_err(|e| QcError::DimensionMapping(e.to_string()))?;
        Ok(plane.to_owned())
    }

    fn metadata_tree(&self) -> Option<serde_json::Value> {
        self.metadata.clone()
    }
}
