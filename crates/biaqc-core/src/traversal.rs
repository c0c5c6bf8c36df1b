use crate::error::Result;
use crate::series::{SeriesSource, Slice, SliceCoord};

/// Lazy walk over every (T, C, Z) plane of a series.
///
/// T is the outermost loop and Z the innermost. Planes are read only when
/// the iterator is advanced. Clone the iterator (or call [`slices`] again)
/// to restart.
#[derive(Debug)]
pub struct SliceIter<'a, S: ?Sized> {
    source: &'a S,
    extents: [usize; 3],
    next: usize,
}

impl<S: ?Sized> Clone for SliceIter<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            extents: self.extents,
            next: self.next,
        }
    }
}

/// Start a traversal. Fails when the series lacks a T, C or Z axis.
pub fn slices<S: SeriesSource + ?Sized>(source: &S) -> Result<SliceIter<'_, S>> {
    let extents = source.dimensions().tcz()?;
    Ok(SliceIter {
        source,
        extents,
        next: 0,
    })
}

impl<S: ?Sized> SliceIter<'_, S> {
    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    fn total(&self) -> usize {
        self.extents.iter().product()
    }

    fn coord_at(&self, flat: usize) -> SliceCoord {
        let [_, c_size, z_size] = self.extents;
        SliceCoord {
            t: flat / (c_size * z_size),
            c: (flat / z_size) % c_size,
            z: flat % z_size,
        }
    }
}

impl<S: SeriesSource + ?Sized> Iterator for SliceIter<'_, S> {
    type Item = Result<Slice>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }
        let coord = self.coord_at(self.next);
        self.next += 1;
        Some(
            self.source
                .read_plane(coord.t, coord.c, coord.z)
                .map(|data| Slice { coord, data }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<S: SeriesSource + ?Sized> ExactSizeIterator for SliceIter<'_, S> {}
