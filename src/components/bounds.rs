use geo::{Coord, Rect};
use shrinkwraprs::Shrinkwrap;
use std::ops::Range;

use crate::{
    errors::{RasterError, Result},
    intersection::Intersection,
};

/// Axis aligned world rectangle, in the crs of the raster it came from.
#[derive(Shrinkwrap, Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds(Rect);

impl From<Rect> for GeoBounds {
    fn from(value: Rect) -> Self {
        Self(value)
    }
}

impl Intersection for GeoBounds {
    type Output = GeoBounds;
    fn intersection(&self, rhs: &Self) -> Result<Self::Output> {
        Ok(GeoBounds(self.0.intersection(&rhs.0)?))
    }
}

impl GeoBounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self(Rect::new((min_x, min_y), (max_x, max_y)))
    }

    /// Smallest bounds containing every coordinate.
    pub fn from_coords(coords: impl IntoIterator<Item = Coord>) -> Self {
        let mut coords = coords.into_iter();
        let first = coords.next().unwrap_or_default();
        let (min, max) = coords.fold((first, first), |(min, max), coord| {
            (
                Coord {
                    x: min.x.min(coord.x),
                    y: min.y.min(coord.y),
                },
                Coord {
                    x: max.x.max(coord.x),
                    y: max.y.max(coord.y),
                },
            )
        });
        Self(Rect::new(min, max))
    }

    /// `(min_x, min_y, max_x, max_y)` a.k.a. (west, south, east, north).
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        let (min, max) = (self.0.min(), self.0.max());
        (min.x, min.y, max.x, max.y)
    }

    pub fn union(&self, rhs: &Self) -> Self {
        Self::from_coords([self.0.min(), self.0.max(), rhs.0.min(), rhs.0.max()])
    }

    /// Upper left corner of a north up raster covering the bounds.
    pub fn west_north(&self) -> Coord {
        Coord {
            x: self.0.min().x,
            y: self.0.max().y,
        }
    }

    /// Corners in (west, north), (east, north), (west, south), (east, south) order.
    pub fn corners(&self) -> [Coord; 4] {
        let (west, south, east, north) = self.to_tuple();
        [
            Coord { x: west, y: north },
            Coord { x: east, y: north },
            Coord { x: west, y: south },
            Coord { x: east, y: south },
        ]
    }
}

/// Half open pixel window `[rows.start, rows.end) × [cols.start, cols.end)`,
/// with origin at the top left pixel of the raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelWindow {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl PixelWindow {
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            rows: row_start..row_end,
            cols: col_start..col_end,
        }
    }

    /// Window covering a whole `(height, width)` raster.
    pub fn full(height: usize, width: usize) -> Self {
        Self::new(0, height, 0, width)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.cols.len()
    }

    /// Fails unless the window is non empty and inside a `(height, width)` raster.
    pub fn check_within(&self, height: usize, width: usize) -> Result<()> {
        let rows_ok = self.rows.start < self.rows.end && self.rows.end <= height;
        let cols_ok = self.cols.start < self.cols.end && self.cols.end <= width;
        if rows_ok && cols_ok {
            Ok(())
        } else {
            Err(RasterError::OutOfBounds {
                rows: (self.rows.start, self.rows.end),
                cols: (self.cols.start, self.cols.end),
                shape: (height, width),
            })
        }
    }

    /// Window of `inner`, relative to this window, in this window's raster.
    pub fn nest(&self, inner: &PixelWindow) -> Self {
        Self::new(
            self.rows.start + inner.rows.start,
            self.rows.start + inner.rows.end,
            self.cols.start + inner.cols.start,
            self.cols.start + inner.cols.end,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn union_takes_outer_edges() {
        let lhs = GeoBounds::new(0., -4., 4., 0.);
        let rhs = GeoBounds::new(2., -6., 6., -2.);
        assert_eq!(lhs.union(&rhs).to_tuple(), (0., -6., 6., 0.));
        assert_eq!(lhs.union(&rhs).west_north(), Coord { x: 0., y: 0. });
    }

    #[rstest]
    fn intersection_of_bounds() {
        let lhs = GeoBounds::new(0., -4., 4., 0.);
        let rhs = GeoBounds::new(2., -6., 6., -2.);
        assert_eq!(lhs.intersection(&rhs).unwrap().to_tuple(), (2., -4., 4., -2.));
    }

    #[rstest]
    #[case(PixelWindow::new(0, 10, 0, 5), true)]
    #[case(PixelWindow::new(3, 3, 0, 5), false)]
    #[case(PixelWindow::new(0, 11, 0, 5), false)]
    #[case(PixelWindow::new(0, 10, 4, 6), false)]
    #[case(PixelWindow::new(9, 10, 4, 5), true)]
    fn window_checks(#[case] window: PixelWindow, #[case] ok: bool) {
        assert_eq!(window.check_within(10, 5).is_ok(), ok)
    }

    #[rstest]
    fn nested_windows_compose() {
        let outer = PixelWindow::new(2, 8, 2, 8);
        assert_eq!(outer.nest(&PixelWindow::new(1, 4, 1, 4)), PixelWindow::new(3, 6, 3, 6));
    }
}
