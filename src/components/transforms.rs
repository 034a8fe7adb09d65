use geo::{AffineTransform, Coord};
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::bounds::GeoBounds,
    errors::{RasterError, Result},
};

/// Distance below which a fractional pixel coordinate snaps to the integer.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Point within a pixel that a pixel coordinate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelOffset {
    #[default]
    UpperLeft,
    Center,
}

impl PixelOffset {
    fn shift(&self) -> f64 {
        match self {
            PixelOffset::UpperLeft => 0.,
            PixelOffset::Center => 0.5,
        }
    }
}

/// Pixel `(col, row)` to world `(x, y)` transform of a raster.
///
/// `x = a·col + b·row + c`, `y = d·col + e·row + f`
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct GridTransform(AffineTransform);

impl From<AffineTransform> for GridTransform {
    fn from(value: AffineTransform) -> Self {
        Self(value)
    }
}

impl GridTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self(AffineTransform::new(a, b, c, d, e, f))
    }

    /// North up transform with the upper left corner at `(west, north)`.
    ///
    /// Pixel sizes are given as positive magnitudes.
    pub fn from_origin(west: f64, north: f64, x_size: f64, y_size: f64) -> Self {
        Self::new(x_size, 0., west, 0., -y_size, north)
    }

    /// `[a, b, c, d, e, f]`
    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.0.a(),
            self.0.b(),
            self.0.xoff(),
            self.0.d(),
            self.0.e(),
            self.0.yoff(),
        ]
    }

    pub fn is_invertible(&self) -> bool {
        let [a, b, _, d, e, _] = self.coefficients();
        a * e - b * d != 0.
    }

    pub fn inverse(&self) -> Result<AffineTransform> {
        if !self.is_invertible() {
            return Err(RasterError::NonInvertibleTransform);
        }
        self.0.inverse().ok_or(RasterError::NonInvertibleTransform)
    }

    /// World coordinates of pixel `(col, row)`.
    pub fn xy(&self, col: f64, row: f64, offset: PixelOffset) -> Coord {
        let shift = offset.shift();
        self.0.apply(Coord {
            x: col + shift,
            y: row + shift,
        })
    }

    /// Fractional pixel `(col, row)` of a world coordinate.
    pub fn pixel(&self, coord: Coord) -> Result<Coord> {
        Ok(self.inverse()?.apply(coord))
    }

    /// Pixel `(row, col)` containing a world coordinate.
    ///
    /// Coordinates that land within [SNAP_TOLERANCE] of a pixel edge belong
    /// to the pixel starting at that edge.
    pub fn rowcol(&self, coord: Coord) -> Result<(isize, isize)> {
        let pixel = self.pixel(coord)?;
        Ok((snap_floor(pixel.y) as isize, snap_floor(pixel.x) as isize))
    }

    /// World bounds covered by an array of `(height, width)` pixels.
    pub fn array_bounds(&self, height: usize, width: usize) -> GeoBounds {
        let (height, width) = (height as f64, width as f64);
        let corners = [(0., 0.), (width, 0.), (0., height), (width, height)]
            .map(|(col, row)| self.xy(col, row, PixelOffset::UpperLeft));
        GeoBounds::from_coords(corners)
    }

    /// Same linear terms, translated so that `origin` maps to pixel `(0, 0)`.
    pub fn with_origin(&self, origin: Coord) -> Self {
        let [a, b, _, d, e, _] = self.coefficients();
        Self::new(a, b, origin.x, d, e, origin.y)
    }

    /// Divides the diagonal terms by `scale`; shear and offsets are kept.
    pub fn scaled(&self, scale: f64) -> Self {
        let [a, b, c, d, e, f] = self.coefficients();
        Self::new(a / scale, b, c, d, e / scale, f)
    }
}

/// `value` rounded to the nearest integer when within [SNAP_TOLERANCE] of it.
pub(crate) fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < SNAP_TOLERANCE {
        rounded
    } else {
        value
    }
}

fn snap_floor(value: f64) -> f64 {
    snap(value).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn north_up() -> GridTransform {
        GridTransform::from_origin(100., 200., 10., 10.)
    }

    #[rstest]
    fn upper_left_and_center(north_up: GridTransform) {
        assert_eq!(north_up.xy(0., 0., PixelOffset::UpperLeft), Coord { x: 100., y: 200. });
        assert_eq!(north_up.xy(2., 1., PixelOffset::Center), Coord { x: 125., y: 185. });
    }

    #[rstest]
    #[case(Coord { x: 100., y: 200. }, (0, 0))]
    #[case(Coord { x: 119.9, y: 180.1 }, (1, 1))]
    #[case(Coord { x: 130., y: 170. }, (3, 3))]
    #[case(Coord { x: 99., y: 201. }, (-1, -1))]
    fn rowcol_floors(north_up: GridTransform, #[case] coord: Coord, #[case] expected: (isize, isize)) {
        assert_eq!(north_up.rowcol(coord).unwrap(), expected)
    }

    #[rstest]
    fn rowcol_snaps_rounding_noise(north_up: GridTransform) {
        let coord = Coord { x: 100. + 0.1 * 3. * 100., y: 200. };
        assert_eq!(north_up.rowcol(coord).unwrap(), (0, 3))
    }

    #[rstest]
    fn singular_transform_is_rejected() {
        let transform = GridTransform::new(1., 2., 0., 2., 4., 0.);
        assert!(matches!(
            transform.rowcol(Coord { x: 0., y: 0. }),
            Err(RasterError::NonInvertibleTransform)
        ))
    }

    #[rstest]
    fn array_bounds_of_north_up(north_up: GridTransform) {
        let bounds = north_up.array_bounds(4, 3);
        assert_eq!(bounds.to_tuple(), (100., 160., 130., 200.))
    }

    #[rstest]
    fn scaling_keeps_shear_and_origin() {
        let transform = GridTransform::new(10., 0.5, 1., 0.25, -10., 2.).scaled(2.);
        assert_eq!(transform.coefficients(), [5., 0.5, 1., 0.25, -5., 2.])
    }
}
