use std::sync::Arc;

use crate::components::{bounds::GeoBounds, transforms::GridTransform, DataType};

/// Georeferencing and layout shared by every band of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile<T: DataType> {
    pub crs: Arc<str>,
    pub transform: GridTransform,
    pub width: usize,
    pub height: usize,
    pub nodata: Option<T>,
    /// Pixel size magnitudes, (x, y).
    pub pixel_size: (f64, f64),
    /// Number of bands.
    pub count: usize,
}

impl<T: DataType> Profile<T> {
    /// Profile of a grid laid out by `transform`, pixel size is taken from it.
    pub fn new(
        crs: impl Into<Arc<str>>,
        transform: GridTransform,
        shape: (usize, usize),
        nodata: Option<T>,
    ) -> Self {
        let [a, b, _, d, e, _] = transform.coefficients();
        Self {
            crs: crs.into(),
            transform,
            height: shape.0,
            width: shape.1,
            nodata,
            pixel_size: (a.hypot(d), b.hypot(e)),
            count: 0,
        }
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn bounds(&self) -> GeoBounds {
        self.transform.array_bounds(self.height, self.width)
    }

    pub fn is_square(&self) -> bool {
        self.pixel_size.0 == self.pixel_size.1
    }
}
