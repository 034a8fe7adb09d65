use log::debug;
use ndarray::s;

use crate::{
    components::{
        bounds::PixelWindow,
        grid::RasterGrid,
        transforms::{snap, GridTransform, PixelOffset},
        DataType,
    },
    crs_geo::CrsPolygons,
    errors::Result,
    intersection::Intersection,
};

/// Storage of cropped bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    /// Narrow the existing allocation, nothing is copied.
    #[default]
    InPlace,
    /// Copy the window into a new, tightly packed buffer.
    Compact,
}

impl<T: DataType> RasterGrid<T> {
    /// Transform mapping pixel `(0, 0)` to the upper left corner of the
    /// window's first pixel, pixel size is unchanged.
    pub fn window_transform(&self, window: &PixelWindow) -> GridTransform {
        let origin = self.transform().xy(
            window.cols.start as f64,
            window.rows.start as f64,
            PixelOffset::UpperLeft,
        );
        self.transform().with_origin(origin)
    }

    /// Restricts the grid to a half open pixel window.
    ///
    /// The grid is left untouched when the window does not fit.
    pub fn crop_by_pixel(&mut self, window: PixelWindow, mode: CopyMode) -> Result<&mut Self> {
        let (height, width) = self.shape();
        window.check_within(height, width)?;
        debug!("cropping {:?} to {window:?}", self.shape());

        let transform = self.window_transform(&window);
        let (profile, bands, _) = self.parts_mut();
        for array in bands.values_mut() {
            array.slice_collapse(s![window.rows.clone(), window.cols.clone()]);
            if mode == CopyMode::Compact {
                *array = array.to_owned();
            }
        }
        profile.transform = transform;
        profile.height = window.height();
        profile.width = window.width();
        Ok(self)
    }

    /// Smallest pixel window covering the intersection of the geometries'
    /// bounding box with the grid.
    ///
    /// Partly covered pixels on every edge are included.
    pub fn extent_window(&self, geometries: &CrsPolygons) -> Result<PixelWindow> {
        geometries.check_crs(self.crs())?;
        let extent = geometries.bounding_box()?.intersection(&self.bounds())?;

        let (mut rows, mut cols) = ((f64::MAX, f64::MIN), (f64::MAX, f64::MIN));
        for corner in extent.corners() {
            let pixel = self.transform().pixel(corner)?;
            let (row, col) = (snap(pixel.y), snap(pixel.x));
            rows = (rows.0.min(row), rows.1.max(row));
            cols = (cols.0.min(col), cols.1.max(col));
        }
        let (height, width) = self.shape();
        let clamp = |value: f64, max: usize| value.clamp(0., max as f64) as usize;
        Ok(PixelWindow::new(
            clamp(rows.0.floor(), height),
            clamp(rows.1.ceil(), height),
            clamp(cols.0.floor(), width),
            clamp(cols.1.ceil(), width),
        ))
    }

    /// Crops the grid to the extent of `geometries`, see [RasterGrid::crop_by_pixel].
    pub fn crop_by_extent(&mut self, geometries: &CrsPolygons, mode: CopyMode) -> Result<&mut Self> {
        let window = self.extent_window(geometries)?;
        self.crop_by_pixel(window, mode)
    }
}
