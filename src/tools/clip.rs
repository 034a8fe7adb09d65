use log::debug;

use crate::{
    components::{bounds::PixelWindow, grid::RasterGrid, rasterize, DataType},
    crs_geo::CrsPolygons,
    errors::Result,
    tools::crop::CopyMode,
};

/// Options of [RasterGrid::clip].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Keep every pixel the geometries touch, not only those whose center they contain.
    pub all_touched: bool,
    /// Keep pixels inside the geometries. When unset, pixels outside are kept.
    pub invert: bool,
    /// Crop to the geometries' extent before masking.
    pub crop: bool,
    /// Storage of the cropped bands.
    pub copy: CopyMode,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            all_touched: true,
            invert: true,
            crop: true,
            copy: CopyMode::default(),
        }
    }
}

impl<T: DataType> RasterGrid<T> {
    /// Masks every band with the rasterized geometries.
    ///
    /// Bands are multiplied by the 0/1 mask, so excluded pixels become zero,
    /// not nodata. On error the grid is left untouched.
    pub fn clip(&mut self, geometries: &CrsPolygons, config: ClipConfig) -> Result<&mut Self> {
        geometries.check_crs(self.crs())?;
        let window = if config.crop {
            self.extent_window(geometries)?
        } else {
            let (height, width) = self.shape();
            PixelWindow::full(height, width)
        };
        let (height, width) = self.shape();
        window.check_within(height, width)?;
        let mask = rasterize::mask(
            geometries.geometry(),
            (window.height(), window.width()),
            &self.window_transform(&window),
            config.all_touched,
            config.invert,
        )?;
        debug!(
            "clipping {} of {} pixels",
            mask.iter().filter(|keep| !**keep).count(),
            mask.len()
        );

        if config.crop {
            self.crop_by_pixel(window, config.copy)?;
        }
        let (_, bands, _) = self.parts_mut();
        for array in bands.values_mut() {
            array.zip_mut_with(&mask, |value, keep| {
                *value = *value * if *keep { T::one() } else { T::zero() }
            });
        }
        Ok(self)
    }
}
