pub mod components;
mod crs_geo;
mod errors;
mod intersection;
pub mod tools;

pub use components::{
    Bands, DataType, GeoBounds, GridArena, GridId, GridMetadata, GridTransform, PixelOffset,
    PixelWindow, Profile, RasterGrid,
};
pub use crs_geo::{CrsGeometry, CrsPolygons};
pub use errors::{RasterError, Result};
pub use intersection::Intersection;
pub use tools::{
    clip::ClipConfig,
    combine::{combine, DuplicatePolicy},
    crop::CopyMode,
    mosaic::{direct_merge, merge, merge_with_pixel_size, offset_overwrite},
    resample::{AffineKernel, ResampleKernel, ResampleMethod},
};
