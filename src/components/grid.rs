use log::info;
use ndarray::Array2;
use std::{collections::BTreeMap, fmt::Debug};

use crate::{
    components::{
        bounds::GeoBounds, metadata::GridMetadata, profile::Profile, transforms::GridTransform,
        DataType,
    },
    errors::{RasterError, Result},
};

/// Band key to `(height, width)` array.
pub type Bands<T> = BTreeMap<String, Array2<T>>;

/// Multi band raster anchored to a crs by an affine transform.
///
/// Every band has the shape `(profile.height, profile.width)` and shares
/// `profile.nodata`.
#[derive(Clone, PartialEq)]
pub struct RasterGrid<T: DataType> {
    profile: Profile<T>,
    bands: Bands<T>,
    metadata: GridMetadata,
    children: Vec<RasterGrid<T>>,
}

impl<T: DataType> Debug for RasterGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let f = &mut f.debug_struct("RasterGrid");
        let bands: Vec<&String> = self.bands.keys().collect();
        f.field("crs", &self.profile.crs)
            .field("geo_bounds", &self.bounds().to_tuple())
            .field("shape", &self.shape())
            .field("nodata", &self.profile.nodata)
            .field("bands", &bands)
            .field("children", &self.children.len())
            .finish()
    }
}

impl<T: DataType> RasterGrid<T> {
    pub(crate) fn init(
        mut profile: Profile<T>,
        bands: Bands<T>,
        metadata: GridMetadata,
        children: Vec<RasterGrid<T>>,
    ) -> Self {
        profile.count = bands.len();
        Self {
            profile,
            bands,
            metadata,
            children,
        }
    }

    pub fn new(
        profile: Profile<T>,
        bands: Bands<T>,
        metadata: GridMetadata,
        children: Vec<RasterGrid<T>>,
    ) -> Result<Self> {
        let expected = profile.shape();
        for (band, array) in bands.iter() {
            let found = array.dim();
            if found != expected {
                return Err(RasterError::BandShapeMismatch {
                    band: band.clone(),
                    expected,
                    found,
                });
            }
        }
        let grid = Self::init(profile, bands, metadata, children);
        info!("new {grid:?}");
        Ok(grid)
    }

    pub fn profile(&self) -> &Profile<T> {
        &self.profile
    }

    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut GridMetadata {
        &mut self.metadata
    }

    pub fn bands(&self) -> &Bands<T> {
        &self.bands
    }

    pub fn band_keys(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    pub fn band(&self, key: &str) -> Result<&Array2<T>> {
        self.bands
            .get(key)
            .ok_or_else(|| RasterError::UnknownBand(key.to_string()))
    }

    /// Values may change freely, the shape is fixed by the profile.
    pub fn band_mut(&mut self, key: &str) -> Result<ndarray::ArrayViewMut2<'_, T>> {
        self.bands
            .get_mut(key)
            .map(|array| array.view_mut())
            .ok_or_else(|| RasterError::UnknownBand(key.to_string()))
    }

    pub fn children(&self) -> &[RasterGrid<T>] {
        &self.children
    }

    pub fn take_children(&mut self) -> Vec<RasterGrid<T>> {
        std::mem::take(&mut self.children)
    }

    pub fn crs(&self) -> &str {
        self.profile.crs.as_ref()
    }

    pub fn transform(&self) -> &GridTransform {
        &self.profile.transform
    }

    pub fn nodata(&self) -> Option<T> {
        self.profile.nodata
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        self.profile.shape()
    }

    pub fn bounds(&self) -> GeoBounds {
        self.profile.bounds()
    }

    pub fn into_parts(self) -> (Profile<T>, Bands<T>, GridMetadata, Vec<RasterGrid<T>>) {
        (self.profile, self.bands, self.metadata, self.children)
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Profile<T>, &mut Bands<T>, &mut GridMetadata) {
        (&mut self.profile, &mut self.bands, &mut self.metadata)
    }
}
