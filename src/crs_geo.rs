use std::sync::Arc;

use geo::{BoundingRect, MultiPolygon, Polygon};
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::bounds::GeoBounds,
    errors::{RasterError, Result},
};

/// Geometry tagged with the crs its coordinates are expressed in.
#[derive(Shrinkwrap, Debug, Clone, PartialEq)]
pub struct CrsGeometry<G> {
    crs: Arc<str>,
    #[shrinkwrap(main_field)]
    geometry: G,
}

impl<G> CrsGeometry<G> {
    pub fn new(crs: impl Into<Arc<str>>, geometry: G) -> Self {
        Self {
            crs: crs.into(),
            geometry,
        }
    }

    pub fn crs(&self) -> &str {
        self.crs.as_ref()
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Fails unless the geometry is in `crs`. Geometries are never reprojected.
    pub fn check_crs(&self, crs: &str) -> Result<()> {
        if self.crs().eq(crs) {
            Ok(())
        } else {
            Err(RasterError::CrsMismatch {
                expected: crs.to_string(),
                found: self.crs().to_string(),
            })
        }
    }
}

impl<G: BoundingRect<f64>> CrsGeometry<G>
where
    G::Output: Into<Option<geo::Rect>>,
{
    /// Bounding box of all geometries, errors if there are no coordinates.
    pub fn bounding_box(&self) -> Result<GeoBounds> {
        self.geometry
            .bounding_rect()
            .into()
            .map(GeoBounds::from)
            .ok_or(RasterError::EmptyGeometry)
    }

    /// `(minx, miny, maxx, maxy)`
    pub fn bounds(&self) -> Result<(f64, f64, f64, f64)> {
        Ok(self.bounding_box()?.to_tuple())
    }
}

/// Polygons sharing a crs, as consumed by clipping and cropping.
pub type CrsPolygons = CrsGeometry<MultiPolygon>;

impl CrsPolygons {
    pub fn from_polygons(crs: impl Into<Arc<str>>, polygons: impl IntoIterator<Item = Polygon>) -> Self {
        Self::new(crs, MultiPolygon::new(polygons.into_iter().collect()))
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.geometry.iter()
    }
}
