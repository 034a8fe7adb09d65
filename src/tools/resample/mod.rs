pub mod kernel;

use log::info;
use num::traits::AsPrimitive;

pub use kernel::{AffineKernel, ResampleKernel, ResampleMethod};

use crate::{
    components::{
        grid::{Bands, RasterGrid},
        profile::Profile,
        DataType,
    },
    errors::{RasterError, Result},
};

impl<T: DataType> RasterGrid<T> {
    /// [RasterGrid::resample_with] the built in [AffineKernel].
    pub fn resample<U>(
        &self,
        target_resolution: f64,
        method: ResampleMethod,
        nodata: Option<U>,
    ) -> Result<RasterGrid<U>>
    where
        U: DataType,
        T: AsPrimitive<U>,
    {
        self.resample_with(target_resolution, method, nodata, &AffineKernel)
    }

    /// Rescales a square pixel grid to `target_resolution`, casting bands to `U`.
    ///
    /// Only the diagonal terms of the transform are scaled. `nodata` replaces
    /// the grid nodata in the output, missing source nodata reads as zero.
    /// Children are resampled the same way, the grid itself is not consumed.
    pub fn resample_with<U, K>(
        &self,
        target_resolution: f64,
        method: ResampleMethod,
        nodata: Option<U>,
        kernel: &K,
    ) -> Result<RasterGrid<U>>
    where
        U: DataType,
        T: AsPrimitive<U>,
        K: ResampleKernel<U>,
    {
        if !self.profile().is_square() {
            return Err(RasterError::NonSquareResolution(self.profile().pixel_size));
        }
        if !(target_resolution.is_finite() && target_resolution > 0.) {
            return Err(RasterError::InvalidResolution(target_resolution));
        }

        let profile = self.profile();
        let scale = profile.pixel_size.0 / target_resolution;
        let transform = profile.transform.scaled(scale);
        let scaled = |len: usize| ((len as f64 * scale).round() as usize).max(1);
        let (height, width) = (scaled(profile.height), scaled(profile.width));

        let cast = <T as AsPrimitive<U>>::as_;
        let src_nodata = profile.nodata.map(cast).unwrap_or_else(U::zero);
        let dst_nodata = nodata.unwrap_or(src_nodata);
        info!(
            "resampling {:?} to {:?} ({scale}x, {method:?})",
            profile.shape(),
            (height, width)
        );

        let bands: Bands<U> = self
            .bands()
            .iter()
            .map(|(key, array)| {
                let converted = array.mapv(cast);
                kernel
                    .reproject(
                        converted.view(),
                        &profile.transform,
                        (height, width),
                        &transform,
                        profile.crs.as_ref(),
                        profile.crs.as_ref(),
                        src_nodata,
                        dst_nodata,
                        method,
                    )
                    .map(|resampled| (key.clone(), resampled))
            })
            .collect::<Result<_>>()?;

        let children = self
            .children()
            .iter()
            .map(|child| child.resample_with(target_resolution, method, nodata, kernel))
            .collect::<Result<Vec<_>>>()?;

        let resolution = (target_resolution, target_resolution);
        let mut metadata = self.metadata().clone();
        metadata.resolution = resolution;
        let profile = Profile {
            crs: profile.crs.clone(),
            transform,
            width,
            height,
            nodata: nodata.or(profile.nodata.map(cast)),
            pixel_size: resolution,
            count: 0,
        };
        Ok(RasterGrid::init(profile, bands, metadata, children))
    }
}
