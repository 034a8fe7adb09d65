use crate::{
    components::{dtype::cast_or, grid::RasterGrid, profile::Profile, DataType},
    errors::{RasterError, Result},
};

impl<T: DataType> RasterGrid<T> {
    /// Linearly maps every band from the `from` value range onto `to`, as `U`.
    ///
    /// Values outside `from` are clamped to the ends of `to`. Nodata is mapped
    /// like any other value, children are dropped.
    pub fn normalize<U: DataType>(&self, from: (f64, f64), to: (f64, f64)) -> Result<RasterGrid<U>> {
        if from.0 == from.1 || !(from.0.is_finite() && from.1.is_finite()) {
            return Err(RasterError::InvalidRange(from));
        }
        let (low, high) = if to.0 <= to.1 { to } else { (to.1, to.0) };
        let map = |value: T| -> U {
            let value: f64 = value.as_();
            let ratio = ((value - from.0) / (from.1 - from.0)).clamp(0., 1.);
            let mapped = to.0 + ratio * (to.1 - to.0);
            cast_or(mapped.clamp(low, high), U::zero())
        };

        let profile = self.profile();
        let bands = self
            .bands()
            .iter()
            .map(|(key, array)| (key.clone(), array.mapv(map)))
            .collect();
        let profile = Profile {
            crs: profile.crs.clone(),
            transform: profile.transform,
            width: profile.width,
            height: profile.height,
            nodata: profile.nodata.map(map),
            pixel_size: profile.pixel_size,
            count: 0,
        };
        Ok(RasterGrid::init(profile, bands, self.metadata().clone(), vec![]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::grid::tests::grid;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0.)]
    #[case(5_000, 0.5)]
    #[case(10_000, 1.)]
    #[case(12_000, 1.)]
    fn reflectance_to_unit(#[case] value: u16, #[case] expected: f32) {
        let normalized: RasterGrid<f32> = grid((0., 0.), (2, 2), Some(0), &[("B04", value)])
            .normalize((0., 10_000.), (0., 1.))
            .unwrap();
        assert_eq!(normalized.band("B04").unwrap()[[1, 1]], expected);
        assert_eq!(normalized.nodata(), Some(0.));
    }

    #[rstest]
    fn reversed_target_range() {
        let normalized: RasterGrid<u8> = grid((0., 0.), (1, 1), None, &[("a", 0.25f64)])
            .normalize((0., 1.), (255., 0.))
            .unwrap();
        assert_eq!(normalized.band("a").unwrap()[[0, 0]], 191);
    }

    #[rstest]
    fn degenerate_source_range() {
        let grid = grid((0., 0.), (1, 1), None, &[("a", 1f32)]);
        let result = grid.normalize::<f32>((3., 3.), (0., 1.));
        assert!(matches!(result, Err(RasterError::InvalidRange(_))));
        assert_eq!(grid.band("a").unwrap()[[0, 0]], 1.);
    }
}
