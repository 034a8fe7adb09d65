use geo::{AffineTransform, Coord};
use ndarray::{Array2, ArrayView2, Zip};

use crate::{
    components::{
        dtype::cast_or,
        transforms::{GridTransform, PixelOffset},
        DataType,
    },
    errors::{RasterError, Result},
};

/// How source pixels are combined into a destination pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleMethod {
    /// Value of the source pixel containing the destination pixel center.
    #[default]
    Nearest,
    /// Distance weighted 2x2 neighbourhood.
    Bilinear,
    /// Catmull-Rom 4x4 neighbourhood.
    Cubic,
    /// Mean of the valid source pixels whose centers fall in the destination pixel.
    Average,
}

/// Regrids one band from a source to a destination pixel grid.
pub trait ResampleKernel<T: DataType>: Sync {
    #[allow(clippy::too_many_arguments)]
    fn reproject(
        &self,
        src: ArrayView2<T>,
        src_transform: &GridTransform,
        dst_shape: (usize, usize),
        dst_transform: &GridTransform,
        src_crs: &str,
        dst_crs: &str,
        src_nodata: T,
        dst_nodata: T,
        method: ResampleMethod,
    ) -> Result<Array2<T>>;
}

/// Kernel for grids that share a crs, mapping pixels through both transforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct AffineKernel;

impl<T: DataType> ResampleKernel<T> for AffineKernel {
    fn reproject(
        &self,
        src: ArrayView2<T>,
        src_transform: &GridTransform,
        dst_shape: (usize, usize),
        dst_transform: &GridTransform,
        src_crs: &str,
        dst_crs: &str,
        src_nodata: T,
        dst_nodata: T,
        method: ResampleMethod,
    ) -> Result<Array2<T>> {
        if src_crs != dst_crs {
            return Err(RasterError::CrsMismatch {
                expected: src_crs.to_string(),
                found: dst_crs.to_string(),
            });
        }
        let sampler = Sampler {
            src: src.view(),
            to_src: src_transform.inverse()?,
            dst_transform,
            src_nodata,
            dst_nodata,
        };
        let mut dst = Array2::from_elem(dst_shape, dst_nodata);
        Zip::indexed(&mut dst).par_for_each(|(row, col), value| {
            let (row, col) = (row as f64, col as f64);
            *value = match method {
                ResampleMethod::Nearest => sampler.nearest(sampler.center(row, col)),
                ResampleMethod::Bilinear => sampler.bilinear(sampler.center(row, col)),
                ResampleMethod::Cubic => sampler.cubic(sampler.center(row, col)),
                ResampleMethod::Average => sampler.average(row, col),
            }
        });
        Ok(dst)
    }
}

struct Sampler<'a, T> {
    src: ArrayView2<'a, T>,
    to_src: AffineTransform,
    dst_transform: &'a GridTransform,
    src_nodata: T,
    dst_nodata: T,
}

impl<T: DataType> Sampler<'_, T> {
    /// Source pixel coordinates of a destination pixel center.
    fn center(&self, row: f64, col: f64) -> Coord {
        let world = self.dst_transform.xy(col, row, PixelOffset::Center);
        self.to_src.apply(world)
    }

    fn get(&self, row: isize, col: isize) -> Option<T> {
        let (height, width) = self.src.dim();
        if row < 0 || col < 0 || row as usize >= height || col as usize >= width {
            return None;
        }
        Some(self.src[[row as usize, col as usize]])
    }

    /// Value at clamped indices, `None` for nodata.
    fn valid_clamped(&self, row: isize, col: isize) -> Option<f64> {
        let (height, width) = self.src.dim();
        let row = row.clamp(0, height as isize - 1);
        let col = col.clamp(0, width as isize - 1);
        self.get(row, col)
            .filter(|value| !value.is_nodata(self.src_nodata))
            .map(|value| value.as_())
    }

    fn inside(&self, position: Coord) -> bool {
        let (height, width) = self.src.dim();
        position.x >= 0. && position.y >= 0. && position.x < width as f64 && position.y < height as f64
    }

    fn nearest(&self, position: Coord) -> T {
        match self.get(position.y.floor() as isize, position.x.floor() as isize) {
            Some(value) if !value.is_nodata(self.src_nodata) => value,
            _ => self.dst_nodata,
        }
    }

    fn bilinear(&self, position: Coord) -> T {
        if !self.inside(position) {
            return self.dst_nodata;
        }
        let (x, y) = (position.x - 0.5, position.y - 0.5);
        let (x0, y0) = (x.floor(), y.floor());
        let (xf, yf) = (x - x0, y - y0);
        let (x0, y0) = (x0 as isize, y0 as isize);
        let corners = [
            self.valid_clamped(y0, x0),
            self.valid_clamped(y0, x0 + 1),
            self.valid_clamped(y0 + 1, x0),
            self.valid_clamped(y0 + 1, x0 + 1),
        ];
        match corners {
            [Some(v00), Some(v01), Some(v10), Some(v11)] => {
                let top = v00 * (1. - xf) + v01 * xf;
                let bottom = v10 * (1. - xf) + v11 * xf;
                cast_or(top * (1. - yf) + bottom * yf, self.dst_nodata)
            }
            _ => self.dst_nodata,
        }
    }

    fn cubic(&self, position: Coord) -> T {
        if !self.inside(position) {
            return self.dst_nodata;
        }
        let (x, y) = (position.x - 0.5, position.y - 0.5);
        let (x0, y0) = (x.floor(), y.floor());
        let (xf, yf) = (x - x0, y - y0);
        let (x0, y0) = (x0 as isize, y0 as isize);

        let mut rows = [0.; 4];
        for (j, row) in rows.iter_mut().enumerate() {
            let mut values = [0.; 4];
            for (i, value) in values.iter_mut().enumerate() {
                match self.valid_clamped(y0 + j as isize - 1, x0 + i as isize - 1) {
                    Some(valid) => *value = valid,
                    None => return self.bilinear(position),
                }
            }
            *row = catmull_rom(values, xf);
        }
        cast_or(catmull_rom(rows, yf), self.dst_nodata)
    }

    fn average(&self, row: f64, col: f64) -> T {
        let corners = [(0., 0.), (1., 0.), (0., 1.), (1., 1.)].map(|(dc, dr)| {
            self.to_src
                .apply(self.dst_transform.xy(col + dc, row + dr, PixelOffset::UpperLeft))
        });
        let xs = corners.map(|corner| corner.x);
        let ys = corners.map(|corner| corner.y);
        let min = |values: [f64; 4]| values.into_iter().fold(f64::MAX, f64::min);
        let max = |values: [f64; 4]| values.into_iter().fold(f64::MIN, f64::max);

        // first source pixel whose center is at or past `edge`
        let (height, width) = self.src.dim();
        let center_index = |edge: f64, len: usize| ((edge - 0.5).ceil().max(0.) as usize).min(len);
        let (mut sum, mut count) = (0., 0usize);
        for src_row in center_index(min(ys), height)..center_index(max(ys), height) {
            for src_col in center_index(min(xs), width)..center_index(max(xs), width) {
                let value = self.src[[src_row, src_col]];
                if !value.is_nodata(self.src_nodata) {
                    sum += value.as_();
                    count += 1;
                }
            }
        }
        if count == 0 {
            self.nearest(self.center(row, col))
        } else {
            cast_or(sum / count as f64, self.dst_nodata)
        }
    }
}

fn catmull_rom(p: [f64; 4], t: f64) -> f64 {
    let a = -0.5 * p[0] + 1.5 * p[1] - 1.5 * p[2] + 0.5 * p[3];
    let b = p[0] - 2.5 * p[1] + 2. * p[2] - 0.5 * p[3];
    let c = -0.5 * p[0] + 0.5 * p[2];
    a * t * t * t + b * t * t + c * t + p[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::{fixture, rstest};

    const CRS: &str = "EPSG:32633";

    #[fixture]
    fn src() -> Array2<f32> {
        array![[1., 2., 3., 4.], [5., 6., 7., 8.], [9., 10., 11., 12.], [13., 14., 15., 16.]]
    }

    fn run(src: &Array2<f32>, dst_shape: (usize, usize), pixel: f64, method: ResampleMethod) -> Array2<f32> {
        let src_transform = GridTransform::from_origin(0., 0., 1., 1.);
        let dst_transform = GridTransform::from_origin(0., 0., pixel, pixel);
        AffineKernel
            .reproject(src.view(), &src_transform, dst_shape, &dst_transform, CRS, CRS, -1., -9., method)
            .unwrap()
    }

    #[rstest]
    #[case(ResampleMethod::Nearest)]
    #[case(ResampleMethod::Bilinear)]
    #[case(ResampleMethod::Cubic)]
    #[case(ResampleMethod::Average)]
    fn same_grid_is_identity(src: Array2<f32>, #[case] method: ResampleMethod) {
        assert_eq!(run(&src, (4, 4), 1., method), src);
    }

    #[rstest]
    fn nearest_upsamples_by_repetition(src: Array2<f32>) {
        let dst = run(&src, (8, 8), 0.5, ResampleMethod::Nearest);
        assert_eq!(dst[[0, 0]], 1.);
        assert_eq!(dst[[1, 1]], 1.);
        assert_eq!(dst[[2, 3]], 6.);
        assert_eq!(dst[[7, 7]], 16.);
    }

    #[rstest]
    fn average_downsamples_blocks(src: Array2<f32>) {
        let dst = run(&src, (2, 2), 2., ResampleMethod::Average);
        assert_eq!(dst, array![[3.5, 5.5], [11.5, 13.5]]);
    }

    #[rstest]
    fn bilinear_interpolates_between_centers(src: Array2<f32>) {
        let dst = run(&src, (2, 2), 2., ResampleMethod::Bilinear);
        assert!((dst[[0, 0]] - 3.5).abs() < 1e-6);
    }

    #[rstest]
    fn nodata_is_propagated(mut src: Array2<f32>) {
        src[[0, 0]] = -1.;
        let nearest = run(&src, (4, 4), 1., ResampleMethod::Nearest);
        assert_eq!(nearest[[0, 0]], -9.);
        let bilinear = run(&src, (2, 2), 2., ResampleMethod::Bilinear);
        assert_eq!(bilinear[[0, 0]], -9.);
        let average = run(&src, (2, 2), 2., ResampleMethod::Average);
        assert!((average[[0, 0]] - 13. / 3.).abs() < 1e-6);
    }

    #[rstest]
    fn outside_source_is_nodata(src: Array2<f32>) {
        let dst = run(&src, (6, 6), 1., ResampleMethod::Nearest);
        assert_eq!(dst[[5, 5]], -9.);
        assert_eq!(dst[[3, 3]], 16.);
    }

    #[rstest]
    fn crs_change_is_refused(src: Array2<f32>) {
        let transform = GridTransform::from_origin(0., 0., 1., 1.);
        let result = AffineKernel.reproject(
            src.view(),
            &transform,
            (4, 4),
            &transform,
            CRS,
            "EPSG:4326",
            -1.,
            -1.,
            ResampleMethod::Nearest,
        );
        assert!(matches!(result, Err(RasterError::CrsMismatch { .. })));
    }
}
