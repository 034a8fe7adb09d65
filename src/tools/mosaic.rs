use itertools::Itertools;
use log::{debug, info};
use ndarray::{s, Array2, ArrayView2, CowArray, Ix2};
use rayon::prelude::*;
use std::{collections::BTreeSet, time::Instant};

use crate::{
    components::{
        grid::{Bands, RasterGrid},
        metadata::GridMetadata,
        profile::Profile,
        transforms::{GridTransform, PixelOffset},
        DataType,
    },
    errors::{RasterError, Result},
};

/// Copies `source` into `substrate` with its top left pixel at `offset` (row, col).
///
/// Fails without writing if any part of `source` would land outside `substrate`.
pub fn offset_overwrite<T: DataType>(
    source: ArrayView2<T>,
    offset: (isize, isize),
    substrate: &mut Array2<T>,
) -> Result<()> {
    let (height, width) = source.dim();
    let (substrate_height, substrate_width) = substrate.dim();
    let (row, col) = offset;
    let fits = row >= 0
        && col >= 0
        && row as usize + height <= substrate_height
        && col as usize + width <= substrate_width;
    if !fits {
        return Err(RasterError::AlignmentOverflow {
            offset,
            source_shape: (height, width),
            substrate_shape: (substrate_height, substrate_width),
        });
    }
    let (row, col) = (row as usize, col as usize);
    substrate
        .slice_mut(s![row..row + height, col..col + width])
        .assign(&source);
    Ok(())
}

/// Substrate pixel holding the center of the source's top left pixel.
fn substrate_offset(
    source_transform: &GridTransform,
    substrate_transform: &GridTransform,
) -> Result<(isize, isize)> {
    let center = source_transform.xy(0., 0., PixelOffset::Center);
    substrate_transform.rowcol(center)
}

/// Mosaics two arrays onto a nodata filled substrate covering both.
///
/// The substrate is north up with `pixel_size`, anchored at the union's
/// (west, north) corner. `second` is written last and wins where they overlap.
/// Both inputs are assumed to already have `pixel_size`.
pub fn direct_merge<T: DataType>(
    first: ArrayView2<T>,
    first_transform: &GridTransform,
    second: ArrayView2<T>,
    second_transform: &GridTransform,
    pixel_size: (f64, f64),
    nodata: T,
) -> Result<(Array2<T>, GridTransform)> {
    let first_bounds = first_transform.array_bounds(first.nrows(), first.ncols());
    let second_bounds = second_transform.array_bounds(second.nrows(), second.ncols());
    let bounds = first_bounds.union(&second_bounds);

    let origin = bounds.west_north();
    let transform = GridTransform::from_origin(origin.x, origin.y, pixel_size.0, pixel_size.1);
    let (west, south, east, north) = bounds.to_tuple();
    let shape = (
        ((north - south) / pixel_size.1).round() as usize,
        ((east - west) / pixel_size.0).round() as usize,
    );
    debug!("allocating substrate of shape {shape:?} over {:?}", bounds.to_tuple());

    let mut substrate = Array2::from_elem(shape, nodata);
    let sources = [
        (first.view(), first_transform),
        (second.view(), second_transform),
    ];
    for (source, source_transform) in sources {
        let offset = substrate_offset(source_transform, &transform)?;
        let start = Instant::now();
        offset_overwrite(source, offset, &mut substrate)?;
        debug!("overwrote substrate at {offset:?} in {:?}", start.elapsed());
    }
    Ok((substrate, transform))
}

fn check_schema<T: DataType>(first: &RasterGrid<T>, second: &RasterGrid<T>) -> Result<()> {
    if first.crs() != second.crs() {
        return Err(RasterError::SchemaMismatch(format!(
            "crs {} != {}",
            first.crs(),
            second.crs()
        )));
    }
    let first_keys: BTreeSet<&str> = first.band_keys().collect();
    let second_keys: BTreeSet<&str> = second.band_keys().collect();
    if first_keys != second_keys {
        return Err(RasterError::SchemaMismatch(format!(
            "bands [{}] != [{}]",
            first_keys.iter().join(", "),
            second_keys.iter().join(", ")
        )));
    }
    if first_keys.is_empty() {
        return Err(RasterError::SchemaMismatch("grids have no bands".to_string()));
    }
    Ok(())
}

/// [merge_with_pixel_size] at the first grid's pixel size.
pub fn merge<T: DataType>(
    first: &RasterGrid<T>,
    second: &RasterGrid<T>,
    reference: Option<&RasterGrid<T>>,
) -> Result<RasterGrid<T>> {
    merge_with_pixel_size(first, second, reference, first.profile().pixel_size)
}

/// Mosaics two grids with the same crs and bands into a new grid.
///
/// Nodata is the first grid's, or [DataType::FALLBACK_NODATA]; pixels of
/// `second` holding its own nodata are rewritten to it before merging. With a
/// `reference`, each merged band is merged again into a nodata array laid out
/// like the reference. Bands are merged in parallel.
pub fn merge_with_pixel_size<T: DataType>(
    first: &RasterGrid<T>,
    second: &RasterGrid<T>,
    reference: Option<&RasterGrid<T>>,
    pixel_size: (f64, f64),
) -> Result<RasterGrid<T>> {
    check_schema(first, second)?;
    let nodata = first.nodata().unwrap_or(T::FALLBACK_NODATA);
    let second_nodata = second.nodata().unwrap_or(T::FALLBACK_NODATA);
    let remap = !second_nodata.is_nodata(nodata);

    let keys: Vec<&str> = first.band_keys().collect();
    let merged = keys
        .par_iter()
        .map(|key| -> Result<(String, Array2<T>, GridTransform)> {
            let start = Instant::now();
            let second_band = second.band(key)?;
            let second_band: CowArray<T, Ix2> = if remap {
                second_band
                    .mapv(|value| if value.is_nodata(second_nodata) { nodata } else { value })
                    .into()
            } else {
                second_band.view().into()
            };

            let (mut band, mut transform) = direct_merge(
                first.band(key)?.view(),
                first.transform(),
                second_band.view(),
                second.transform(),
                pixel_size,
                nodata,
            )?;
            if let Some(reference) = reference {
                let substrate = Array2::from_elem(reference.shape(), nodata);
                (band, transform) = direct_merge(
                    substrate.view(),
                    reference.transform(),
                    band.view(),
                    &transform,
                    pixel_size,
                    nodata,
                )?;
            }
            debug!("merged band `{key}` in {:?}", start.elapsed());
            Ok((key.to_string(), band, transform))
        })
        .collect::<Result<Vec<_>>>()?;

    let Some((_, last_band, transform)) = merged.last() else {
        return Err(RasterError::SchemaMismatch("grids have no bands".to_string()));
    };
    let mut profile = Profile::new(first.profile().crs.clone(), *transform, last_band.dim(), Some(nodata));
    profile.pixel_size = pixel_size;
    let bands: Bands<T> = merged
        .into_iter()
        .map(|(key, band, _)| (key, band))
        .collect();
    let grid = RasterGrid::new(profile, bands, GridMetadata::new(pixel_size), vec![])?;
    info!("merged into {grid:?}");
    Ok(grid)
}
