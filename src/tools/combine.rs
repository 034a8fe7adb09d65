use log::{debug, info};
use std::borrow::Cow;

use crate::{
    components::{
        grid::{Bands, RasterGrid},
        DataType,
    },
    errors::{RasterError, Result},
};

/// What to do with a band key present in both grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Fail,
    /// Keep the first grid's band, drop the second's.
    KeepFirst,
}

/// Pairwise grid level check, band arrays are not inspected.
pub fn check_compatible<T: DataType>(first: &RasterGrid<T>, second: &RasterGrid<T>) -> Result<()> {
    let (lhs, rhs) = (first.profile(), second.profile());
    if lhs.pixel_size != rhs.pixel_size {
        return Err(RasterError::IncompatibleGrid(format!(
            "resolution {:?} != {:?}",
            lhs.pixel_size, rhs.pixel_size
        )));
    }
    if lhs.crs != rhs.crs {
        return Err(RasterError::IncompatibleGrid(format!(
            "crs {} != {}",
            lhs.crs, rhs.crs
        )));
    }
    if lhs.shape() != rhs.shape() {
        return Err(RasterError::IncompatibleGrid(format!(
            "shape {:?} != {:?}",
            lhs.shape(),
            rhs.shape()
        )));
    }
    Ok(())
}

/// Combines the bands and children of two grids into one.
///
/// Borrowed operands are duplicated, owned ones are moved into the result.
/// An absent operand is the identity. The result keeps the first grid's
/// profile and metadata.
pub fn combine<T: DataType>(
    first: Option<Cow<'_, RasterGrid<T>>>,
    second: Option<Cow<'_, RasterGrid<T>>>,
    duplicates: DuplicatePolicy,
) -> Result<Option<RasterGrid<T>>> {
    match (first, second) {
        (None, None) => Ok(None),
        (Some(grid), None) | (None, Some(grid)) => Ok(Some(grid.into_owned())),
        (Some(first), Some(second)) => {
            check_compatible(&first, &second)?;
            check_duplicates(&first, &second, duplicates)?;
            if matches!(first, Cow::Borrowed(_)) || matches!(second, Cow::Borrowed(_)) {
                debug!("combine duplicates borrowed band storage");
            }
            Ok(Some(merge_checked(first.into_owned(), second.into_owned())))
        }
    }
}

fn check_duplicates<T: DataType>(
    first: &RasterGrid<T>,
    second: &RasterGrid<T>,
    duplicates: DuplicatePolicy,
) -> Result<()> {
    if duplicates == DuplicatePolicy::KeepFirst {
        return Ok(());
    }
    match second.band_keys().find(|key| first.bands().contains_key(*key)) {
        Some(key) => Err(RasterError::DuplicateBand(key.to_string())),
        None => Ok(()),
    }
}

fn merge_checked<T: DataType>(first: RasterGrid<T>, second: RasterGrid<T>) -> RasterGrid<T> {
    let (profile, mut bands, metadata, mut children) = first.into_parts();
    let (_, second_bands, _, mut second_children) = second.into_parts();
    for (key, array) in second_bands {
        if bands.contains_key(&key) {
            debug!("dropping duplicate band `{key}`");
        } else {
            bands.insert(key, array);
        }
    }
    children.append(&mut second_children);
    let grid = RasterGrid::init(profile, bands, metadata, children);
    info!("combined into {grid:?}");
    grid
}

impl<T: DataType> RasterGrid<T> {
    /// Moves `other`'s bands and children into `self`, see [combine].
    pub fn combine(self, other: RasterGrid<T>, duplicates: DuplicatePolicy) -> Result<Self> {
        check_compatible(&self, &other)?;
        check_duplicates(&self, &other, duplicates)?;
        Ok(merge_checked(self, other))
    }

    /// Moves the bands named by `keys` into a new grid with the same profile
    /// and metadata, and no children.
    pub fn split_off<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) -> Result<Self> {
        let keys: Vec<&str> = keys.into_iter().collect();
        if let Some(missing) = keys.iter().find(|key| !self.bands().contains_key(**key)) {
            return Err(RasterError::UnknownBand(missing.to_string()));
        }
        let (profile, bands, metadata) = self.parts_mut();
        let split: Bands<T> = keys
            .into_iter()
            .filter_map(|key| bands.remove_entry(key))
            .collect();
        profile.count = bands.len();
        Ok(RasterGrid::init(profile.clone(), split, metadata.clone(), vec![]))
    }

    /// One single band grid per band, children are dropped.
    pub fn split(self) -> Vec<(String, Self)> {
        let (profile, bands, metadata, _) = self.into_parts();
        bands
            .into_iter()
            .map(|(key, array)| {
                let bands = Bands::from([(key.clone(), array)]);
                (key, RasterGrid::init(profile.clone(), bands, metadata.clone(), vec![]))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::grid::tests::grid;
    use rstest::{fixture, rstest};

    #[fixture]
    fn visible() -> RasterGrid<u16> {
        grid((0., 0.), (3, 3), Some(0), &[("B02", 2), ("B03", 3)])
    }

    #[fixture]
    fn infrared() -> RasterGrid<u16> {
        grid((0., 0.), (3, 3), Some(0), &[("B08", 8)])
    }

    #[rstest]
    fn absent_operand_is_identity(visible: RasterGrid<u16>) {
        let left = combine(Some(Cow::Borrowed(&visible)), None, DuplicatePolicy::Fail).unwrap();
        let right = combine(None, Some(Cow::Borrowed(&visible)), DuplicatePolicy::Fail).unwrap();
        assert_eq!(left.as_ref(), Some(&visible));
        assert_eq!(right.as_ref(), Some(&visible));
        assert!(combine::<u16>(None, None, DuplicatePolicy::Fail).unwrap().is_none());
    }

    #[rstest]
    fn disjoint_bands_union(visible: RasterGrid<u16>, infrared: RasterGrid<u16>) {
        let combined = combine(
            Some(Cow::Borrowed(&visible)),
            Some(Cow::Owned(infrared)),
            DuplicatePolicy::Fail,
        )
        .unwrap()
        .unwrap();
        assert_eq!(combined.band_keys().collect::<Vec<_>>(), ["B02", "B03", "B08"]);
        assert_eq!(combined.profile().transform, visible.profile().transform);
        assert_eq!(combined.profile().count, 3);
        assert_eq!(combined.band("B08").unwrap()[[2, 2]], 8);
        // borrowed operand is untouched
        assert_eq!(visible.profile().count, 2);
    }

    #[rstest]
    fn duplicate_band_fails(visible: RasterGrid<u16>) {
        let other = grid((0., 0.), (3, 3), Some(0), &[("B03", 30)]);
        let result = visible.clone().combine(other.clone(), DuplicatePolicy::Fail);
        assert!(matches!(result, Err(RasterError::DuplicateBand(key)) if key == "B03"));

        let kept = visible.combine(other, DuplicatePolicy::KeepFirst).unwrap();
        assert_eq!(kept.band("B03").unwrap()[[0, 0]], 3);
        assert_eq!(kept.profile().count, 2);
    }

    #[rstest]
    #[case(grid((0., 0.), (3, 4), Some(0), &[("B08", 8)]))]
    #[case({
        let mut other = grid((0., 0.), (3, 3), Some(0), &[("B08", 8)]);
        other.parts_mut().0.crs = "EPSG:4326".into();
        other
    })]
    #[case({
        let mut other = grid((0., 0.), (3, 3), Some(0), &[("B08", 8)]);
        other.parts_mut().0.pixel_size = (20., 20.);
        other
    })]
    fn incompatible_grids(visible: RasterGrid<u16>, #[case] other: RasterGrid<u16>) {
        let result = visible.combine(other, DuplicatePolicy::KeepFirst);
        assert!(matches!(result, Err(RasterError::IncompatibleGrid(_))));
    }

    #[rstest]
    fn children_are_concatenated(visible: RasterGrid<u16>, infrared: RasterGrid<u16>) {
        let (profile, bands, metadata, _) = visible.into_parts();
        let child = grid((0., 0.), (1, 1), None, &[("c", 1u16)]);
        let parent = RasterGrid::new(profile, bands, metadata, vec![child.clone()]).unwrap();
        let (profile, bands, metadata, _) = infrared.into_parts();
        let other = RasterGrid::new(profile, bands, metadata, vec![child.clone()]).unwrap();

        let combined = parent.combine(other, DuplicatePolicy::Fail).unwrap();
        assert_eq!(combined.children(), &[child.clone(), child]);
    }

    #[rstest]
    fn split_off_moves_bands(mut visible: RasterGrid<u16>) {
        assert!(matches!(
            visible.split_off(["B02", "B12"]),
            Err(RasterError::UnknownBand(key)) if key == "B12"
        ));
        assert_eq!(visible.profile().count, 2);

        let blue = visible.split_off(["B02"]).unwrap();
        assert_eq!(blue.band_keys().collect::<Vec<_>>(), ["B02"]);
        assert_eq!(visible.band_keys().collect::<Vec<_>>(), ["B03"]);
        assert_eq!((blue.profile().count, visible.profile().count), (1, 1));
    }

    #[rstest]
    fn split_per_band(visible: RasterGrid<u16>) {
        let split = visible.split();
        assert_eq!(split.len(), 2);
        assert_eq!(split[1].0, "B03");
        assert_eq!(split[1].1.band("B03").unwrap()[[0, 0]], 3);
    }
}
