use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use rastermosaic::{
    merge, offset_overwrite, Bands, GridMetadata, GridTransform, Profile, RasterGrid,
};

const SIZE: (usize, usize) = (2048, 2048);
const BANDS: [&str; 3] = ["B04", "B03", "B02"];

fn tile(west: f64, north: f64, value: u16) -> RasterGrid<u16> {
    let transform = GridTransform::from_origin(west, north, 10., 10.);
    let profile = Profile::new("EPSG:32633", transform, SIZE, Some(0));
    let bands: Bands<u16> = BANDS
        .iter()
        .map(|key| (key.to_string(), Array2::from_elem(SIZE, value)))
        .collect();
    RasterGrid::new(profile, bands, GridMetadata::new((10., 10.)), vec![]).unwrap()
}

fn bench_offset_overwrite(c: &mut Criterion) {
    let source = Array2::from_elem(SIZE, 1u16);
    let mut substrate = Array2::from_elem((SIZE.0 * 2, SIZE.1 * 2), 0u16);
    c.bench_function("offset_overwrite", |b| {
        b.iter(|| offset_overwrite(source.view(), (1024, 1024), &mut substrate))
    });
}

fn bench_merge(c: &mut Criterion) {
    let first = tile(300_000., 5_000_000., 1);
    let second = tile(310_240., 4_989_760., 2);
    c.bench_function("merge", |b| b.iter(|| merge(&first, &second, None)));
}

criterion_group!(benches, bench_offset_overwrite, bench_merge);
criterion_main!(benches);
