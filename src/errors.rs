pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error(transparent)]
    NdarrayError(#[from] ndarray::ShapeError),
    #[error("grids are incompatible: {0}")]
    IncompatibleGrid(String),
    #[error("band `{0}` is present in both grids")]
    DuplicateBand(String),
    #[error("pixel window rows {rows:?} cols {cols:?} is outside of raster shape {shape:?}")]
    OutOfBounds {
        rows: (usize, usize),
        cols: (usize, usize),
        /// (height, width)
        shape: (usize, usize),
    },
    #[error("crs `{expected}` does not match `{found}`")]
    CrsMismatch { expected: String, found: String },
    #[error("There is no intersection between geometries and raster")]
    EmptyIntersection,
    #[error("resolution {0:?} is not square")]
    NonSquareResolution((f64, f64)),
    #[error("grids do not share a band schema: {0}")]
    SchemaMismatch(String),
    #[error("array of shape {source_shape:?} at offset {offset:?} overflows substrate of shape {substrate_shape:?}")]
    AlignmentOverflow {
        /// (row, col)
        offset: (isize, isize),
        source_shape: (usize, usize),
        substrate_shape: (usize, usize),
    },
    #[error("band `{band}` has shape {found:?}, raster is {expected:?}")]
    BandShapeMismatch {
        band: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("no band named `{0}`")]
    UnknownBand(String),
    #[error("transform is not invertible")]
    NonInvertibleTransform,
    #[error("invalid target resolution {0}")]
    InvalidResolution(f64),
    #[error("invalid value range {0:?}")]
    InvalidRange((f64, f64)),
    #[error("geometry collection is empty")]
    EmptyGeometry,
}
