pub mod arena;
pub mod bounds;
pub mod dtype;
pub mod grid;
pub mod metadata;
pub mod profile;
pub mod rasterize;
pub mod transforms;

pub use arena::{GridArena, GridId};
pub use bounds::{GeoBounds, PixelWindow};
pub use dtype::DataType;
pub use grid::{Bands, RasterGrid};
pub use metadata::GridMetadata;
pub use profile::Profile;
pub use transforms::{GridTransform, PixelOffset};
