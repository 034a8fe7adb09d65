pub mod clip;
pub mod combine;
pub mod crop;
pub mod mosaic;
pub mod normalize;
pub mod resample;
