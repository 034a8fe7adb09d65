use chrono::NaiveDate;
use std::collections::HashMap;

/// Free form raster metadata.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct GridMetadata {
    /// Ground resolution in crs units, (x, y).
    pub resolution: (f64, f64),
    pub acquired: Option<NaiveDate>,
    pub description: Option<String>,
    pub extra: HashMap<String, String>,
}

impl GridMetadata {
    pub fn new(resolution: (f64, f64)) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    pub fn with_acquired(mut self, acquired: NaiveDate) -> Self {
        self.acquired = Some(acquired);
        self
    }
}
