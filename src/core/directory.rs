use std::{collections::BTreeMap, fmt::Debug, fs, path::Path};

use serde::Deserialize;

use crate::prelude::*;

/// Read-only lookup of cities and their districts, keyed by administrative code.
#[must_use]
#[derive(Debug, Deserialize)]
pub struct RegionDirectory(BTreeMap<u32, City>);

#[must_use]
#[derive(Debug, Deserialize)]
pub struct City {
    pub name: String,

    /// District (county) names keyed by their five-digit code.
    pub districts: BTreeMap<u32, String>,
}

impl RegionDirectory {
    #[instrument(skip_all, fields(path = ?path))]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read the region directory `{}`", path.display()))?;
        let directory = Self::from_json(&json)?;
        info!(n_cities = directory.0.len(), "loaded the region directory");
        Ok(directory)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse the region directory")
    }

    pub fn city(&self, code: u32) -> Result<&City> {
        self.0.get(&code).with_context(|| format!("unknown city code `{code}`"))
    }
}
