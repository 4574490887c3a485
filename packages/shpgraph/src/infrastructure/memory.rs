//! In-memory driver
//!
//! Datasets live in a map keyed by path. `create_dataset` refuses a path
//! that is already present, matching the on-disk driver.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{GeoDriver, Layer};
use crate::{Result, ShpError};

#[derive(Debug, Default)]
pub struct MemoryDriver {
    datasets: RwLock<HashMap<PathBuf, Vec<Layer>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `layers` under `path`, replacing any previous dataset
    pub fn insert(&self, path: impl Into<PathBuf>, layers: Vec<Layer>) {
        self.datasets.write().insert(path.into(), layers);
    }

    /// Copy of the dataset stored under `path`
    pub fn dataset(&self, path: &Path) -> Option<Vec<Layer>> {
        self.datasets.read().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.read().is_empty()
    }
}

impl GeoDriver for MemoryDriver {
    fn name(&self) -> &str {
        "Memory"
    }

    fn read_layers(&self, path: &Path) -> Result<Vec<Layer>> {
        self.dataset(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no dataset at {}", path.display()),
            )
            .into()
        })
    }

    fn create_dataset(&self, outdir: &Path, layers: &[Layer]) -> Result<()> {
        let mut datasets = self.datasets.write();
        if datasets.contains_key(outdir) {
            return Err(ShpError::output_exists(outdir));
        }
        datasets.insert(outdir.to_path_buf(), layers.to_vec());
        Ok(())
    }
}
