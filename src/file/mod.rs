// src/file/mod.rs
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::path::Path;
use crate::config::StoreLayout;
use crate::error::ConfigurationError;
use crate::histogram::Histogram;

pub mod container;
pub mod memory;
pub mod export;
pub mod manifest;

pub use container::{HistogramFile, HistogramFileHandler, StoredHistogram, FileStore};
pub use memory::MemoryStore;
pub use export::export_csv;
pub use manifest::{RunManifest, ManifestFileHandler};

// Core trait for file operations
pub trait FileHandler<T> {
    fn load(&self, path: &Path) -> Result<T>;
    fn save(&self, data: &T, path: &Path) -> Result<()>;
}

/// Where nominal histograms come from and derived histograms go.
///
/// A `None` group means the top level of the container.
pub trait HistogramStore {
    fn load_nominal(&self, key: &str) -> Result<Histogram>;
    fn store(&mut self, group: Option<&str>, histogram: &Histogram) -> Result<()>;
}

pub fn to_pretty_ron<T: Serialize>(data: &T) -> Result<String> {
    let content = ron::ser::to_string_pretty(
        data,
        ron::ser::PrettyConfig::new()
            .new_line("\n".to_string())
            .depth_limit(4)
            .separate_tuple_members(true)
    )?;
    Ok(content)
}

/// Store the unchanged nominal once, then every derived histogram.
pub fn write_outputs<S: HistogramStore>(
    store: &mut S,
    nominal: &Histogram,
    derived: &[Histogram],
    layout: StoreLayout,
) -> Result<()> {
    // Check everything first so a rejected run leaves the store untouched
    for histogram in derived {
        if !histogram.same_binning(nominal) {
            return Err(anyhow!(
                "Derived histogram '{}' does not share the nominal binning",
                histogram.name
            ));
        }
        if layout == StoreLayout::Flat && histogram.name == nominal.name {
            return Err(ConfigurationError::SourceShadowsNominal(histogram.name.clone()).into());
        }
    }

    store.store(None, nominal)?;
    for histogram in derived {
        let group = match layout {
            StoreLayout::Nested => Some(histogram.name.as_str()),
            StoreLayout::Flat => None,
        };
        store.store(group, histogram)?;
    }

    Ok(())
}
