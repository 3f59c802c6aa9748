// src/file/manifest.rs
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Result, Context};
use chrono::prelude::*;
use serde::{Serialize, Deserialize};
use uuid::Uuid;
use super::{FileHandler, to_pretty_ron};
use crate::config::{StoreLayout, SystematicSource};

/// Record of one systematics run, written next to its output container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub version: String,
    pub run_id: Uuid,
    pub created: DateTime<Utc>,
    pub input: String,
    pub output: String,
    pub csv: Option<String>,
    pub nominal_key: String,
    // Always set, even for unseeded runs, so the run can be replayed
    pub seed: u64,
    pub samples: usize,
    pub layout: StoreLayout,
    pub sources: Vec<SystematicSource>,
}

impl RunManifest {
    pub fn new(
        input: &Path,
        output: &Path,
        nominal_key: &str,
        seed: u64,
        samples: usize,
        layout: StoreLayout,
        sources: Vec<SystematicSource>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id: Uuid::new_v4(),
            created: Utc::now(),
            input: input.to_string_lossy().replace('\\', "/"),
            output: output.to_string_lossy().replace('\\', "/"),
            csv: None,
            nominal_key: nominal_key.to_string(),
            seed,
            samples,
            layout,
            sources,
        }
    }

    pub fn with_csv(mut self, path: &Path) -> Self {
        self.csv = Some(path.to_string_lossy().replace('\\', "/"));
        self
    }

    // cms_bckg_syst.ron -> cms_bckg_syst.manifest.ron
    pub fn path_for(output: &Path) -> PathBuf {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        output.with_file_name(format!("{}.manifest.ron", stem))
    }
}

#[derive(Debug)]
pub struct ManifestFileHandler;

impl ManifestFileHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FileHandler<RunManifest> for ManifestFileHandler {
    fn load(&self, path: &Path) -> Result<RunManifest> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;
        ron::from_str(&content)
            .with_context(|| format!("Failed to parse manifest file: {}", path.display()))
    }

    fn save(&self, data: &RunManifest, path: &Path) -> Result<()> {
        let content = to_pretty_ron(data)?;
        fs::write(path, content)?;
        Ok(())
    }
}
