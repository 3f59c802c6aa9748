// src/config/run.rs
use anyhow::{Result, Context};
use serde::{Serialize, Deserialize};
use std::path::Path;
use crate::analysis::{PropagatorSettings, DEFAULT_SAMPLES};
use crate::error::ConfigurationError;
use crate::histogram::Axis;
use super::preset::Preset;
use super::source::{SourceRegistry, SystematicSource};

pub const ENV_PREFIX: &str = "SYSTVAR";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StoreLayout {
    // Each derived histogram under a directory named after its source
    Nested,
    Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub nominal_key: String,
    pub samples: usize,
    pub seed: Option<u64>,
    pub binning: Axis,
    pub check_binning: bool,
    pub parallel: bool,
    pub preset: Preset,
    // Falls back to the preset's layout when unset
    pub layout: Option<StoreLayout>,
    // Overrides the preset when non-empty
    pub sources: Vec<SystematicSource>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            nominal_key: "cms_SR".to_string(),
            samples: DEFAULT_SAMPLES,
            seed: None,
            binning: Axis::default(),
            check_binning: true,
            parallel: true,
            preset: Preset::default(),
            layout: None,
            sources: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Layer an optional config file and `SYSTVAR_*` environment variables
    /// over the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
            }
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().context("Failed to build configuration")?;
        settings
            .try_deserialize::<RunConfig>()
            .context("Failed to parse configuration")
    }

    pub fn sources(&self) -> Vec<SystematicSource> {
        if self.sources.is_empty() {
            self.preset.sources()
        } else {
            self.sources.clone()
        }
    }

    pub fn layout(&self) -> StoreLayout {
        self.layout.unwrap_or_else(|| self.preset.layout())
    }

    pub fn propagator_settings(&self) -> PropagatorSettings {
        PropagatorSettings {
            samples: self.samples,
            parallel: self.parallel,
        }
    }

    // Eager validation: nothing is sampled for a config that fails here
    pub fn resolve(&self) -> std::result::Result<(SourceRegistry, PropagatorSettings), ConfigurationError> {
        self.binning.validate()?;
        let registry = SourceRegistry::from_sources(self.sources())?;
        let settings = self.propagator_settings();
        if settings.samples == 0 && registry.has_sampled() {
            return Err(ConfigurationError::InvalidSampleCount);
        }
        if self.layout() == StoreLayout::Flat {
            let nominal_name = self
                .nominal_key
                .rsplit_once('/')
                .map_or(self.nominal_key.as_str(), |(_, name)| name);
            if let Some(source) = registry.get(nominal_name) {
                return Err(ConfigurationError::SourceShadowsNominal(source.name.clone()));
            }
        }
        Ok((registry, settings))
    }
}
