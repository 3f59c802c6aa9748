// src/config/source.rs
use serde::{Serialize, Deserialize};
use crate::error::{ConfigurationError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VariationPolicy {
    // Monte Carlo RMS of a Gaussian perturbation with sigma = content * fraction
    Sampled,
    // Pure scale shift by content * fraction
    Deterministic,
}

impl Default for VariationPolicy {
    fn default() -> Self {
        VariationPolicy::Sampled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystematicSource {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub fraction: f64,
    #[serde(default)]
    pub policy: VariationPolicy,
}

impl SystematicSource {
    pub fn new(name: impl Into<String>, fraction: f64, policy: VariationPolicy) -> Self {
        Self {
            name: name.into(),
            label: None,
            fraction,
            policy,
        }
    }

    pub fn sampled(name: impl Into<String>, fraction: f64) -> Self {
        Self::new(name, fraction, VariationPolicy::Sampled)
    }

    pub fn deterministic(name: impl Into<String>, fraction: f64) -> Self {
        Self::new(name, fraction, VariationPolicy::Deterministic)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    // Derived histograms fall back to the source name when no label is set
    pub fn title(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptySourceName);
        }
        // '/' separates group and name in container keys
        if self.name.contains('/') {
            return Err(ConfigurationError::InvalidSourceName(self.name.clone()));
        }
        if !self.fraction.is_finite() || self.fraction <= 0.0 {
            return Err(ConfigurationError::InvalidFraction {
                name: self.name.clone(),
                fraction: self.fraction,
            });
        }
        Ok(())
    }
}

/// Ordered set of systematic sources for one run.
///
/// Registration order is the order derived histograms are produced in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRegistry {
    sources: Vec<SystematicSource>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: SystematicSource) -> Result<()> {
        source.validate()?;
        if self.contains(&source.name) {
            return Err(ConfigurationError::DuplicateSource(source.name));
        }
        self.sources.push(source);
        Ok(())
    }

    pub fn from_sources<I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = SystematicSource>,
    {
        let mut registry = Self::new();
        for source in sources {
            registry.register(source)?;
        }
        Ok(registry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&SystematicSource> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn sources(&self) -> &[SystematicSource] {
        &self.sources
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystematicSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn has_sampled(&self) -> bool {
        self.sources.iter().any(|s| s.policy == VariationPolicy::Sampled)
    }
}
