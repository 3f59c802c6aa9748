// src/file/memory.rs
use anyhow::{Result, anyhow};
use super::HistogramStore;
use super::container::HistogramFile;
use crate::histogram::Histogram;

// In-memory container, handy for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    file: HistogramFile,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_histogram(mut self, histogram: Histogram) -> Self {
        self.file.insert(None, histogram);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Histogram> {
        self.file.find(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.file.keys()
    }

    pub fn into_file(self) -> HistogramFile {
        self.file
    }
}

impl HistogramStore for MemoryStore {
    fn load_nominal(&self, key: &str) -> Result<Histogram> {
        self.file
            .find(key)
            .cloned()
            .ok_or_else(|| anyhow!("Histogram '{}' not found in memory store", key))
    }

    fn store(&mut self, group: Option<&str>, histogram: &Histogram) -> Result<()> {
        self.file.insert(group, histogram.clone());
        Ok(())
    }
}
