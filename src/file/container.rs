// src/file/container.rs
use anyhow::{Result, Context, anyhow};
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};
use super::{FileHandler, HistogramStore, to_pretty_ron};
use crate::histogram::Histogram;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredHistogram {
    #[serde(default)]
    pub group: Option<String>,
    pub histogram: Histogram,
}

impl StoredHistogram {
    pub fn key(&self) -> String {
        match &self.group {
            Some(group) => format!("{}/{}", group, self.histogram.name),
            None => self.histogram.name.clone(),
        }
    }
}

/// Histogram container document.
///
/// Entries keep insertion order. A histogram is addressed by its name at the
/// top level, or by `group/name` inside a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramFile {
    pub version: String,
    pub entries: Vec<StoredHistogram>,
}

impl Default for HistogramFile {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            entries: Vec::new(),
        }
    }
}

impl HistogramFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, key: &str) -> Option<&Histogram> {
        let (group, name) = match key.rsplit_once('/') {
            Some((group, name)) => (Some(group), name),
            None => (None, key),
        };
        self.entries
            .iter()
            .find(|e| e.group.as_deref() == group && e.histogram.name == name)
            .map(|e| &e.histogram)
    }

    // Writing a key twice replaces the earlier histogram in place
    pub fn insert(&mut self, group: Option<&str>, histogram: Histogram) {
        let group = group.map(str::to_string);
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.group == group && e.histogram.name == histogram.name)
        {
            existing.histogram = histogram;
        } else {
            self.entries.push(StoredHistogram { group, histogram });
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(StoredHistogram::key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
pub struct HistogramFileHandler;

impl HistogramFileHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FileHandler<HistogramFile> for HistogramFileHandler {
    fn load(&self, path: &Path) -> Result<HistogramFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read histogram file: {}", path.display()))?;
        ron::from_str(&content)
            .with_context(|| format!("Failed to parse histogram file: {}", path.display()))
    }

    fn save(&self, data: &HistogramFile, path: &Path) -> Result<()> {
        let content = to_pretty_ron(data)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write histogram file: {}", path.display()))?;
        Ok(())
    }
}

/// Reads nominal histograms from one container and collects outputs for another.
///
/// Nothing is written until `flush`, and the output container is always
/// recreated from scratch.
#[derive(Debug)]
pub struct FileStore {
    input_path: PathBuf,
    output_path: PathBuf,
    input: HistogramFile,
    output: HistogramFile,
    handler: HistogramFileHandler,
}

impl FileStore {
    pub fn open(input_path: &Path, output_path: &Path) -> Result<Self> {
        if !input_path.exists() {
            return Err(anyhow!("Histogram file not found: {}", input_path.display()));
        }
        let handler = HistogramFileHandler::new();
        let input = handler.load(input_path)?;

        Ok(Self {
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            input,
            output: HistogramFile::new(),
            handler,
        })
    }

    pub fn output(&self) -> &HistogramFile {
        &self.output
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn flush(&self) -> Result<()> {
        if self.output_path.exists() {
            tracing::warn!(path = %self.output_path.display(), "overwriting existing output file");
        }
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.handler.save(&self.output, &self.output_path)?;
        tracing::info!(
            path = %self.output_path.display(),
            histograms = self.output.len(),
            "wrote output file"
        );
        Ok(())
    }
}

impl HistogramStore for FileStore {
    fn load_nominal(&self, key: &str) -> Result<Histogram> {
        let histogram = self
            .input
            .find(key)
            .cloned()
            .ok_or_else(|| anyhow!("Histogram '{}' not found in {}", key, self.input_path.display()))?;
        histogram
            .validate()
            .with_context(|| format!("Histogram '{}' in {} is malformed", key, self.input_path.display()))?;
        Ok(histogram)
    }

    fn store(&mut self, group: Option<&str>, histogram: &Histogram) -> Result<()> {
        self.output.insert(group, histogram.clone());
        Ok(())
    }
}
