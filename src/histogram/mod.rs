// src/histogram/mod.rs
use serde::{Serialize, Deserialize};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bin {
    pub content: f64,
    pub error: f64,
}

impl Bin {
    pub fn new(content: f64, error: f64) -> Self {
        Self { content, error }
    }

    pub fn empty() -> Self {
        Self::new(0.0, 0.0)
    }

    // None for empty bins, where the ratio is undefined
    pub fn relative_error(&self) -> Option<f64> {
        if self.content == 0.0 {
            None
        } else {
            Some(self.error / self.content)
        }
    }
}

/// Fixed-width binning of a one-dimensional histogram.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Axis {
    pub bins: usize,
    pub low: f64,
    pub high: f64,
}

impl Default for Axis {
    fn default() -> Self {
        // Agreed signal-region binning
        Self {
            bins: 17,
            low: 2.5,
            high: 19.5,
        }
    }
}

impl Axis {
    pub fn new(bins: usize, low: f64, high: f64) -> Result<Self, ConfigurationError> {
        let axis = Self { bins, low, high };
        axis.validate()?;
        Ok(axis)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.bins == 0 || !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(ConfigurationError::InvalidAxis {
                bins: self.bins,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        (self.high - self.low) / self.bins as f64
    }

    pub fn lower_edge(&self, index: usize) -> f64 {
        self.low + index as f64 * self.width()
    }

    pub fn upper_edge(&self, index: usize) -> f64 {
        if index + 1 == self.bins {
            self.high
        } else {
            self.lower_edge(index + 1)
        }
    }

    pub fn center(&self, index: usize) -> f64 {
        self.low + (index as f64 + 0.5) * self.width()
    }

    pub fn edges(&self) -> Vec<f64> {
        (0..=self.bins)
            .map(|i| if i == self.bins { self.high } else { self.lower_edge(i) })
            .collect()
    }
}

/// An ordered sequence of bins over a fixed axis.
///
/// The bin vector always has exactly `axis.bins` entries; constructors reject
/// anything else so downstream code can index bins and edges together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Histogram {
    pub name: String,
    pub title: String,
    axis: Axis,
    bins: Vec<Bin>,
}

impl Histogram {
    pub fn new(name: impl Into<String>, title: impl Into<String>, axis: Axis, bins: Vec<Bin>) -> Result<Self, ConfigurationError> {
        axis.validate()?;
        if bins.len() != axis.bins {
            return Err(ConfigurationError::BinCountMismatch {
                expected: axis.bins,
                found: bins.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            title: title.into(),
            axis,
            bins,
        })
    }

    pub fn zeroed(name: impl Into<String>, title: impl Into<String>, axis: Axis) -> Result<Self, ConfigurationError> {
        Self::new(name, title, axis, vec![Bin::empty(); axis.bins])
    }

    // Histograms read from disk bypass `new`, so the store re-checks them
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.axis.validate()?;
        if self.bins.len() != self.axis.bins {
            return Err(ConfigurationError::BinCountMismatch {
                expected: self.axis.bins,
                found: self.bins.len(),
            });
        }
        Ok(())
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bin(&self, index: usize) -> Option<&Bin> {
        self.bins.get(index)
    }

    pub fn integral(&self) -> f64 {
        self.bins.iter().map(|b| b.content).sum()
    }

    pub fn same_binning(&self, other: &Histogram) -> bool {
        self.axis == other.axis && self.bins.len() == other.bins.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_axis_edges() {
        let axis = Axis::default();
        let edges = axis.edges();
        assert_eq!(edges.len(), 18);
        assert_relative_eq!(edges[0], 2.5);
        assert_relative_eq!(edges[17], 19.5);
        assert_relative_eq!(axis.width(), 1.0);
        assert_relative_eq!(axis.center(0), 3.0);
        assert_relative_eq!(axis.upper_edge(16), 19.5);
    }

    #[test]
    fn test_invalid_axis_rejected() {
        assert!(Axis::new(0, 0.0, 1.0).is_err());
        assert!(Axis::new(3, 1.0, 1.0).is_err());
        assert!(Axis::new(3, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_bin_count_must_match_axis() {
        let axis = Axis::new(3, 0.0, 3.0).unwrap();
        let err = Histogram::new("h", "h", axis, vec![Bin::empty(); 2]).unwrap_err();
        assert!(matches!(err, ConfigurationError::BinCountMismatch { expected: 3, found: 2 }));
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(Bin::new(0.0, 1.0).relative_error(), None);
        assert_relative_eq!(Bin::new(100.0, 10.0).relative_error().unwrap(), 0.1);
    }

    #[test]
    fn test_integral_and_binning() {
        let axis = Axis::new(2, 0.0, 2.0).unwrap();
        let a = Histogram::new("a", "", axis, vec![Bin::new(1.0, 1.0), Bin::new(2.5, 0.5)]).unwrap();
        let b = Histogram::zeroed("b", "", axis).unwrap();
        assert_relative_eq!(a.integral(), 3.5);
        assert!(a.same_binning(&b));
    }
}
