// src/analysis/builder.rs
use crate::analysis::propagator::{SourceVariations, VariationResult};
use crate::config::SystematicSource;
use crate::error::{ConfigurationError, Result};
use crate::histogram::Histogram;

/// Turns per-source variation results into histograms binned like the nominal.
#[derive(Debug, Clone, Copy)]
pub struct DerivedHistogramBuilder<'a> {
    nominal: &'a Histogram,
}

impl<'a> DerivedHistogramBuilder<'a> {
    pub fn new(nominal: &'a Histogram) -> Self {
        Self { nominal }
    }

    pub fn build(&self, source: &SystematicSource, results: &[VariationResult]) -> Result<Histogram> {
        if results.len() != self.nominal.len() {
            return Err(ConfigurationError::BinCountMismatch {
                expected: self.nominal.len(),
                found: results.len(),
            });
        }

        let bins = results.iter().map(VariationResult::as_bin).collect();
        let histogram = Histogram::new(source.name.clone(), source.title(), *self.nominal.axis(), bins)?;
        tracing::debug!(
            source = %source.name,
            integral = histogram.integral(),
            nominal_integral = self.nominal.integral(),
            "built derived histogram"
        );
        Ok(histogram)
    }

    // Validates every source before returning, so callers never see a partial set
    pub fn build_all(&self, variations: &[SourceVariations]) -> Result<Vec<Histogram>> {
        variations
            .iter()
            .map(|v| self.build(&v.source, &v.results))
            .collect()
    }
}
