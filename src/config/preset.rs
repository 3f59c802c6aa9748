// src/config/preset.rs
use serde::{Serialize, Deserialize};
use super::source::SystematicSource;
use super::run::StoreLayout;

/// Source lists used by the signal-region analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Background,
    Signal,
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Background
    }
}

impl Preset {
    pub fn sources(&self) -> Vec<SystematicSource> {
        match self {
            Preset::Background => vec![
                SystematicSource::sampled("cms_SR_HF_SCALE_SYS", 0.067)
                    .with_label("CMS Signal Region with Systematic (HF scale)"),
                SystematicSource::sampled("cms_SR_Nch_SYS", 0.036)
                    .with_label("CMS Signal Region with Systematic (Effect of nch)"),
                SystematicSource::sampled("cms_SR_LUMI_SYS", 0.05)
                    .with_label("CMS Signal Region with Systematic (Luminosity)"),
            ],
            Preset::Signal => vec![
                SystematicSource::sampled("cms_SR_syst_muon_eff", 0.067)
                    .with_label("CMS Signal Region with Systematic (Muon Efficiency)"),
                SystematicSource::sampled("cms_SR_syst_pion_eff", 0.036)
                    .with_label("CMS Signal Region with Systematic (Pion Efficiency)"),
                SystematicSource::sampled("cms_SR_syst_simSampleSizeBinByBinVariation", 0.03)
                    .with_label("CMS Signal Region with Systematic (Simulated Sample Size Bin-By-Bin Variation)"),
                SystematicSource::sampled("cms_SR_syst_tLeptonBRVariation", 0.006)
                    .with_label("CMS Signal Region with Systematic (t-Lepton Branching Ratio Variation)"),
                SystematicSource::sampled("cms_SR_syst_simSampleSizeEfficiencyVariation", 0.011)
                    .with_label("CMS Signal Region with Systematic (Simulated Sample Size Efficiency Variation)"),
                // Luminosity is a plain 5% shift in the signal sample
                SystematicSource::deterministic("cms_SR_syst_lumi", 0.05)
                    .with_label("CMS Signal Region with Systematic (Luminosity)"),
            ],
        }
    }

    pub fn layout(&self) -> StoreLayout {
        match self {
            Preset::Background => StoreLayout::Nested,
            Preset::Signal => StoreLayout::Flat,
        }
    }
}
