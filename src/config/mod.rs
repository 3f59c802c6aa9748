// src/config/mod.rs
pub mod source;
pub mod preset;
pub mod run;

// Re-export commonly used types
pub use source::{SystematicSource, VariationPolicy, SourceRegistry};
pub use preset::Preset;
pub use run::{RunConfig, StoreLayout};
