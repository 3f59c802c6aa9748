// src/lib.rs
pub mod analysis;
pub mod config;
pub mod error;
pub mod file;
pub mod histogram;

pub use analysis::{
    generate_variations,
    RandomVariateEngine,
    UncertaintyPropagator,
    DerivedHistogramBuilder,
    PropagatorSettings,
    VariationResult
};
pub use config::{RunConfig, SourceRegistry, SystematicSource, VariationPolicy, Preset, StoreLayout};
pub use error::ConfigurationError;
pub use histogram::{Axis, Bin, Histogram};
