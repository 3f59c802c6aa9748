use approx::assert_relative_eq;
use systvar::analysis::{self, precision, RandomVariateEngine, UncertaintyPropagator, PropagatorSettings};
use systvar::config::{Preset, RunConfig, SourceRegistry, StoreLayout, SystematicSource, VariationPolicy};
use systvar::file::{self, FileHandler, FileStore, HistogramFile, HistogramFileHandler, HistogramStore, MemoryStore};
use systvar::{Axis, Bin, ConfigurationError, Histogram};

fn nominal_signal_region() -> Histogram {
    let contents = [
        0.0, 312.0, 240.5, 181.0, 133.25, 97.0, 70.0, 49.5, 35.0, 24.0, 0.0, 11.0, 7.5, 5.0, 3.25, 2.0, 1.0,
    ];
    let bins = contents.iter().map(|&c| Bin::new(c, c.sqrt())).collect();
    Histogram::new("cms_SR", "CMS Signal Region", Axis::default(), bins).unwrap()
}

fn run(nominal: &Histogram, sources: Vec<SystematicSource>, seed: u64) -> Vec<Histogram> {
    let registry = SourceRegistry::from_sources(sources).unwrap();
    let propagator = UncertaintyPropagator::new(registry, PropagatorSettings::default()).unwrap();
    analysis::generate_variations(nominal, &propagator, &RandomVariateEngine::seeded(seed)).unwrap()
}

#[test]
fn concrete_scenario_single_bin() {
    let axis = Axis::new(1, 2.5, 3.5).unwrap();
    let nominal = Histogram::new("cms_SR", "", axis, vec![Bin::new(100.0, 10.0)]).unwrap();

    let derived = run(
        &nominal,
        vec![
            SystematicSource::sampled("hf_scale", 0.067),
            SystematicSource::deterministic("lumi", 0.05),
        ],
        7,
    );

    let sampled = derived[0].bins()[0];
    assert!((sampled.content - 106.7).abs() < 0.05 * 6.7, "content = {}", sampled.content);
    assert_relative_eq!(sampled.error, 0.1 * sampled.content, epsilon = 1e-9);

    let shifted = derived[1].bins()[0];
    assert_eq!(shifted.content, 105.0);
    assert_relative_eq!(shifted.error, 10.5, epsilon = 1e-12);
}

#[test]
fn every_preset_preserves_binning_zero_bins_and_relative_errors() {
    let nominal = nominal_signal_region();

    for preset in [Preset::Background, Preset::Signal] {
        let sources = preset.sources();
        let derived = run(&nominal, sources.clone(), 2024);
        assert_eq!(derived.len(), sources.len());

        for (source, histogram) in sources.iter().zip(&derived) {
            assert_eq!(histogram.name, source.name);
            assert!(histogram.same_binning(&nominal));
            assert_eq!(histogram.axis().edges(), nominal.axis().edges());

            for (bin, varied) in nominal.bins().iter().zip(histogram.bins()) {
                match bin.relative_error() {
                    None => assert_eq!(*varied, Bin::empty()),
                    Some(rel) => {
                        assert_relative_eq!(varied.error / varied.content, rel, epsilon = 1e-9);
                        if source.policy == VariationPolicy::Deterministic {
                            assert_eq!(varied.content, bin.content + bin.content * source.fraction);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn sampled_shift_averages_to_fraction() {
    let nominal = nominal_signal_region();
    let source = SystematicSource::sampled("cms_SR_Nch_SYS", 0.036);

    let mut total = 0.0;
    let mut count = 0;
    for seed in 0..5 {
        let derived = run(&nominal, vec![source.clone()], seed);
        for (bin, varied) in nominal.bins().iter().zip(derived[0].bins()) {
            if bin.content != 0.0 {
                total += (varied.content - bin.content) / bin.content;
                count += 1;
            }
        }
    }
    let mean_shift = total / count as f64;

    // 75 independent estimates: the mean is far tighter than a single bin
    let (lo, hi) = precision::rms_interval(0.036, 10_000 * count, 0.999);
    assert!(mean_shift > lo && mean_shift < hi, "mean shift {mean_shift} outside [{lo}, {hi}]");
}

#[test]
fn explicit_seed_is_bit_reproducible() {
    let nominal = nominal_signal_region();
    let a = run(&nominal, Preset::Signal.sources(), 99);
    let b = run(&nominal, Preset::Signal.sources(), 99);
    let c = run(&nominal, Preset::Signal.sources(), 100);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn misconfiguration_is_rejected_before_sampling() {
    let config = RunConfig {
        sources: vec![SystematicSource::sampled("cms_SR_LUMI_SYS", -0.05)],
        ..RunConfig::default()
    };
    assert!(matches!(config.resolve(), Err(ConfigurationError::InvalidFraction { .. })));

    let nominal = Histogram::zeroed("cms_SR", "", Axis::new(10, 0.0, 10.0).unwrap()).unwrap();
    assert!(matches!(
        analysis::ensure_binning(&nominal, &Axis::default()),
        Err(ConfigurationError::BinningMismatch { .. })
    ));
}

#[test]
fn memory_store_pipeline_nests_background_sources() {
    let nominal = nominal_signal_region();
    let mut store = MemoryStore::new().with_histogram(nominal.clone());

    let loaded = store.load_nominal("cms_SR").unwrap();
    let derived = run(&loaded, Preset::Background.sources(), 5);
    file::write_outputs(&mut store, &loaded, &derived, Preset::Background.layout()).unwrap();

    assert_eq!(
        store.keys(),
        vec![
            "cms_SR",
            "cms_SR_HF_SCALE_SYS/cms_SR_HF_SCALE_SYS",
            "cms_SR_Nch_SYS/cms_SR_Nch_SYS",
            "cms_SR_LUMI_SYS/cms_SR_LUMI_SYS",
        ]
    );
    assert_eq!(store.get("cms_SR"), Some(&nominal));
}

#[test]
fn file_store_pipeline_writes_flat_signal_container() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cms_tau_mu3prong_orig.ron");
    let output = dir.path().join("cms_tau_mu3prong_syst.ron");
    let csv = dir.path().join("signal.csv");

    let mut container = HistogramFile::new();
    container.insert(None, nominal_signal_region());
    HistogramFileHandler::new().save(&container, &input).unwrap();

    let config = RunConfig {
        preset: Preset::Signal,
        seed: Some(11),
        samples: 2_000,
        ..RunConfig::default()
    };
    let (registry, settings) = config.resolve().unwrap();

    let mut store = FileStore::open(&input, &output).unwrap();
    let nominal = store.load_nominal(&config.nominal_key).unwrap();
    analysis::ensure_binning(&nominal, &config.binning).unwrap();

    let propagator = UncertaintyPropagator::new(registry, settings).unwrap();
    let engine = RandomVariateEngine::new(config.seed);
    let derived = analysis::generate_variations(&nominal, &propagator, &engine).unwrap();

    assert_eq!(config.layout(), StoreLayout::Flat);
    file::write_outputs(&mut store, &nominal, &derived, config.layout()).unwrap();
    store.flush().unwrap();
    file::export_csv(&csv, &nominal, &derived).unwrap();

    let written = HistogramFileHandler::new().load(&output).unwrap();
    assert_eq!(written.len(), 7);
    let lumi = written.find("cms_SR_syst_lumi").unwrap();
    assert_eq!(lumi.bins()[1].content, 312.0 + 312.0 * 0.05);
    assert_eq!(lumi.title, "CMS Signal Region with Systematic (Luminosity)");

    let rows = std::fs::read_to_string(&csv).unwrap().lines().count();
    assert_eq!(rows, 18);
}
