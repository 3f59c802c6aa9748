// src/file/export.rs
use anyhow::{Result, anyhow};
use csv::Writer;
use std::path::Path;
use crate::histogram::Histogram;

/// Write one CSV row per bin: edges, nominal content and error, then a
/// content/error column pair for every derived histogram.
pub fn export_csv<P: AsRef<Path>>(path: P, nominal: &Histogram, derived: &[Histogram]) -> Result<()> {
    if let Some(bad) = derived.iter().find(|h| !h.same_binning(nominal)) {
        return Err(anyhow!("Cannot export '{}': binning differs from the nominal", bad.name));
    }

    let mut writer = Writer::from_path(path)?;

    let mut headers = vec![
        "bin".to_string(),
        "low".to_string(),
        "high".to_string(),
        "nominal".to_string(),
        "nominal_error".to_string(),
    ];
    for histogram in derived {
        headers.push(histogram.name.clone());
        headers.push(format!("{}_error", histogram.name));
    }
    writer.write_record(&headers)?;

    let axis = nominal.axis();
    for (i, bin) in nominal.bins().iter().enumerate() {
        let mut record = vec![
            (i + 1).to_string(),
            axis.lower_edge(i).to_string(),
            axis.upper_edge(i).to_string(),
            bin.content.to_string(),
            bin.error.to_string(),
        ];
        for histogram in derived {
            let varied = histogram.bins()[i];
            record.push(varied.content.to_string());
            record.push(varied.error.to_string());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
