// src/analysis/precision.rs
use statrs::distribution::{Normal, ContinuousCDF};

// Asymptotic relative standard error of an RMS estimate about a known mean
pub fn rms_relative_precision(samples: usize) -> f64 {
    if samples == 0 {
        return f64::INFINITY;
    }
    1.0 / (2.0 * samples as f64).sqrt()
}

/// Two-sided interval for the true width behind an RMS estimate.
///
/// Uses the normal approximation `rms * (1 +/- z / sqrt(2N))`, which is
/// accurate for the sample counts used here (thousands and up). The
/// confidence level is clamped to (0, 1).
pub fn rms_interval(rms: f64, samples: usize, confidence: f64) -> (f64, f64) {
    let confidence = confidence.clamp(1e-6, 1.0 - 1e-12);
    let z = match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(0.5 + confidence / 2.0),
        Err(_) => return (f64::NEG_INFINITY, f64::INFINITY),
    };
    let half_width = z * rms_relative_precision(samples);
    ((rms * (1.0 - half_width)).max(0.0), rms * (1.0 + half_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relative_precision_for_default_samples() {
        assert_relative_eq!(rms_relative_precision(10_000), 1.0 / 200.0_f64.sqrt() / 10.0, epsilon = 1e-12);
        assert!(rms_relative_precision(0).is_infinite());
    }

    #[test]
    fn test_interval_contains_estimate_and_shrinks_with_samples() {
        let (lo, hi) = rms_interval(6.7, 10_000, 0.95);
        assert!(lo < 6.7 && 6.7 < hi);

        let (lo_big, hi_big) = rms_interval(6.7, 1_000_000, 0.95);
        assert!(hi_big - lo_big < hi - lo);
    }

    #[test]
    fn test_interval_width_matches_normal_quantile() {
        let (lo, hi) = rms_interval(1.0, 5_000, 0.95);
        // z(0.975) = 1.95996...
        assert_relative_eq!(hi - 1.0, 1.959964 / 100.0, epsilon = 1e-5);
        assert_relative_eq!(1.0 - lo, 1.959964 / 100.0, epsilon = 1e-5);
    }
}
