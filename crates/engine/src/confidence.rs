//! Residual-based dispersion estimate bounding the projection.
//!
//! Residuals are measured against the least-squares line fitted over the
//! trailing window, so a noisy history widens the band while a perfectly
//! linear one collapses it. The same sigma is applied to every horizon
//! step: uncertainty does not widen with distance into the future.

use crate::estimators::{FIT_WINDOW, ols_fit};

/// Population standard deviation of the residuals between the trailing
/// 30 actual points and their fitted trend line.
pub fn confidence_std(net: &[f64]) -> f64 {
    let window = &net[net.len().saturating_sub(FIT_WINDOW)..];
    if window.len() < 2 {
        return 0.0;
    }

    let (slope, intercept) = ols_fit(window);
    let variance = window
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let fitted = intercept + slope * i as f64;
            let residual = y - fitted;
            residual * residual
        })
        .sum::<f64>()
        / window.len() as f64;

    variance.sqrt()
}

/// `(lower, upper)` bounds per horizon step: `combined[i] ± 2·std`.
pub fn confidence_band(combined: &[f64], std: f64) -> Vec<(f64, f64)> {
    combined
        .iter()
        .map(|&value| (value - 2.0 * std, value + 2.0 * std))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_history_has_zero_dispersion() {
        let net: Vec<f64> = (0..FIT_WINDOW).map(|i| i as f64).collect();
        assert!(confidence_std(&net) < 1e-9);
    }

    #[test]
    fn alternating_history_has_positive_dispersion() {
        let net: Vec<f64> = (0..FIT_WINDOW)
            .map(|i| if i % 2 == 0 { 10.0 } else { -10.0 })
            .collect();
        // Fit is roughly flat at zero; every point is ~10 away from it.
        let std = confidence_std(&net);
        assert!((std - 10.0).abs() < 0.5);
    }

    #[test]
    fn short_history_yields_zero_std() {
        assert_eq!(confidence_std(&[]), 0.0);
        assert_eq!(confidence_std(&[4.0]), 0.0);
    }

    #[test]
    fn band_is_symmetric_around_the_forecast() {
        let band = confidence_band(&[5.0, -5.0], 1.5);
        assert_eq!(band, vec![(2.0, 8.0), (-8.0, -2.0)]);
    }
}
