//! The two trend estimators and their combiner.
//!
//! Both forecasters read the same daily net series and are deliberately
//! simple: ordinary least squares assumes the trend is stable over the
//! fitting window, Holt's linear smoothing adapts to the most recent local
//! trend but can overreact to noise. Averaging the two is an auditable
//! ensembling choice, not a learned weighting.

/// Number of trailing points both the regression and the confidence
/// estimator fit against.
pub const FIT_WINDOW: usize = 30;

/// Least-squares slope and intercept over `window`, x = sequential index.
///
/// A degenerate window (fewer than two points, or constant x) yields a zero
/// slope and the series mean as intercept.
pub(crate) fn ols_fit(window: &[f64]) -> (f64, f64) {
    let n = window.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = window.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in window.iter().enumerate() {
        let x_diff = i as f64 - x_mean;
        numerator += x_diff * (y - y_mean);
        denominator += x_diff * x_diff;
    }

    if denominator == 0.0 {
        return (0.0, y_mean);
    }

    let slope = numerator / denominator;
    (slope, y_mean - slope * x_mean)
}

/// Ordinary least-squares projection over the most recent [`FIT_WINDOW`]
/// points, continuing the index sequence beyond the end of history:
/// `proj[h] = a + b * (last_index + 1 + h)`.
pub fn linear_forecast(net: &[f64], horizon: usize) -> Vec<f64> {
    let window = &net[net.len().saturating_sub(FIT_WINDOW)..];
    if window.is_empty() {
        return vec![0.0; horizon];
    }

    let (slope, intercept) = ols_fit(window);
    let last_index = (window.len() - 1) as f64;
    (1..=horizon)
        .map(|step| intercept + slope * (last_index + step as f64))
        .collect()
}

/// Holt's linear (double exponential) smoothing.
///
/// Level and trend are each updated once per historical point; the forecast
/// extrapolates linearly from the final pair: `level + h * trend`.
///
/// Degenerate inputs: an empty series forecasts zeros; a single point has an
/// undefined trend and is treated as flat, repeating the observation.
pub fn holt_forecast(net: &[f64], alpha: f64, beta: f64, horizon: usize) -> Vec<f64> {
    match net {
        [] => return vec![0.0; horizon],
        [only] => return vec![*only; horizon],
        _ => {}
    }

    let mut level = net[0];
    let mut trend = net[1] - net[0];

    for &observation in &net[1..] {
        let previous_level = level;
        level = alpha * observation + (1.0 - alpha) * (level + trend);
        trend = beta * (level - previous_level) + (1.0 - beta) * trend;
    }

    (1..=horizon)
        .map(|step| level + step as f64 * trend)
        .collect()
}

/// Elementwise mean of the two projections.
pub fn combine(holt: &[f64], linear: &[f64]) -> Vec<f64> {
    debug_assert_eq!(holt.len(), linear.len());
    holt.iter()
        .zip(linear)
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}
