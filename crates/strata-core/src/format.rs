//! Value formatting and scale policy helpers shared by the presenters.

/// SI buckets for absolute byte quantities.
pub const BYTES: &[(f64, &str)] = &[
    (1e12, "TB"),
    (1e9, "GB"),
    (1e6, "MB"),
    (1e3, "KB"),
    (1.0, "B"),
];

/// SI buckets for byte rates.
pub const BYTES_PER_SEC: &[(f64, &str)] = &[
    (1e12, "TB/s"),
    (1e9, "GB/s"),
    (1e6, "MB/s"),
    (1e3, "KB/s"),
    (1.0, "B/s"),
];

/// Format a value using the bucket selected by the row's scale, so every
/// label along one chart shares a unit.
pub fn format_measurement(value: f64, scale: f64, buckets: &[(f64, &str)]) -> String {
    let (factor, unit) = buckets
        .iter()
        .copied()
        .find(|&(factor, _)| scale >= factor)
        .unwrap_or_else(|| buckets[buckets.len() - 1]);
    format!("{:.1}{unit}", value / factor)
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_watts(value: f64) -> String {
    format!("{value:.1}W")
}

/// Scale denominator for unbounded metrics: the power-of-10 ceiling of the
/// window maximum. Flat/empty windows get 1.0 so the chart stays blank
/// instead of dividing by zero.
pub fn pow10_ceiling(max: f64) -> f64 {
    if max <= 1.0 {
        return 1.0;
    }
    10f64.powf(max.log10().ceil())
}
