//! Number formatting shared by the tables.

/// Format a statistic compactly.
///
/// Fixed point with `decimals` places for moderate magnitudes, scientific
/// notation for very small or very large ones, `nan`/`inf` otherwise.
pub fn number(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    let small = 10f64.powi(-(decimals as i32));
    if magnitude != 0.0 && (magnitude < small || magnitude >= 1e7) {
        format!("{value:.3e}")
    } else {
        format!("{value:.decimals$}")
    }
}

/// Format a p-value with three decimals, `0.000` below that resolution.
pub fn p_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.3}")
    }
}

/// Centre `text` in a field of `width` characters.
pub fn centered(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}

/// Truncate a label to at most `width` characters.
pub fn truncated(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        label.to_string()
    } else {
        label.chars().take(width).collect()
    }
}
