//! Small numeric helpers shared by the aggregation stages.

/// Round to a fixed number of decimal places (half away from zero).
///
/// Results that round to zero are always +0.0.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor + 0.0
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Format a score the way the summary table expects: always with a decimal
/// point, never in exponent form.
pub fn format_score(value: f64) -> String {
    // Normalize -0.0 so empty profiles print as 0.0
    let value = if value == 0.0 { 0.0 } else { value };
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-0.00049, 3), 0.0);
        assert!(round_to(-0.00049, 3).is_sign_positive());
        assert!(round_to(-0.0, 5).is_sign_positive());
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(0.1 + 0.2, 5), 0.3);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.25, 0.75]), Some(0.5));
        assert_eq!(mean(&[1.0]), Some(1.0));
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(-0.0), "0.0");
        assert_eq!(format_score(-0.00123), "-0.00123");
        assert_eq!(format_score(0.00001), "0.00001");
        assert_eq!(format_score(1.0), "1.0");
    }
}
