//! Formatting helpers for presenting backend metrics.

use time::{macros::format_description, Date};

const MISSING: &str = "—";

/// `0.823` -> `82.3%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}%", v * 100.0),
        _ => MISSING.to_string(),
    }
}

/// Signed win value (CWV/TWV), e.g. `+1.25`.
pub fn format_win_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:+.2}"),
        _ => MISSING.to_string(),
    }
}

pub fn format_record(wins: u32, losses: u32) -> String {
    format!("{wins}-{losses}")
}

pub fn format_seed(value: Option<f64>) -> String {
    format_optional(value, 1)
}

pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => MISSING.to_string(),
    }
}

/// Header stamp for exported images, e.g. `Mar 8, 2025`.
pub fn format_date_stamp(date: Date) -> String {
    date.format(&format_description!(
        "[month repr:short] [day padding:none], [year]"
    ))
    .unwrap_or_else(|_| MISSING.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn percent_and_missing_values() {
        assert_eq!(format_percent(Some(0.823)), "82.3%");
        assert_eq!(format_percent(Some(f64::NAN)), "—");
        assert_eq!(format_percent(None), "—");
    }

    #[test]
    fn win_values_carry_sign() {
        assert_eq!(format_win_value(Some(1.254)), "+1.25");
        assert_eq!(format_win_value(Some(-0.4)), "-0.40");
    }

    #[test]
    fn record_and_seed() {
        assert_eq!(format_record(24, 8), "24-8");
        assert_eq!(format_seed(Some(4.06)), "4.1");
    }

    #[test]
    fn date_stamp_is_short_month() {
        assert_eq!(format_date_stamp(date!(2025 - 03 - 08)), "Mar 8, 2025");
    }
}
