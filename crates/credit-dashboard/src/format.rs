use credit_analysis::{ChangeDirection, Delta};

/// Placeholder for any missing or undefined value.
pub const MISSING: &str = "—";

/// Fixed decimals with thousands separators; `—` when missing.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    let v = match value.filter(|v| v.is_finite()) {
        Some(v) => v,
        None => return MISSING.to_string(),
    };

    let fixed = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }

    let rounds_to_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if v < 0.0 && !rounds_to_zero {
        format!("-{}", out)
    } else {
        out
    }
}

/// Signed percentage with one decimal, e.g. `+27.8%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(p) => format!("{:+.1}%", p),
        None => MISSING.to_string(),
    }
}

/// `▲ 0.50 (27.8%)`, `▼ 1.00 (50.0%)` or `– 0.00 (0.0%)`.
pub fn trend_indicator(delta: &Delta) -> String {
    let absolute = match (delta.direction, delta.absolute_change) {
        (ChangeDirection::Undefined, _) | (_, None) => return MISSING.to_string(),
        (_, Some(a)) => a,
    };
    let percent = match delta.percent_change {
        Some(p) => format!("{:.1}%", p.abs()),
        None => MISSING.to_string(),
    };
    let arrow = match delta.direction {
        ChangeDirection::Up => "▲",
        ChangeDirection::Down => "▼",
        _ => "–",
    };
    format!("{} {:.2} ({})", arrow, absolute.abs(), percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_analysis::delta;

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_number(Some(1_234_567.891), 2), "1,234,567.89");
        assert_eq!(format_number(Some(-1234.5), 1), "-1,234.5");
        assert_eq!(format_number(Some(1000.0), 0), "1,000");
        assert_eq!(format_number(Some(999.0), 0), "999");
        assert_eq!(format_number(Some(-0.001), 2), "0.00");
        assert_eq!(format_number(None, 2), "—");
        assert_eq!(format_number(Some(f64::NAN), 2), "—");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(Some(27.777)), "+27.8%");
        assert_eq!(format_percent(Some(-50.0)), "-50.0%");
        assert_eq!(format_percent(None), "—");
    }

    #[test]
    fn test_trend_indicator() {
        assert_eq!(trend_indicator(&delta(Some(2.3), Some(1.8))), "▲ 0.50 (27.8%)");
        assert_eq!(trend_indicator(&delta(Some(1.0), Some(2.0))), "▼ 1.00 (50.0%)");
        assert_eq!(trend_indicator(&delta(Some(5.0), Some(5.0))), "– 0.00 (0.0%)");
        assert_eq!(trend_indicator(&delta(Some(5.0), Some(0.0))), "▲ 5.00 (—)");
        assert_eq!(trend_indicator(&delta(None, Some(1.0))), "—");
    }
}
