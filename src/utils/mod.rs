use chrono::{DateTime, Local};

use crate::error::{Error, Result};

pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_date(value: &DateTime<Local>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Parses a decimal with `.` or `,` as the separator. Thousands separators are
/// not supported: more than one separator, or a comma followed by exactly three
/// digits (`1,000`), is rejected rather than read as a fraction.
pub fn parse_decimal(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let separators = trimmed.matches(|c: char| c == ',' || c == '.').count();
    if separators > 1 {
        return Err(Error::InvalidNumeric(format!("{:?}: more than one separator", value)));
    }
    if let Some((_, fraction)) = trimmed.split_once(',') {
        if fraction.len() == 3 && fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidNumeric(format!(
                "{:?}: looks like a thousands separator",
                value
            )));
        }
    }
    let normalized = trimmed.replace(',', ".");
    let parsed = normalized
        .parse::<f64>()
        .map_err(|e| Error::InvalidNumeric(format!("{:?}: {}", value, e)))?;
    if !parsed.is_finite() {
        return Err(Error::InvalidNumeric(format!("{:?}: not finite", value)));
    }
    Ok(parsed)
}

/// Lenient numeric field reader: absent, blank and unparsable text all read as 0.
pub fn parse_amount(value: Option<&str>) -> f64 {
    let raw = match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return 0.0,
    };
    match parse_decimal(raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "numeric field defaulted to 0");
            0.0
        }
    }
}

#[cfg(test)]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
