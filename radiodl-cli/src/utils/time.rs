use crate::error::AppError;
use std::fmt::Write;

/// Parse a show length into whole minutes.
///
/// A bare number is taken as minutes; `s`, `m` and `h` suffixes are accepted
/// ("90", "90m", "1.5h", "5400s"). Partial minutes round up.
pub fn parse_minutes(time_str: &str) -> Result<u32, AppError> {
    let time_str = time_str.trim();
    if time_str.is_empty() {
        return Err(AppError::ParseError("Invalid format: empty string".to_string()));
    }

    let split_index = time_str
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(time_str.len());

    let numeric_part = &time_str[..split_index];
    let unit_part = time_str[split_index..].trim().to_lowercase();

    let value = numeric_part
        .parse::<f64>()
        .map_err(|_| AppError::ParseError(format!("Invalid number in '{time_str}'")))?;

    let minutes = match unit_part.as_str() {
        "" | "m" | "min" => value,
        "s" => value / 60.0,
        "h" => value * 60.0,
        _ => {
            return Err(AppError::ParseError(format!(
                "Invalid unit '{unit_part}' in '{time_str}'"
            )));
        }
    };

    if !minutes.is_finite() || minutes <= 0.0 || minutes > u32::MAX as f64 {
        return Err(AppError::ParseError(format!(
            "Duration out of range: '{time_str}'"
        )));
    }

    Ok(minutes.ceil() as u32)
}

/// Convert seconds to a human-readable format
pub fn format_duration(seconds: f64) -> String {
    let mut result = String::with_capacity(10);

    // Writing into a String cannot fail.
    let _ = if seconds >= 3600.0 {
        write!(result, "{:.2}h", seconds / 3600.0)
    } else if seconds >= 60.0 {
        write!(result, "{:.2}m", seconds / 60.0)
    } else {
        write!(result, "{seconds:.2}s")
    };

    result
}
