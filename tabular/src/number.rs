//! FILENAME: tabular/src/number.rs
//! PURPOSE: Lenient numeric coercion and locale-free number formatting.
//! CONTEXT: Uploaded sheets often carry numbers as text ("12", "3.5 kg").
//! Aggregation reads the leading numeric prefix of such text; grouping needs
//! a stable string for every number regardless of the host locale.

/// Parses the leading numeric prefix of `input`.
///
/// Leading whitespace is skipped, then an optional sign, digits with an
/// optional fraction, and an optional exponent are consumed. Anything after
/// the prefix is ignored, so `"3.5 kg"` yields `3.5`. `"Infinity"` (with an
/// optional sign) is recognised. Returns `None` when no digits are found.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    if s[pos..].starts_with("Infinity") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        frac_digits = &s[frac_start..end];
        pos = end;
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    // An exponent only counts when at least one digit follows it ("1e" is 1).
    let mut exponent = "";
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut end = pos + 1;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        let digits_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_start {
            exponent = &s[pos + 1..end];
        }
    }

    let mut literal = String::with_capacity(int_digits.len() + frac_digits.len() + exponent.len() + 4);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }
    if !exponent.is_empty() {
        literal.push('e');
        literal.push_str(exponent);
    }

    literal.parse().ok()
}

/// Returns true when the whole of `input` (ignoring surrounding whitespace)
/// is a finite number. Used for deciding whether a field sorts numerically.
pub fn is_numeric_text(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return false;
    }
    matches!(trimmed.parse::<f64>(), Ok(n) if n.is_finite())
}

/// Formats a number without locale grouping or trailing zeros.
///
/// Magnitudes of 1e21 and above, or below 1e-6, use exponent form with an
/// explicit exponent sign ("1e+21", "1.5e-7"), the same thresholds and shape
/// as JavaScript's `Number.prototype.toString`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        // Collapses -0 into 0.
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
            _ => exp,
        }
    } else {
        format!("{}", n)
    }
}
