/// Comma-grouped integer, e.g. `85,123,456`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// B/M/K abbreviation matching the viewer: 2 decimals for billions, 1 for
/// millions and thousands, grouped digits below that.
pub fn format_compact(value: i64) -> String {
    let magnitude = value.unsigned_abs();
    let sign = if value < 0 { "-" } else { "" };
    if magnitude >= 1_000_000_000 {
        format!("{sign}{:.2}B", magnitude as f64 / 1_000_000_000.0)
    } else if magnitude >= 1_000_000 {
        format!("{sign}{:.1}M", magnitude as f64 / 1_000_000.0)
    } else if magnitude >= 1_000 {
        format!("{sign}{:.1}K", magnitude as f64 / 1_000.0)
    } else {
        format!("{sign}{}", format_count(magnitude))
    }
}

/// Signed compact form with an explicit `+` for gains.
pub fn format_signed_compact(value: i64) -> String {
    if value > 0 {
        format!("+{}", format_compact(value))
    } else {
        format_compact(value)
    }
}

/// Status badge text by completion percentage (viewer thresholds).
pub fn status_label(pct: f64) -> &'static str {
    if pct >= 100.0 {
        "DONE"
    } else if pct >= 80.0 {
        "CLOSE"
    } else if pct >= 50.0 {
        "ON TRACK"
    } else {
        "BEHIND"
    }
}
