use chrono::Duration;

/// Formats a duration as `1h 15m 34s`.
///
/// Starts at the largest non-zero unit and includes every smaller unit down
/// to seconds, or milliseconds when `include_millis` is set. Hours are not
/// wrapped at 24.
pub fn format_with_units(duration: &Duration, include_millis: bool) -> String {
    let total_ms = duration.num_milliseconds().unsigned_abs();
    let hours = total_ms / 3_600_000;
    let mins = total_ms / 60_000 % 60;
    let secs = total_ms / 1_000 % 60;
    let millis = total_ms % 1_000;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if !parts.is_empty() || mins > 0 {
        parts.push(format!("{mins}m"));
    }
    if !parts.is_empty() || secs > 0 || !include_millis {
        parts.push(format!("{secs}s"));
    }
    if include_millis {
        parts.push(format!("{millis}ms"));
    }

    let joined = parts.join(" ");
    if *duration < Duration::zero() && total_ms > 0 {
        format!("-{joined}")
    } else {
        joined
    }
}
