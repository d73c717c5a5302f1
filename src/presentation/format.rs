use chrono::{DateTime, Local, Utc};
use std::time::Duration;

/// Chilean peso, no decimals: `59990.0` → `$59.990`.
pub fn format_clp(price: f64) -> String {
    let rounded = price.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}${}", sign, grouped)
}

/// Countdown badge text, `m:ss`, truncating partial seconds.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Whole minutes, rounded up, for "wait N minutes" messages.
pub fn cooldown_minutes(remaining: Duration) -> u64 {
    let millis = remaining.as_millis() as u64;
    (millis + 59_999) / 60_000
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
