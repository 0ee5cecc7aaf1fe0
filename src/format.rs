//! Display formatting for phone numbers, sizes and dates (pt-BR conventions).

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Formats a 13-digit Brazilian number as `+55 (11) 98765-4321`. Anything
/// else comes back untouched.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 13 {
        return phone.to_string();
    }
    format!(
        "+{} ({}) {}-{}",
        &digits[0..2],
        &digits[2..4],
        &digits[4..9],
        &digits[9..]
    )
}

pub fn format_file_size(bytes: Option<u64>) -> String {
    match bytes {
        None | Some(0) => String::new(),
        Some(b) if b < 1024 => format!("{b} B"),
        Some(b) if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

/// `dd/mm/aaaa hh:mm` in local time. Unparseable input is returned as is.
pub fn format_timestamp(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.format("%d/%m/%Y %H:%M").to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d/%m/%Y 00:00").to_string();
    }
    raw.to_string()
}

/// `YYYY-MM-DD` to `DD/MM/YYYY`.
pub fn format_display_date(iso: &str) -> String {
    let mut parts = iso.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d)) => format!("{d}/{m}/{y}"),
        _ => iso.to_string(),
    }
}

pub fn format_api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
