use std::fmt::Display;
use std::time::Duration;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const UNAVAILABLE: &str = "unavailable";

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Bytes to GiB, rounded to 2 decimals. Display only.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    round_2(bytes as f64 / GIB)
}

pub fn round_1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn round_2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `H:MM:SS`, prefixed with `N day(s), ` once the uptime reaches a day.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

pub fn or_unavailable<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => UNAVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gib_conversion_rounds_to_two_places() {
        assert_eq!(bytes_to_gib(0), 0.0);
        assert_eq!(bytes_to_gib(1024 * 1024 * 1024), 1.0);
        assert_eq!(bytes_to_gib(1_610_612_736), 1.5);
        assert_eq!(bytes_to_gib(300), 0.0);
        assert_eq!(bytes_to_gib(8_000_000_000), 7.45);
    }

    #[test]
    fn uptime_formats_like_a_clock() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_uptime(Duration::from_secs(3_725)), "1:02:05");
        assert_eq!(
            format_uptime(Duration::from_secs(86_400 + 61)),
            "1 day, 0:01:01"
        );
        assert_eq!(
            format_uptime(Duration::from_secs(3 * 86_400 + 4 * 3_600 + 12 * 60 + 9)),
            "3 days, 4:12:09"
        );
    }

    #[test]
    fn byte_labels() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_unicode("firefox", 10), "firefox");
        assert_eq!(
            truncate_unicode("gnome-shell-extension", 8),
            "gnome-s\u{2026}"
        );
    }

    #[test]
    fn sentinel_rendering() {
        assert_eq!(or_unavailable(Some(3)), "3");
        assert_eq!(or_unavailable::<u32>(None), "unavailable");
    }
}
