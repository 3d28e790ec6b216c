//! Human-readable sizes and compression ratios.

/// Format a byte count with a binary unit.
///
/// # Examples
///
/// - `format_bytes(512)` -> `"512 B"`
/// - `format_bytes(2048)` -> `"2.00 KiB"`
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.2} {unit}")
}

/// Format the size change from `old` to `new` as a signed percentage.
///
/// `100_000 -> 80_000` is `"-20%"`; growth is prefixed with `+`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn format_ratio(old: u64, new: u64) -> String {
    if old == 0 {
        return "0%".to_string();
    }
    let percent = ((new as f64 - old as f64) / old as f64 * 100.0).round() as i64;
    if percent > 0 {
        format!("+{percent}%")
    } else {
        format!("{percent}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MiB");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(100_000, 80_000), "-20%");
        assert_eq!(format_ratio(100, 150), "+50%");
        assert_eq!(format_ratio(100, 100), "0%");
        assert_eq!(format_ratio(0, 10), "0%");
    }
}
