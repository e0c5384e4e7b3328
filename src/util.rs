/// Format milliseconds as `mm:ss`, the way the game timers display it.
/// Minutes keep growing past 99 rather than wrapping.
pub fn format_ms(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Whole-number percentage of `part` in `total`
pub fn percent(part: usize, total: usize) -> Option<f64> {
    match total {
        positive if positive > 0 => Some(((part as f64 / total as f64) * 100.0).round()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(0), "00:00");
        assert_eq!(format_ms(999), "00:00");
        assert_eq!(format_ms(1_000), "00:01");
        assert_eq!(format_ms(61_500), "01:01");
        assert_eq!(format_ms(600_000), "10:00");
    }

    #[test]
    fn test_format_ms_past_an_hour() {
        assert_eq!(format_ms(6_000_000), "100:00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 2), Some(50.0));
        assert_eq!(percent(2, 3), Some(67.0));
        assert_eq!(percent(3, 3), Some(100.0));
    }

    #[test]
    fn test_percent_empty_total() {
        assert_eq!(percent(0, 0), None);
    }
}
