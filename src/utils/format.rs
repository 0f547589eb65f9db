use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format minutes as "Xh Ym", "Xh" or "Ym"
pub fn format_hours_minutes(total_minutes: u64) -> String {
    let h = total_minutes / 60;
    let m = total_minutes % 60;
    if h == 0 {
        format!("{}m", m)
    } else if m == 0 {
        format!("{}h", h)
    } else {
        format!("{}h {}m", h, m)
    }
}

/// One decimal, trailing ".0" dropped
pub fn format_decimal(value: f64) -> String {
    if value == value.floor() {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).clamp(0.0, 1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Pad or cut `s` to exactly `width` terminal columns.
pub fn fit_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return format!("{}{}", s, " ".repeat(width - s.width()));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    format!("{}{}", out, " ".repeat(width.saturating_sub(used)))
}

/// First 8 characters of an id, enough to address it from the command line.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_and_minutes() {
        assert_eq!(format_hours_minutes(0), "0m");
        assert_eq!(format_hours_minutes(45), "45m");
        assert_eq!(format_hours_minutes(120), "2h");
        assert_eq!(format_hours_minutes(135), "2h 15m");
    }

    #[test]
    fn decimals() {
        assert_eq!(format_decimal(3.0), "3");
        assert_eq!(format_decimal(0.3), "0.3");
    }

    #[test]
    fn bars_clamp() {
        assert_eq!(progress_bar(0, 0, 4), "░░░░");
        assert_eq!(progress_bar(2, 4, 4), "██░░");
        assert_eq!(progress_bar(9, 4, 4), "████");
    }

    #[test]
    fn fit_width_pads_and_truncates() {
        assert_eq!(fit_width("Gym", 5), "Gym  ");
        assert_eq!(fit_width("Footwork + Defense", 8), "Footwor…");
        assert_eq!(fit_width("Footwork + Defense", 8).width(), 8);
    }

    #[test]
    fn short_ids() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
