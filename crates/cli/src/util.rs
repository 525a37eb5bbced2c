use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string; Cyrillic is 1 column, CJK and most emoji 2.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `width` display columns, ending in ".." when cut.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .next()
            .filter(|ch| ch.width().unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Exactly `width` display columns: right-padded or truncated.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let w = display_width(&cut);
    format!("{}{}", cut, " ".repeat(width.saturating_sub(w)))
}

/// Two spaces per nesting level.
pub(crate) fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Horizontal gauge bar `[####....]` with `width` inner columns.
pub(crate) fn gauge_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
