use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Text of the 1-based `line` of `source`, without its line ending.
pub fn source_line(source: &str, line: usize) -> &str {
    source
        .split('\n')
        .nth(line.saturating_sub(1))
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or("")
}

/// Marker line that puts `^` under `span` chars of `text` starting at the
/// 1-based char `column`. Tabs are copied so the marker lines up in a terminal.
pub fn caret_line(text: &str, column: usize, span: usize) -> String {
    let mut marker = String::new();
    for ch in text.chars().take(column.saturating_sub(1)) {
        if ch == '\t' {
            marker.push('\t');
        } else {
            let w = UnicodeWidthChar::width(ch).unwrap_or(1);
            marker.push_str(&" ".repeat(w));
        }
    }
    let underlined: String = text.chars().skip(column.saturating_sub(1)).take(span).collect();
    let width = display_width(&underlined).max(1);
    marker.push_str(&"^".repeat(width));
    marker
}
