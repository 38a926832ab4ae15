use std::ops::Range;

/// Byte span of the first `\d+\.?\d*` match in `text`.
pub fn literal_span(text: &str) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;

    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    Some(start..end)
}

/// First unsigned numeric literal in `text`.
pub fn first_literal(text: &str) -> Option<f64> {
    let span = literal_span(text)?;
    text[span].trim_end_matches('.').parse().ok()
}
