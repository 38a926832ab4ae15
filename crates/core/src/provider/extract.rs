//! Table-oriented value extraction shared by the HTML-backed providers.

use crate::numeric;
use scraper::{ElementRef, Html, Selector};
use std::ops::RangeInclusive;

const PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Parses display text such as `"80.81%"`, `"$1,204.5"` or `"-3.2"`.
/// A dash or empty cell yields `None`.
pub fn extract_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect();
    let span = numeric::literal_span(&cleaned)?;
    let negative = span.start > 0 && cleaned.as_bytes()[span.start - 1] == b'-';

    let value: f64 = cleaned[span].trim_end_matches('.').parse().ok()?;
    Some(if negative { -value } else { value })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn rows_of(scope: ElementRef<'_>) -> Vec<Vec<String>> {
    let (Ok(tr), Ok(cells)) = (Selector::parse("tr"), Selector::parse("td, th")) else {
        return Vec::new();
    };
    scope
        .select(&tr)
        .map(|row| row.select(&cells).map(cell_text).collect())
        .collect()
}

/// Value in the cell right after a label cell, as laid out by key/value snapshot tables.
/// Exact (case-insensitive) label matches win over prefix matches such as
/// `"Gross Margin (TTM)"`. A label never matches in the middle of a cell, so `"P/E"`
/// does not pick up `"Forward P/E"`.
pub fn label_value(html: &str, labels: &[&str]) -> Option<f64> {
    let document = Html::parse_document(html);
    let rows = rows_of(document.root_element());

    let matchers: [fn(&str, &str) -> bool; 2] = [
        |cell, label| cell.eq_ignore_ascii_case(label),
        |cell, label| cell.to_lowercase().starts_with(&label.to_lowercase()),
    ];

    for matches in matchers {
        for label in labels {
            for row in &rows {
                for (i, cell) in row.iter().enumerate() {
                    if !matches(cell, label) {
                        continue;
                    }
                    if let Some(value) = row.get(i + 1).and_then(|next| extract_number(next)) {
                        return Some(value);
                    }
                }
            }
        }
    }
    None
}

/// Most recent percentage from a history table: the first data row of the column whose
/// header matches `header`. Without a matching column, the first percentage among the
/// leading columns is used. Values outside 0..=100 are skipped.
pub fn column_value(html: &str, header: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    let table = Selector::parse("table").ok()?;
    let wanted = header.to_lowercase();

    for scope in document.select(&table) {
        let rows = rows_of(scope);
        let Some((head, body)) = rows.split_first() else {
            continue;
        };

        let column = head.iter().position(|h| {
            let h = h.to_lowercase();
            !h.is_empty() && (h.contains(&wanted) || wanted.contains(&h))
        });

        let found = match column {
            Some(col) => body
                .iter()
                .filter_map(|row| row.get(col).and_then(|t| extract_number(t)))
                .find(|v| PERCENT_RANGE.contains(v)),
            None => body
                .iter()
                .flat_map(|row| row.iter().skip(1).take(4))
                .filter(|t| t.contains('%'))
                .filter_map(|t| extract_number(t))
                .find(|v| PERCENT_RANGE.contains(v)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}
