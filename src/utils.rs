use chrono::NaiveDate;
use std::path::Path;

pub fn format_draw_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_draw_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Splits `mahajana-sampatha_2025-01-02.txt` into the lottery name
/// (`Mahajana Sampatha`) and the draw date.
pub fn parse_document_filename(path: &Path) -> Option<(String, NaiveDate)> {
    let stem = path.file_stem()?.to_str()?;
    let (lottery, date) = stem.rsplit_once('_')?;
    let date = parse_draw_date(date)?;

    let name = lottery
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        return None;
    }
    Some((name, date))
}
