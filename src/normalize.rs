use regex::Regex;
use std::sync::LazyLock;

use crate::error::TicketError;

static TICKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:[A-Z]{2})?)([0-9]+)$").expect("ticket regex compiles"));

/// Canonicalizes a ticket string into `(series, number)`.
///
/// All whitespace is removed and letters are uppercased. What remains must be
/// an optional two-letter series followed by at least one digit. A lone
/// leading letter is rejected since a series is always two letters.
pub fn normalize_ticket(raw: &str) -> Result<(Option<String>, String), TicketError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    if compact.is_empty() {
        return Err(TicketError::Empty);
    }

    let caps = TICKET_RE
        .captures(&compact)
        .ok_or_else(|| TicketError::Malformed(raw.trim().to_string()))?;

    let series = caps
        .get(1)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let number = caps[2].to_string();

    Ok((series, number))
}
