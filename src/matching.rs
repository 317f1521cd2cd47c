//! Ticket matching against the prize categories of one draw.
//!
//! A candidate ticket matches a query on any of three tiers:
//!
//! 1. `Exact`: both sides carry a series, series and number are equal.
//! 2. `NumberOnly`: numbers are equal, series ignored.
//! 3. `LastFour`: the last four digits are equal and the printed number is
//!    shorter than the query number, as with last-four-digit prizes.
//!
//! Among all matching categories the one with the strictly greatest amount
//! wins. Categories are visited in rank order, so an equal amount keeps the
//! higher-ranked category.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueryError;
use crate::normalize::normalize_ticket;
use crate::types::{DrawInfo, DrawRecord, MatchResult, MatchTier, PrizeCategory, TicketIdentifier};

const SUFFIX_LEN: usize = 4;

/// Accepted digit-length window for query numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLimits {
    pub min_digits: usize,
    pub max_digits: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            min_digits: 4,
            max_digits: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuery {
    pub series: Option<String>,
    pub number: String,
}

impl MatchQuery {
    /// Normalizes and validates a user-supplied ticket string.
    pub fn parse(raw: &str, limits: &QueryLimits) -> Result<Self, QueryError> {
        let (series, number) = normalize_ticket(raw)?;
        let len = number.len();
        if len < limits.min_digits || len > limits.max_digits {
            return Err(QueryError::Length {
                len,
                min: limits.min_digits,
                max: limits.max_digits,
            });
        }
        Ok(Self { series, number })
    }
}

/// Strongest tier on which `candidate` matches `query`, if any.
pub fn match_tier(query: &MatchQuery, candidate: &TicketIdentifier) -> Option<MatchTier> {
    let same_number = query.number == candidate.number;

    match (&query.series, &candidate.series) {
        (Some(q), Some(c)) if same_number && q == c => return Some(MatchTier::Exact),
        _ => {}
    }
    if same_number {
        return Some(MatchTier::NumberOnly);
    }
    if suffix_matches(&query.number, &candidate.number) {
        return Some(MatchTier::LastFour);
    }
    None
}

fn suffix_matches(query: &str, candidate: &str) -> bool {
    if query.len() < SUFFIX_LEN || candidate.len() < SUFFIX_LEN || candidate.len() >= query.len() {
        return false;
    }
    query[query.len() - SUFFIX_LEN..] == candidate[candidate.len() - SUFFIX_LEN..]
}

/// Best-paying match of `query` among `categories`.
pub fn match_ticket(
    query: &MatchQuery,
    draw: &DrawInfo,
    categories: &[PrizeCategory],
) -> MatchResult {
    let mut ordered: Vec<&PrizeCategory> = categories.iter().collect();
    ordered.sort_by_key(|c| c.rank);

    let mut best: Option<(&PrizeCategory, &TicketIdentifier, MatchTier)> = None;

    for category in ordered {
        let Some((ticket, tier)) = best_ticket(query, category) else {
            continue;
        };
        let better = match best {
            Some((current, _, _)) => category.amount > current.amount,
            None => true,
        };
        if better {
            best = Some((category, ticket, tier));
        }
    }

    match best {
        Some((category, ticket, tier)) => {
            debug!(category = %category.name, ticket = %ticket, ?tier, "ticket matched");
            MatchResult::Win {
                draw: draw.clone(),
                category: category.clone(),
                ticket: ticket.clone(),
                tier,
            }
        }
        None => MatchResult::NoWin { draw: draw.clone() },
    }
}

/// The ticket in `category` matching on the strongest tier, first one on ties.
fn best_ticket<'a>(
    query: &MatchQuery,
    category: &'a PrizeCategory,
) -> Option<(&'a TicketIdentifier, MatchTier)> {
    let mut best: Option<(&TicketIdentifier, MatchTier)> = None;
    for ticket in &category.tickets {
        if let Some(tier) = match_tier(query, ticket) {
            if best.is_none_or(|(_, current)| tier < current) {
                best = Some((ticket, tier));
            }
        }
    }
    best
}

/// Validates a raw ticket string and matches it against a stored draw.
///
/// `draw` is `None` when no record exists for the requested date, which is
/// reported as [`MatchResult::NoDraw`] rather than an error.
pub fn check_ticket(
    raw_ticket: &str,
    limits: &QueryLimits,
    lottery_name: &str,
    draw_date: NaiveDate,
    draw: Option<&DrawRecord>,
) -> Result<MatchResult, QueryError> {
    let query = MatchQuery::parse(raw_ticket, limits)?;

    Ok(match draw {
        Some(record) => match_ticket(&query, &record.info, &record.categories),
        None => MatchResult::NoDraw {
            lottery_name: lottery_name.to_string(),
            draw_date,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draw_info() -> DrawInfo {
        DrawInfo {
            lottery_name: "Mahajana Sampatha".to_string(),
            draw_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            draw_number: Some("4521".to_string()),
            source: "test".to_string(),
        }
    }

    fn category(name: &str, rank: u32, amount: i64, tickets: &[&str]) -> PrizeCategory {
        PrizeCategory {
            name: name.to_string(),
            rank,
            amount: Decimal::from(amount),
            tickets: tickets
                .iter()
                .map(|t| TicketIdentifier::parse(t).unwrap())
                .collect(),
        }
    }

    fn categories() -> Vec<PrizeCategory> {
        vec![
            category("1st", 0, 10_000_000, &["DF 869610"]),
            category("Consolation", 5, 5000, &["9610"]),
        ]
    }

    fn query(raw: &str) -> MatchQuery {
        MatchQuery::parse(raw, &QueryLimits::default()).unwrap()
    }

    #[test]
    fn test_full_ticket_wins_highest_category() {
        let result = match_ticket(&query("DF 869610"), &draw_info(), &categories());
        match result {
            MatchResult::Win { category, ticket, tier, draw } => {
                assert_eq!(category.name, "1st");
                assert_eq!(ticket.to_string(), "DF 869610");
                assert_eq!(tier, MatchTier::Exact);
                assert_eq!(draw.draw_number.as_deref(), Some("4521"));
            }
            other => panic!("expected win, got {:?}", other),
        }
    }

    #[test]
    fn test_four_digit_query_wins_consolation_only() {
        let result = match_ticket(&query("9610"), &draw_info(), &categories());
        match result {
            MatchResult::Win { category, tier, .. } => {
                assert_eq!(category.name, "Consolation");
                assert_eq!(tier, MatchTier::NumberOnly);
            }
            other => panic!("expected win, got {:?}", other),
        }
    }

    #[test]
    fn test_number_only_ignores_series() {
        let result = match_ticket(&query("869610"), &draw_info(), &categories());
        match result {
            MatchResult::Win { category, tier, .. } => {
                assert_eq!(category.name, "1st");
                assert_eq!(tier, MatchTier::NumberOnly);
            }
            other => panic!("expected win, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_series_still_matches_on_number() {
        let q = query("XY 869610");
        let printed = TicketIdentifier::parse("DF 869610").unwrap();
        assert_eq!(match_tier(&q, &printed), Some(MatchTier::NumberOnly));
    }

    #[test]
    fn test_last_four_matches_longer_query() {
        let result = match_ticket(&query("AB 119610"), &draw_info(), &categories());
        match result {
            MatchResult::Win { category, tier, .. } => {
                assert_eq!(category.name, "Consolation");
                assert_eq!(tier, MatchTier::LastFour);
            }
            other => panic!("expected win, got {:?}", other),
        }
    }

    #[test]
    fn test_suffix_needs_shorter_printed_number() {
        let q = query("DF 869610");
        let consolation = TicketIdentifier::parse("9610").unwrap();
        let other_book = TicketIdentifier::parse("XY 129610").unwrap();
        assert_eq!(match_tier(&q, &consolation), Some(MatchTier::LastFour));
        assert_eq!(match_tier(&q, &other_book), None);
    }

    #[test]
    fn test_no_match_keeps_draw_metadata() {
        let result = match_ticket(&query("DF 111111"), &draw_info(), &categories());
        assert_eq!(result, MatchResult::NoWin { draw: draw_info() });
    }

    #[test]
    fn test_equal_amounts_keep_higher_rank() {
        let cats = vec![
            category("5th Prize", 4, 1000, &["4444"]),
            category("4th Prize", 3, 1000, &["4444"]),
        ];
        let result = match_ticket(&query("4444"), &draw_info(), &cats);
        match result {
            MatchResult::Win { category, .. } => assert_eq!(category.name, "4th Prize"),
            other => panic!("expected win, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_is_repeatable() {
        let cats = categories();
        let q = query("DF 869610");
        let first = match_ticket(&q, &draw_info(), &cats);
        let second = match_ticket(&q, &draw_info(), &cats);
        assert_eq!(first, second);
    }

    #[test]
    fn test_query_length_window() {
        let limits = QueryLimits::default();
        assert_eq!(
            MatchQuery::parse("123", &limits),
            Err(QueryError::Length { len: 3, min: 4, max: 9 })
        );
        assert_eq!(
            MatchQuery::parse("1234567890", &limits),
            Err(QueryError::Length { len: 10, min: 4, max: 9 })
        );
        assert!(MatchQuery::parse("1234", &limits).is_ok());
        assert!(MatchQuery::parse("DF 123456789", &limits).is_ok());
    }

    #[test]
    fn test_malformed_query_reports_format() {
        let err = MatchQuery::parse("ABC123", &QueryLimits::default()).unwrap_err();
        assert_eq!(err.reason(), "format");
    }

    #[test]
    fn test_check_ticket_without_draw() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let limits = QueryLimits::default();
        let result = check_ticket("DF 869610", &limits, "Mahajana Sampatha", date, None).unwrap();
        assert_eq!(
            result,
            MatchResult::NoDraw {
                lottery_name: "Mahajana Sampatha".to_string(),
                draw_date: date,
            }
        );
    }

    #[test]
    fn test_check_ticket_rejects_before_matching() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let limits = QueryLimits::default();
        let err = check_ticket("12", &limits, "Mahajana Sampatha", date, None).unwrap_err();
        assert_eq!(err.reason(), "length");
    }
}
