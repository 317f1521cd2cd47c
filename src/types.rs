use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TicketError;
use crate::normalize::normalize_ticket;

/// A winning ticket identifier as printed in a result document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketIdentifier {
    pub raw_text: String,
    pub series: Option<String>,
    pub number: String,
}

impl TicketIdentifier {
    /// Builds an identifier through the shared normalization rule.
    pub fn parse(raw: &str) -> Result<Self, TicketError> {
        let (series, number) = normalize_ticket(raw)?;
        Ok(Self {
            raw_text: raw.trim().to_string(),
            series,
            number,
        })
    }

    /// Canonical rendering: `"DF 869610"` or `"0456"`.
    pub fn rendered(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TicketIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.series {
            Some(series) => write!(f, "{} {}", series, self.number),
            None => write!(f, "{}", self.number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeCategory {
    pub name: String,
    /// Position in the catalog, 0 being the top payout rank.
    pub rank: u32,
    pub amount: Decimal,
    pub tickets: Vec<TicketIdentifier>,
}

/// Identifying metadata of one draw, supplied alongside the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawInfo {
    pub lottery_name: String,
    pub draw_date: NaiveDate,
    pub draw_number: Option<String>,
    pub source: String,
}

/// A draw loaded back from storage. Categories are in rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub id: i64,
    pub info: DrawInfo,
    pub categories: Vec<PrizeCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    NumberOnly,
    LastFour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchResult {
    NoDraw {
        lottery_name: String,
        draw_date: NaiveDate,
    },
    NoWin {
        draw: DrawInfo,
    },
    Win {
        draw: DrawInfo,
        category: PrizeCategory,
        ticket: TicketIdentifier,
        tier: MatchTier,
    },
}

impl MatchResult {
    pub fn is_win(&self) -> bool {
        matches!(self, MatchResult::Win { .. })
    }
}

/// Row-level view of a stored draw, used by listing queries.
#[derive(Debug, Clone, Serialize)]
pub struct DrawRow {
    pub id: i64,
    pub lottery_name: String,
    pub draw_date: String,
    pub draw_number: Option<String>,
    pub source: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketHit {
    pub lottery_name: String,
    pub draw_date: String,
    pub category: String,
    pub amount: String,
    pub ticket: String,
}
