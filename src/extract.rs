//! Marker-driven extraction of prize categories from result document text.
//!
//! The text is cut into blocks at catalog marker phrases, one block per
//! category, and each block is then mined for an amount and ticket numbers.
//! Nothing here fails: blocks that do not yield a usable category are
//! dropped and logged.

use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

use crate::catalog::{CategoryDefinition, PrizeCatalog};
use crate::types::{PrizeCategory, TicketIdentifier};

static SERIES_TICKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z]{2})\s*([0-9]{6})").expect("series ticket regex compiles")
});

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run regex compiles"));

static DRAW_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)draw\s*(?:no\.?|number|#)\s*[:.]?\s*([0-9]+)")
        .expect("draw number regex compiles")
});

/// Length of the ticket groups recovered from bare digit runs.
const GROUP_LEN: usize = 4;

/// A contiguous span of text belonging to one catalog category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'t> {
    pub category_index: usize,
    pub start: usize,
    pub end: usize,
    pub text: &'t str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Category { index: usize, marker_len: usize },
    Footer,
}

/// Splits document text into category blocks using a catalog's marker and
/// footer phrases.
pub struct Segmenter<'c> {
    catalog: &'c PrizeCatalog,
}

impl<'c> Segmenter<'c> {
    pub fn new(catalog: &'c PrizeCatalog) -> Self {
        Self { catalog }
    }

    /// Blocks in document order. A block runs from its marker to the next
    /// marker or footer, or to the end of the text.
    pub fn segment<'t>(&self, text: &'t str) -> Vec<Block<'t>> {
        let mut blocks = Vec::new();
        let mut current = self.next_boundary(text, 0);

        while let Some((start, Boundary::Category { index, marker_len })) = current {
            let next = self.next_boundary(text, start + marker_len);
            let end = next.map(|(pos, _)| pos).unwrap_or(text.len());

            blocks.push(Block {
                category_index: index,
                start,
                end,
                text: &text[start..end],
            });
            current = next;
        }

        blocks
    }

    /// Earliest marker or footer at or after `from`. At equal offsets the
    /// longer phrase wins.
    fn next_boundary(&self, text: &str, from: usize) -> Option<(usize, Boundary)> {
        let haystack = &text[from..];
        let mut best: Option<(usize, usize, Boundary)> = None;

        let mut consider = |phrase: &str, boundary: Boundary| {
            if let Some(pos) = haystack.find(phrase) {
                let candidate = (from + pos, phrase.len(), boundary);
                best = match best {
                    Some(b) if b.0 < candidate.0 || (b.0 == candidate.0 && b.1 >= candidate.1) => {
                        Some(b)
                    }
                    _ => Some(candidate),
                };
            }
        };

        for (index, def) in self.catalog.categories.iter().enumerate() {
            for marker in &def.markers {
                consider(
                    marker,
                    Boundary::Category {
                        index,
                        marker_len: marker.len(),
                    },
                );
            }
        }
        for footer in &self.catalog.footers {
            consider(footer, Boundary::Footer);
        }

        best.map(|(pos, _, boundary)| (pos, boundary))
    }
}

/// Runs the whole extraction pipeline over one document.
pub fn extract_categories(text: &str, catalog: &PrizeCatalog) -> Vec<PrizeCategory> {
    let blocks = Segmenter::new(catalog).segment(text);

    blocks
        .iter()
        .filter_map(|block| {
            let def = &catalog.categories[block.category_index];
            extract_block(block, def, block.category_index as u32)
        })
        .collect()
}

fn extract_block(block: &Block<'_>, def: &CategoryDefinition, rank: u32) -> Option<PrizeCategory> {
    let Some(amount) = parse_amount(block.text, def) else {
        debug!(
            category = %def.name,
            offset = block.start,
            "dropping block without a positive amount"
        );
        return None;
    };

    let body = block.text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    let tickets = if def.has_series {
        series_tickets(body)
    } else {
        grouped_tickets(body)
    };

    if tickets.is_empty() {
        debug!(category = %def.name, offset = block.start, "dropping block without tickets");
        return None;
    }

    debug!(category = %def.name, %amount, tickets = tickets.len(), "extracted category");
    Some(PrizeCategory {
        name: def.name.clone(),
        rank,
        amount,
        tickets,
    })
}

fn parse_amount(text: &str, def: &CategoryDefinition) -> Option<Decimal> {
    let caps = def.amount_pattern.captures(text)?;
    let digits: String = caps.get(1)?.as_str().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&digits)
        .ok()
        .filter(|amount| *amount > Decimal::ZERO)
}

/// `DF 869610`, `DF869610`: two capitals then exactly six digits.
fn series_tickets(body: &str) -> Vec<TicketIdentifier> {
    let rendered = SERIES_TICKET_RE
        .captures_iter(body)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]));
    dedup_tickets(rendered)
}

/// Every digit run of at least four digits, cut into consecutive four-digit
/// groups. A shorter tail is dropped.
fn grouped_tickets(body: &str) -> Vec<TicketIdentifier> {
    let rendered = DIGIT_RUN_RE
        .find_iter(body)
        .map(|m| m.as_str())
        .filter(|run| run.len() >= GROUP_LEN)
        .flat_map(|run| {
            (0..run.len() / GROUP_LEN)
                .map(move |i| run[i * GROUP_LEN..(i + 1) * GROUP_LEN].to_string())
        });
    dedup_tickets(rendered)
}

fn dedup_tickets(rendered: impl Iterator<Item = String>) -> Vec<TicketIdentifier> {
    let mut seen = HashSet::new();
    rendered
        .filter(|r| seen.insert(r.clone()))
        .filter_map(|r| TicketIdentifier::parse(&r).ok())
        .collect()
}

/// Finds a printed draw number such as `Draw No: 4521`.
pub fn extract_draw_number(text: &str) -> Option<String> {
    DRAW_NUMBER_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}
