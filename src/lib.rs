pub mod api;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod matching;
pub mod normalize;
pub mod types;
pub mod utils;

pub use catalog::{CategoryDefinition, PrizeCatalog};
pub use error::*;
pub use extract::{Segmenter, extract_categories, extract_draw_number};
pub use matching::{MatchQuery, QueryLimits, check_ticket, match_ticket};
pub use normalize::normalize_ticket;
pub use types::*;
