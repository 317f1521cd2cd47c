use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

use crate::api::{DocumentSource, fetch_document_text, load_document_dir};
use crate::catalog::PrizeCatalog;
use crate::database::{draw_exists, save_draw};
use crate::error::IngestError;
use crate::extract::{extract_categories, extract_draw_number};
use crate::types::DrawInfo;
use crate::utils::format_draw_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    Stored { draw_id: i64, categories: usize, tickets: usize },
    AlreadyStored,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub ingested: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Extracts one document and stores the result.
///
/// Draws already stored are not extracted again. A document that yields no
/// category at all is an ingestion failure.
pub fn ingest_document(
    conn: &Connection,
    source: &DocumentSource,
    catalog: &PrizeCatalog,
) -> Result<IngestOutcome, IngestError> {
    let lottery = &source.info.lottery_name;
    let date = source.info.draw_date;

    if draw_exists(conn, lottery, date)? {
        info!(lottery = %lottery, date = %date, "draw already stored");
        return Ok(IngestOutcome::AlreadyStored);
    }

    let categories = extract_categories(&source.text, catalog);
    if categories.is_empty() {
        return Err(IngestError::NoCategories {
            lottery: lottery.clone(),
            date: format_draw_date(date),
        });
    }

    let mut info = source.info.clone();
    if info.draw_number.is_none() {
        info.draw_number = extract_draw_number(&source.text);
    }

    let tickets = categories.iter().map(|c| c.tickets.len()).sum();
    let draw_id = save_draw(conn, &info, &categories)?;
    info!(
        lottery = %lottery,
        date = %date,
        draw_id,
        categories = categories.len(),
        tickets,
        "draw stored"
    );

    Ok(IngestOutcome::Stored {
        draw_id,
        categories: categories.len(),
        tickets,
    })
}

/// Fetches a text document over HTTP and ingests it.
pub async fn ingest_url(
    conn: &Connection,
    url: &str,
    info: DrawInfo,
    catalog: &PrizeCatalog,
) -> Result<IngestOutcome, IngestError> {
    if draw_exists(conn, &info.lottery_name, info.draw_date)? {
        return Ok(IngestOutcome::AlreadyStored);
    }
    let text = fetch_document_text(url).await?;
    ingest_document(conn, &DocumentSource { info, text }, catalog)
}

/// Ingests every document in `dir`. One failing document does not stop the
/// run.
pub fn ingest_directory(
    conn: &Connection,
    dir: &Path,
    catalog: &PrizeCatalog,
) -> Result<IngestSummary, IngestError> {
    let loaded = load_document_dir(dir)?;
    let mut summary = IngestSummary {
        failed: loaded.unreadable,
        ..IngestSummary::default()
    };

    for document in &loaded.documents {
        match ingest_document(conn, document, catalog) {
            Ok(IngestOutcome::Stored { .. }) => summary.ingested += 1,
            Ok(IngestOutcome::AlreadyStored) => summary.skipped += 1,
            Err(e @ IngestError::NoCategories { .. }) => {
                warn!(source = %document.info.source, "{}", e);
                summary.failed += 1;
            }
            Err(e) => {
                error!(source = %document.info.source, "ingestion failed: {}", e);
                summary.failed += 1;
            }
        }
    }

    info!(
        ingested = summary.ingested,
        skipped = summary.skipped,
        failed = summary.failed,
        "ingestion run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_database_with_connection, get_draw_by_date};
    use chrono::NaiveDate;
    use std::fs;

    const DOCUMENT: &str = "Govisetha Draw No: 1200\n\
                            1st Prize Rs : 10,000,000\nDF 869610\n\
                            4th Prize Rs : 500\n038304630500\n\
                            Terms and Conditions\n";

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_database_with_connection(&conn).unwrap();
        conn
    }

    fn source(text: &str) -> DocumentSource {
        DocumentSource {
            info: DrawInfo {
                lottery_name: "Govisetha".to_string(),
                draw_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                draw_number: None,
                source: "test".to_string(),
            },
            text: text.to_string(),
        }
    }

    #[test]
    fn test_ingest_document_stores_and_skips_repeat() {
        let conn = memory_db();
        let catalog = PrizeCatalog::standard().unwrap();

        let outcome = ingest_document(&conn, &source(DOCUMENT), &catalog).unwrap();
        assert!(matches!(
            outcome,
            IngestOutcome::Stored { categories: 2, tickets: 4, .. }
        ));

        let again = ingest_document(&conn, &source(DOCUMENT), &catalog).unwrap();
        assert_eq!(again, IngestOutcome::AlreadyStored);

        let record = get_draw_by_date(&conn, "Govisetha", source(DOCUMENT).info.draw_date)
            .unwrap()
            .unwrap();
        assert_eq!(record.info.draw_number.as_deref(), Some("1200"));
    }

    #[test]
    fn test_document_without_categories_fails() {
        let conn = memory_db();
        let catalog = PrizeCatalog::standard().unwrap();
        let err = ingest_document(&conn, &source("blank page"), &catalog).unwrap_err();
        assert!(matches!(err, IngestError::NoCategories { .. }));
    }

    #[test]
    fn test_ingest_directory_summary() {
        let conn = memory_db();
        let catalog = PrizeCatalog::standard().unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("govisetha_2025-01-02.txt"), DOCUMENT).unwrap();
        fs::write(dir.path().join("govisetha_2025-01-09.txt"), "unreadable").unwrap();

        let summary = ingest_directory(&conn, dir.path(), &catalog).unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                ingested: 1,
                skipped: 0,
                failed: 1
            }
        );

        let rerun = ingest_directory(&conn, dir.path(), &catalog).unwrap();
        assert_eq!(rerun.skipped, 1);
        assert_eq!(rerun.failed, 1);
    }

    #[test]
    fn test_non_utf8_document_does_not_stop_run() {
        let conn = memory_db();
        let catalog = PrizeCatalog::standard().unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("govisetha_2025-01-02.txt"), DOCUMENT).unwrap();
        fs::write(dir.path().join("govisetha_2025-01-09.txt"), [0xff, 0xfe, 0x34, 0x0a]).unwrap();

        let summary = ingest_directory(&conn, dir.path(), &catalog).unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                ingested: 1,
                skipped: 0,
                failed: 1
            }
        );

        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(get_draw_by_date(&conn, "Govisetha", date).unwrap().is_some());
    }
}
