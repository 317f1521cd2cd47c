use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use lotto_scan::api::DocumentSource;
use lotto_scan::catalog::PrizeCatalog;
use lotto_scan::database::*;
use lotto_scan::ingest::{ingest_document, ingest_url};
use lotto_scan::matching::{QueryLimits, check_ticket};
use lotto_scan::types::DrawInfo;
use lotto_scan::utils::parse_draw_date;

fn required_str<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing {} parameter", key))
}

fn required_date(arguments: &HashMap<String, Value>, key: &str) -> Result<NaiveDate> {
    let raw = required_str(arguments, key)?;
    parse_draw_date(raw)
        .ok_or_else(|| anyhow::anyhow!("Invalid {} '{}', expected YYYY-MM-DD", key, raw))
}

fn draw_info(arguments: &HashMap<String, Value>, default_source: &str) -> Result<DrawInfo> {
    Ok(DrawInfo {
        lottery_name: required_str(arguments, "lottery")?.to_string(),
        draw_date: required_date(arguments, "date")?,
        draw_number: arguments
            .get("draw_number")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        source: arguments
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or(default_source)
            .to_string(),
    })
}

pub struct DrawUseCase {
    connection: Arc<rusqlite::Connection>,
    catalog: Arc<PrizeCatalog>,
}

impl DrawUseCase {
    pub fn new(connection: Arc<rusqlite::Connection>, catalog: Arc<PrizeCatalog>) -> Self {
        Self {
            connection,
            catalog,
        }
    }

    pub async fn ingest_document_text(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let text = required_str(arguments, "text")?;
        let source = DocumentSource {
            info: draw_info(arguments, "inline")?,
            text: text.to_string(),
        };

        let outcome = ingest_document(&self.connection, &source, &self.catalog)?;

        Ok(json!({
            "success": true,
            "outcome": outcome
        })
        .to_string())
    }

    pub async fn ingest_document_url(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let url = required_str(arguments, "url")?;
        let info = draw_info(arguments, url)?;

        let outcome = ingest_url(&self.connection, url, info, &self.catalog).await?;

        Ok(json!({
            "success": true,
            "outcome": outcome
        })
        .to_string())
    }

    pub async fn get_draw_by_date(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery = required_str(arguments, "lottery")?;
        let date = required_date(arguments, "date")?;

        let result = get_draw_by_date(&self.connection, lottery, date)?;

        Ok(json!({
            "success": true,
            "result": result
        })
        .to_string())
    }

    pub async fn get_latest_draws(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let limit = arguments
            .get("limit")
            .and_then(|v| v.as_i64())
            .unwrap_or(10);

        let results = get_latest_draws(&self.connection, limit)?;

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }

    pub async fn get_draws_by_date_range(
        &self,
        arguments: &HashMap<String, Value>,
    ) -> Result<String> {
        let start_date = required_date(arguments, "start_date")?;
        let end_date = required_date(arguments, "end_date")?;

        let results = get_draws_by_date_range(&self.connection, start_date, end_date)?;

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }

    pub async fn search_ticket(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let number = required_str(arguments, "number")?;

        let results = search_ticket_number(&self.connection, number)?;

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }
}

pub struct TicketUseCase {
    connection: Arc<rusqlite::Connection>,
    limits: QueryLimits,
}

impl TicketUseCase {
    pub fn new(connection: Arc<rusqlite::Connection>, limits: QueryLimits) -> Self {
        Self { connection, limits }
    }

    /// Validation rejections are a normal answer here, not a tool error.
    pub async fn check_ticket(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery = required_str(arguments, "lottery")?;
        let date = required_date(arguments, "date")?;
        let ticket = required_str(arguments, "ticket")?;

        let record = get_draw_by_date(&self.connection, lottery, date)?;

        let response = match check_ticket(ticket, &self.limits, lottery, date, record.as_ref()) {
            Ok(result) => json!({
                "success": true,
                "result": result
            }),
            Err(e) => json!({
                "success": false,
                "reason": e.reason(),
                "message": e.to_string()
            }),
        };

        Ok(response.to_string())
    }
}
