use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

use lotto_scan::catalog::PrizeCatalog;
use lotto_scan::config;
use lotto_scan::database::{get_draw_by_date, open_database};
use lotto_scan::ingest::{ingest_directory, ingest_url};
use lotto_scan::matching::check_ticket;
use lotto_scan::types::DrawInfo;
use lotto_scan::utils::parse_draw_date;

const USAGE: &str = "usage:
  lotto-scan ingest [dir]
  lotto-scan fetch <url> <lottery> <YYYY-MM-DD>
  lotto-scan check <lottery> <YYYY-MM-DD> <ticket>";

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter(env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let conn = open_database(&config.database_url)?;
    let catalog = PrizeCatalog::standard()?;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["ingest"] | [] => {
            let dir = PathBuf::from(&config.document_dir);
            let summary = ingest_directory(&conn, &dir, &catalog)
                .with_context(|| format!("reading {}", dir.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        ["ingest", dir] => {
            let summary = ingest_directory(&conn, &PathBuf::from(*dir), &catalog)
                .with_context(|| format!("reading {}", dir))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        ["fetch", url, lottery, date] => {
            let draw_date = parse_date(date)?;
            let info = DrawInfo {
                lottery_name: lottery.to_string(),
                draw_date,
                draw_number: None,
                source: url.to_string(),
            };
            let outcome = ingest_url(&conn, url, info, &catalog).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ["check", lottery, date, ticket @ ..] if !ticket.is_empty() => {
            let draw_date = parse_date(date)?;
            let record = get_draw_by_date(&conn, lottery, draw_date)?;
            let result = check_ticket(
                &ticket.join(" "),
                &config.limits,
                lottery,
                draw_date,
                record.as_ref(),
            )?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate> {
    parse_draw_date(value).with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", value))
}
