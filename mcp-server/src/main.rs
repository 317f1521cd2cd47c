use anyhow::Result;
use std::sync::Arc;

use lotto_scan::catalog::PrizeCatalog;
use lotto_scan::config;
use lotto_scan::database::open_database;

mod mcp_handler;
mod use_cases;

use mcp_handler::{MCPHandler, stdio};
use use_cases::{DrawUseCase, TicketUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("lotto-scan MCP server starting");

    let db_conn = open_database(&config.database_url)?;
    let db_conn_arc = Arc::new(db_conn);
    let catalog = Arc::new(PrizeCatalog::standard()?);

    let draw_use_case = DrawUseCase::new(Arc::clone(&db_conn_arc), catalog);
    let ticket_use_case = TicketUseCase::new(Arc::clone(&db_conn_arc), config.limits);

    let handler = MCPHandler::new(Arc::new(draw_use_case), Arc::new(ticket_use_case));

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
