use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Result};
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::types::{DrawInfo, DrawRecord, DrawRow, PrizeCategory, TicketHit, TicketIdentifier};
use crate::utils::{format_draw_date, parse_draw_date};

pub fn open_database(database_url: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create {}: {}", parent.display(), e)),
                )
            })?;
        }
    }

    let conn = Connection::open(database_url)?;
    create_database_with_connection(&conn)?;
    info!(path = database_url, "database ready");
    Ok(conn)
}

pub fn create_database_with_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS draws (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lottery_name TEXT NOT NULL,
            draw_date TEXT NOT NULL,
            draw_number TEXT,
            source TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (lottery_name, draw_date)
        );

        CREATE TABLE IF NOT EXISTS prize_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            draw_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            category_rank INTEGER NOT NULL,
            amount TEXT NOT NULL,
            UNIQUE (draw_id, name),
            FOREIGN KEY (draw_id) REFERENCES draws (id)
        );

        CREATE TABLE IF NOT EXISTS winning_tickets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL,
            raw_text TEXT NOT NULL,
            series TEXT,
            number TEXT NOT NULL,
            position INTEGER NOT NULL,
            UNIQUE (category_id, raw_text),
            FOREIGN KEY (category_id) REFERENCES prize_categories (id)
        );

        CREATE INDEX IF NOT EXISTS idx_winning_tickets_number ON winning_tickets (number);",
    )
}

/// Stores a draw and its categories. Returns the draw id.
///
/// A draw already stored for the same lottery and date keeps its row; a
/// category name already stored for the draw is ignored.
pub fn save_draw(conn: &Connection, info: &DrawInfo, categories: &[PrizeCategory]) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let draw_date = format_draw_date(info.draw_date);

    tx.execute(
        "INSERT OR IGNORE INTO draws (lottery_name, draw_date, draw_number, source)
         VALUES (?1, ?2, ?3, ?4)",
        (&info.lottery_name, &draw_date, &info.draw_number, &info.source),
    )?;

    let draw_id: i64 = tx.query_row(
        "SELECT id FROM draws WHERE lottery_name = ?1 AND draw_date = ?2",
        (&info.lottery_name, &draw_date),
        |row| row.get(0),
    )?;

    for category in categories {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO prize_categories (draw_id, name, category_rank, amount)
             VALUES (?1, ?2, ?3, ?4)",
            (draw_id, &category.name, category.rank, category.amount.to_string()),
        )?;
        if inserted == 0 {
            continue;
        }
        let category_id = tx.last_insert_rowid();

        for (position, ticket) in category.tickets.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO winning_tickets
                 (category_id, raw_text, series, number, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    category_id,
                    ticket.to_string(),
                    &ticket.series,
                    &ticket.number,
                    position as i64,
                ),
            )?;
        }
    }

    tx.commit()?;
    Ok(draw_id)
}

pub fn draw_exists(conn: &Connection, lottery_name: &str, date: NaiveDate) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE lottery_name = ?1 AND draw_date = ?2",
        (lottery_name, format_draw_date(date)),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Loads a full draw with categories in rank order and tickets in printed
/// order.
pub fn get_draw_by_date(
    conn: &Connection,
    lottery_name: &str,
    date: NaiveDate,
) -> Result<Option<DrawRecord>> {
    let row = conn
        .query_row(
            "SELECT id, lottery_name, draw_date, draw_number, source
             FROM draws WHERE lottery_name = ?1 AND draw_date = ?2",
            (lottery_name, format_draw_date(date)),
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((id, lottery_name, draw_date, draw_number, source)) = row else {
        return Ok(None);
    };

    let info = DrawInfo {
        lottery_name,
        draw_date: parse_draw_date(&draw_date).unwrap_or(date),
        draw_number,
        source,
    };
    let categories = get_categories_by_draw_id(conn, id)?;

    Ok(Some(DrawRecord {
        id,
        info,
        categories,
    }))
}

fn get_categories_by_draw_id(conn: &Connection, draw_id: i64) -> Result<Vec<PrizeCategory>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category_rank, amount FROM prize_categories
         WHERE draw_id = ?1 ORDER BY category_rank, id",
    )?;
    let category_iter = stmt.query_map([draw_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u32>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut categories = Vec::new();
    for category in category_iter {
        let (id, name, rank, amount) = category?;
        let amount = Decimal::from_str(&amount).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        categories.push(PrizeCategory {
            name,
            rank,
            amount,
            tickets: get_tickets_by_category_id(conn, id)?,
        });
    }
    Ok(categories)
}

fn get_tickets_by_category_id(
    conn: &Connection,
    category_id: i64,
) -> Result<Vec<TicketIdentifier>> {
    let mut stmt = conn.prepare(
        "SELECT raw_text, series, number FROM winning_tickets
         WHERE category_id = ?1 ORDER BY position",
    )?;
    let ticket_iter = stmt.query_map([category_id], |row| {
        Ok(TicketIdentifier {
            raw_text: row.get(0)?,
            series: row.get(1)?,
            number: row.get(2)?,
        })
    })?;

    let mut tickets = Vec::new();
    for ticket in ticket_iter {
        tickets.push(ticket?);
    }
    Ok(tickets)
}

fn draw_row(row: &rusqlite::Row<'_>) -> Result<DrawRow> {
    Ok(DrawRow {
        id: row.get(0)?,
        lottery_name: row.get(1)?,
        draw_date: row.get(2)?,
        draw_number: row.get(3)?,
        source: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn get_latest_draws(conn: &Connection, limit: i64) -> Result<Vec<DrawRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, lottery_name, draw_date, draw_number, source, created_at
         FROM draws
         ORDER BY draw_date DESC, lottery_name
         LIMIT ?1",
    )?;
    let draw_iter = stmt.query_map([limit], draw_row)?;

    let mut results = Vec::new();
    for draw in draw_iter {
        results.push(draw?);
    }
    Ok(results)
}

pub fn get_draws_by_date_range(
    conn: &Connection,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<DrawRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, lottery_name, draw_date, draw_number, source, created_at
         FROM draws
         WHERE draw_date >= ?1 AND draw_date <= ?2
         ORDER BY draw_date DESC, lottery_name",
    )?;
    let draw_iter = stmt.query_map(
        [format_draw_date(start_date), format_draw_date(end_date)],
        draw_row,
    )?;

    let mut results = Vec::new();
    for draw in draw_iter {
        results.push(draw?);
    }
    Ok(results)
}

/// Winning tickets whose number contains `number`, newest draws first.
/// Stored tickets whose number contains `number` as a literal substring.
pub fn search_ticket_number(conn: &Connection, number: &str) -> Result<Vec<TicketHit>> {
    let mut stmt = conn.prepare(
        "SELECT d.lottery_name, d.draw_date, pc.name, pc.amount, wt.raw_text
         FROM winning_tickets wt
         JOIN prize_categories pc ON wt.category_id = pc.id
         JOIN draws d ON pc.draw_id = d.id
         WHERE wt.number LIKE ?1 ESCAPE '\\'
         ORDER BY d.draw_date DESC, pc.category_rank, wt.position",
    )?;

    let search_pattern = format!("%{}%", escape_like(number));
    let hit_iter = stmt.query_map([&search_pattern], |row| {
        Ok(TicketHit {
            lottery_name: row.get(0)?,
            draw_date: row.get(1)?,
            category: row.get(2)?,
            amount: row.get(3)?,
            ticket: row.get(4)?,
        })
    })?;

    let mut results = Vec::new();
    for hit in hit_iter {
        results.push(hit?);
    }
    Ok(results)
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
