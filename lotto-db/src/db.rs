use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{ComboKind, CombinationRecord, Draw, PairClass};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    round         INTEGER PRIMARY KEY,
    date          TEXT NOT NULL,
    numbers       TEXT NOT NULL,
    bonus         INTEGER NOT NULL,
    prize_1st     INTEGER NOT NULL DEFAULT 0,
    prize_2nd     INTEGER NOT NULL DEFAULT 0,
    prize_3rd     INTEGER NOT NULL DEFAULT 0,
    winner_count  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS combination_stats (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    type     TEXT NOT NULL,
    numbers  TEXT NOT NULL,
    count    INTEGER NOT NULL,
    rank     INTEGER NOT NULL,
    rounds   TEXT NOT NULL,
    class    TEXT
);

CREATE INDEX IF NOT EXISTS idx_combination_stats_type_count
    ON combination_stats (type, count DESC);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotto645.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).context("Migration failed")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let numbers_json =
        serde_json::to_string(&draw.numbers).context("Failed to encode numbers")?;
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO draws (round, date, numbers, bonus, prize_1st, prize_2nd, prize_3rd, winner_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                draw.round,
                draw.date,
                numbers_json,
                draw.bonus,
                draw.prize_1st,
                draw.prize_2nd,
                draw.prize_3rd,
                draw.winner_count,
            ],
        )
        .context("Insert failed")?;
    Ok(changed > 0)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let n: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(n)
}

fn row_to_draw(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draw> {
    let numbers_json: String = row.get(2)?;
    let numbers: [u8; 6] = serde_json::from_str(&numbers_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Draw {
        round: row.get(0)?,
        date: row.get(1)?,
        numbers,
        bonus: row.get(3)?,
        prize_1st: row.get(4)?,
        prize_2nd: row.get(5)?,
        prize_3rd: row.get(6)?,
        winner_count: row.get(7)?,
    })
}

const DRAW_COLUMNS: &str =
    "round, date, numbers, bonus, prize_1st, prize_2nd, prize_3rd, winner_count";

/// Full history, oldest round first. Input order for the statistics batch.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM draws ORDER BY round ASC",
        DRAW_COLUMNS
    ))?;
    let draws = stmt
        .query_map([], row_to_draw)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(draws)
}

/// Most recent draws, newest round first.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM draws ORDER BY round DESC LIMIT ?1",
        DRAW_COLUMNS
    ))?;
    let draws = stmt
        .query_map([limit], row_to_draw)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(draws)
}

const INSERT_BATCH: usize = 500;

/// Replaces all stored combinations of one kind in a single transaction.
/// On any failure the transaction rolls back and the prior table stays
/// authoritative.
pub fn replace_combination_table(
    conn: &Connection,
    kind: ComboKind,
    records: &[CombinationRecord],
) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("Failed to start transaction")?;

    tx.execute(
        "DELETE FROM combination_stats WHERE type = ?1",
        [kind.as_str()],
    )
    .context("Failed to clear prior combinations")?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO combination_stats (type, numbers, count, rank, rounds, class)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for chunk in records.chunks(INSERT_BATCH) {
            for record in chunk {
                let numbers_json = serde_json::to_string(&record.numbers)
                    .context("Failed to encode combination numbers")?;
                let rounds_json = serde_json::to_string(&record.rounds)
                    .context("Failed to encode rounds")?;
                stmt.execute(rusqlite::params![
                    kind.as_str(),
                    numbers_json,
                    record.count,
                    record.rank,
                    rounds_json,
                    record.class.map(|c| c.as_str()),
                ])
                .context("Failed to insert combination")?;
            }
        }
    }

    tx.commit().context("Commit failed")?;
    Ok(())
}

fn row_to_combination(row: &rusqlite::Row<'_>) -> rusqlite::Result<CombinationRecord> {
    let kind_str: String = row.get(0)?;
    let numbers_json: String = row.get(1)?;
    let rounds_json: String = row.get(4)?;
    let class_str: Option<String> = row.get(5)?;

    fn conversion(
        idx: usize,
        e: Box<dyn std::error::Error + Send + Sync + 'static>,
    ) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e)
    }

    let kind = ComboKind::from_str(&kind_str).map_err(|e| conversion(0, e.into()))?;
    let numbers: Vec<u8> =
        serde_json::from_str(&numbers_json).map_err(|e| conversion(1, Box::new(e)))?;
    let rounds: Vec<u32> =
        serde_json::from_str(&rounds_json).map_err(|e| conversion(4, Box::new(e)))?;
    let class = match class_str {
        Some(s) => Some(PairClass::from_str(&s).map_err(|e| conversion(5, e.into()))?),
        None => None,
    };

    Ok(CombinationRecord {
        kind,
        numbers,
        count: row.get(2)?,
        rank: row.get(3)?,
        rounds,
        class,
    })
}

/// Ranked combinations of one kind with count >= min_count, best first.
pub fn query_combinations(
    conn: &Connection,
    kind: ComboKind,
    min_count: u32,
    limit: u32,
) -> Result<Vec<CombinationRecord>> {
    let mut stmt = conn.prepare(
        "SELECT type, numbers, count, rank, rounds, class FROM combination_stats
         WHERE type = ?1 AND count >= ?2
         ORDER BY count DESC, numbers ASC
         LIMIT ?3",
    )?;
    let records = stmt
        .query_map(
            rusqlite::params![kind.as_str(), min_count, limit],
            row_to_combination,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}
