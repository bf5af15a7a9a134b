use anyhow::{bail, Context, Result};
use lotto_db::rusqlite::Connection;
use std::path::Path;

use lotto_db::db::insert_draw;
use lotto_db::models::{validate_draw, Draw};

/// Accepts 2024-01-06, 2024.01.06 and 2024/01/06.
pub fn parse_date(raw: &str) -> Result<String> {
    let parts: Vec<&str> = raw
        .trim()
        .split(|c: char| c == '-' || c == '.' || c == '/')
        .collect();
    if parts.len() != 3 {
        bail!("Invalid date format: '{}'", raw);
    }
    let year: u16 = parts[0].parse().with_context(|| format!("Bad year in '{}'", raw))?;
    let month: u8 = parts[1].parse().with_context(|| format!("Bad month in '{}'", raw))?;
    let day: u8 = parts[2].parse().with_context(|| format!("Bad day in '{}'", raw))?;
    if month < 1 || month > 12 || day < 1 || day > 31 {
        bail!("Invalid date: '{}'", raw);
    }
    Ok(format!("{:04}-{:02}-{:02}", year, month, day))
}

fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Missing field at index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Cannot parse '{}' (index {})", s, idx))
    };

    let get_i64_or_zero = |idx: usize| -> i64 {
        get(idx)
            .ok()
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0)
    };

    let round: u32 = get(0)?
        .parse()
        .with_context(|| format!("Cannot parse round '{}'", get(0).unwrap_or_default()))?;
    let date = parse_date(&get(1)?)?;

    let numbers: [u8; 6] = [
        get_u8(2)?,
        get_u8(3)?,
        get_u8(4)?,
        get_u8(5)?,
        get_u8(6)?,
        get_u8(7)?,
    ];
    let bonus = get_u8(8)?;
    validate_draw(&numbers, bonus)?;

    Ok(Draw {
        round,
        date,
        numbers,
        bonus,
        prize_1st: get_i64_or_zero(9),
        prize_2nd: get_i64_or_zero(10),
        prize_3rd: get_i64_or_zero(11),
        winner_count: get_i64_or_zero(12) as i32,
    })
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Cannot start transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => match insert_draw(&tx, &draw) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        eprintln!("Insert error on record {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    eprintln!("Parse error on record {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("Read error on record {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Commit failed")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-06").unwrap(), "2024-01-06");
        assert_eq!(parse_date("2024.01.06").unwrap(), "2024-01-06");
        assert_eq!(parse_date("2024/1/6").unwrap(), "2024-01-06");
        assert!(parse_date("06-01").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_parse_record() {
        let record = csv::StringRecord::from(vec![
            "1101",
            "2024.01.06",
            "3",
            "12",
            "19",
            "27",
            "33",
            "41",
            "8",
            "2512345678",
            "51234567",
            "1534567",
            "13",
        ]);
        let draw = parse_record(&record).unwrap();
        assert_eq!(draw.round, 1101);
        assert_eq!(draw.date, "2024-01-06");
        assert_eq!(draw.numbers, [3, 12, 19, 27, 33, 41]);
        assert_eq!(draw.bonus, 8);
        assert_eq!(draw.prize_1st, 2_512_345_678);
        assert_eq!(draw.winner_count, 13);
    }

    #[test]
    fn test_parse_record_missing_prizes() {
        let record = csv::StringRecord::from(vec![
            "1", "2024-01-06", "1", "2", "3", "4", "5", "6", "7",
        ]);
        let draw = parse_record(&record).unwrap();
        assert_eq!(draw.prize_1st, 0);
        assert_eq!(draw.winner_count, 0);
    }

    #[test]
    fn test_parse_record_rejects_invalid_numbers() {
        let record = csv::StringRecord::from(vec![
            "1", "2024-01-06", "1", "2", "3", "4", "5", "46", "7",
        ]);
        assert!(parse_record(&record).is_err());
        let record = csv::StringRecord::from(vec![
            "1", "2024-01-06", "1", "2", "3", "4", "5", "5", "7",
        ]);
        assert!(parse_record(&record).is_err());
    }
}
