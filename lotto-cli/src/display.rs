use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use lotto_db::models::{CombinationRecord, Draw, PairClass};

use crate::import::ImportResult;
use crate::simulate::SimulationReport;
use crate::stats::NumberGap;
use crate::stats::engine::CombinationTable;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn numbers_str(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

/// 1,234,567 style grouping for won amounts.
pub fn format_won(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("No draws to display.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Round", "Date", "Numbers", "Bonus", "1st prize", "Winners"]);

    for draw in draws {
        let mut sorted = draw.numbers;
        sorted.sort();
        let prize = if draw.prize_1st > 0 {
            format!("{} won", format_won(draw.prize_1st))
        } else {
            "—".to_string()
        };
        table.add_row(vec![
            &draw.round.to_string(),
            &draw.date,
            &numbers_str(&sorted),
            &format!("{:2}", draw.bonus),
            &prize,
            &draw.winner_count.to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Records read       : {}", result.total_records);
    println!("  Inserted           : {}", result.inserted);
    println!("  Duplicates skipped : {}", result.skipped);
    if result.errors > 0 {
        println!("  Errors             : {}", result.errors);
    }
}

pub fn display_recalc_summary(table: &CombinationTable) {
    println!("Combination tables replaced:");
    println!("  Pairs      : {}", table.pairs.len());
    println!("  Triples    : {}", table.triples.len());
    println!("  Quadruples : {}", table.quadruples.len());
}

pub fn display_combinations(records: &[CombinationRecord]) {
    if records.is_empty() {
        println!("No combinations stored. Run: lotto645 recalc");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Rank", "Numbers", "Count", "Class", "Recent rounds"]);

    for record in records {
        let class_cell = match record.class {
            Some(PairClass::Affinity) => Cell::new("affinity").fg(Color::Green),
            Some(PairClass::Conflict) => Cell::new("conflict").fg(Color::Red),
            None => Cell::new("—"),
        };
        let recent: Vec<String> = record
            .rounds
            .iter()
            .rev()
            .take(5)
            .map(|r| r.to_string())
            .collect();
        table.add_row(vec![
            Cell::new(record.rank),
            Cell::new(numbers_str(&record.numbers)),
            Cell::new(record.count),
            class_cell,
            Cell::new(recent.join(", ")),
        ]);
    }

    println!("{table}");
}

pub fn display_frequencies(freq: &[(u8, u32)], window: u32) {
    println!("\nAppearances over the last {} draws (bonus included)\n", window);
    let mut table = new_table();
    table.set_header(vec!["Number", "Count"]);
    for (number, count) in freq {
        table.add_row(vec![&format!("{:2}", number), &count.to_string()]);
    }
    println!("{table}");
}

pub fn display_missing(missing: &[NumberGap], min_gap: u32) {
    if missing.is_empty() {
        println!("No number has been absent for {} draws or more.", min_gap);
        return;
    }
    println!("\nNumbers absent for at least {} draws\n", min_gap);
    let mut table = new_table();
    table.set_header(vec!["Number", "Draws absent"]);
    for gap in missing {
        table.add_row(vec![&format!("{:2}", gap.number), &gap.gap.to_string()]);
    }
    println!("{table}");
}

pub fn display_generated(sets: &[[u8; 6]], preset_name: &str) {
    println!("\nGenerated sets ({})\n", preset_name);
    let mut table = new_table();
    table.set_header(vec!["#", "Numbers", "Odd:Even", "Sum"]);
    for (i, set) in sets.iter().enumerate() {
        let odd = set.iter().filter(|n| *n % 2 == 1).count();
        let sum: u16 = set.iter().map(|&n| n as u16).sum();
        table.add_row(vec![
            &(i + 1).to_string(),
            &numbers_str(set),
            &format!("{}:{}", odd, 6 - odd),
            &sum.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_simulation(report: &SimulationReport, picks: &[u8; 6], years: u32) {
    println!(
        "\nBuying {} every round for {} years ({} draws)\n",
        numbers_str(picks),
        years,
        report.draw_count
    );
    println!("  Spent  : {} won", format_won(report.total_spent));
    println!("  Won    : {} won", format_won(report.total_won));
    let profit = report.profit();
    let sign = if profit >= 0 { "+" } else { "" };
    println!("  Profit : {}{} won", sign, format_won(profit));

    if report.wins.is_empty() {
        println!("\nNo winning rounds.");
        return;
    }

    println!("\nWinning rounds ({})\n", report.wins.len());
    let mut table = new_table();
    table.set_header(vec!["Round", "Date", "Numbers", "Bonus", "Rank", "Prize"]);
    for win in &report.wins {
        let mut sorted = win.numbers;
        sorted.sort();
        table.add_row(vec![
            &win.round.to_string(),
            &win.date,
            &numbers_str(&sorted),
            &format!("{:2}", win.bonus),
            &win.rank.to_string(),
            &format!("{} won", format_won(win.prize)),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_won() {
        assert_eq!(format_won(0), "0");
        assert_eq!(format_won(999), "999");
        assert_eq!(format_won(1_000), "1,000");
        assert_eq!(format_won(2_512_345_678), "2,512,345,678");
        assert_eq!(format_won(-50_000), "-50,000");
    }

    #[test]
    fn test_numbers_str() {
        assert_eq!(numbers_str(&[3, 12, 45]), " 3 - 12 - 45");
    }
}
