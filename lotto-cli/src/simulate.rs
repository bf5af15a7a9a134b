use chrono::{Months, NaiveDate};

use lotto_db::models::Draw;

pub const TICKET_PRICE: i64 = 1_000;

// Ranks 4 and 5 pay fixed statutory amounts; 1-3 vary per draw.
const PRIZE_4TH: i64 = 50_000;
const PRIZE_5TH: i64 = 5_000;

#[derive(Debug, Clone)]
pub struct WinRecord {
    pub round: u32,
    pub date: String,
    pub numbers: [u8; 6],
    pub bonus: u8,
    pub rank: u8,
    pub prize: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub draw_count: u32,
    pub total_spent: i64,
    pub total_won: i64,
    pub wins: Vec<WinRecord>,
}

impl SimulationReport {
    pub fn profit(&self) -> i64 {
        self.total_won - self.total_spent
    }
}

/// Winning rank for one ticket against one draw: 6 matches is 1st, 5 plus the
/// bonus is 2nd, 5 is 3rd, 4 is 4th, 3 is 5th.
pub fn win_rank(picks: &[u8; 6], draw: &Draw) -> Option<u8> {
    let matches = picks.iter().filter(|n| draw.numbers.contains(n)).count();
    let bonus_match = picks.contains(&draw.bonus);
    match (matches, bonus_match) {
        (6, _) => Some(1),
        (5, true) => Some(2),
        (5, false) => Some(3),
        (4, _) => Some(4),
        (3, _) => Some(5),
        _ => None,
    }
}

fn prize_for(rank: u8, draw: &Draw) -> i64 {
    match rank {
        1 => draw.prize_1st,
        2 => draw.prize_2nd,
        3 => draw.prize_3rd,
        4 => PRIZE_4TH,
        _ => PRIZE_5TH,
    }
}

/// Replays history with one ticket per round over the last `years` years,
/// measured back from the newest draw. Input is newest first; draws with
/// unparseable dates are skipped.
pub fn simulate(draws: &[Draw], picks: &[u8; 6], years: u32) -> SimulationReport {
    let mut report = SimulationReport::default();

    let newest = draws
        .first()
        .and_then(|d| NaiveDate::parse_from_str(&d.date, "%Y-%m-%d").ok());
    let cutoff = newest.and_then(|d| d.checked_sub_months(Months::new(12 * years)));

    for draw in draws {
        let Ok(date) = NaiveDate::parse_from_str(&draw.date, "%Y-%m-%d") else {
            continue;
        };
        if let Some(cutoff) = cutoff {
            if date < cutoff {
                continue;
            }
        }
        report.draw_count += 1;
        report.total_spent += TICKET_PRICE;

        if let Some(rank) = win_rank(picks, draw) {
            let prize = prize_for(rank, draw);
            report.total_won += prize;
            report.wins.push(WinRecord {
                round: draw.round,
                date: draw.date.clone(),
                numbers: draw.numbers,
                bonus: draw.bonus,
                rank,
                prize,
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(round: u32, date: &str, numbers: [u8; 6], bonus: u8) -> Draw {
        Draw {
            round,
            date: date.to_string(),
            numbers,
            bonus,
            prize_1st: 2_000_000_000,
            prize_2nd: 50_000_000,
            prize_3rd: 1_500_000,
            winner_count: 10,
        }
    }

    #[test]
    fn test_win_ranks() {
        let d = draw(1, "2024-01-06", [1, 2, 3, 4, 5, 6], 7);
        assert_eq!(win_rank(&[1, 2, 3, 4, 5, 6], &d), Some(1));
        assert_eq!(win_rank(&[1, 2, 3, 4, 5, 7], &d), Some(2));
        assert_eq!(win_rank(&[1, 2, 3, 4, 5, 45], &d), Some(3));
        assert_eq!(win_rank(&[1, 2, 3, 4, 44, 45], &d), Some(4));
        assert_eq!(win_rank(&[1, 2, 3, 43, 44, 45], &d), Some(5));
        assert_eq!(win_rank(&[1, 2, 42, 43, 44, 45], &d), None);
        // Bonus alone does not rescue a 4-match.
        assert_eq!(win_rank(&[1, 2, 3, 4, 7, 45], &d), Some(4));
    }

    #[test]
    fn test_simulation_totals() {
        let draws = vec![
            draw(3, "2024-01-20", [1, 2, 3, 4, 5, 6], 7),
            draw(2, "2024-01-13", [1, 2, 3, 40, 41, 42], 45),
            draw(1, "2024-01-06", [10, 20, 30, 40, 41, 42], 45),
        ];
        let report = simulate(&draws, &[1, 2, 3, 4, 5, 6], 1);

        assert_eq!(report.draw_count, 3);
        assert_eq!(report.total_spent, 3 * TICKET_PRICE);
        // Round 3 is a 1st-rank win, round 2 a 5th-rank (3 matches).
        assert_eq!(report.wins.len(), 2);
        assert_eq!(report.wins[0].rank, 1);
        assert_eq!(report.wins[1].rank, 5);
        assert_eq!(report.total_won, 2_000_000_000 + 5_000);
        assert_eq!(report.profit(), report.total_won - 3_000);
    }

    #[test]
    fn test_period_cutoff() {
        let draws = vec![
            draw(2, "2024-01-13", [10, 20, 30, 40, 41, 42], 45),
            draw(1, "2020-01-04", [10, 20, 30, 40, 41, 42], 45),
        ];
        let report = simulate(&draws, &[1, 2, 3, 4, 5, 6], 1);
        assert_eq!(report.draw_count, 1);
        assert_eq!(report.total_spent, TICKET_PRICE);
    }

    #[test]
    fn test_bad_dates_skipped() {
        let draws = vec![
            draw(2, "2024-01-13", [10, 20, 30, 40, 41, 42], 45),
            draw(1, "not-a-date", [10, 20, 30, 40, 41, 42], 45),
        ];
        let report = simulate(&draws, &[1, 2, 3, 4, 5, 6], 10);
        assert_eq!(report.draw_count, 1);
    }

    #[test]
    fn test_empty_history() {
        let report = simulate(&[], &[1, 2, 3, 4, 5, 6], 10);
        assert_eq!(report.draw_count, 0);
        assert_eq!(report.profit(), 0);
        assert!(report.wins.is_empty());
    }
}
