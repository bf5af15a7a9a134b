pub mod combos;
pub mod engine;

use lotto_db::models::Draw;

/// Gap is the number of draws since the number last appeared (main or bonus):
/// 0 means it came out in the most recent draw, history length means never.
#[derive(Debug, Clone, Copy)]
pub struct NumberGap {
    pub number: u8,
    pub gap: u32,
}

/// Appearance counts (main numbers and bonus) over the `window` most recent
/// draws. Input is expected newest first. Sorted by count descending, then
/// number ascending.
pub fn number_frequencies(draws: &[Draw], window: usize) -> Vec<(u8, u32)> {
    let mut counts = [0u32; 46];
    for draw in draws.iter().take(window) {
        for n in draw.all_numbers() {
            counts[n as usize] += 1;
        }
    }
    let mut freq: Vec<(u8, u32)> = (1..=45u8).map(|n| (n, counts[n as usize])).collect();
    freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    freq
}

/// Draws-since-last-appearance for every number 1..=45, newest-first input.
pub fn last_seen_gaps(draws: &[Draw]) -> Vec<NumberGap> {
    let mut gaps = [u32::MAX; 46];
    for (index, draw) in draws.iter().enumerate() {
        for n in draw.all_numbers() {
            let slot = &mut gaps[n as usize];
            if *slot == u32::MAX {
                *slot = index as u32;
            }
        }
    }
    (1..=45u8)
        .map(|n| NumberGap {
            number: n,
            gap: if gaps[n as usize] == u32::MAX {
                draws.len() as u32
            } else {
                gaps[n as usize]
            },
        })
        .collect()
}

/// Numbers absent for at least `min_gap` draws, longest-absent first.
pub fn missing_numbers(draws: &[Draw], min_gap: u32) -> Vec<NumberGap> {
    let mut missing: Vec<NumberGap> = last_seen_gaps(draws)
        .into_iter()
        .filter(|g| g.gap >= min_gap)
        .collect();
    missing.sort_by(|a, b| b.gap.cmp(&a.gap).then_with(|| a.number.cmp(&b.number)));
    missing
}

/// The 6 numbers plus bonus of the most recent draw, empty when no history.
pub fn latest_round_numbers(draws: &[Draw]) -> Vec<u8> {
    draws
        .first()
        .map(|d| d.all_numbers().to_vec())
        .unwrap_or_default()
}
