use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use lotto_db::models::{CombinationRecord, Draw};

use crate::generator::constraints::{ConstraintSet, Preset};
use crate::stats::{last_seen_gaps, latest_round_numbers, missing_numbers, number_frequencies};

/// Pair-count floor for a combination to qualify as an affinity partner.
pub const AFFINITY_MIN_COUNT: u32 = 30;
pub const AFFINITY_QUERY_LIMIT: u32 = 100;

const ODD_EVEN_CHOICES: [(u8, u8); 3] = [(2, 4), (3, 3), (4, 2)];

/// Derives a constraint set (seed numbers included) for one preset from
/// recent-draw statistics. `draws` is newest first; `affinity_pairs` are the
/// strongest stored pairs (count >= AFFINITY_MIN_COUNT, best first).
pub fn preset_constraints(
    preset: Preset,
    draws: &[Draw],
    affinity_pairs: &[CombinationRecord],
    rng: &mut StdRng,
) -> ConstraintSet {
    match preset {
        Preset::Balanced => balanced(draws, rng),
        Preset::Aggressive => {
            let frequent = frequent_numbers(draws);
            seeded_constraints(&frequent, draws, affinity_pairs, rng)
        }
        Preset::Defensive => {
            let oldest = longest_absent_numbers(draws);
            seeded_constraints(&oldest, draws, affinity_pairs, rng)
        }
        Preset::Custom => ConstraintSet::default(),
    }
}

/// 3 numbers seen in the last 5 draws plus 3 picked among the 10
/// longest-absent; fixed 3:3 parity and a 100-175 sum corridor.
fn balanced(draws: &[Draw], rng: &mut StdRng) -> ConstraintSet {
    let min_gap = (draws.len() as u32).min(10);
    let mut absent: Vec<u8> = missing_numbers(draws, min_gap)
        .into_iter()
        .take(10)
        .map(|g| g.number)
        .collect();
    absent.shuffle(rng);
    absent.truncate(3);

    let mut recent: Vec<u8> = Vec::new();
    for draw in draws.iter().take(5) {
        for n in draw.all_numbers() {
            if !recent.contains(&n) {
                recent.push(n);
            }
        }
    }
    recent.shuffle(rng);
    recent.truncate(3);

    let mut include = absent;
    for n in recent {
        if !include.contains(&n) {
            include.push(n);
        }
    }

    ConstraintSet {
        include,
        odd_even: Some((3, 3)),
        sum_range: Some((100, 175)),
        ..Default::default()
    }
}

/// Numbers by appearance count over the last 10 draws, most frequent first,
/// zero-count numbers dropped.
fn frequent_numbers(draws: &[Draw]) -> Vec<u8> {
    number_frequencies(draws, 10)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(n, _)| n)
        .collect()
}

/// Numbers by draws-since-last-appearance, longest absent first.
fn longest_absent_numbers(draws: &[Draw]) -> Vec<u8> {
    let mut gaps = last_seen_gaps(draws);
    gaps.sort_by(|a, b| b.gap.cmp(&a.gap).then_with(|| a.number.cmp(&b.number)));
    gaps.into_iter().map(|g| g.number).collect()
}

/// Shared aggressive/defensive seeding: top-3 from the ordered source list,
/// one latest-draw number if none landed among them, up to 2 affinity
/// partners of the list's first number, shortfall padded from the source.
fn seeded_constraints(
    ordered: &[u8],
    draws: &[Draw],
    affinity_pairs: &[CombinationRecord],
    rng: &mut StdRng,
) -> ConstraintSet {
    let latest = latest_round_numbers(draws);
    let mut seeds: Vec<u8> = ordered.iter().take(3).copied().collect();

    if !latest.is_empty() && !seeds.iter().any(|n| latest.contains(n)) {
        seeds.push(latest[rng.random_range(0..latest.len())]);
    }

    if let Some(&anchor) = ordered.first() {
        let has_latest = seeds.iter().any(|n| latest.contains(n));
        let mut partners: Vec<u8> = Vec::new();
        for pair in affinity_pairs {
            if pair.numbers.len() != 2 {
                continue;
            }
            let partner = if pair.numbers[0] == anchor {
                pair.numbers[1]
            } else if pair.numbers[1] == anchor {
                pair.numbers[0]
            } else {
                continue;
            };
            if seeds.contains(&partner) || partners.contains(&partner) {
                continue;
            }
            // A second latest-round number would break the exactly-one cap.
            if has_latest && latest.contains(&partner) {
                continue;
            }
            partners.push(partner);
        }
        partners.shuffle(rng);
        for partner in partners.into_iter().take(2) {
            if seeds.len() < 6 {
                seeds.push(partner);
            }
        }
    }

    for &n in ordered {
        if seeds.len() >= 6 {
            break;
        }
        if !seeds.contains(&n) {
            seeds.push(n);
        }
    }
    seeds.truncate(6);

    let odd_even = ODD_EVEN_CHOICES[rng.random_range(0..ODD_EVEN_CHOICES.len())];

    ConstraintSet {
        include: seeds,
        odd_even: Some(odd_even),
        latest_round: latest,
        ..Default::default()
    }
}
