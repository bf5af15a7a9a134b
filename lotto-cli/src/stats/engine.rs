use std::collections::BTreeMap;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use lotto_db::db::replace_combination_table;
use lotto_db::models::{ComboKind, CombinationRecord, Draw, PairClass, validate_draw};
use lotto_db::rusqlite::Connection;

use crate::stats::combos::Combinations;

/// Ranked co-occurrence statistics for the full history, one list per kind.
pub struct CombinationTable {
    pub pairs: Vec<CombinationRecord>,
    pub triples: Vec<CombinationRecord>,
    pub quadruples: Vec<CombinationRecord>,
}

impl CombinationTable {
    pub fn records(&self, kind: ComboKind) -> &[CombinationRecord] {
        match kind {
            ComboKind::Pair => &self.pairs,
            ComboKind::Triple => &self.triples,
            ComboKind::Quadruple => &self.quadruples,
        }
    }
}

struct Tally {
    count: u32,
    rounds: Vec<u32>,
}

/// Counting map keyed by the canonical ascending number vector, so that key
/// identity is structural rather than string-based.
type TallyMap = BTreeMap<Vec<u8>, Tally>;

fn record(map: &mut TallyMap, combo: Vec<u8>, round: u32) {
    let entry = map.entry(combo).or_insert(Tally {
        count: 0,
        rounds: Vec::new(),
    });
    // A round contributes at most once per combination even if the subset is
    // reachable through both the main and the bonus-substituted pool. Draws
    // arrive in ascending round order, so checking the tail suffices.
    if entry.rounds.last().copied() != Some(round) {
        entry.count += 1;
        entry.rounds.push(round);
    }
}

fn tally_draw(map: &mut TallyMap, draw: &Draw, k: usize) {
    let mut main = draw.numbers;
    main.sort();

    for combo in Combinations::new(&main, k) {
        record(map, combo, draw.round);
    }
    for sub in Combinations::new(&main, k - 1) {
        let mut combo = sub;
        combo.push(draw.bonus);
        combo.sort();
        record(map, combo, draw.round);
    }
}

/// Dense ranks over a count-descending list: ties share a rank, the rank
/// increases by one each time the count strictly decreases.
fn assign_ranks(records: &mut [CombinationRecord]) {
    let mut rank = 0u32;
    let mut previous: Option<u32> = None;
    for record in records.iter_mut() {
        if previous != Some(record.count) {
            rank += 1;
            previous = Some(record.count);
        }
        record.rank = rank;
    }
}

fn into_records(map: TallyMap, kind: ComboKind) -> Vec<CombinationRecord> {
    let mut records: Vec<CombinationRecord> = map
        .into_iter()
        .map(|(numbers, tally)| CombinationRecord {
            kind,
            numbers,
            count: tally.count,
            rank: 0,
            rounds: tally.rounds,
            class: None,
        })
        .collect();
    // Count descending, numbers ascending within ties: a total order, so
    // recomputation over unchanged history yields an identical table.
    records.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.numbers.cmp(&b.numbers)));
    assign_ranks(&mut records);
    records
}

fn classify_pairs(pairs: &mut [CombinationRecord]) {
    if pairs.is_empty() {
        return;
    }
    let mean = pairs.iter().map(|p| p.count as f64).sum::<f64>() / pairs.len() as f64;
    for pair in pairs.iter_mut() {
        pair.class = Some(if pair.count as f64 >= mean {
            PairClass::Affinity
        } else {
            PairClass::Conflict
        });
    }
}

/// One batch pass over the full history. Draws with invalid number arrays are
/// skipped; combinations that never co-occur produce no record.
pub fn compute_combination_stats(draws: &[Draw]) -> CombinationTable {
    compute_with_progress(draws, None)
}

fn compute_with_progress(draws: &[Draw], progress: Option<&ProgressBar>) -> CombinationTable {
    let mut ordered: Vec<&Draw> = draws
        .iter()
        .filter(|d| validate_draw(&d.numbers, d.bonus).is_ok())
        .collect();
    ordered.sort_by_key(|d| d.round);

    let mut pair_map = TallyMap::new();
    let mut triple_map = TallyMap::new();
    let mut quadruple_map = TallyMap::new();

    for draw in ordered {
        tally_draw(&mut pair_map, draw, 2);
        tally_draw(&mut triple_map, draw, 3);
        tally_draw(&mut quadruple_map, draw, 4);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let mut pairs = into_records(pair_map, ComboKind::Pair);
    classify_pairs(&mut pairs);

    CombinationTable {
        pairs,
        triples: into_records(triple_map, ComboKind::Triple),
        quadruples: into_records(quadruple_map, ComboKind::Quadruple),
    }
}

/// Recomputes the combination tables from scratch and replaces each stored
/// kind atomically. A failure while replacing leaves the prior tables intact.
pub fn recalculate(conn: &Connection, draws: &[Draw]) -> Result<CombinationTable> {
    let pb = ProgressBar::new(draws.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap()
        .progress_chars("=> "),
    );

    let table = compute_with_progress(draws, Some(&pb));
    pb.finish_and_clear();

    replace_combination_table(conn, ComboKind::Pair, &table.pairs)?;
    replace_combination_table(conn, ComboKind::Triple, &table.triples)?;
    replace_combination_table(conn, ComboKind::Quadruple, &table.quadruples)?;

    Ok(table)
}
