use rand::rngs::StdRng;
use rand::Rng;

use crate::generator::constraints::{band, violations, ConstraintSet, Preset, Violation};

/// Sole termination authority for the retry loop: after this many failed
/// attempts the fallback set is returned.
pub const MAX_ATTEMPTS: usize = 100;

/// Produces one 6-number set for the given constraints, ascending. Never
/// fails: jointly unsatisfiable constraints degrade to a fallback honoring
/// only include/exclude, so callers needing strictness must re-validate.
pub fn generate(preset: Preset, constraints: &ConstraintSet, rng: &mut StdRng) -> [u8; 6] {
    for _ in 0..MAX_ATTEMPTS {
        if let Some(set) = attempt(preset, constraints, rng) {
            return set;
        }
    }
    fallback(constraints, rng)
}

fn in_range(n: u8) -> bool {
    (1..=45).contains(&n)
}

/// Seeds an attempt with the include numbers. When the latest-round cap is
/// active at most one latest-round number is seeded, and it takes the first
/// slot so the fill phase knows the cap is already spent.
fn seed(preset: Preset, constraints: &ConstraintSet) -> Vec<u8> {
    let usable = |n: u8| in_range(n) && !constraints.exclude.contains(&n);
    let mut result: Vec<u8> = Vec::with_capacity(6);

    if constraints.caps_latest(preset) {
        if let Some(&first) = constraints
            .include
            .iter()
            .find(|n| constraints.latest_round.contains(n))
        {
            if usable(first) {
                result.push(first);
            }
        }
        for &n in &constraints.include {
            if !constraints.latest_round.contains(&n) && usable(n) && !result.contains(&n) {
                result.push(n);
            }
        }
    } else {
        for &n in &constraints.include {
            if usable(n) && !result.contains(&n) {
                result.push(n);
            }
        }
    }

    result.truncate(6);
    result
}

fn attempt(preset: Preset, constraints: &ConstraintSet, rng: &mut StdRng) -> Option<[u8; 6]> {
    // Seed.
    let mut result = seed(preset, constraints);
    let caps = constraints.caps_latest(preset);

    let mut pool: Vec<u8> = (1..=45)
        .filter(|n| !result.contains(n) && !constraints.exclude.contains(n))
        .collect();
    if caps && result.iter().any(|n| constraints.latest_round.contains(n)) {
        pool.retain(|n| !constraints.latest_round.contains(n));
    }

    // Fill: uniform draw without replacement. Once a latest-round number
    // lands in the set, the rest of them leave the pool.
    while result.len() < 6 && !pool.is_empty() {
        let n = pool.remove(rng.random_range(0..pool.len()));
        result.push(n);
        if caps && constraints.latest_round.contains(&n) {
            pool.retain(|m| !constraints.latest_round.contains(m));
        }
    }
    if result.len() != 6 {
        return None;
    }

    // Validate, only at full size: most constraints are meaningless earlier.
    let failed = violations(preset, constraints, &result);
    if !failed.is_empty() {
        // Repair: a narrow miss on a single constraint gets one local fix
        // before the attempt is abandoned.
        let repaired = match failed.as_slice() {
            [Violation::OddEven] => repair_parity(&mut result, preset, constraints, rng),
            [Violation::BandDiversity] if preset == Preset::Balanced => {
                repair_bands(&mut result, constraints, rng)
            }
            _ => false,
        };
        if !repaired || !violations(preset, constraints, &result).is_empty() {
            return None;
        }
    }

    result.sort();
    let mut out = [0u8; 6];
    out.copy_from_slice(&result);
    Some(out)
}

/// Members eligible to be swapped out. Latest-round members are untouchable;
/// include numbers are only sacrificed when nothing else fits the bill, which
/// happens for preset seed sets but never for a satisfiable constraint set.
fn swap_victims<F: Fn(u8) -> bool>(
    result: &[u8],
    constraints: &ConstraintSet,
    caps: bool,
    eligible: F,
) -> Vec<usize> {
    let collect = |allow_includes: bool| -> Vec<usize> {
        result
            .iter()
            .enumerate()
            .filter(|(_, &n)| {
                eligible(n)
                    && (allow_includes || !constraints.include.contains(&n))
                    && !(caps && constraints.latest_round.contains(&n))
            })
            .map(|(i, _)| i)
            .collect()
    };
    let preferred = collect(false);
    if preferred.is_empty() {
        collect(true)
    } else {
        preferred
    }
}

/// Swaps wrong-parity members for unused numbers of the needed parity.
/// No second latest-round number is ever swapped in.
fn repair_parity(
    result: &mut [u8],
    preset: Preset,
    constraints: &ConstraintSet,
    rng: &mut StdRng,
) -> bool {
    let Some((target_odd, _)) = constraints.odd_even else {
        return false;
    };
    let caps = constraints.caps_latest(preset);

    let odd = result.iter().filter(|n| *n % 2 == 1).count() as i32;
    let needed = target_odd as i32 - odd;
    let (out_parity, in_parity) = if needed > 0 { (0u8, 1u8) } else { (1, 0) };

    for _ in 0..needed.abs() {
        let victims = swap_victims(result, constraints, caps, |n| n % 2 == out_parity);
        let mut candidates: Vec<u8> = (1..=45)
            .filter(|&n| {
                n % 2 == in_parity
                    && !result.contains(&n)
                    && !constraints.exclude.contains(&n)
                    && !(caps && constraints.latest_round.contains(&n))
            })
            .collect();
        if victims.is_empty() || candidates.is_empty() {
            return false;
        }
        let slot = victims[rng.random_range(0..victims.len())];
        result[slot] = candidates.swap_remove(rng.random_range(0..candidates.len()));
    }
    true
}

/// Moves one member of the fullest band into a band the set is missing.
fn repair_bands(result: &mut [u8], constraints: &ConstraintSet, rng: &mut StdRng) -> bool {
    let mut counts = [0u8; 6];
    for &n in result.iter() {
        counts[band(n) as usize] += 1;
    }
    let fullest = (1u8..=5).max_by_key(|&b| counts[b as usize]).unwrap();
    let missing: Vec<u8> = (1u8..=5).filter(|&b| counts[b as usize] == 0).collect();
    if missing.is_empty() {
        return false;
    }
    let target = missing[rng.random_range(0..missing.len())];

    let victims = swap_victims(result, constraints, false, |n| band(n) == fullest);
    let mut candidates: Vec<u8> = (1..=45)
        .filter(|&n| {
            band(n) == target && !result.contains(&n) && !constraints.exclude.contains(&n)
        })
        .collect();
    if victims.is_empty() || candidates.is_empty() {
        return false;
    }
    let slot = victims[rng.random_range(0..victims.len())];
    result[slot] = candidates.swap_remove(rng.random_range(0..candidates.len()));
    true
}

/// Best-effort set honoring only include/exclude. Guarantees termination when
/// the structural constraints are jointly unsatisfiable.
fn fallback(constraints: &ConstraintSet, rng: &mut StdRng) -> [u8; 6] {
    let mut result: Vec<u8> = Vec::with_capacity(6);
    for &n in &constraints.include {
        if in_range(n) && !result.contains(&n) {
            result.push(n);
        }
    }
    result.truncate(6);

    let mut pool: Vec<u8> = (1..=45)
        .filter(|n| !result.contains(n) && !constraints.exclude.contains(n))
        .collect();
    while result.len() < 6 && !pool.is_empty() {
        result.push(pool.swap_remove(rng.random_range(0..pool.len())));
    }

    result.sort();
    let mut out = [0u8; 6];
    out.copy_from_slice(&result);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn assert_well_formed(set: &[u8; 6]) {
        assert!(set.iter().all(|&n| (1..=45).contains(&n)));
        assert!(set.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_custom_constraints_honored() {
        let constraints = ConstraintSet {
            include: vec![1, 2, 3],
            odd_even: Some((3, 3)),
            sum_range: Some((80, 200)),
            ..Default::default()
        };
        for seed in 0..20 {
            let set = generate(Preset::Custom, &constraints, &mut rng(seed));
            assert_well_formed(&set);
            for n in [1, 2, 3] {
                assert!(set.contains(&n));
            }
            let odd = set.iter().filter(|n| *n % 2 == 1).count();
            assert_eq!(odd, 3);
            let sum: u16 = set.iter().map(|&n| n as u16).sum();
            assert!((80..=200).contains(&sum));
        }
    }

    #[test]
    fn test_exclude_honored() {
        let constraints = ConstraintSet {
            exclude: vec![1, 2, 3, 4, 5],
            ..Default::default()
        };
        for seed in 0..20 {
            let set = generate(Preset::Custom, &constraints, &mut rng(seed));
            assert_well_formed(&set);
            assert!(set.iter().all(|n| !constraints.exclude.contains(n)));
        }
    }

    #[test]
    fn test_impossible_constraints_fall_back() {
        // All-odd with a sum cap below the smallest all-odd sum: unsatisfiable.
        let constraints = ConstraintSet {
            include: vec![2],
            odd_even: Some((6, 0)),
            sum_range: Some((6, 21)),
            ..Default::default()
        };
        let set = generate(Preset::Custom, &constraints, &mut rng(7));
        assert_well_formed(&set);
        assert!(set.contains(&2));
    }

    #[test]
    fn test_latest_round_exactly_one() {
        let constraints = ConstraintSet {
            include: vec![7, 20],
            latest_round: vec![7, 8, 9, 10, 11, 12, 13],
            ..Default::default()
        };
        for seed in 0..20 {
            for preset in [Preset::Aggressive, Preset::Defensive] {
                let set = generate(preset, &constraints, &mut rng(seed));
                assert_well_formed(&set);
                let latest = set
                    .iter()
                    .filter(|n| constraints.latest_round.contains(n))
                    .count();
                assert_eq!(latest, 1);
                assert!(set.contains(&7));
                assert!(set.contains(&20));
            }
        }
    }

    #[test]
    fn test_seed_caps_latest_includes() {
        let constraints = ConstraintSet {
            include: vec![8, 9, 20],
            latest_round: vec![8, 9],
            ..Default::default()
        };
        let seeded = seed(Preset::Defensive, &constraints);
        assert_eq!(seeded, vec![8, 20]);
        // Without the cap both latest numbers stay.
        let seeded = seed(Preset::Custom, &constraints);
        assert_eq!(seeded, vec![8, 9, 20]);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let constraints = ConstraintSet {
            odd_even: Some((2, 4)),
            ..Default::default()
        };
        let a = generate(Preset::Custom, &constraints, &mut rng(42));
        let b = generate(Preset::Custom, &constraints, &mut rng(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_repair_parity() {
        let constraints = ConstraintSet {
            odd_even: Some((3, 3)),
            ..Default::default()
        };
        let mut result = vec![1, 3, 5, 7, 9, 2];
        assert!(repair_parity(&mut result, Preset::Custom, &constraints, &mut rng(1)));
        let odd = result.iter().filter(|n| *n % 2 == 1).count();
        assert_eq!(odd, 3);
        let mut sorted = result.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
    }

    #[test]
    fn test_repair_parity_preserves_latest_member() {
        let constraints = ConstraintSet {
            odd_even: Some((2, 4)),
            latest_round: vec![9],
            ..Default::default()
        };
        let mut result = vec![9, 1, 3, 2, 4, 6];
        assert!(repair_parity(&mut result, Preset::Aggressive, &constraints, &mut rng(3)));
        assert!(result.contains(&9));
        let latest = result.iter().filter(|&&n| n == 9).count();
        assert_eq!(latest, 1);
        let odd = result.iter().filter(|n| *n % 2 == 1).count();
        assert_eq!(odd, 2);
    }

    #[test]
    fn test_repair_bands() {
        let constraints = ConstraintSet::default();
        let mut result = vec![1, 3, 5, 11, 13, 15];
        assert!(repair_bands(&mut result, &constraints, &mut rng(5)));
        let mut bands: Vec<u8> = result.iter().map(|&n| band(n)).collect();
        bands.sort();
        bands.dedup();
        assert_eq!(bands.len(), 3);
    }

    #[test]
    fn test_fallback_fills_six() {
        let constraints = ConstraintSet {
            include: vec![10, 20, 30],
            exclude: vec![1, 2, 3, 4, 5],
            ..Default::default()
        };
        let set = fallback(&constraints, &mut rng(11));
        assert_well_formed(&set);
        for n in [10, 20, 30] {
            assert!(set.contains(&n));
        }
        assert!(set.iter().all(|n| !constraints.exclude.contains(n)));
    }
}
