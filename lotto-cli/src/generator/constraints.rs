#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Balanced,
    Aggressive,
    Defensive,
    Custom,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Balanced => "balanced",
            Preset::Aggressive => "aggressive",
            Preset::Defensive => "defensive",
            Preset::Custom => "custom",
        }
    }
}

/// Structural constraints a generated set must satisfy. Empty collections and
/// `None` mean the constraint is inactive.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    pub include: Vec<u8>,
    pub exclude: Vec<u8>,
    pub odd_even: Option<(u8, u8)>,
    pub bands: Vec<u8>,
    pub sum_range: Option<(u16, u16)>,
    pub latest_round: Vec<u8>,
}

impl ConstraintSet {
    /// Aggressive and defensive sets cap latest-round inclusion at exactly one.
    pub fn caps_latest(&self, preset: Preset) -> bool {
        matches!(preset, Preset::Aggressive | Preset::Defensive) && !self.latest_round.is_empty()
    }
}

/// Decade band of a number: 1-10, 11-20, 21-30, 31-40, 41-45.
pub fn band(n: u8) -> u8 {
    match n {
        1..=10 => 1,
        11..=20 => 2,
        21..=30 => 3,
        31..=40 => 4,
        _ => 5,
    }
}

pub fn ones_digit(n: u8) -> u8 {
    n % 10
}

/// Length of the longest run of consecutive integers.
pub fn max_consecutive_run(numbers: &[u8]) -> usize {
    let mut sorted = numbers.to_vec();
    sorted.sort();
    let mut longest = 1;
    let mut current = 1;
    for pair in sorted.windows(2) {
        if pair[1] == pair[0] + 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    OddEven,
    SumRange,
    BandDiversity,
    ConsecutiveRun,
    OnesDigit,
    LatestRound,
    BandMembership,
}

/// All constraints a full 6-number candidate fails, empty when valid. The
/// checks only apply at size 6; partial sets are never judged.
pub fn violations(preset: Preset, constraints: &ConstraintSet, candidate: &[u8]) -> Vec<Violation> {
    let mut failed = Vec::new();

    if let Some((target_odd, target_even)) = constraints.odd_even {
        let odd = candidate.iter().filter(|n| *n % 2 == 1).count() as u8;
        let even = candidate.len() as u8 - odd;
        if odd != target_odd || even != target_even {
            failed.push(Violation::OddEven);
        }
    }

    if let Some((min, max)) = constraints.sum_range {
        let sum: u16 = candidate.iter().map(|&n| n as u16).sum();
        if sum < min || sum > max {
            failed.push(Violation::SumRange);
        }
    }

    if preset == Preset::Balanced {
        let mut band_counts = [0u8; 6];
        for &n in candidate {
            band_counts[band(n) as usize] += 1;
        }
        let distinct = band_counts.iter().filter(|&&c| c > 0).count();
        if distinct < 3 || band_counts.iter().any(|&c| c >= 4) {
            failed.push(Violation::BandDiversity);
        }
        if max_consecutive_run(candidate) > 2 {
            failed.push(Violation::ConsecutiveRun);
        }
    }

    if preset == Preset::Defensive {
        let mut digit_counts = [0u8; 10];
        for &n in candidate {
            digit_counts[ones_digit(n) as usize] += 1;
        }
        if digit_counts.iter().any(|&c| c > 2) {
            failed.push(Violation::OnesDigit);
        }
    }

    if constraints.caps_latest(preset) {
        let latest = candidate
            .iter()
            .filter(|n| constraints.latest_round.contains(n))
            .count();
        if latest != 1 {
            failed.push(Violation::LatestRound);
        }
    }

    if preset == Preset::Custom && !constraints.bands.is_empty() {
        if candidate.iter().any(|&n| !constraints.bands.contains(&band(n))) {
            failed.push(Violation::BandMembership);
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band() {
        assert_eq!(band(1), 1);
        assert_eq!(band(10), 1);
        assert_eq!(band(11), 2);
        assert_eq!(band(30), 3);
        assert_eq!(band(40), 4);
        assert_eq!(band(41), 5);
        assert_eq!(band(45), 5);
    }

    #[test]
    fn test_max_consecutive_run() {
        assert_eq!(max_consecutive_run(&[1, 2, 3, 10, 20, 30]), 3);
        assert_eq!(max_consecutive_run(&[5, 10, 15, 20, 25, 30]), 1);
        assert_eq!(max_consecutive_run(&[44, 45, 1, 2, 20, 30]), 2);
        assert_eq!(max_consecutive_run(&[40, 41, 42, 43, 44, 45]), 6);
    }

    #[test]
    fn test_odd_even_violation() {
        let constraints = ConstraintSet {
            odd_even: Some((3, 3)),
            ..Default::default()
        };
        assert!(violations(Preset::Custom, &constraints, &[1, 3, 5, 2, 4, 6]).is_empty());
        assert_eq!(
            violations(Preset::Custom, &constraints, &[1, 3, 5, 7, 2, 4]),
            vec![Violation::OddEven]
        );
    }

    #[test]
    fn test_sum_range_violation() {
        let constraints = ConstraintSet {
            sum_range: Some((100, 175)),
            ..Default::default()
        };
        assert!(violations(Preset::Custom, &constraints, &[10, 15, 20, 25, 30, 35]).is_empty());
        assert_eq!(
            violations(Preset::Custom, &constraints, &[1, 2, 3, 4, 5, 6]),
            vec![Violation::SumRange]
        );
    }

    #[test]
    fn test_balanced_band_checks() {
        let constraints = ConstraintSet::default();
        // Two bands only.
        assert!(violations(Preset::Balanced, &constraints, &[1, 3, 5, 11, 13, 15])
            .contains(&Violation::BandDiversity));
        // Four members in one band.
        assert!(violations(Preset::Balanced, &constraints, &[1, 3, 5, 7, 21, 31])
            .contains(&Violation::BandDiversity));
        // Three-long run.
        assert!(violations(Preset::Balanced, &constraints, &[1, 2, 3, 15, 25, 35])
            .contains(&Violation::ConsecutiveRun));
        assert!(violations(Preset::Balanced, &constraints, &[1, 2, 15, 25, 35, 45]).is_empty());
    }

    #[test]
    fn test_defensive_ones_digit() {
        let constraints = ConstraintSet::default();
        assert!(violations(Preset::Defensive, &constraints, &[3, 13, 23, 5, 15, 40])
            .contains(&Violation::OnesDigit));
        assert!(violations(Preset::Defensive, &constraints, &[3, 13, 24, 5, 15, 40]).is_empty());
    }

    #[test]
    fn test_latest_round_exactly_one() {
        let constraints = ConstraintSet {
            latest_round: vec![7, 8, 9],
            ..Default::default()
        };
        let ok = violations(Preset::Aggressive, &constraints, &[7, 1, 2, 3, 4, 5]);
        assert!(ok.is_empty());
        let none = violations(Preset::Aggressive, &constraints, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(none, vec![Violation::LatestRound]);
        let two = violations(Preset::Defensive, &constraints, &[7, 8, 1, 2, 3, 4]);
        assert_eq!(two, vec![Violation::LatestRound]);
        // Balanced ignores the rule.
        assert!(violations(Preset::Balanced, &constraints, &[11, 22, 1, 33, 44, 15]).is_empty());
    }

    #[test]
    fn test_custom_band_membership() {
        let constraints = ConstraintSet {
            bands: vec![1, 2],
            ..Default::default()
        };
        assert!(violations(Preset::Custom, &constraints, &[1, 5, 9, 11, 15, 19]).is_empty());
        assert_eq!(
            violations(Preset::Custom, &constraints, &[1, 5, 9, 11, 15, 41]),
            vec![Violation::BandMembership]
        );
    }
}
