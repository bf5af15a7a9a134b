use anyhow::{bail, Result};

/// One historical draw: 6 main numbers plus a bonus number.
#[derive(Debug, Clone)]
pub struct Draw {
    pub round: u32,
    pub date: String,
    pub numbers: [u8; 6],
    pub bonus: u8,
    pub prize_1st: i64,
    pub prize_2nd: i64,
    pub prize_3rd: i64,
    pub winner_count: i32,
}

impl Draw {
    /// The 6 main numbers plus the bonus, as drawn.
    pub fn all_numbers(&self) -> [u8; 7] {
        [
            self.numbers[0],
            self.numbers[1],
            self.numbers[2],
            self.numbers[3],
            self.numbers[4],
            self.numbers[5],
            self.bonus,
        ]
    }
}

pub fn validate_draw(numbers: &[u8; 6], bonus: u8) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > 45 {
            bail!("Number {} out of range (1-45)", n);
        }
    }
    if bonus < 1 || bonus > 45 {
        bail!("Bonus {} out of range (1-45)", bonus);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Duplicate number: {}", numbers[i]);
            }
        }
    }
    if numbers.contains(&bonus) {
        bail!("Bonus {} duplicates a main number", bonus);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComboKind {
    Pair,
    Triple,
    Quadruple,
}

impl ComboKind {
    pub fn size(&self) -> usize {
        match self {
            ComboKind::Pair => 2,
            ComboKind::Triple => 3,
            ComboKind::Quadruple => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComboKind::Pair => "pair",
            ComboKind::Triple => "triple",
            ComboKind::Quadruple => "quadruple",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "pair" => Ok(ComboKind::Pair),
            "triple" => Ok(ComboKind::Triple),
            "quadruple" => Ok(ComboKind::Quadruple),
            _ => bail!("Unknown combination kind: '{}'", s),
        }
    }
}

impl std::fmt::Display for ComboKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pairs at or above the mean co-occurrence count are affinity, the rest conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairClass {
    Affinity,
    Conflict,
}

impl PairClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairClass::Affinity => "affinity",
            PairClass::Conflict => "conflict",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "affinity" => Ok(PairClass::Affinity),
            "conflict" => Ok(PairClass::Conflict),
            _ => bail!("Unknown pair class: '{}'", s),
        }
    }
}

/// Co-occurrence statistics for one k-combination over the full history.
///
/// `rounds` lists every round the combination appeared in; a round is counted
/// at most once even when the subset is reachable through both the main pool
/// and the bonus-substituted pool of the same draw, so `count == rounds.len()`.
#[derive(Debug, Clone)]
pub struct CombinationRecord {
    pub kind: ComboKind,
    pub numbers: Vec<u8>,
    pub count: u32,
    pub rank: u32,
    pub rounds: Vec<u32>,
    pub class: Option<PairClass>,
}
