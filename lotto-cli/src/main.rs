mod display;
mod generator;
mod import;
mod simulate;
mod stats;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lotto_db::db::{
    count_draws, db_path, fetch_all_draws, fetch_last_draws, insert_draw, migrate, open_db,
    query_combinations,
};
use lotto_db::models::{validate_draw, ComboKind, Draw};

use crate::display::{
    display_combinations, display_draws, display_frequencies, display_generated,
    display_import_summary, display_missing, display_recalc_summary, display_simulation,
};
use crate::generator::presets::{AFFINITY_MIN_COUNT, AFFINITY_QUERY_LIMIT};
use crate::generator::{generate, preset_constraints, ConstraintSet, Preset};
use crate::stats::{engine::recalculate, missing_numbers, number_frequencies};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Balanced,
    Aggressive,
    Defensive,
    Custom,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Balanced => Preset::Balanced,
            PresetArg::Aggressive => Preset::Aggressive,
            PresetArg::Defensive => Preset::Defensive,
            PresetArg::Custom => Preset::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Pair,
    Triple,
    Quadruple,
}

impl From<KindArg> for ComboKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Pair => ComboKind::Pair,
            KindArg::Triple => ComboKind::Triple,
            KindArg::Quadruple => ComboKind::Quadruple,
        }
    }
}

#[derive(Parser)]
#[command(name = "lotto645", about = "Lotto 6/45 draw analytics and number generation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import draws from a CSV file
    Import {
        /// Path to the CSV file (round,date,n1..n6,bonus,prize_1st,prize_2nd,prize_3rd,winner_count)
        #[arg(short, long, default_value = "assets/lotto645.csv")]
        file: PathBuf,
    },

    /// Print the database path
    DbPath,

    /// List the most recent draws
    List {
        /// Number of draws to show
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Add a draw manually
    Add,

    /// Recompute the combination statistics tables from the full history
    Recalc,

    /// Show ranked combination statistics
    Combos {
        /// Combination kind
        #[arg(short, long, value_enum, default_value = "pair")]
        kind: KindArg,

        /// Number of rows to show
        #[arg(short, long, default_value = "20")]
        top: u32,

        /// Minimum co-occurrence count
        #[arg(short, long, default_value = "0")]
        min_count: u32,
    },

    /// Show appearance frequencies and missing-number ranges
    Stats {
        /// Analysis window (number of draws)
        #[arg(short, long, default_value = "100")]
        window: u32,

        /// Minimum absence (draws) to list a number as missing
        #[arg(short, long, default_value = "3")]
        min_gap: u32,
    },

    /// Generate number sets
    Generate {
        /// Generation strategy
        #[arg(short, long, value_enum, default_value = "balanced")]
        preset: PresetArg,

        /// Required numbers, comma separated (custom preset, max 3)
        #[arg(long, value_delimiter = ',')]
        include: Vec<u8>,

        /// Forbidden numbers, comma separated (custom preset, max 5)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<u8>,

        /// Odd:even split, e.g. 3:3 (custom preset)
        #[arg(long)]
        odd_even: Option<String>,

        /// Allowed decade bands 1-5, comma separated (custom preset)
        #[arg(long, value_delimiter = ',')]
        bands: Vec<u8>,

        /// Minimum sum of the 6 numbers (custom preset)
        #[arg(long)]
        sum_min: Option<u16>,

        /// Maximum sum of the 6 numbers (custom preset)
        #[arg(long)]
        sum_max: Option<u16>,

        /// Number of sets to generate
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Replay history against a fixed number set
    Simulate {
        /// The 6 numbers to play, comma separated
        #[arg(short, long, value_delimiter = ',')]
        numbers: Vec<u8>,

        /// Period in years, measured back from the newest draw
        #[arg(short, long, default_value = "10")]
        years: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Add => cmd_add(&conn),
        Command::Recalc => cmd_recalc(&conn),
        Command::Combos {
            kind,
            top,
            min_count,
        } => cmd_combos(&conn, kind.into(), top, min_count),
        Command::Stats { window, min_gap } => cmd_stats(&conn, window, min_gap),
        Command::Generate {
            preset,
            include,
            exclude,
            odd_even,
            bands,
            sum_min,
            sum_max,
            count,
            seed,
        } => {
            let custom = CustomOptions {
                include,
                exclude,
                odd_even,
                bands,
                sum_min,
                sum_max,
            };
            cmd_generate(&conn, preset.into(), custom, count, seed)
        }
        Command::Simulate { numbers, years } => cmd_simulate(&conn, &numbers, years),
    }
}

fn cmd_import(conn: &lotto_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &lotto_db::rusqlite::Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Empty database. Run first: lotto645 import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_recalc(conn: &lotto_db::rusqlite::Connection) -> Result<()> {
    let draws = fetch_all_draws(conn)?;
    if draws.is_empty() {
        println!("Empty database. Run first: lotto645 import");
        return Ok(());
    }
    println!("Analyzing {} draws...", draws.len());
    let table = recalculate(conn, &draws)?;
    display_recalc_summary(&table);
    Ok(())
}

fn cmd_combos(
    conn: &lotto_db::rusqlite::Connection,
    kind: ComboKind,
    top: u32,
    min_count: u32,
) -> Result<()> {
    let records = query_combinations(conn, kind, min_count, top)?;
    display_combinations(&records);
    Ok(())
}

fn cmd_stats(conn: &lotto_db::rusqlite::Connection, window: u32, min_gap: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Empty database. Run first: lotto645 import");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws(conn, effective_window)?;

    display_frequencies(&number_frequencies(&draws, effective_window as usize), effective_window);
    display_missing(&missing_numbers(&draws, min_gap), min_gap);
    Ok(())
}

struct CustomOptions {
    include: Vec<u8>,
    exclude: Vec<u8>,
    odd_even: Option<String>,
    bands: Vec<u8>,
    sum_min: Option<u16>,
    sum_max: Option<u16>,
}

fn parse_odd_even(raw: &str) -> Result<(u8, u8)> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 2 {
        bail!("Invalid odd:even format: '{}'", raw);
    }
    let odd: u8 = parts[0].parse().with_context(|| format!("Bad odd count '{}'", parts[0]))?;
    let even: u8 = parts[1].parse().with_context(|| format!("Bad even count '{}'", parts[1]))?;
    if u16::from(odd) + u16::from(even) != 6 {
        bail!("Odd and even counts must sum to 6, got {}:{}", odd, even);
    }
    Ok((odd, even))
}

fn custom_constraints(options: &CustomOptions) -> Result<ConstraintSet> {
    if options.include.len() > 3 {
        bail!("At most 3 include numbers are allowed");
    }
    if options.exclude.len() > 5 {
        bail!("At most 5 exclude numbers are allowed");
    }
    for &n in options.include.iter().chain(&options.exclude) {
        if n < 1 || n > 45 {
            bail!("Number {} out of range (1-45)", n);
        }
    }
    if options.include.iter().any(|n| options.exclude.contains(n)) {
        bail!("Include and exclude numbers overlap");
    }
    if options.bands.iter().any(|&b| b < 1 || b > 5) {
        bail!("Bands must be between 1 and 5");
    }
    let sum_range = match (options.sum_min, options.sum_max) {
        (None, None) => None,
        (min, max) => {
            let min = min.unwrap_or(21);
            let max = max.unwrap_or(255);
            if min > max {
                bail!("Sum range is empty: {} > {}", min, max);
            }
            Some((min, max))
        }
    };
    let odd_even = options
        .odd_even
        .as_deref()
        .map(parse_odd_even)
        .transpose()?;

    Ok(ConstraintSet {
        include: options.include.clone(),
        exclude: options.exclude.clone(),
        odd_even,
        bands: options.bands.clone(),
        sum_range,
        ..Default::default()
    })
}

fn cmd_generate(
    conn: &lotto_db::rusqlite::Connection,
    preset: Preset,
    options: CustomOptions,
    count: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let sets = if preset == Preset::Custom {
        let constraints = custom_constraints(&options)?;
        (0..count)
            .map(|_| generate(preset, &constraints, &mut rng))
            .collect::<Vec<_>>()
    } else {
        let n = count_draws(conn)?;
        if n == 0 {
            println!("Empty database. Run first: lotto645 import");
            return Ok(());
        }
        let draws = fetch_last_draws(conn, 1000)?;
        let pairs =
            query_combinations(conn, ComboKind::Pair, AFFINITY_MIN_COUNT, AFFINITY_QUERY_LIMIT)?;
        // Fresh seed numbers per set: each strategy pick re-samples its
        // recent/absent pools.
        (0..count)
            .map(|_| {
                let constraints = preset_constraints(preset, &draws, &pairs, &mut rng);
                generate(preset, &constraints, &mut rng)
            })
            .collect::<Vec<_>>()
    };

    display_generated(&sets, preset.name());
    Ok(())
}

fn cmd_simulate(conn: &lotto_db::rusqlite::Connection, numbers: &[u8], years: u32) -> Result<()> {
    if numbers.len() != 6 {
        bail!("Exactly 6 numbers are required, got {}", numbers.len());
    }
    let mut picks = [0u8; 6];
    picks.copy_from_slice(numbers);
    picks.sort();
    // Reuse draw validation; the bonus slot is irrelevant here.
    let dummy_bonus = (1..=45u8).find(|n| !picks.contains(n)).unwrap_or(1);
    validate_draw(&picks, dummy_bonus).context("Invalid number set")?;

    let n = count_draws(conn)?;
    if n == 0 {
        println!("Empty database. Run first: lotto645 import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, n)?;
    let report = simulate::simulate(&draws, &picks, years);
    display_simulation(&report, &picks, years);
    Ok(())
}

fn cmd_add(conn: &lotto_db::rusqlite::Connection) -> Result<()> {
    println!("Add a draw manually\n");

    let round: u32 = prompt("Round (e.g. 1101): ")?
        .parse()
        .context("Invalid round")?;
    let raw_date = prompt("Date (YYYY-MM-DD): ")?;
    let date = import::parse_date(&raw_date)?;
    let numbers = prompt_numbers()?;
    let bonus = prompt_bonus(&numbers)?;

    validate_draw(&numbers, bonus)?;

    let draw = Draw {
        round,
        date,
        numbers,
        bonus,
        prize_1st: 0,
        prize_2nd: 0,
        prize_3rd: 0,
        winner_count: 0,
    };

    println!("\nDraw to insert:");
    display_draws(&[draw.clone()]);

    let confirm = prompt("\nConfirm insert? (y/n): ")?;
    if confirm.trim().to_lowercase() == "y" {
        let inserted = insert_draw(conn, &draw)?;
        if inserted {
            println!("Draw inserted.");
        } else {
            println!("This round already exists (duplicate ignored).");
        }
    } else {
        println!("Insert cancelled.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input).context("Read error")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers() -> Result<[u8; 6]> {
    loop {
        let input = prompt("6 numbers (space separated, 1-45): ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 6 => {
                let arr = [v[0], v[1], v[2], v[3], v[4], v[5]];
                let bonus = (1..=45u8).find(|n| !arr.contains(n)).unwrap_or(1);
                if validate_draw(&arr, bonus).is_ok() {
                    return Ok(arr);
                }
                println!("Invalid numbers (1-45, no duplicates). Try again.");
            }
            _ => println!("Enter exactly 6 numbers. Try again."),
        }
    }
}

fn prompt_bonus(numbers: &[u8; 6]) -> Result<u8> {
    loop {
        let input = prompt("Bonus number (1-45): ")?;
        match input.parse::<u8>() {
            Ok(b) if validate_draw(numbers, b).is_ok() => return Ok(b),
            _ => println!("Invalid bonus (1-45, distinct from the 6 numbers). Try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_odd_even() {
        assert_eq!(parse_odd_even("3:3").unwrap(), (3, 3));
        assert_eq!(parse_odd_even("2:4").unwrap(), (2, 4));
        assert!(parse_odd_even("3:4").is_err());
        assert!(parse_odd_even("33").is_err());
        // Counts near u8::MAX must be rejected, not wrap around.
        assert!(parse_odd_even("200:200").is_err());
        assert!(parse_odd_even("255:7").is_err());
    }

    #[test]
    fn test_custom_constraints_validation() {
        let base = CustomOptions {
            include: vec![1, 2, 3],
            exclude: vec![4, 5],
            odd_even: Some("3:3".to_string()),
            bands: vec![1, 2, 3],
            sum_min: Some(80),
            sum_max: Some(200),
        };
        let constraints = custom_constraints(&base).unwrap();
        assert_eq!(constraints.include, vec![1, 2, 3]);
        assert_eq!(constraints.odd_even, Some((3, 3)));
        assert_eq!(constraints.sum_range, Some((80, 200)));

        let too_many = CustomOptions {
            include: vec![1, 2, 3, 4],
            exclude: vec![],
            odd_even: None,
            bands: vec![],
            sum_min: None,
            sum_max: None,
        };
        assert!(custom_constraints(&too_many).is_err());

        let overlap = CustomOptions {
            include: vec![1],
            exclude: vec![1],
            odd_even: None,
            bands: vec![],
            sum_min: None,
            sum_max: None,
        };
        assert!(custom_constraints(&overlap).is_err());

        let empty_sum = CustomOptions {
            include: vec![],
            exclude: vec![],
            odd_even: None,
            bands: vec![],
            sum_min: Some(200),
            sum_max: Some(100),
        };
        assert!(custom_constraints(&empty_sum).is_err());
    }
}
