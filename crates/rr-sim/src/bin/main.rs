//! Reward Draw CLI
//!
//! Usage:
//!   reward-draw pool --catalog items.yaml              - Print a display pool
//!   reward-draw draw --catalog items.yaml --keys 3     - Run one full draw
//!   reward-draw simulate --catalog items.yaml --json   - Odds report

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use rr_draw::{
    Catalog, DrawConfig, DrawSession, InMemoryLedger, ManualTimer, Modifier, ReelEvent, SpinStart,
    TerminalBell, ThreadTimer,
};
use rr_sim::simulate_odds;

#[derive(Parser)]
#[command(name = "reward-draw", about = "Reward draw engine driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and print a display pool
    Pool {
        /// Catalog file (YAML or JSON)
        #[arg(short, long)]
        catalog: PathBuf,
        /// Engine config file (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run one draw through the reel and settle it
    Draw {
        #[arg(short, long)]
        catalog: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Draw context (normal, event, premium_lootbox, ...)
        #[arg(short, long, default_value = "normal")]
        modifier: String,
        /// Opaque draw context id forwarded to the ledger
        #[arg(long)]
        context: Option<String>,
        /// Keys in the in-memory ledger
        #[arg(short, long, default_value_t = 1)]
        keys: u32,
        /// Sleep through the real step schedule
        #[arg(long)]
        realtime: bool,
        /// Ring the terminal bell on every step
        #[arg(long)]
        bell: bool,
    },
    /// Estimate tier odds by repeated draws
    Simulate {
        #[arg(short, long)]
        catalog: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = "normal")]
        modifier: String,
        #[arg(short, long, default_value_t = 1_000_000)]
        trials: u64,
        #[arg(long)]
        seed: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Pool {
            catalog,
            config,
            seed,
        } => print_pool(&catalog, config.as_deref(), seed),
        Commands::Draw {
            catalog,
            config,
            seed,
            modifier,
            context,
            keys,
            realtime,
            bell,
        } => run_draw(
            &catalog,
            config.as_deref(),
            seed,
            &modifier,
            context,
            keys,
            realtime,
            bell,
        ),
        Commands::Simulate {
            catalog,
            config,
            modifier,
            trials,
            seed,
            json,
        } => run_simulation(&catalog, config.as_deref(), &modifier, trials, seed, json),
    }
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<DrawConfig> {
    let mut config = match path {
        Some(path) => DrawConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DrawConfig::default(),
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path).with_context(|| format!("Failed to load catalog {}", path.display()))
}

fn parse_modifier(name: &str) -> Result<Modifier> {
    name.parse::<Modifier>()
        .with_context(|| format!("Expected one of: {}", modifier_names()))
}

fn modifier_names() -> String {
    Modifier::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_pool(catalog: &Path, config: Option<&Path>, seed: Option<u64>) -> Result<()> {
    let config = load_config(config, seed)?;
    let catalog = load_catalog(catalog)?;
    let session = DrawSession::new(config, catalog, Box::new(InMemoryLedger::default()))?;
    let pool = session.pool();

    println!("Display pool: {} slots", pool.len());
    for (tier, count) in pool.tier_counts().iter() {
        println!("  {:<10} {:>3}", tier.name(), count);
    }
    println!("  {:<10} {:>3}", "(padding)", pool.placeholder_count());
    println!();
    for (index, slot) in pool.slots().iter().enumerate() {
        println!("{index:>4}  {:<10} {}", slot.tier().name(), slot.label());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_draw(
    catalog: &Path,
    config: Option<&Path>,
    seed: Option<u64>,
    modifier: &str,
    context: Option<String>,
    keys: u32,
    realtime: bool,
    bell: bool,
) -> Result<()> {
    let modifier = parse_modifier(modifier)?;
    let config = load_config(config, seed)?;
    let catalog = load_catalog(catalog)?;

    let ledger = InMemoryLedger::with_keys(keys);
    let mut session = DrawSession::new(config, catalog, Box::new(ledger.clone()))?;
    if bell {
        session = session.with_cue(Box::new(TerminalBell::new()));
    }

    let plan = match session.spin(modifier, context)? {
        SpinStart::Started(plan) => plan,
        SpinStart::AlreadySpinning => bail!("Reel is already spinning"),
    };
    println!(
        "Spinning {} steps ({:?} mapping, slot {})",
        plan.total_steps, plan.mapping, plan.winner_index
    );

    let mut clock = ManualTimer::new();
    let events = if realtime {
        session.run_to_completion(&mut ThreadTimer)
    } else {
        session.run_to_completion(&mut clock)
    };

    for event in &events {
        match event {
            ReelEvent::StepAdvanced { step, cursor } => {
                log::debug!("step {step} -> cursor {cursor}");
            }
            ReelEvent::Landed {
                outcome,
                winner_index,
                ..
            } => println!(
                "Landed: {} [{}] ({}) at slot {}",
                outcome.name, outcome.id, outcome.tier, winner_index
            ),
            ReelEvent::Settled { receipt } => println!(
                "Settled: entry #{}, {} keys remaining",
                receipt.entry_id, receipt.keys_remaining
            ),
            ReelEvent::SettlementFailed { error, .. } => println!("Settlement failed: {error}"),
        }
    }
    if !realtime {
        println!("Spin time: {:.0} ms", clock.elapsed_ms());
    }
    println!("Keys left: {}", ledger.keys());
    Ok(())
}

fn run_simulation(
    catalog: &Path,
    config: Option<&Path>,
    modifier: &str,
    trials: u64,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let modifier = parse_modifier(modifier)?;
    let config = load_config(config, None)?;
    let catalog = load_catalog(catalog)?;
    let seed = seed.or(config.seed).unwrap_or_else(rand::random);

    let report = simulate_odds(&config.weights, catalog.items(), modifier, trials, seed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} draws, modifier {}, seed {}",
        report.trials, report.modifier, report.seed
    );
    println!("{:<10} {:>10} {:>10} {:>10}", "tier", "wins", "observed", "expected");
    for odds in &report.tiers {
        println!(
            "{:<10} {:>10} {:>9.4}% {:>9.4}%",
            odds.tier.name(),
            odds.wins,
            odds.empirical * 100.0,
            odds.expected * 100.0
        );
    }
    println!("max deviation: {:.5}", report.max_deviation());
    Ok(())
}
