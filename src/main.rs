use std::path::PathBuf;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use coup_engine::{EngineConfig, MatchManager, MatchStore, MemoryStore, COPIES_PER_CHARACTER, TOTAL_COINS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Coup rules engine", long_about = None)]
struct Args {
    /// JSON engine config; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play random legal intents through the match manager and check the invariants after each one.
    Simulate {
        #[arg(short, long, default_value_t = 10)]
        matches: usize,

        #[arg(short, long)]
        players: Option<usize>,

        #[arg(short, long)]
        seed: Option<u64>,

        /// Intents per match before giving up on a winner.
        #[arg(long, default_value_t = 1000)]
        max_steps: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match args.command {
        Command::Simulate { matches, players, seed, max_steps } => {
            if let Some(players) = players {
                config.default_player_count = players;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            config.validate()?;
            simulate(config, matches, max_steps).await
        }
    }
}

async fn simulate(config: EngineConfig, matches: usize, max_steps: usize) -> anyhow::Result<()> {
    let mut rng = match config.seed {
        Some(seed) => Pcg64::seed_from_u64(seed.wrapping_add(1)),
        None => Pcg64::from_entropy(),
    };
    let manager = MatchManager::new(MemoryStore::new(), config);
    info!(config = ?manager.config(), matches, max_steps, "simulation started");

    let mut decided = 0;
    for _ in 0..matches {
        let mut record = manager.create_match(None).await?;
        let match_id = record.id.clone();

        let mut steps = 0;
        while record.winner().is_none() && steps < max_steps {
            let intents = record.intents();
            if intents.is_empty() {
                bail!("no legal intents in match {match_id}: {:?}", record);
            }
            let intent = intents[rng.gen_range(0..intents.len())].clone();

            record = manager.apply(&match_id, intent).await?;
            steps += 1;

            if record.card_counts() != [COPIES_PER_CHARACTER; 5] {
                bail!("card count broken in match {match_id}: {:?}", record.card_counts());
            }
            if record.total_coins() != TOTAL_COINS {
                bail!("coin count broken in match {match_id}: {}", record.total_coins());
            }
        }

        match record.winner() {
            Some(winner) => {
                decided += 1;
                info!(%match_id, winner, steps, treasury = record.treasury, "match decided");
            }
            None => warn!(%match_id, steps, "match undecided"),
        }

        manager.end_match(&match_id).await?;
    }

    info!(matches, decided, remaining = manager.store().list_ids().await?.len(), "simulation finished");
    Ok(())
}
