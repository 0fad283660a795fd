#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, plays and replays Grid Tactics matches.

mod autoplay;
mod render;
mod snapshot_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grid_tactics_core::{Entity, EntityArena, EntityKind, GameAction};
use grid_tactics_system_combat::{Scene, Simulator};
use grid_tactics_system_terrain::{generate, GeneratedMap, GeneratorConfig};
use grid_tactics_system_visibility::{FogOfWar, DEFAULT_VISIBILITY_SIZE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Procedural tactics sandbox.
#[derive(Debug, Parser)]
#[command(name = "grid-tactics", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generates a map and prints it with the planned spawns.
    Generate {
        /// Seed for the map generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// TOML file overriding generator parameters.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Shows only what the player can see from the start tile.
        #[arg(long)]
        fog: bool,
    },
    /// Generates a map and plays it with a greedy player.
    Autoplay {
        /// Seed for the map generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// TOML file overriding generator parameters.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Player turns to play before giving up.
        #[arg(long, default_value_t = 200)]
        turns: u32,
    },
    /// Applies a JSON list of actions on top of a snapshot transfer string.
    Replay {
        /// Snapshot transfer string produced by `autoplay`.
        #[arg(long)]
        snapshot: String,
        /// JSON file holding an array of actions.
        #[arg(long)]
        actions: PathBuf,
    },
}

/// Entry point for the Grid Tactics command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    match Cli::parse().command {
        Command::Generate { seed, config, fog } => run_generate(seed, config, fog),
        Command::Autoplay {
            seed,
            config,
            turns,
        } => run_autoplay(seed, config, turns),
        Command::Replay { snapshot, actions } => run_replay(&snapshot, &actions),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_toml_file(&path)
            .with_context(|| format!("loading generator config {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn generate_map(seed: u64, config: Option<PathBuf>) -> Result<GeneratedMap> {
    let config = load_config(config)?;
    let map = generate(&config, &mut ChaCha8Rng::seed_from_u64(seed));
    println!(
        "seed {seed}: {}x{} map after {} attempt(s){}",
        map.world.rows(),
        map.world.cols(),
        map.attempts,
        if map.fallback { " (fallback)" } else { "" }
    );
    Ok(map)
}

fn run_generate(seed: u64, config: Option<PathBuf>, fog: bool) -> Result<()> {
    let map = generate_map(seed, config)?;
    let entities = EntityArena::from_entities(map.entities());

    let view = fog.then(|| {
        let mut fog = FogOfWar::new();
        let _ = fog.reveal(&map.world, map.spawns.player, DEFAULT_VISIBILITY_SIZE);
        fog
    });
    print!("{}", render::render_map(&map.world, &entities, view.as_ref()));

    for entity in entities.iter() {
        println!("{}", describe(entity));
    }
    Ok(())
}

fn run_autoplay(seed: u64, config: Option<PathBuf>, turns: u32) -> Result<()> {
    let map = generate_map(seed, config)?;
    let report = autoplay::autoplay(&map, turns)?;
    let simulator = &report.simulator;

    print!("{}", render::render_map(simulator.world(), simulator.entities(), None));
    println!(
        "result: {:?} after {} turn(s), {} action(s)",
        simulator.result(),
        report.turns,
        simulator.action_log().len()
    );
    let transfer = snapshot_transfer::encode_snapshot(&simulator.take_snapshot())
        .context("encoding final snapshot")?;
    println!("{transfer}");
    Ok(())
}

fn run_replay(snapshot: &str, actions_path: &Path) -> Result<()> {
    let snapshot =
        snapshot_transfer::decode_snapshot(snapshot).context("decoding snapshot string")?;
    let source = fs::read_to_string(actions_path)
        .with_context(|| format!("reading actions from {}", actions_path.display()))?;
    let actions: Vec<GameAction> = serde_json::from_str(&source)
        .with_context(|| format!("parsing actions from {}", actions_path.display()))?;

    let replayed = Simulator::replay_from_snapshot(&snapshot, &actions, Entity::from_snapshot);
    tracing::info!(
        replayed = actions.len(),
        logged = replayed.action_log.len(),
        "replayed actions"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&replayed).context("serialising replayed snapshot")?
    );
    Ok(())
}

fn describe(entity: &Entity) -> String {
    let role = match entity.kind {
        EntityKind::Player => "player",
        EntityKind::Enemy => "enemy",
        EntityKind::Npc => "npc",
    };
    match entity.combatant {
        Some(combatant) => format!(
            "{role} #{} at {} ({}/{} hp)",
            entity.id,
            entity.position,
            combatant.health(),
            combatant.max_health()
        ),
        None => format!("{role} #{} at {}", entity.id, entity.position),
    }
}
