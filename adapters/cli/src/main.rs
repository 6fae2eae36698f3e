#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless arena session with a scripted
//! player and prints a summary.

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use arena_core::WeaponKind;
use arena_headless::Simulation;
use arena_system_bootstrap::{ArenaConfig, Bootstrap};
use arena_world::query;
use clap::{Parser, ValueEnum};
use log::info;

/// Runs a headless arena session.
#[derive(Debug, Parser)]
#[command(name = "arena-sim", version, about)]
struct Cli {
    /// Arena description in TOML; the built-in ring arena is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Frames simulated per second.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,
    /// Overrides the configured root seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the starting weapon.
    #[arg(long, value_enum)]
    weapon: Option<WeaponArg>,
    /// Keeps simulating after the player is defeated.
    #[arg(long)]
    play_on: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum WeaponArg {
    Pistol,
    MachineGun,
    SniperRifle,
    Shotgun,
    RocketLauncher,
    GatlingGun,
}

impl From<WeaponArg> for WeaponKind {
    fn from(value: WeaponArg) -> Self {
        match value {
            WeaponArg::Pistol => Self::Pistol,
            WeaponArg::MachineGun => Self::MachineGun,
            WeaponArg::SniperRifle => Self::SniperRifle,
            WeaponArg::Shotgun => Self::Shotgun,
            WeaponArg::RocketLauncher => Self::RocketLauncher,
            WeaponArg::GatlingGun => Self::GatlingGun,
        }
    }
}

impl Cli {
    fn arena_config(&self) -> Result<ArenaConfig> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::load(path)
                .with_context(|| format!("failed to load arena from {}", path.display()))?,
            None => ArenaConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(weapon) = self.weapon {
            config.player.weapon = weapon.into();
        }
        Ok(config)
    }
}

/// Entry point for the arena command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    ensure!(
        cli.seconds.is_finite() && cli.seconds > 0.0,
        "--seconds must be positive, got {}",
        cli.seconds
    );
    ensure!(cli.tick_rate > 0, "--tick-rate must be positive");

    let bootstrap =
        Bootstrap::new(cli.arena_config()?).context("arena configuration was rejected")?;
    let mut simulation = Simulation::new(&bootstrap);
    println!("{}", bootstrap.welcome_banner(simulation.world()));

    let dt = Duration::from_secs(1) / cli.tick_rate;
    let frames = (cli.seconds * cli.tick_rate as f32).ceil() as u64;
    info!(
        "simulating {frames} frames at {} Hz with seed {}",
        cli.tick_rate,
        bootstrap.config().seed
    );

    for _ in 0..frames {
        let _ = simulation.step_autopilot(dt);
        if simulation.stats().player_defeated && !cli.play_on {
            info!(
                "player defeated after {:.1}s",
                query::elapsed(simulation.world()).as_secs_f32()
            );
            break;
        }
    }

    let player = query::player(simulation.world());
    println!("{}", simulation.stats());
    println!(
        "final health:     {}/{} with {} ammo ({})",
        player.health.get(),
        player.max_health.get(),
        player.ammo,
        player.weapon.label()
    );
    Ok(())
}
