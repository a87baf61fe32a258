//! Burrow CLI - local console for the burrow kernel
//!
//! Writes a default world configuration, or plays the demo zone from the
//! terminal as a single player.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use burrow::attr::{Alias, Description, Name, Player};
use burrow::events::{self, TokioEvents};
use burrow::world::Thing;
use burrow::{Engine, World, WorldConfig, demo};

#[derive(Parser)]
#[command(name = "burrow")]
#[command(version = burrow::VERSION)]
#[command(about = "Concurrency and container kernel for a shared text world", long_about = None)]
struct Cli {
    /// World configuration file
    #[arg(short, long, default_value = "burrow.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Players above which a location is crowded
        #[arg(long, default_value = "10")]
        crowd_size: usize,
    },

    /// Play the demo zone on this terminal
    Play {
        /// Name of your character
        #[arg(short, long, default_value = "Diddymus")]
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        WorldConfig::load(&cli.config).with_context(|| format!("loading {:?}", cli.config))?
    } else {
        WorldConfig::default()
    };

    // Initialize tracing
    let level = if config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Init { crowd_size } => {
            let config = WorldConfig {
                crowd_size,
                ..config
            };
            config.validate()?;
            config.save(&cli.config)?;
            println!("Wrote world configuration to {:?}", cli.config);
        }

        Commands::Play { name } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(play(config, name))?;
        }
    }

    Ok(())
}

async fn play(config: WorldConfig, name: String) -> Result<()> {
    let (queue, due) = TokioEvents::new(tokio::runtime::Handle::current());
    let world = Arc::new(World::new(config, Arc::new(queue)));
    demo::build(&world);

    let engine = Arc::new(Engine::new(world));
    tokio::spawn(events::deliver(engine.clone(), due));

    let (player, mut output) = Player::new();
    let hero = Thing::builder()
        .with(Name::new(name.clone()))
        .with(Alias::new([name.as_str()]))
        .with(Description::new("An adventurer, new to these parts."))
        .with(player)
        .with_inventory()
        .build();

    let printer = tokio::spawn(async move {
        while let Some(text) = output.recv().await {
            println!("{}", text);
            print!(">");
            // Prompt only, nothing to recover from
            let _ = std::io::Write::flush(&mut std::io::stdout());
        }
    });

    let entered = {
        let (engine, hero) = (engine.clone(), hero.clone());
        tokio::task::spawn_blocking(move || engine.enter(&hero)).await?
    };
    if !entered {
        anyhow::bail!("the world has nowhere to start");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            let (engine, hero) = (engine.clone(), hero.clone());
            tokio::task::spawn_blocking(move || engine.leave(&hero)).await?;
            break;
        };

        let (engine, hero) = (engine.clone(), hero.clone());
        let playing = tokio::task::spawn_blocking(move || engine.execute(&hero, &line)).await?;
        if !playing {
            break;
        }
    }

    // Let the printer catch up with the farewell before shutting down
    tokio::time::sleep(Duration::from_millis(50)).await;
    printer.abort();
    Ok(())
}
