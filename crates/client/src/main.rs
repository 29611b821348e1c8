//! `dex` command line client.
//!
//! Answers companion queries from the static documents under `DEX_DATA_DIR`
//! (or `--data-dir`). There is no live host in a standalone process, so every
//! answer comes from the static fallback.
//!
//! ```bash
//! dex --data-dir ./data spawns vulpix --form alolan
//! dex bearers static --json
//! dex evo ivysaur
//! ```

mod logging;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dex_resolver::{DataKind, Dex, DexConfig};
use tracing::Instrument;

#[derive(Debug, Parser)]
#[command(name = "dex", version, about = "Creature companion data queries")]
struct Cli {
    /// Static document root (overrides DEX_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, default_value = "dex.toml")]
    config: PathBuf,

    /// Locale for display names (overrides DEX_LOCALE)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Seconds to wait for background indices
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Where and when a species spawns
    Spawns {
        species: String,
        #[arg(long)]
        form: Option<String>,
    },
    /// Species that learn a move
    Learners { move_id: String },
    /// Species that can have an ability
    Bearers { ability: String },
    /// Species that drop an item
    Droppers { item: String },
    /// Evolution family of a species
    Evo { species: String },
    /// Forward move catalog of a species
    Moves { species: String },
    /// Egg groups of a species
    Eggs { species: String },
    /// Effort value yield of a species
    Evs { species: String },
    /// Biomes in a biome tag
    Tag { tag: String },
    /// Load state of every data set
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = DexConfig::load(&cli.config).context("Failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(locale) = &cli.locale {
        config.locale = locale.to_ascii_lowercase();
    }
    // Index builds are started on demand by the query itself.
    config.background = matches!(cli.command, Command::Status);

    let session_id = logging::setup_logging(config.session_id.as_deref())?;
    let span = tracing::info_span!("session", id = %session_id);

    async move {
        tracing::info!(data_dir = ?config.data_dir, locale = %config.locale, "Starting dex");
        let dex = Dex::builder().config(config).build();
        let output = run(&dex, &cli).await?;
        print!("{output}");
        Ok(())
    }
    .instrument(span)
    .await
}

async fn run(dex: &Dex, cli: &Cli) -> Result<String> {
    let timeout = Duration::from_secs(cli.timeout);

    let output = match &cli.command {
        Command::Spawns { species, form } => {
            let conditions = dex.resolve_spawn_conditions(species, form.as_deref());
            if cli.json {
                serde_json::to_string_pretty(&conditions)?
            } else {
                render::spawn_conditions(species, &conditions)
            }
        }
        Command::Learners { move_id } => {
            dex.learners_of(move_id);
            wait(dex, DataKind::MoveIndex, timeout).await;
            let learners = dex.learners_of(move_id);
            if cli.json {
                serde_json::to_string_pretty(&learners)?
            } else {
                render::learners(move_id, &learners)
            }
        }
        Command::Bearers { ability } => {
            dex.bearers_of(ability);
            wait(dex, DataKind::AbilityIndex, timeout).await;
            let bearers = dex.bearers_of(ability);
            if cli.json {
                serde_json::to_string_pretty(&bearers)?
            } else {
                render::bearers(ability, &bearers)
            }
        }
        Command::Droppers { item } => {
            dex.droppers_of(item);
            wait(dex, DataKind::DropIndex, timeout).await;
            let droppers = dex.droppers_of(item);
            if cli.json {
                serde_json::to_string_pretty(&droppers)?
            } else {
                render::droppers(item, &droppers)
            }
        }
        Command::Evo { species } => {
            let tree = dex.evolution_tree_of(species);
            match (&tree, cli.json) {
                (_, true) => serde_json::to_string_pretty(&tree.as_deref())?,
                (Some(tree), false) => render::evolution_tree(tree),
                (None, false) => format!("{species} does not evolve\n"),
            }
        }
        Command::Moves { species } => {
            let moves = dex.moves_of(species);
            if cli.json {
                serde_json::to_string_pretty(&moves)?
            } else {
                render::moves(species, &moves)
            }
        }
        Command::Eggs { species } => {
            let groups = dex.egg_groups_of(species);
            if cli.json {
                serde_json::to_string_pretty(&groups)?
            } else if groups.is_empty() {
                format!("No egg groups known for {species}\n")
            } else {
                format!("{}\n", groups.join(", "))
            }
        }
        Command::Evs { species } => {
            let ev = dex.ev_yield_of(species);
            if cli.json {
                serde_json::to_string_pretty(&ev)?
            } else {
                render::ev_yield(species, ev)
            }
        }
        Command::Tag { tag } => {
            let names = dex.resolve_tag_default(tag);
            if cli.json {
                serde_json::to_string_pretty(&names[..])?
            } else if names.is_empty() {
                format!("No biomes known for #{}\n", tag.trim_start_matches('#'))
            } else {
                format!("{}\n", names.join("\n"))
            }
        }
        Command::Status => {
            for kind in DataKind::ALL {
                wait(dex, kind, timeout).await;
            }
            let statuses = dex.status();
            if cli.json {
                serde_json::to_string_pretty(&statuses)?
            } else {
                render::status(&statuses)
            }
        }
    };

    Ok(if output.ends_with('\n') { output } else { format!("{output}\n") })
}

async fn wait(dex: &Dex, kind: DataKind, timeout: Duration) {
    if !dex.ready(kind, timeout).await {
        tracing::warn!("{} not ready after {:?}, answering with partial data", kind, timeout);
    }
}
