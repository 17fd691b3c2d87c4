//! nirimgr CLI
//!
//! Configuration checks and scratchpad commands for nirimgr.

use std::path::Path;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use nirimgr_config::{ActionSet, Config, LogLevel};
use nirimgr_daemon::engine::ActionRegistry;
use nirimgr_daemon::floating::{Edge, EdgeMove, DEFAULT_BORDER, DEFAULT_TOP_OFFSET};
use nirimgr_daemon::niri_ipc::{NiriClient, SocketPool};
use nirimgr_daemon::scratch::Scratchpad;

#[derive(Parser, Debug)]
#[command(name = "nirimgr")]
#[command(about = "Rule-based window and workspace manager for niri")]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: config/config.json, then ~/.config/nirimgr/config.json)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration file
    Validate,

    /// Scratchpad workspace commands
    Scratch {
        #[command(subcommand)]
        command: ScratchCommands,
    },

    /// Floating window commands
    Floating {
        #[command(subcommand)]
        command: FloatingCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ScratchCommands {
    /// Move the focused window to the scratchpad workspace
    Move,

    /// Bring a scratchpad window to the focused workspace
    Show,

    /// Focus a running app, or spawn it if it isn't running
    SpawnOrFocus {
        /// Key of the command in spawnOrFocus.commands, also searched in app ids
        app_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum FloatingCommands {
    /// Move the focused floating window to an edge of its output
    Move {
        #[arg(value_enum)]
        edge: Edge,

        /// Gap between the window and the edge, in logical pixels
        #[arg(default_value_t = DEFAULT_BORDER)]
        border: f64,

        /// Height of a bar at the top of the output
        #[arg(long, default_value_t = DEFAULT_TOP_OFFSET)]
        top_offset: f64,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    nirimgr_daemon::init_logging(LogLevel::Warn);

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate => {
            let config_path = nirimgr_config::find_config(cli.config.as_deref())?;
            cmd_validate(&config_path)
        }
        Commands::Scratch { command } => {
            let config_path = nirimgr_config::find_config(cli.config.as_deref())?;
            let config = nirimgr_config::load_config(&config_path)?;
            nirimgr_daemon::log_config_warnings(&config);
            cmd_scratch(&config, command).await
        }
        Commands::Floating { command } => cmd_floating(command).await,
    }
}

fn cmd_validate(config_path: &Path) -> miette::Result<()> {
    println!("Validating configuration: {}", config_path.display());

    let config = nirimgr_config::load_config(config_path)?;
    let registry = ActionRegistry::new();

    let mut problems = config.warnings();
    for (index, rule) in config.rules.iter().enumerate() {
        problems.extend(unknown_actions(&registry, &rule.actions, &format!("rule {}", index)));
    }
    for (name, actions) in &config.events {
        problems.extend(unknown_actions(&registry, actions, &format!("event {}", name)));
    }
    problems.extend(unknown_actions(
        &registry,
        &config.show_scratchpad_actions,
        "showScratchpadActions",
    ));

    println!("Configuration is valid!");
    println!("  Rules: {}", config.rules.len());
    for (index, rule) in config.rules.iter().enumerate() {
        println!(
            "    - #{} {} ({} match, {} exclude, {} action(s))",
            index,
            rule.rule_type,
            rule.matches.len(),
            rule.excludes.len(),
            rule.actions.len()
        );
    }
    println!("  Event blocks: {}", config.events.len());
    println!("  Scratchpad workspace: {}", config.scratchpad_workspace);
    println!(
        "  Spawn-or-focus: {} rule(s), {} command(s)",
        config.spawn_or_focus.rules.len(),
        config.spawn_or_focus.commands.len()
    );

    if !problems.is_empty() {
        println!("\nWarnings:");
        for problem in &problems {
            println!("  - {}", problem);
        }
    }

    Ok(())
}

fn unknown_actions(registry: &ActionRegistry, actions: &ActionSet, location: &str) -> Vec<String> {
    actions
        .iter()
        .filter(|action| registry.get(&action.name).is_none())
        .map(|action| format!("{}: unknown action {}", location, action.name))
        .collect()
}

async fn cmd_scratch(config: &Config, command: ScratchCommands) -> miette::Result<()> {
    let mut client = NiriClient::connect().await.into_diagnostic()?;
    let pool = SocketPool::new(client.socket_path());
    let registry = ActionRegistry::new();
    let scratchpad = Scratchpad::new(config, &registry);

    let result = match command {
        ScratchCommands::Move => scratchpad.move_focused(&mut client, &pool).await,
        ScratchCommands::Show => scratchpad.show(&mut client, &pool).await,
        ScratchCommands::SpawnOrFocus { app_id } => {
            scratchpad.spawn_or_focus(&mut client, &pool, &app_id).await
        }
    };

    result.map_err(|e| miette::miette!("{:#}", e))
}

async fn cmd_floating(command: FloatingCommands) -> miette::Result<()> {
    let FloatingCommands::Move {
        edge,
        border,
        top_offset,
    } = command;

    let mut client = NiriClient::connect().await.into_diagnostic()?;
    let pool = SocketPool::new(client.socket_path());
    let edge_move = EdgeMove {
        edge,
        border,
        top_offset,
    };

    edge_move
        .perform(&ActionRegistry::new(), &mut client, &pool)
        .await
        .map_err(|e| miette::miette!("{:#}", e))
}
