//! Forge - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use forge_core::settings::GameSettings;
use forge_tools::error::{Result, ToolError};
use forge_tools::inspect::{self, ReportFormat};
use forge_tools::validate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forge-tools")]
#[command(about = "Development tools for Forge rulesets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate ruleset files
    Validate {
        /// Ruleset file, or a directory of them
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },
    /// Print a player's stat blocks after researching upgrades
    Inspect {
        /// Ruleset file
        ruleset: PathBuf,
        /// Upgrades to research, in order
        #[arg(short, long, value_delimiter = ',')]
        upgrades: Vec<String>,
        /// Unit types to report (all when omitted)
        #[arg(short = 't', long = "unit-type", value_delimiter = ',')]
        unit_types: Vec<String>,
        /// Game settings RON file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: ReportFormat,
    },
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating rulesets in: {}", path.display());
            for summary in validate::validate_path(&path)? {
                println!("{summary}");
            }
            tracing::info!("Validation passed");
        }
        Commands::Inspect {
            ruleset,
            upgrades,
            unit_types,
            settings,
            format,
        } => {
            let rules = validate::load_ruleset(&ruleset)?;
            let settings = match settings {
                Some(path) => {
                    let source = std::fs::read_to_string(&path)
                        .map_err(|source| ToolError::Io { path, source })?;
                    GameSettings::from_ron_str(&source)?
                }
                None => GameSettings::default(),
            };
            let report = inspect::inspect(rules, settings, &upgrades, &unit_types)?;
            println!("{}", inspect::render(&report, format)?);
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
