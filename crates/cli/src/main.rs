use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use elibros_kernel::settings::Settings;
use elibros_search::{rank_by, SortDirection};

#[derive(Debug, Parser)]
#[command(name = "elibros", version, about = "eLibros storefront backend-for-frontend")]
struct Cli {
    /// Directory holding `base.toml` and the environment overlays.
    #[arg(long, global = true, env = "ELIBROS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// local, staging or production.
    #[arg(long = "env", global = true, env = "ELIBROS_ENV", default_value = "local")]
    environment: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until ctrl-c.
    Serve,
    /// List the module mount points.
    Routes,
    /// Print the effective settings as JSON.
    Config,
    /// Rank the lines read from stdin against a search term.
    Search {
        /// Empty keeps every line and only sorts.
        #[arg(default_value = "")]
        term: String,
        /// Sort each tier in descending order.
        #[arg(long)]
        desc: bool,
    },
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let config_dir = self.config_dir.clone().unwrap_or_else(|| PathBuf::from("config"));
        Settings::load_from(&config_dir, &self.environment)
            .with_context(|| format!("failed to load settings from {}", config_dir.display()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Serve => {
            let settings = cli.settings()?;
            elibros_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "starting eLibros web from the CLI");
            elibros_web::run(settings).await
        }
        Command::Routes => {
            let settings = cli.settings()?;
            let state = elibros_web::AppState::from_settings(&settings)?;
            let registry = elibros_web::build_registry(&state);

            let mut out = io::stdout().lock();
            for (name, mount) in registry.mount_points() {
                writeln!(out, "{name:<10} {mount}")?;
            }
            writeln!(out, "{:<10} /healthz", "health")?;
            writeln!(out, "{:<10} /swagger-ui", "docs")?;
            writeln!(out, "{:<10} /docs/openapi.json", "openapi")?;
            Ok(())
        }
        Command::Config => {
            let settings = cli.settings()?;
            let json =
                serde_json::to_string_pretty(&settings).context("failed to render settings")?;
            println!("{json}");
            Ok(())
        }
        Command::Search { term, desc } => {
            let lines: Vec<String> = io::stdin()
                .lock()
                .lines()
                .collect::<Result<_, _>>()
                .context("failed to read stdin")?;
            let direction = if *desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };

            let mut out = io::stdout().lock();
            for line in rank_by(&lines, term, direction, |line| line.as_str()) {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
    }
}
