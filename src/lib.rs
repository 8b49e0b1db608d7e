pub mod config;
pub mod controller;
pub mod engine;
pub mod env;
pub mod logging;
pub mod navigate;
pub mod params;
pub mod ui;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};

use crate::config::Config;
use crate::engine::{CatalogEngine, QueryEngine, Resolution};
use crate::env::Locale;
use crate::navigate::{Navigator, SystemNavigator};
use crate::params::{PARAM_COUNTRY, PARAM_LANGUAGE, PARAM_QUERY};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "shortcut-search",
    version,
    about = "Keyword shortcut query TUI with live suggestions"
)]
pub struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the shortcut catalog JSON (overrides the config file)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI
    Tui {
        /// Fragment-style page parameters, e.g. "country=de&language=de&query=w+Berlin"
        #[arg(long)]
        params: Option<String>,
    },
    /// Resolve one query non-interactively and navigate
    Process {
        /// Fragment-style parameters, or a bare query string
        params: String,

        /// Print the resolved URL without opening it
        #[arg(long, default_value_t = false)]
        print_only: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let catalog_override = cli.catalog.clone();

    match cli.command {
        Commands::Tui { params } => {
            let _log_guard = logging::init_file(&default_log_path())?;
            run_tui_command(config, catalog_override, params.as_deref()).await
        }
        Commands::Process { params, print_only } => {
            logging::init_stderr();
            run_process(config, catalog_override, &params, print_only).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "scut", &mut io::stdout());
            Ok(())
        }
        Commands::Man => {
            let man = clap_mangen::Man::new(Cli::command());
            man.render(&mut io::stdout())?;
            Ok(())
        }
    }
}

async fn run_tui_command(
    config: Config,
    catalog_override: Option<PathBuf>,
    params: Option<&str>,
) -> Result<()> {
    let parameters = params.map(params::parse_fragment).unwrap_or_default();
    let locale = Locale::resolve(&locale_overrides(&config, &parameters));
    let engine = build_engine(&config, catalog_override, &locale)?;
    let initial_query = parameters.get(PARAM_QUERY).cloned();
    ui::tui::run_tui(engine, locale, config.controller_options(), initial_query).await
}

/// The automatic processing entry point: parse parameters, resolve once,
/// navigate or fail hard.
async fn run_process(
    config: Config,
    catalog_override: Option<PathBuf>,
    params: &str,
    print_only: bool,
) -> Result<()> {
    let parameters = if params.contains('=') {
        params::parse_fragment(params)
    } else {
        HashMap::from([(PARAM_QUERY.to_string(), params.to_string())])
    };
    let query = parameters
        .get(PARAM_QUERY)
        .cloned()
        .context("query parameter was not set")?;
    let locale = Locale::resolve(&locale_overrides(&config, &parameters));
    let engine = build_engine(&config, catalog_override, &locale)?;

    match engine.process(&query).await? {
        Resolution::Resolved { url: Some(url) } => {
            println!("{}", controller::loading_status(&url));
            if !print_only {
                SystemNavigator.replace(&url);
            }
            Ok(())
        }
        Resolution::Resolved { url: None } => {
            println!("Resolved without a navigable target.");
            Ok(())
        }
        Resolution::NotFound { reason } => bail!("not found / problem: {reason}"),
    }
}

/// Config-file locale settings act as a baseline; page parameters win.
fn locale_overrides(
    config: &Config,
    parameters: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut overrides = HashMap::new();
    if let Some(language) = &config.language {
        overrides.insert(PARAM_LANGUAGE.to_string(), language.clone());
    }
    if let Some(country) = &config.country {
        overrides.insert(PARAM_COUNTRY.to_string(), country.clone());
    }
    for (key, value) in parameters {
        overrides.insert(key.clone(), value.clone());
    }
    overrides
}

fn build_engine(
    config: &Config,
    catalog_override: Option<PathBuf>,
    locale: &Locale,
) -> Result<Arc<CatalogEngine>> {
    let path = catalog_override
        .or_else(|| config.catalog.clone())
        .or_else(config::default_catalog_path)
        .context("no catalog path: pass --catalog or set `catalog` in the config file")?;
    let engine = CatalogEngine::from_file(&path, locale.namespaces())?;
    Ok(Arc::new(engine))
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("shortcut-search")
        .join("scut.log")
}
