mod console;
mod dashboard;
mod setup;

use std::path::PathBuf;

use clap::Parser;
use fleet_core::config::FleetConfig;
use fleet_sync::GitCli;

use crate::console::TermConsole;
use crate::dashboard::Dashboard;
use crate::setup::AliasSetup;

#[derive(Parser)]
#[command(
    name = "fleet",
    version,
    about = "Dashboard for keeping a folder of git repos in sync with their remotes"
)]
struct Cli {
    /// Directory whose subdirectories are scanned for repos
    #[arg(long)]
    root: Option<PathBuf>,
    /// Config file to use instead of ~/.fleet/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let config = match &cli.config {
        Some(path) => FleetConfig::load_from(path)?,
        None => FleetConfig::load()?,
    };
    let mut settings = config.resolve_from_env();
    if let Some(root) = cli.root {
        settings = settings.with_root(root);
    }

    let git = GitCli::new();
    let mut dashboard = Dashboard::new(&settings, &git, TermConsole::new(), AliasSetup::detect()?)
        // Spinners would interleave with debug logs.
        .with_progress(!cli.verbose);
    dashboard.run()?;
    Ok(())
}
