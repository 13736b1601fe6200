use anyhow::Context;
use clap::Parser;
use log::info;

use rowfile::conf::Config;
use rowfile::core::{setup_logging, CliArgs};
use rowfile::store::Store;

fn main() -> anyhow::Result<()> {
    setup_logging();

    let args = CliArgs::parse();
    info!(args = &args; "Rowfile started.");

    let config = match &args.config {
        Some(path) => {
            let toml = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {path}"))?;
            Config::from_str(&toml)?
        }
        None => Config::default(),
    };

    let store = Store::open(&config.storage)?;
    info!(
        "serving {} tables from {}",
        store.table_names().count(),
        store.directory().display()
    );

    Ok(())
}
