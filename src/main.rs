use std::fs::OpenOptions;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use sushi::config::{Cli, Settings};
use sushi::{host, Shell};

fn main() {
    dotenvy::dotenv().ok();

    if let Err(err) = run() {
        eprintln!("sushi: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = Settings::from_cli(Cli::parse())?;
    init_logging(&settings)?;
    info!("starting with {:?}", settings);

    let shell = Shell::bootstrap(&settings).context("failed to initialize history/config")?;
    host::run(settings.host, shell)
}

fn init_logging(settings: &Settings) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(path) = &settings.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
