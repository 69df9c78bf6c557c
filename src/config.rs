use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

pub const HISTORY_FILE: &str = ".sushi_history";
pub const CONFIG_FILE: &str = ".sushi_config";

/// Which front-end drives the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HostKind {
    /// Full-screen in the current terminal.
    #[default]
    #[value(alias = "terminal")]
    Tty,
    /// A desktop window.
    #[value(alias = "window")]
    Gui,
}

/// sushi command-line arguments. Every option can also come from the
/// environment (or `.env`).
#[derive(Debug, Parser)]
#[command(name = "sushi", version, about = "Interactive shell with live fuzzy command hints", long_about = None)]
pub struct Cli {
    /// Front-end to run.
    #[arg(long, value_enum, env = "SUSHI_HOST", ignore_case = true, default_value_t = HostKind::Tty)]
    pub host: HostKind,

    /// Shorthand for `--host gui`.
    #[arg(long, conflicts_with = "tty")]
    pub gui: bool,

    /// Shorthand for `--host tty`.
    #[arg(long)]
    pub tty: bool,

    /// History log. Defaults to `~/.sushi_history`.
    #[arg(long, value_name = "FILE", env = "SUSHI_HISTORY")]
    pub history: Option<PathBuf>,

    /// Config file, created empty when missing. Defaults to `~/.sushi_config`.
    #[arg(long, value_name = "FILE", env = "SUSHI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Send log output to this file instead of stderr.
    #[arg(long, value_name = "FILE", env = "SUSHI_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    fn host(&self) -> HostKind {
        if self.gui {
            HostKind::Gui
        } else if self.tty {
            HostKind::Tty
        } else {
            self.host
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub home_dir: PathBuf,
    pub history_path: PathBuf,
    pub config_path: PathBuf,
    pub host: HostKind,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from parsed arguments and `HOME`. `.env` should
    /// already have been loaded before the arguments were parsed.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Self::resolve(cli, env::var("HOME").ok())
    }

    fn resolve(cli: Cli, home: Option<String>) -> Result<Self> {
        let home_dir = home
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .context("HOME is not set")?;

        let host = cli.host();
        Ok(Self {
            history_path: cli.history.unwrap_or_else(|| home_dir.join(HISTORY_FILE)),
            config_path: cli.config.unwrap_or_else(|| home_dir.join(CONFIG_FILE)),
            log_file: cli.log_file,
            host,
            home_dir,
        })
    }

    /// Home directory as used for `~` substitution.
    pub fn home(&self) -> String {
        self.home_dir.to_string_lossy().into_owned()
    }
}
