use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Output captured from a foreground child.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

/// Failures of a single dispatch. All of these are recoverable: the shell
/// writes them into the live turn and keeps reading input.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{command}: {argument} required")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("didn't find '{0}'")]
    CommandNotFound(String),
    #[error("cd: {path}: {source}")]
    ChangeDirectory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{command}: failed to start: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command}: {status}")]
    Failed {
        command: String,
        status: ExitStatus,
        output: Captured,
    },
}

impl ExecError {
    /// Whatever the child managed to print before failing.
    pub fn captured(&self) -> Option<&Captured> {
        match self {
            ExecError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// The history or config file could not be created, read or appended to.
/// Fatal: the loop stops rather than continuing with a history it can't trust.
#[derive(Debug, Error)]
#[error("{}: {source}", .path.display())]
pub struct PersistenceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl PersistenceError {
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}
