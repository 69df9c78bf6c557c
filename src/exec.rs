//! Turning a submitted line into something that runs.
//!
//! There is no shell grammar here: the line is split on single spaces, so
//! an argument can't contain a space. A trailing `&` token sends the command
//! to the background, where nobody waits for it or reads its output.

use std::env;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Captured, ExecError};

/// A parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub background: bool,
}

impl Invocation {
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}

/// What a successful dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to run.
    Noop,
    /// A foreground command ran to a zero exit status.
    Completed(Captured),
    /// `cd` changed the working directory.
    ChangedDirectory(PathBuf),
    /// A background command was started; holds the child's pid.
    Detached(u32),
    /// `exit` was entered.
    Exit,
}

/// Replace every `~` with `home`, split on spaces and peel off a trailing
/// `&`. `cmd&` is read as `cmd &`.
pub fn parse_input(home: &str, input: &str) -> Invocation {
    let mut line = input.replace('~', home);
    if line.is_empty() {
        return Invocation::default();
    }

    if line.len() >= 2 && line.ends_with('&') && !line[..line.len() - 1].ends_with(' ') {
        line.insert(line.len() - 1, ' ');
    }

    let mut argv: Vec<String> = line.split(' ').map(String::from).collect();
    let background = argv.last().is_some_and(|last| last == "&");
    if background {
        argv.pop();
    }

    Invocation { argv, background }
}

/// Run an invocation. Foreground commands block until the child exits.
pub fn dispatch(invocation: &Invocation) -> Result<Dispatch, ExecError> {
    let Some(program) = invocation.program() else {
        return Ok(Dispatch::Noop);
    };
    let args = &invocation.argv[1..];

    match program {
        "cd" => change_directory(args.first()),
        "exit" => Ok(Dispatch::Exit),
        _ => {
            let path = which::which(program)
                .map_err(|_| ExecError::CommandNotFound(program.to_string()))?;
            debug!("resolved {} to {}", program, path.display());

            let mut command = Command::new(&path);
            command.args(args);

            if invocation.background {
                spawn_detached(program, command)
            } else {
                run_foreground(program, command)
            }
        }
    }
}

fn change_directory(target: Option<&String>) -> Result<Dispatch, ExecError> {
    let target = target.ok_or(ExecError::MissingArgument {
        command: "cd",
        argument: "path",
    })?;

    env::set_current_dir(target).map_err(|source| ExecError::ChangeDirectory {
        path: target.clone(),
        source,
    })?;

    let cwd = working_dir(target);
    info!("working directory is now {}", cwd.display());
    Ok(Dispatch::ChangedDirectory(cwd))
}

/// The resolved working directory, or `target` as typed when it can't be
/// read back.
fn working_dir(target: &str) -> PathBuf {
    match env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            debug!("can't resolve working directory after cd {}: {}", target, err);
            PathBuf::from(target)
        }
    }
}

fn run_foreground(program: &str, mut command: Command) -> Result<Dispatch, ExecError> {
    let output = command
        .stdin(Stdio::inherit())
        .output()
        .map_err(|source| ExecError::Launch {
            command: program.to_string(),
            source,
        })?;

    let captured = Captured {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if output.status.success() {
        Ok(Dispatch::Completed(captured))
    } else {
        debug!("{} exited with {}", program, output.status);
        Err(ExecError::Failed {
            command: program.to_string(),
            status: output.status,
            output: captured,
        })
    }
}

fn spawn_detached(program: &str, mut command: Command) -> Result<Dispatch, ExecError> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| ExecError::Launch {
            command: program.to_string(),
            source,
        })?;

    info!("started {} in the background (pid {})", program, child.id());
    Ok(Dispatch::Detached(child.id()))
}
