//! Front-ends. Each one turns native input into [`InputEvent`]s, hands them
//! to the [`Shell`] and paints the lines it lays out.
//!
//! [`InputEvent`]: crate::event::InputEvent

pub mod gui;
pub mod tty;

use anyhow::Result;

use crate::config::HostKind;
use crate::shell::Shell;

pub fn run(kind: HostKind, shell: Shell) -> Result<()> {
    match kind {
        HostKind::Tty => tty::run(shell),
        HostKind::Gui => gui::run(shell),
    }
}
