//! sushi: an interactive shell front-end with live fuzzy command hints.
//!
//! The core ([`shell::Shell`]) is a plain state machine driven by
//! [`event::InputEvent`]s; the modules under [`host`] connect it to a
//! terminal or a window.

pub mod candidates;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod exec;
pub mod hint;
pub mod history;
pub mod host;
pub mod prompt;
pub mod shell;
pub mod transcript;

pub use error::{ExecError, PersistenceError};
pub use event::{Control, InputEvent, Key};
pub use shell::Shell;
