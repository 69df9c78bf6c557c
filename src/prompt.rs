//! The live prompt: a line editor and a hint row, with exactly one of them
//! holding focus at a time.
//!
//! The editor's own cursor decides when the hint row takes over: pressing
//! Right with the cursor already at the end of the line moves focus into the
//! hints, and pressing Left on the first hint hands it back.

use log::trace;

use crate::candidates::CandidateSet;
use crate::editor::LineEditor;
use crate::event::Key;
use crate::hint::HintList;
use crate::history::{HistoryStore, Recall};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    EditingLine,
    BrowsingHints,
}

/// Result of routing one key through the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// The line text changed.
    Changed,
    /// Focus or a cursor moved; the text is the same.
    Moved,
    /// Nothing happened.
    Ignored,
    /// Enter was pressed; carries the submitted line.
    Submit(String),
    /// The user asked to leave the shell.
    Exit,
}

#[derive(Debug, Clone, Default)]
pub struct Prompt {
    editor: LineEditor,
    hints: HintList,
    focus: Focus,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn hints(&self) -> &HintList {
        &self.hints
    }

    pub fn value(&self) -> &str {
        self.editor.value()
    }

    pub fn handle(
        &mut self,
        key: Key,
        history: &mut HistoryStore,
        candidates: &CandidateSet,
    ) -> Routed {
        let before = self.editor.value().to_string();
        let routed = self.route(key, history);
        if let Routed::Submit(_) | Routed::Exit = routed {
            return routed;
        }

        self.hints.refresh(candidates, self.editor.value());
        trace!("{:?} -> {:?} ({:?})", key, routed, self.focus);

        match routed {
            Routed::Ignored => Routed::Ignored,
            _ if self.editor.value() != before => Routed::Changed,
            _ => Routed::Moved,
        }
    }

    fn route(&mut self, key: Key, history: &mut HistoryStore) -> Routed {
        match (key, self.focus) {
            // Submission doesn't care where focus is.
            (Key::Enter, _) => {
                let line = self.editor.take();
                let line = line.strip_suffix('\n').unwrap_or(&line).to_string();
                self.hints.clear();
                self.focus = Focus::EditingLine;
                Routed::Submit(line)
            }
            (Key::EndOfInput, _) => Routed::Exit,
            (Key::Interrupt, _) => {
                self.editor.clear();
                history.rewind();
                self.focus = Focus::EditingLine;
                Routed::Moved
            }

            (Key::Right, Focus::EditingLine) => {
                if self.editor.at_end() {
                    self.focus = Focus::BrowsingHints;
                } else {
                    self.editor.move_right();
                }
                Routed::Moved
            }
            (Key::Right, Focus::BrowsingHints) => {
                self.hints.move_right();
                Routed::Moved
            }

            (Key::Left, Focus::EditingLine) => {
                self.editor.move_left();
                Routed::Moved
            }
            (Key::Left, Focus::BrowsingHints) => {
                if self.hints.cursor() == 0 {
                    self.focus = Focus::EditingLine;
                } else {
                    self.hints.move_left();
                }
                Routed::Moved
            }

            (Key::Up, _) => {
                self.focus = Focus::EditingLine;
                if self.editor.is_empty() || history.is_browsing() {
                    if let Some(line) = history.recall_older() {
                        self.editor.set_value(line);
                    }
                }
                Routed::Moved
            }

            (Key::Down, Focus::BrowsingHints) => {
                self.focus = Focus::EditingLine;
                Routed::Moved
            }
            (Key::Down, Focus::EditingLine) => {
                match history.recall_newer() {
                    Some(Recall::Entry(line)) => self.editor.set_value(line),
                    Some(Recall::Live) => self.editor.clear(),
                    None => self.focus = Focus::BrowsingHints,
                }
                Routed::Moved
            }

            (Key::Tab, Focus::BrowsingHints) => {
                if let Some(choice) = self.hints.selected() {
                    let choice = choice.to_string();
                    self.editor.set_value(&choice);
                }
                self.focus = Focus::EditingLine;
                Routed::Moved
            }
            (Key::Tab, Focus::EditingLine) => Routed::Ignored,

            (Key::Backspace, Focus::BrowsingHints) => {
                self.focus = Focus::EditingLine;
                Routed::Moved
            }
            (Key::Backspace, Focus::EditingLine) => {
                self.editor.backspace();
                Routed::Moved
            }
            (Key::Delete, Focus::EditingLine) => {
                self.editor.delete();
                Routed::Moved
            }
            (Key::Home, Focus::EditingLine) => {
                self.editor.home();
                Routed::Moved
            }
            (Key::End, Focus::EditingLine) => {
                self.editor.end();
                Routed::Moved
            }
            (Key::Char(ch), Focus::EditingLine) if !ch.is_control() => {
                self.editor.insert(ch);
                Routed::Moved
            }

            _ => Routed::Ignored,
        }
    }
}
