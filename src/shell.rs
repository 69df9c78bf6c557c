//! The interactive core. A host feeds [`InputEvent`]s into [`Shell::handle`]
//! one at a time and paints [`Shell::lines`] afterwards; the shell itself
//! never touches the terminal.

use log::{debug, info, warn};

use crate::candidates::CandidateSet;
use crate::config::Settings;
use crate::error::PersistenceError;
use crate::event::{Control, InputEvent, Key};
use crate::exec::{self, Dispatch};
use crate::history::{self, HistoryStore};
use crate::prompt::{Prompt, Routed};
use crate::transcript::{Line, Transcript, Turn, Viewport};

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 24;

pub struct Shell {
    home: String,
    candidates: CandidateSet,
    history: HistoryStore,
    transcript: Transcript,
    prompt: Prompt,
    viewport: Viewport,
}

impl Shell {
    pub fn new(home: impl Into<String>, candidates: CandidateSet, history: HistoryStore) -> Self {
        Self {
            home: home.into(),
            candidates,
            history,
            transcript: Transcript::new(),
            prompt: Prompt::new(),
            viewport: Viewport::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }

    /// Create the config file if needed, load history and scan `PATH`.
    pub fn bootstrap(settings: &Settings) -> Result<Self, PersistenceError> {
        history::ensure_file(&settings.config_path)?;
        let history = HistoryStore::load(&settings.history_path)?;
        let candidates = CandidateSet::from_env();
        Ok(Self::new(settings.home(), candidates, history))
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<Control, PersistenceError> {
        match event {
            InputEvent::Resize { width, height } => {
                self.viewport.resize(width, height);
            }
            InputEvent::Scroll(delta) => self.scroll(delta),
            InputEvent::Key(Key::PageUp) => self.scroll(-self.page()),
            InputEvent::Key(Key::PageDown) => self.scroll(self.page()),
            InputEvent::Key(key) => {
                match self
                    .prompt
                    .handle(key, &mut self.history, &self.candidates)
                {
                    Routed::Changed => self.viewport.goto_bottom(),
                    Routed::Moved | Routed::Ignored => {}
                    Routed::Submit(line) => return self.submit(line),
                    Routed::Exit => {
                        info!("end of input");
                        return Ok(Control::Exit);
                    }
                }
            }
        }
        Ok(Control::Continue)
    }

    fn submit(&mut self, line: String) -> Result<Control, PersistenceError> {
        let invocation = exec::parse_input(&self.home, &line);
        debug!("submitting {:?} (background: {})", invocation.argv, invocation.background);

        let turn = match exec::dispatch(&invocation) {
            Ok(Dispatch::Exit) => {
                info!("exit requested");
                return Ok(Control::Exit);
            }
            Ok(Dispatch::Completed(output)) => {
                self.history.record(&line)?;
                Turn::completed(line, output)
            }
            // Nothing to run, nothing worth remembering.
            Ok(Dispatch::Noop) => Turn::quiet(line),
            Ok(Dispatch::ChangedDirectory(_)) => {
                self.history.record(&line)?;
                Turn::quiet(line)
            }
            Ok(Dispatch::Detached(pid)) => {
                debug!("{} detached as pid {}", line, pid);
                self.history.record(&line)?;
                Turn::quiet(line)
            }
            Err(err) => {
                warn!("{}: {}", line, err);
                Turn::failed(line, &err)
            }
        };

        self.history.rewind();
        self.transcript.push(turn);
        self.prompt = Prompt::new();
        self.viewport.goto_bottom();
        Ok(Control::Continue)
    }

    fn page(&self) -> i32 {
        i32::from(self.viewport.height()).saturating_sub(1).max(1)
    }

    fn scroll(&mut self, delta: i32) {
        let total = self.layout().len();
        self.viewport.scroll(delta, total);
    }

    fn layout(&self) -> Vec<Line> {
        self.transcript.layout(&self.prompt, self.viewport.width())
    }

    /// Styled lines currently inside the viewport.
    pub fn lines(&self) -> Vec<Line> {
        let all = self.layout();
        let window = self.viewport.window(all.len());
        all.into_iter()
            .skip(window.start)
            .take(window.len())
            .collect()
    }

    /// The visible part of the transcript as plain text.
    pub fn render(&self) -> String {
        self.lines()
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> (tempfile::TempDir, Shell) {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryStore::load(dir.path().join(".sushi_history")).unwrap();
        let candidates = CandidateSet::from_names(["cd", "exit", "echo", "ls"]);
        (dir, Shell::new("/home/me", candidates, history))
    }

    #[test]
    fn resize_changes_layout_width() {
        let (_dir, mut shell) = shell();
        shell
            .handle(InputEvent::Resize {
                width: 30,
                height: 10,
            })
            .unwrap();
        let lines = shell.lines();
        assert!(lines.iter().any(|l| l.text().chars().count() == 30));
        assert!(lines.len() <= 10);
    }

    #[test]
    fn render_shows_live_text() {
        let (_dir, mut shell) = shell();
        for ch in "ec".chars() {
            shell.handle(Key::Char(ch).into()).unwrap();
        }
        let screen = shell.render();
        assert!(screen.contains("❯ ec"));
        assert!(screen.contains(" echo "));
    }

    #[test]
    fn scrolling_does_not_touch_the_prompt() {
        let (_dir, mut shell) = shell();
        shell
            .handle(InputEvent::Resize {
                width: 40,
                height: 4,
            })
            .unwrap();
        for _ in 0..3 {
            shell.handle(Key::Enter.into()).unwrap();
        }
        assert_eq!(shell.transcript().len(), 3);

        shell.handle(Key::PageUp.into()).unwrap();
        assert!(!shell.viewport().is_following());

        // Moving a cursor is not a content change.
        shell.handle(Key::Left.into()).unwrap();
        assert!(!shell.viewport().is_following());

        shell.handle(Key::Char('l').into()).unwrap();
        assert!(shell.viewport().is_following());
    }

    #[test]
    fn end_of_input_stops_the_loop() {
        let (_dir, mut shell) = shell();
        assert_eq!(shell.handle(Key::EndOfInput.into()).unwrap(), Control::Exit);
    }
}
