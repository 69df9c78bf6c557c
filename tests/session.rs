use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serial_test::serial;
use sushi::candidates::CandidateSet;
use sushi::history::HistoryStore;
use sushi::prompt::Focus;
use sushi::transcript::Tone;
use sushi::{Control, InputEvent, Key, Shell};

struct Session {
    dir: tempfile::TempDir,
    shell: Shell,
}

impl Session {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryStore::load(history_path(dir.path())).unwrap();
        let candidates = CandidateSet::from_names(["cd", "exit", "echo", "ls", "list", "cat"]);
        let shell = Shell::new("/home/sushi", candidates, history);
        Self { dir, shell }
    }

    fn press(&mut self, key: Key) -> Control {
        self.shell.handle(InputEvent::Key(key)).unwrap()
    }

    fn type_str(&mut self, text: &str) {
        for ch in text.chars() {
            assert_eq!(self.press(Key::Char(ch)), Control::Continue);
        }
    }

    fn submit(&mut self, line: &str) -> Control {
        self.type_str(line);
        self.press(Key::Enter)
    }

    fn history(&self) -> &[String] {
        self.shell.history().entries()
    }

    fn history_file(&self) -> String {
        fs::read_to_string(history_path(self.dir.path())).unwrap()
    }
}

fn history_path(dir: &Path) -> PathBuf {
    dir.join(".sushi_history")
}

#[test]
#[serial]
fn cd_changes_directory_and_is_recorded() {
    let original = env::current_dir().unwrap();
    let mut session = Session::new();

    assert_eq!(session.submit("cd /tmp"), Control::Continue);

    assert_eq!(
        env::current_dir().unwrap(),
        Path::new("/tmp").canonicalize().unwrap()
    );
    let turn = session.shell.transcript().last().unwrap();
    assert_eq!(turn.input(), "cd /tmp");
    assert_eq!(turn.stdout(), "");
    assert_eq!(turn.stderr(), "");
    assert_eq!(session.history(), ["cd /tmp"]);
    assert_eq!(session.history_file(), "cd /tmp\n");

    env::set_current_dir(original).unwrap();
}

#[test]
#[serial]
fn cd_expands_home_shorthand() {
    let original = env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().canonicalize().unwrap();
    let history = HistoryStore::load(history_path(&home)).unwrap();
    let mut shell = Shell::new(
        home.to_string_lossy(),
        CandidateSet::from_names(["cd"]),
        history,
    );
    fs::create_dir(home.join("src")).unwrap();

    for ch in "cd ~/src".chars() {
        shell.handle(Key::Char(ch).into()).unwrap();
    }
    shell.handle(Key::Enter.into()).unwrap();
    assert_eq!(env::current_dir().unwrap(), home.join("src"));
    // The line is recorded as typed.
    assert_eq!(shell.history().entries(), ["cd ~/src"]);

    env::set_current_dir(original).unwrap();
}

#[test]
fn unknown_command_is_reported_and_not_recorded() {
    let mut session = Session::new();

    assert_eq!(session.submit("nonexistent-cmd"), Control::Continue);

    let turn = session.shell.transcript().last().unwrap();
    assert!(turn.stderr().contains("nonexistent-cmd"));
    assert_eq!(turn.tone(), Tone::Error);
    assert!(session.history().is_empty());
    assert_eq!(session.history_file(), "");

    // A fresh prompt is open and the loop keeps going.
    assert_eq!(session.shell.prompt().value(), "");
    assert_eq!(session.shell.prompt().focus(), Focus::EditingLine);
    assert!(session.shell.render().contains("nonexistent-cmd"));
}

#[test]
fn cd_without_argument_is_reported() {
    let mut session = Session::new();
    session.submit("cd");
    let turn = session.shell.transcript().last().unwrap();
    assert!(turn.stderr().contains("required"));
    assert!(session.history().is_empty());
}

#[test]
fn background_command_returns_immediately() {
    let mut session = Session::new();

    let started = Instant::now();
    assert_eq!(session.submit("sleep 100 &"), Control::Continue);
    assert!(started.elapsed() < Duration::from_millis(250));

    let turn = session.shell.transcript().last().unwrap();
    assert_eq!(turn.stdout(), "");
    assert_eq!(turn.stderr(), "");
    assert_eq!(session.history(), ["sleep 100 &"]);

    // The next line is accepted right away.
    session.type_str("ec");
    assert_eq!(session.shell.prompt().value(), "ec");
}

#[test]
fn foreground_output_is_captured_and_recorded_once() {
    let mut session = Session::new();
    session.submit("echo hello sushi");
    session.submit("echo hello sushi");

    let turns = session.shell.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].stdout(), "hello sushi\n");
    assert_eq!(turns[0].tone(), Tone::Success);
    assert_eq!(session.history(), ["echo hello sushi"]);
    assert_eq!(session.history_file(), "echo hello sushi\n");
}

#[test]
fn failing_command_shows_status_and_is_not_recorded() {
    let mut session = Session::new();
    session.submit("sh -c exit");
    session.submit("false");

    let turn = session.shell.transcript().last().unwrap();
    assert!(turn.stderr().contains("false"));
    assert!(turn.stderr().contains("exit status"));
    assert_eq!(session.history(), ["sh -c exit"]);
}

#[test]
fn exit_ends_the_loop_without_recording() {
    let mut session = Session::new();
    assert_eq!(session.submit("exit"), Control::Exit);
    assert!(session.history().is_empty());
    assert!(session.shell.transcript().is_empty());
}

#[test]
fn empty_submission_opens_a_new_turn() {
    let mut session = Session::new();
    assert_eq!(session.press(Key::Enter), Control::Continue);
    assert_eq!(session.shell.transcript().len(), 1);
    assert!(session.history().is_empty());
}

#[test]
fn bare_background_marker_runs_nothing_and_is_not_recorded() {
    let mut session = Session::new();
    assert_eq!(session.submit("&"), Control::Continue);

    let turn = session.shell.transcript().last().unwrap();
    assert_eq!(turn.input(), "&");
    assert_eq!(turn.tone(), Tone::Neutral);
    assert!(session.history().is_empty());
    assert_eq!(session.history_file(), "");
}

#[test]
fn tab_accepts_a_hint() {
    let mut session = Session::new();
    session.type_str("l");
    let hints = session.shell.prompt().hints().hints().to_vec();
    assert_eq!(hints, ["ls", "list"]);
    assert!(!hints.contains(&"cat".to_string()));

    session.press(Key::Right);
    assert_eq!(session.shell.prompt().focus(), Focus::BrowsingHints);
    session.press(Key::Right);
    session.press(Key::Tab);
    assert_eq!(session.shell.prompt().focus(), Focus::EditingLine);
    assert_eq!(session.shell.prompt().value(), "list");
}

#[test]
fn submitted_lines_can_be_recalled() {
    let mut session = Session::new();
    session.submit("echo one");
    session.submit("echo two");

    session.press(Key::Up);
    assert_eq!(session.shell.prompt().value(), "echo two");
    session.press(Key::Up);
    assert_eq!(session.shell.prompt().value(), "echo one");
    session.press(Key::Down);
    session.press(Key::Down);
    assert_eq!(session.shell.prompt().value(), "");

    // Submitting while browsing resets the history cursor.
    session.press(Key::Up);
    session.press(Key::Enter);
    assert_eq!(session.shell.history().cursor(), 0);
}

#[test]
fn losing_the_history_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state");
    fs::create_dir(&nested).unwrap();
    let history = HistoryStore::load(history_path(&nested)).unwrap();
    let mut shell = Shell::new("/home/sushi", CandidateSet::from_names(["echo"]), history);
    fs::remove_dir_all(&nested).unwrap();

    for ch in "echo hi".chars() {
        shell.handle(Key::Char(ch).into()).unwrap();
    }
    let err = shell.handle(Key::Enter.into()).unwrap_err();
    assert!(err.path.ends_with(".sushi_history"));
}
