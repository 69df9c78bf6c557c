//! The session transcript: every finished turn followed by the live prompt,
//! laid out as boxed rows of styled text and viewed through a scrolling
//! window.

use std::ops::Range;

use crate::error::{Captured, ExecError};
use crate::prompt::{Focus, Prompt};

const PROMPT_MARK: &str = "❯ ";
const MIN_WIDTH: usize = 8;
const TAB_WIDTH: usize = 4;

/// One submitted line and what it printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    input: String,
    stdout: String,
    stderr: String,
}

impl Turn {
    /// A turn that produced no output (empty line, `cd`, background start).
    pub fn quiet(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn completed(input: impl Into<String>, output: Captured) -> Self {
        Self {
            input: input.into(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }

    /// Keeps whatever the child printed and appends the failure reason to
    /// stderr.
    pub fn failed(input: impl Into<String>, err: &ExecError) -> Self {
        let (stdout, mut stderr) = match err.captured() {
            Some(output) => (output.stdout.clone(), output.stderr.clone()),
            None => (String::new(), String::new()),
        };
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&err.to_string());

        Self {
            input: input.into(),
            stdout,
            stderr,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn tone(&self) -> Tone {
        if !self.stderr.is_empty() {
            Tone::Error
        } else if !self.stdout.is_empty() {
            Tone::Success
        } else {
            Tone::Neutral
        }
    }
}

/// Visual treatment of a turn's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Nothing printed yet, or nothing to print.
    Neutral,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Border(Tone),
    PromptMark,
    Input,
    Cursor,
    Stdout,
    Stderr,
    Hint,
    HintSelected { active: bool },
}

pub type Rgb = (u8, u8, u8);

impl Style {
    pub fn foreground(self) -> Option<Rgb> {
        match self {
            Style::Plain | Style::Stdout => None,
            Style::Border(Tone::Neutral) => Some((0x56, 0xEE, 0xF4)),
            Style::Border(Tone::Success) => Some((0xC7, 0xEF, 0x00)),
            Style::Border(Tone::Error) | Style::Stderr => Some((0xDB, 0x16, 0x2F)),
            Style::PromptMark => Some((0x31, 0x85, 0xFC)),
            Style::Input | Style::HintSelected { .. } => Some((0xF0, 0xF7, 0xF4)),
            Style::Cursor => Some((0x0C, 0x0C, 0x14)),
            Style::Hint => Some((0x58, 0x58, 0x58)),
        }
    }

    pub fn background(self) -> Option<Rgb> {
        match self {
            Style::Cursor => Some((0x31, 0x85, 0xFC)),
            Style::HintSelected { active: true } => Some((0xFF, 0x5F, 0xAF)),
            Style::HintSelected { active: false } => Some((0x3A, 0x3A, 0x3A)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Finished turns, oldest first. Only ever appended to.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Every turn plus the live prompt, framed to `width` columns.
    pub fn layout(&self, live: &Prompt, width: u16) -> Vec<Line> {
        let width = usize::from(width).max(MIN_WIDTH);
        let mut lines = Vec::new();

        for turn in &self.turns {
            let mut rows = vec![vec![
                Span::new(PROMPT_MARK, Style::PromptMark),
                Span::new(turn.input.as_str(), Style::Input),
            ]];
            rows.extend(text_rows(&turn.stdout, Style::Stdout));
            rows.extend(text_rows(&turn.stderr, Style::Stderr));
            frame(&mut lines, rows, turn.tone(), width);
        }

        let rows = vec![prompt_row(live), hint_row(live)];
        frame(&mut lines, rows, Tone::Neutral, width);
        lines
    }
}

fn text_rows(text: &str, style: Style) -> Vec<Vec<Span>> {
    text.lines()
        .map(|line| {
            let line = line.trim_end_matches('\r').replace('\t', &" ".repeat(TAB_WIDTH));
            vec![Span::new(line, style)]
        })
        .collect()
}

fn prompt_row(live: &Prompt) -> Vec<Span> {
    let editor = live.editor();
    let mut row = vec![Span::new(PROMPT_MARK, Style::PromptMark)];

    if live.focus() == Focus::BrowsingHints {
        row.push(Span::new(editor.value(), Style::Input));
        return row;
    }

    let chars: Vec<char> = editor.value().chars().collect();
    let (before, rest) = chars.split_at(editor.cursor().min(chars.len()));
    row.push(Span::new(before.iter().collect::<String>(), Style::Input));
    match rest.split_first() {
        Some((under, after)) => {
            row.push(Span::new(under.to_string(), Style::Cursor));
            row.push(Span::new(after.iter().collect::<String>(), Style::Input));
        }
        None => row.push(Span::new(" ", Style::Cursor)),
    }
    row
}

fn hint_row(live: &Prompt) -> Vec<Span> {
    let hints = live.hints();
    let active = live.focus() == Focus::BrowsingHints;
    hints
        .hints()
        .iter()
        .enumerate()
        .map(|(i, hint)| {
            let style = if i == hints.cursor() {
                Style::HintSelected { active }
            } else {
                Style::Hint
            };
            Span::new(format!(" {} ", hint), style)
        })
        .collect()
}

/// Draw `rows` inside a rounded box, wrapping anything wider than the box.
fn frame(out: &mut Vec<Line>, rows: Vec<Vec<Span>>, tone: Tone, width: usize) {
    let inner = width - 4;
    let border = Style::Border(tone);

    out.push(Line::default());
    out.push(Line {
        spans: vec![Span::new(format!("╭{}╮", "─".repeat(width - 2)), border)],
    });

    for row in rows {
        for mut wrapped in wrap(row, inner) {
            let used: usize = wrapped.iter().map(|s| s.text.chars().count()).sum();
            let mut spans = vec![Span::new("│ ", border)];
            spans.append(&mut wrapped);
            spans.push(Span::new(" ".repeat(inner - used), Style::Plain));
            spans.push(Span::new(" │", border));
            out.push(Line { spans });
        }
    }

    out.push(Line {
        spans: vec![Span::new(format!("╰{}╯", "─".repeat(width - 2)), border)],
    });
}

/// Split a row of spans into rows at most `width` characters wide. An empty
/// row stays one (empty) row.
fn wrap(row: Vec<Span>, width: usize) -> Vec<Vec<Span>> {
    let mut rows = vec![Vec::new()];
    let mut used = 0;

    for span in row {
        let mut current = String::new();
        for ch in span.text.chars() {
            if used == width {
                flush(&mut rows, &mut current, span.style);
                rows.push(Vec::new());
                used = 0;
            }
            current.push(ch);
            used += 1;
        }
        flush(&mut rows, &mut current, span.style);
    }

    rows
}

fn flush(rows: &mut [Vec<Span>], current: &mut String, style: Style) {
    if current.is_empty() {
        return;
    }
    if let Some(last) = rows.last_mut() {
        last.push(Span::new(std::mem::take(current), style));
    }
}

/// Which slice of the laid-out transcript is on screen.
#[derive(Debug, Clone)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    follow: bool,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            offset: 0,
            follow: true,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Stick to the newest line again.
    pub fn goto_bottom(&mut self) {
        self.follow = true;
    }

    /// Move by `delta` lines; landing on the bottom re-enables following.
    pub fn scroll(&mut self, delta: i32, total: usize) {
        let max_start = total.saturating_sub(usize::from(self.height));
        let start = self.window(total).start as i64 + i64::from(delta);
        self.offset = start.clamp(0, max_start as i64) as usize;
        self.follow = self.offset >= max_start;
    }

    pub fn window(&self, total: usize) -> Range<usize> {
        let height = usize::from(self.height);
        let max_start = total.saturating_sub(height);
        let start = if self.follow {
            max_start
        } else {
            self.offset.min(max_start)
        };
        start..(start + height).min(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn tone_follows_output() {
        assert_eq!(Turn::quiet("cd /tmp").tone(), Tone::Neutral);

        let ok = Turn::completed(
            "echo hi",
            Captured {
                stdout: "hi\n".into(),
                stderr: String::new(),
            },
        );
        assert_eq!(ok.tone(), Tone::Success);

        let noisy = Turn::completed(
            "make",
            Captured {
                stdout: "built\n".into(),
                stderr: "warning\n".into(),
            },
        );
        assert_eq!(noisy.tone(), Tone::Error);
    }

    #[test]
    fn failed_turn_carries_reason() {
        let turn = Turn::failed("nonexistent-cmd", &ExecError::CommandNotFound("nonexistent-cmd".into()));
        assert_eq!(turn.stdout(), "");
        assert!(turn.stderr().contains("nonexistent-cmd"));
        assert_eq!(turn.tone(), Tone::Error);
    }

    #[test]
    fn layout_frames_every_turn() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::completed(
            "echo hi",
            Captured {
                stdout: "hi\n".into(),
                stderr: String::new(),
            },
        ));

        let lines = transcript.layout(&Prompt::new(), 20);
        let text = texts(&lines);
        assert_eq!(
            text,
            vec![
                "",
                "╭──────────────────╮",
                "│ ❯ echo hi        │",
                "│ hi               │",
                "╰──────────────────╯",
                "",
                "╭──────────────────╮",
                "│ ❯                │",
                "│                  │",
                "╰──────────────────╯",
            ]
        );
        assert!(lines.iter().all(|l| l.text().chars().count() == 20 || l.spans.is_empty()));
        assert_eq!(lines[1].spans[0].style, Style::Border(Tone::Success));
    }

    #[test]
    fn long_rows_wrap() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::completed(
            "x",
            Captured {
                stdout: "abcdefghij".into(),
                stderr: String::new(),
            },
        ));
        let lines = transcript.layout(&Prompt::new(), 10);
        let text = texts(&lines);
        assert_eq!(text[3], "│ abcdef │");
        assert_eq!(text[4], "│ ghij   │");
    }

    #[test]
    fn viewport_follows_until_scrolled() {
        let mut view = Viewport::new(80, 5);
        assert_eq!(view.window(3), 0..3);
        assert_eq!(view.window(12), 7..12);

        view.scroll(-4, 12);
        assert!(!view.is_following());
        assert_eq!(view.window(12), 3..8);
        assert_eq!(view.window(20), 3..8);

        view.scroll(100, 20);
        assert!(view.is_following());
        assert_eq!(view.window(20), 15..20);

        view.scroll(-100, 20);
        assert_eq!(view.window(20), 0..5);
        view.goto_bottom();
        assert_eq!(view.window(20), 15..20);
    }
}
