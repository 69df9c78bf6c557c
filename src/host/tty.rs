use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEventKind,
};
use crossterm::style::{Color, PrintStyledContent, StyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use log::{debug, warn};

use crate::event::{Control, InputEvent, Key};
use crate::shell::Shell;
use crate::transcript::Span;

const WHEEL_LINES: i32 = 3;

/// Run the shell full-screen in the current terminal until it exits.
pub fn run(mut shell: Shell) -> Result<()> {
    let mut stdout = io::stdout();

    // Outside raw mode the terminal's interrupt key signals the whole
    // foreground group; only the running command should die of it.
    ctrlc::set_handler(|| debug!("interrupt forwarded to the foreground command"))
        .context("failed to install the interrupt handler")?;

    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter the alternate screen")?;

    let result = event_loop(&mut shell, &mut stdout);

    // Best effort: the terminal must be restored even if the loop failed.
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen, cursor::Show);
    let _ = terminal::disable_raw_mode();
    result
}

fn event_loop(shell: &mut Shell, out: &mut impl Write) -> Result<()> {
    let (width, height) = terminal::size().context("failed to read terminal size")?;
    shell.handle(InputEvent::Resize { width, height })?;

    loop {
        draw(shell, out).context("failed to draw")?;

        let event = event::read().context("failed to read input")?;
        let Some(input) = translate(event) else {
            continue;
        };
        let control = if runs_command(&input) {
            let _cooked = CookedMode::enter().context("failed to leave raw mode")?;
            shell.handle(input)?
        } else {
            shell.handle(input)?
        };
        if control == Control::Exit {
            debug!("tty host exiting");
            return Ok(());
        }
    }
}

/// Whether `input` may start a foreground command, which then owns the
/// terminal until it exits.
fn runs_command(input: &InputEvent) -> bool {
    matches!(input, InputEvent::Key(Key::Enter))
}

/// Cooked terminal mode for as long as the guard lives, so a foreground
/// command sees line editing and Ctrl-C becomes SIGINT.
struct CookedMode;

impl CookedMode {
    fn enter() -> io::Result<Self> {
        terminal::disable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for CookedMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::enable_raw_mode() {
            warn!("failed to re-enable raw mode: {}", err);
        }
    }
}

fn draw(shell: &Shell, out: &mut impl Write) -> io::Result<()> {
    queue!(out, cursor::Hide)?;
    for (row, line) in shell.lines().iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, cursor::MoveTo(0, row), Clear(ClearType::CurrentLine))?;
        for span in &line.spans {
            queue!(out, PrintStyledContent(styled(span)))?;
        }
    }
    queue!(out, Clear(ClearType::FromCursorDown))?;
    out.flush()
}

fn styled(span: &Span) -> StyledContent<&str> {
    let mut content = span.text.as_str().stylize();
    if let Some((r, g, b)) = span.style.foreground() {
        content = content.with(Color::Rgb { r, g, b });
    }
    if let Some((r, g, b)) = span.style.background() {
        content = content.on(Color::Rgb { r, g, b });
    }
    content
}

fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => translate_key(key).map(InputEvent::Key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(InputEvent::Scroll(-WHEEL_LINES)),
            MouseEventKind::ScrollDown => Some(InputEvent::Scroll(WHEEL_LINES)),
            _ => None,
        },
        Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Key::Interrupt),
            KeyCode::Char('d') => Some(Key::EndOfInput),
            _ => None,
        };
    }

    let key = match key.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    };
    Some(key)
}
