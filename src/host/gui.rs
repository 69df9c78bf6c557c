use std::env;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use egui::text::{LayoutJob, TextFormat};
use log::error;

use crate::error::PersistenceError;
use crate::event::{Control, InputEvent, Key};
use crate::shell::Shell;
use crate::transcript::{Line, Rgb};

const FONT_SIZE: f32 = 16.0;
const MARGIN: f32 = 12.0;
const STATUS_BAR_HEIGHT: f32 = 28.0;
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(12, 12, 20);
const TEXT: egui::Color32 = egui::Color32::from_rgb(220, 220, 220);

type FailureSlot = Arc<Mutex<Option<PersistenceError>>>;

/// Run the shell in its own window until it exits or the window is closed.
pub fn run(shell: Shell) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_title("sushi")
            .with_resizable(true),
        ..Default::default()
    };

    let failure: FailureSlot = Arc::default();
    let slot = Arc::clone(&failure);

    eframe::run_native(
        "sushi",
        options,
        Box::new(move |cc| {
            let mut visuals = egui::Visuals::dark();
            visuals.window_fill = BACKGROUND;
            visuals.panel_fill = BACKGROUND;
            visuals.extreme_bg_color = BACKGROUND;
            cc.egui_ctx.set_visuals(visuals);

            Ok(Box::new(ShellApp::new(shell, slot)))
        }),
    )
    .map_err(|e| anyhow!("window host failed: {e}"))?;

    let failed = failure.lock().ok().and_then(|mut slot| slot.take());
    match failed {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

struct ShellApp {
    shell: Shell,
    size: (u16, u16),
    closing: bool,
    failure: FailureSlot,
}

impl ShellApp {
    fn new(shell: Shell, failure: FailureSlot) -> Self {
        Self {
            shell,
            size: (0, 0),
            closing: false,
            failure,
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, event: InputEvent) {
        if self.closing {
            return;
        }
        match self.shell.handle(event) {
            Ok(Control::Continue) => {}
            Ok(Control::Exit) => self.close(ctx),
            Err(err) => {
                error!("{}", err);
                if let Ok(mut slot) = self.failure.lock() {
                    *slot = Some(err);
                }
                self.close(ctx);
            }
        }
    }

    fn close(&mut self, ctx: &egui::Context) {
        self.closing = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Keep the shell's viewport in step with how many monospace cells fit.
    fn fit(&mut self, ctx: &egui::Context, available: egui::Vec2) {
        let font = egui::FontId::monospace(FONT_SIZE);
        let (cell_width, row_height) =
            ctx.fonts(|fonts| (fonts.glyph_width(&font, 'M'), fonts.row_height(&font)));
        if cell_width <= 0.0 || row_height <= 0.0 {
            return;
        }

        let cols = (available.x / cell_width).floor().clamp(1.0, f32::from(u16::MAX)) as u16;
        let rows = ((available.y - STATUS_BAR_HEIGHT) / row_height)
            .floor()
            .clamp(1.0, f32::from(u16::MAX)) as u16;
        if (cols, rows) != self.size {
            self.size = (cols, rows);
            self.dispatch(ctx, InputEvent::Resize { width: cols, height: rows });
        }
    }
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (events, wheel) = ctx.input(|i| (i.events.clone(), i.raw_scroll_delta.y));

        for event in &events {
            for input in translate(event) {
                self.dispatch(ctx, input);
            }
        }
        if wheel != 0.0 {
            let row_height = ctx.fonts(|f| f.row_height(&egui::FontId::monospace(FONT_SIZE)));
            let lines = (-wheel / row_height.max(1.0)).round() as i32;
            if lines != 0 {
                self.dispatch(ctx, InputEvent::Scroll(lines));
            }
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(BACKGROUND)
                    .inner_margin(egui::Margin::same(MARGIN)),
            )
            .show(ctx, |ui| {
                self.fit(ctx, ui.available_size());

                ui.spacing_mut().item_spacing = egui::vec2(0.0, 0.0);
                for line in self.shell.lines() {
                    ui.label(layout_line(&line));
                }

                ui.add_space(4.0);
                ui.separator();
                let cwd = env::current_dir()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                ui.small(format!("{} | Ctrl+D: exit", cwd));
            });
    }
}

fn color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

fn layout_line(line: &Line) -> LayoutJob {
    let mut job = LayoutJob::default();
    // Keep blank rows one row tall.
    if line.spans.is_empty() {
        job.append(" ", 0.0, format(TEXT, egui::Color32::TRANSPARENT));
        return job;
    }
    for span in &line.spans {
        let fg = span.style.foreground().map_or(TEXT, color);
        let bg = span
            .style
            .background()
            .map_or(egui::Color32::TRANSPARENT, color);
        job.append(&span.text, 0.0, format(fg, bg));
    }
    job
}

fn format(color: egui::Color32, background: egui::Color32) -> TextFormat {
    TextFormat {
        font_id: egui::FontId::monospace(FONT_SIZE),
        color,
        background,
        ..Default::default()
    }
}

fn translate(event: &egui::Event) -> Vec<InputEvent> {
    match event {
        egui::Event::Text(text) => text
            .chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| InputEvent::Key(Key::Char(ch)))
            .collect(),
        // Ctrl+C arrives as a copy request on most platforms.
        egui::Event::Copy => vec![InputEvent::Key(Key::Interrupt)],
        egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => translate_key(*key, *modifiers)
            .map(InputEvent::Key)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn translate_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<Key> {
    if modifiers.ctrl {
        return match key {
            egui::Key::C => Some(Key::Interrupt),
            egui::Key::D => Some(Key::EndOfInput),
            _ => None,
        };
    }

    let key = match key {
        egui::Key::Enter => Key::Enter,
        egui::Key::Tab => Key::Tab,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::Delete => Key::Delete,
        egui::Key::ArrowLeft => Key::Left,
        egui::Key::ArrowRight => Key::Right,
        egui::Key::ArrowUp => Key::Up,
        egui::Key::ArrowDown => Key::Down,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::PageUp => Key::PageUp,
        egui::Key::PageDown => Key::PageDown,
        _ => return None,
    };
    Some(key)
}
