//! Live progressive preview in the terminal.
//!
//! Each character cell shows two vertically stacked pixels using the upper-half-block
//! glyph, foreground for the top pixel and background for the bottom. The frame
//! lifecycle runs on a fixed tick: when the renderer finishes a frame, time advances
//! and the next one starts; meanwhile whatever has been traced so far is presented.

use std::io::{self, Write as _};
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyModifiers};
use crossterm::style::{self, Color};
use crossterm::{cursor, event, execute, queue, terminal};

use glowfield::renderer::{PixelGrid, Renderer};

/// How long to present between frame-lifecycle checks.
const TICK: Duration = Duration::from_millis(100);

/// Options for `glowfield preview`.
#[derive(Debug, clap::Args)]
pub struct PreviewOptions {
    /// Seconds of scene time to advance per frame.
    #[arg(long, default_value_t = 0.1)]
    pub frame_step: f32,
}

pub fn preview_main(options: &PreviewOptions) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run_loop(&mut stdout, options);

    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run_loop(stdout: &mut io::Stdout, options: &PreviewOptions) -> anyhow::Result<()> {
    let mut renderer = Renderer::new(Box::new(glowfield::demo::build_scene));

    let (columns, rows) = terminal::size()?;
    renderer.resize(u32::from(columns), u32::from(rows) * 2);

    loop {
        if renderer.is_done() {
            renderer.update(options.frame_step);
            renderer.render_frame();
        }
        draw(stdout, &*renderer.frame())?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => {
                    let quit = matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
                        || (key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL));
                    if quit {
                        return Ok(());
                    }
                }
                Event::Resize(columns, rows) => {
                    // Cancels and drains any in-flight frame before reallocating.
                    renderer.resize(u32::from(columns), u32::from(rows) * 2);
                }
                _ => {}
            }
        }
    }
}

fn draw(stdout: &mut io::Stdout, frame: &PixelGrid) -> anyhow::Result<()> {
    for cell_row in 0..frame.height() / 2 {
        queue!(stdout, cursor::MoveTo(0, cell_row as u16))?;
        for x in 0..frame.width() {
            let [tr, tg, tb] = frame.get(x, cell_row * 2).to_srgb8();
            let [br, bg, bb] = frame.get(x, cell_row * 2 + 1).to_srgb8();
            queue!(
                stdout,
                style::SetForegroundColor(Color::Rgb { r: tr, g: tg, b: tb }),
                style::SetBackgroundColor(Color::Rgb { r: br, g: bg, b: bb }),
                style::Print('▀'),
            )?;
        }
    }
    queue!(stdout, style::ResetColor)?;
    stdout.flush()?;
    Ok(())
}
