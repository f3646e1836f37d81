//! Crossterm terminal driver.
//!
//! Puts the terminal in raw alternate-screen mode with mouse capture,
//! translates terminal events into visualizer [`Input`]s and flushes canvas
//! diffs.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind},
    execute, queue,
    style::{Color as CtColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use crate::canvas::{Change, Shade};
use crate::visualizer::{Input, Visualizer};

/// Foreground and background colours for a shade.
fn colors(shade: Shade) -> (CtColor, CtColor) {
    let rgb = |r, g, b| CtColor::Rgb { r, g, b };
    match shade {
        Shade::Empty => (rgb(90, 90, 100), rgb(240, 240, 240)),
        Shade::Wall => (rgb(200, 200, 200), rgb(20, 20, 20)),
        Shade::Start => (rgb(255, 255, 255), rgb(40, 90, 220)),
        Shade::End => (rgb(255, 255, 255), rgb(30, 160, 60)),
        Shade::Frontier => (rgb(40, 40, 40), rgb(170, 220, 250)),
        Shade::Expanded => (rgb(230, 230, 255), rgb(70, 110, 200)),
        Shade::Path => (rgb(40, 40, 0), rgb(250, 220, 60)),
        Shade::Text => (CtColor::Reset, CtColor::Reset),
    }
}

/// Maps a key press to an input.
fn key_input(code: KeyCode, modifiers: KeyModifiers) -> Option<Input> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char(' ') => Some(Input::Start),
        KeyCode::Char('n') => Some(Input::Step),
        KeyCode::Char('c') => Some(Input::Clear),
        KeyCode::Esc => Some(Input::Cancel),
        KeyCode::Char('q') => Some(Input::Quit),
        _ => None,
    }
}

/// A terminal back-end using crossterm. Mouse capture is always on: editing
/// the grid is done with the mouse.
#[derive(Debug, Default)]
pub struct TermDriver;

impl TermDriver {
    /// Create a new driver.
    pub fn new() -> Self {
        Self
    }

    /// Initialise the terminal.
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All),
            event::EnableMouseCapture
        )?;
        Ok(())
    }

    /// Wait up to `timeout` for terminal events and translate the pending
    /// ones. Mouse positions outside the grid are dropped.
    pub fn poll(&mut self, model: &Visualizer, timeout: Duration) -> io::Result<Vec<Input>> {
        let mut inputs = Vec::new();
        if !event::poll(timeout)? {
            return Ok(inputs);
        }

        while event::poll(Duration::ZERO)? {
            let input = match event::read()? {
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) => key_input(code, modifiers),
                Event::Mouse(me) => match me.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        model.cell_at(me.column, me.row).map(Input::Click)
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        model.cell_at(me.column, me.row).map(Input::Drag)
                    }
                    MouseEventKind::Up(MouseButton::Left) => Some(Input::Release),
                    _ => None,
                },
                _ => None,
            };
            if let Some(input) = input {
                log::debug!("input: {input:?}");
                inputs.push(input);
            }
        }
        Ok(inputs)
    }

    /// Draw the changed glyphs.
    pub fn flush(&mut self, changes: &[Change]) -> io::Result<()> {
        let mut stdout = io::stdout();
        for c in changes {
            let (fg, bg) = colors(c.glyph.shade);
            queue!(
                stdout,
                cursor::MoveTo(c.x, c.y),
                SetForegroundColor(fg),
                SetBackgroundColor(bg),
                Print(c.glyph.ch)
            )?;
        }
        queue!(stdout, ResetColor)?;
        stdout.flush()
    }

    /// Restore the terminal.
    pub fn close(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, event::DisableMouseCapture);
        let _ = execute!(stdout, ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_inputs() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_input(KeyCode::Enter, none), Some(Input::Start));
        assert_eq!(key_input(KeyCode::Char('n'), none), Some(Input::Step));
        assert_eq!(key_input(KeyCode::Char('c'), none), Some(Input::Clear));
        assert_eq!(
            key_input(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Input::Quit)
        );
        assert_eq!(key_input(KeyCode::Esc, none), Some(Input::Cancel));
        assert_eq!(key_input(KeyCode::Char('x'), none), None);
    }

    #[test]
    fn every_shade_has_distinct_background() {
        let shades = [
            Shade::Empty,
            Shade::Wall,
            Shade::Start,
            Shade::End,
            Shade::Frontier,
            Shade::Expanded,
            Shade::Path,
        ];
        for (i, a) in shades.iter().enumerate() {
            for b in &shades[i + 1..] {
                assert_ne!(colors(*a).1, colors(*b).1, "{a:?} vs {b:?}");
            }
        }
    }
}
