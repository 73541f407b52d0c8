use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, poll, read};

use crate::TermInt;

pub type TermCoords = (TermInt, TermInt);

#[derive(Copy, Clone, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

const BLANK: Cell = Cell { ch: ' ', color: Color::Reset };

/// Owns the terminal. Keeps a copy of what is on screen so unchanged cells
/// are never re-sent and the board under a message box can be restored.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Cell>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: TermCoords,
    width: TermInt,
    height: TermInt,
    lines: Vec<String>,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        let screen = vec![BLANK; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor")?;
        self.clear()
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error disabling raw mode")?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen")?;
        Ok(())
    }

    /// Collects every pending event, waiting at most `timeout` for the first one.
    pub fn read_events(&self, timeout: Duration) -> Result<Vec<Event>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait).context("Error polling events")? {
            events.push(read().context("Error reading event")?);
            wait = Duration::ZERO;
        }

        Ok(events)
    }

    pub fn size(&self) -> TermCoords {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: TermInt, height: TermInt) -> Result<()> {
        self.width = width;
        self.height = height;
        self.current_msg = None;
        self.clear()
    }

    pub fn draw_borders(&mut self, top_left: TermCoords, width: TermInt, height: TermInt) {
        let (left, top) = top_left;
        let (right, bottom) = (left + width - 1, top + height - 1);

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            self.print_at((x, top), ch, Color::Reset);
            self.print_at((x, bottom), ch, Color::Reset);
        }

        for y in top + 1..bottom {
            self.print_at((left, y), '|', Color::Reset);
            self.print_at((right, y), '|', Color::Reset);
        }
    }

    pub fn print_str(&mut self, pos: TermCoords, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), ch, color);
        }
    }

    /// Shows a centered box with `lines`. Re-showing the same lines is a no-op.
    pub fn show_message(&mut self, lines: &[String]) {
        if let Some(msg) = &self.current_msg {
            if msg.lines == lines {
                return;
            }
            self.hide_message();
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4) as TermInt;
        if msg_width > self.width || msg_height > self.height {
            return;
        }
        let top_left = ((self.width - msg_width) / 2, (self.height - msg_height) / 2);

        for y_diff in 0..msg_height {
            let line = match y_diff {
                0 => "",
                n if n == msg_height - 1 => "",
                n => lines[n as usize - 1].as_str(),
            };
            let padded = format!("{line: ^width$}", line = line, width = msg_width as usize);
            for (x_diff, ch) in padded.chars().enumerate() {
                self.emit((top_left.0 + x_diff as TermInt, top_left.1 + y_diff), Cell { ch, color: Color::White });
            }
        }

        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height, lines: lines.to_vec() });
    }

    pub fn hide_message(&mut self) {
        let Some(msg) = self.current_msg.take() else {
            return;
        };

        // Put back what the box was covering
        for y in msg.top_left.1..msg.top_left.1 + msg.height {
            for x in msg.top_left.0..msg.top_left.0 + msg.width {
                let cell = self.screen[self.index((x, y))];
                self.emit((x, y), cell);
            }
        }
    }

    pub fn print_at(&mut self, pos: TermCoords, ch: char, color: Color) {
        if pos.0 >= self.width || pos.1 >= self.height {
            return;
        }

        let cell = Cell { ch, color };
        let idx = self.index(pos);
        if self.screen[idx] == cell {
            return;
        }
        self.screen[idx] = cell;

        let covered = self.current_msg.as_ref().map_or(false, |msg| msg.covers(pos));
        if !covered {
            self.emit(pos, cell);
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: TermCoords) -> usize {
        self.width as usize * pos.1 as usize + pos.0 as usize
    }

    fn emit(&mut self, pos: TermCoords, cell: Cell) {
        // Queued writes only fail when the flush does, which reports it
        let _ = queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::SetForegroundColor(cell.color),
            style::Print(cell.ch)
        );
    }
}

impl Message {
    fn covers(&self, pos: TermCoords) -> bool {
        pos.0 >= self.top_left.0 && pos.0 < self.top_left.0 + self.width
            && pos.1 >= self.top_left.1 && pos.1 < self.top_left.1 + self.height
    }
}
