use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::device::{DisplaySurface, Frame};
use crate::engine::card::{CardContent, RenderedCard};
use crate::error::{Error, Result};
use crate::ui::card_view::CardView;
use crate::ui::layout::{panel_area, render_card, text_width};

const DEVICE: &str = "display";

/// The terminal standing in for the e-ink panel. Holds raw mode and the
/// alternate screen until dropped.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalDisplay {
    pub fn new() -> Result<Self> {
        enable_raw_mode().map_err(|e| Error::hardware(DEVICE, e))?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(Error::hardware(DEVICE, e));
        }
        let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore();
                return Err(Error::hardware(DEVICE, e));
            }
        };
        let _ = terminal.hide_cursor();
        Ok(Self { terminal })
    }
}

fn restore() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        restore();
        let _ = self.terminal.show_cursor();
    }
}

impl DisplaySurface for TerminalDisplay {
    fn layout(&self, content: &CardContent) -> RenderedCard {
        // Sized for the terminal as it is now; the cache is not redone on resize.
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        let panel = panel_area(Rect::new(0, 0, cols, rows));
        render_card(content, text_width(panel.width))
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        let frame = *frame;
        self.terminal
            .draw(|f| f.render_widget(CardView::new(frame), f.area()))
            .map_err(|e| Error::hardware(DEVICE, e))?;
        Ok(())
    }
}
