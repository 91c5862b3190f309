use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::engine::card::{CardContent, RenderedCard};

pub const PANEL_MAX_WIDTH: u16 = 64;
pub const PANEL_MAX_HEIGHT: u16 = 22;

/// Border plus one column of padding on each side.
const PANEL_CHROME: u16 = 4;

/// The card panel, centred in `area` and capped at the panel maximum.
pub fn panel_area(area: Rect) -> Rect {
    let width = area.width.min(PANEL_MAX_WIDTH);
    let height = area.height.min(PANEL_MAX_HEIGHT);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Columns available for card text inside a panel of `panel_width`.
pub fn text_width(panel_width: u16) -> usize {
    panel_width.saturating_sub(PANEL_CHROME).max(1) as usize
}

fn display_width(text: &str) -> usize {
    Line::from(text).width()
}

/// Greedy word wrap by display width. Words wider than a line, which is the
/// usual case for unspaced scripts, are broken between characters.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = display_width(word);

        if word_width > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let mut buf = [0u8; 4];
            for ch in word.chars() {
                let ch_width = display_width(ch.encode_utf8(&mut buf));
                if current_width + ch_width > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
            continue;
        }

        if !current.is_empty() && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay a card out for a panel `width` columns of text wide.
pub fn render_card(content: &CardContent, width: usize) -> RenderedCard {
    let mut notes = Vec::new();
    if !content.part_of_speech.trim().is_empty() {
        notes.extend(wrap(&format!("({})", content.part_of_speech.trim()), width));
    }
    if let Some(example) = &content.example {
        notes.extend(wrap(example, width));
    }
    RenderedCard {
        question: wrap(&content.front_text, width),
        romanization: wrap(&content.romanization, width),
        answer: wrap(&content.translation, width),
        notes,
    }
}
