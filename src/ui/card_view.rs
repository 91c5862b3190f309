use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::device::Frame;
use crate::engine::card::RenderedCard;
use crate::ui::layout::panel_area;

const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;

/// One full-screen refresh: a bordered panel centred on the terminal.
pub struct CardView<'a> {
    frame: Frame<'a>,
}

impl<'a> CardView<'a> {
    pub fn new(frame: Frame<'a>) -> Self {
        Self { frame }
    }

    fn body(&self) -> Vec<Line<'a>> {
        match self.frame {
            Frame::Banner { title, subtitle } => vec![
                Line::styled(
                    title,
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                ),
                Line::raw(""),
                Line::raw(subtitle),
            ],
            Frame::Question(card) => question_lines(card),
            Frame::Answer(card) => {
                let mut lines = question_lines(card);
                lines.extend(
                    card.romanization
                        .iter()
                        .map(|l| Line::styled(l.as_str(), Style::default().fg(ACCENT))),
                );
                lines.push(Line::raw(""));
                lines.extend(card.answer.iter().map(|l| Line::raw(l.as_str())));
                if !card.notes.is_empty() {
                    lines.push(Line::raw(""));
                    lines.extend(
                        card.notes
                            .iter()
                            .map(|l| Line::styled(l.as_str(), Style::default().fg(DIM))),
                    );
                }
                lines
            }
        }
    }

    fn hint(&self) -> &'static str {
        match self.frame {
            Frame::Banner { .. } => " q quit ",
            Frame::Question(_) => " any key reveal · q quit ",
            Frame::Answer(_) => " 1 easy · 2 medium · 3 hard ",
        }
    }
}

fn question_lines(card: &RenderedCard) -> Vec<Line<'_>> {
    card.question
        .iter()
        .map(|l| Line::styled(l.as_str(), Style::default().add_modifier(Modifier::BOLD)))
        .collect()
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let panel = panel_area(area);
        let block = Block::bordered()
            .title(" inkcards ")
            .title_bottom(Line::styled(self.hint(), Style::default().fg(DIM)).centered())
            .border_style(Style::default().fg(DIM));
        let inner = block.inner(panel);
        block.render(panel, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.body();
        let used = (lines.len() as u16).min(inner.height);
        let top = (inner.height - used) / 2;
        let text_area = Rect {
            x: inner.x,
            y: inner.y + top,
            width: inner.width,
            height: inner.height - top,
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(text_area, buf);
    }
}
