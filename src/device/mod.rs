//! Capability interfaces for the physical collaborators: the slow-refresh
//! display and the three response buttons.

pub mod sim;

use crate::engine::card::{CardContent, RenderedCard, Response};
use crate::error::Result;

/// The three physical buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Easy,
    Medium,
    Hard,
}

impl Button {
    pub fn response(self) -> Response {
        match self {
            Button::Easy => Response::Easy,
            Button::Medium => Response::Medium,
            Button::Hard => Response::Hard,
        }
    }
}

/// What one physical refresh puts on the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Frame<'a> {
    Banner { title: &'a str, subtitle: &'a str },
    Question(&'a RenderedCard),
    Answer(&'a RenderedCard),
}

impl Frame<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Banner { .. } => "banner",
            Frame::Question(_) => "question",
            Frame::Answer(_) => "answer",
        }
    }
}

pub trait DisplaySurface {
    /// Lay a card out for this surface. Called once per card; the result is
    /// cached on the card.
    fn layout(&self, content: &CardContent) -> RenderedCard;

    /// Perform one physical refresh.
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()>;
}

pub trait InputSource {
    /// True while any button is held down.
    fn is_any_pressed(&mut self) -> Result<bool>;

    /// The button currently held, if any.
    fn pressed_button(&mut self) -> Result<Option<Button>>;
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for Box<D> {
    fn layout(&self, content: &CardContent) -> RenderedCard {
        (**self).layout(content)
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        (**self).draw(frame)
    }
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn is_any_pressed(&mut self) -> Result<bool> {
        (**self).is_any_pressed()
    }

    fn pressed_button(&mut self) -> Result<Option<Button>> {
        (**self).pressed_button()
    }
}
