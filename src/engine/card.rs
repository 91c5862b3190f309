use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How well the card was recalled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Easy,
    Medium,
    Hard,
}

impl Response {
    pub const ALL: [Response; 3] = [Response::Easy, Response::Medium, Response::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Response::Easy => "easy",
            Response::Medium => "medium",
            Response::Hard => "hard",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Response::Easy => 1,
            Response::Medium => 2,
            Response::Hard => 3,
        }
    }
}

impl TryFrom<u8> for Response {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Response::Easy),
            2 => Ok(Response::Medium),
            3 => Ok(Response::Hard),
            other => Err(Error::InvalidResponse(other)),
        }
    }
}

/// The immutable, human-facing part of a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardContent {
    pub front_text: String,
    pub romanization: String,
    pub translation: String,
    pub part_of_speech: String,
    pub example: Option<String>,
}

/// Layout produced by a display surface for one card, kept so the question
/// and answer screens of the same card do not lay out text twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedCard {
    pub question: Vec<String>,
    pub romanization: Vec<String>,
    pub answer: Vec<String>,
    pub notes: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Flashcard {
    pub content: CardContent,
    /// Seconds until due, measured from `last_review`.
    pub interval: u64,
    /// Whole-second timestamp of the most recent response.
    pub last_review: Option<u64>,
    pub review_count: u32,
    pub rendered: Option<RenderedCard>,
}

impl Flashcard {
    pub fn new(content: CardContent, interval: u64) -> Self {
        Self {
            content,
            interval,
            last_review: None,
            review_count: 0,
            rendered: None,
        }
    }

    pub fn front_text(&self) -> &str {
        &self.content.front_text
    }

    pub fn is_new(&self) -> bool {
        self.last_review.is_none()
    }

    /// Seconds elapsed since the last review, or `None` if never reviewed.
    pub fn elapsed_secs(&self, now_secs: u64) -> Option<u64> {
        self.last_review.map(|last| now_secs.saturating_sub(last))
    }

    pub fn is_due(&self, now_secs: u64) -> bool {
        match self.elapsed_secs(now_secs) {
            None => true,
            Some(elapsed) => elapsed >= self.interval,
        }
    }

    /// Forget all scheduling history.
    pub fn reset(&mut self, interval: u64) {
        self.interval = interval;
        self.last_review = None;
        self.review_count = 0;
    }

    /// Layout for this card, building it with `layout` on first use.
    pub fn rendered_or_insert_with(
        &mut self,
        layout: impl FnOnce(&CardContent) -> RenderedCard,
    ) -> &RenderedCard {
        let content = &self.content;
        self.rendered.get_or_insert_with(|| layout(content))
    }
}

impl PartialEq for Flashcard {
    /// The render cache is derived state and does not take part in equality.
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
            && self.interval == other.interval
            && self.last_review == other.last_review
            && self.review_count == other.review_count
    }
}

#[cfg(test)]
pub(crate) fn sample_card(front: &str) -> Flashcard {
    Flashcard::new(
        CardContent {
            front_text: front.to_string(),
            romanization: format!("{front}-roman"),
            translation: format!("{front}-meaning"),
            part_of_speech: "noun".to_string(),
            example: None,
        },
        300,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card_is_due() {
        let card = sample_card("你好");
        assert!(card.is_new());
        assert!(card.is_due(0));
    }

    #[test]
    fn test_due_when_interval_elapsed() {
        let mut card = sample_card("谢谢");
        card.last_review = Some(1_000);
        card.interval = 300;
        assert!(!card.is_due(1_299));
        assert!(card.is_due(1_300));
        assert_eq!(card.elapsed_secs(1_450), Some(450));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut card = sample_card("再见");
        card.last_review = Some(5);
        card.review_count = 4;
        card.interval = 9_000;
        card.reset(300);
        assert_eq!(card.last_review, None);
        assert_eq!(card.review_count, 0);
        assert_eq!(card.interval, 300);
    }

    #[test]
    fn test_render_cache_built_once() {
        let mut card = sample_card("书");
        let mut calls = 0;
        for _ in 0..3 {
            card.rendered_or_insert_with(|content| {
                calls += 1;
                RenderedCard {
                    question: vec![content.front_text.clone()],
                    ..RenderedCard::default()
                }
            });
        }
        assert_eq!(calls, 1);
        assert_eq!(card.rendered.as_ref().unwrap().question, vec!["书".to_string()]);
    }

    #[test]
    fn test_response_codes() {
        for response in Response::ALL {
            assert_eq!(Response::try_from(response.code()).unwrap(), response);
        }
        assert!(matches!(Response::try_from(0), Err(Error::InvalidResponse(0))));
        assert!(matches!(Response::try_from(4), Err(Error::InvalidResponse(4))));
    }
}
