use serde::{Deserialize, Serialize};

use crate::engine::card::{CardContent, Flashcard};

pub const DEFAULT_INTERVAL: u64 = 300;

/// One card as persisted. A card file is a JSON array of these, in set order.
///
/// The `hanzi`/`pinyin`/`english` aliases accept files written by older
/// device firmware and its Anki converter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    #[serde(alias = "hanzi")]
    pub front_text: String,
    #[serde(alias = "pinyin")]
    pub romanization: String,
    #[serde(alias = "english")]
    pub translation: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default)]
    pub last_review: Option<u64>,
    #[serde(default)]
    pub review_count: u32,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL
}

impl From<FlashcardRecord> for Flashcard {
    fn from(record: FlashcardRecord) -> Self {
        Flashcard {
            content: CardContent {
                front_text: record.front_text,
                romanization: record.romanization,
                translation: record.translation,
                part_of_speech: record.part_of_speech,
                example: record.example,
            },
            interval: record.interval,
            last_review: record.last_review,
            review_count: record.review_count,
            rendered: None,
        }
    }
}

impl From<&Flashcard> for FlashcardRecord {
    fn from(card: &Flashcard) -> Self {
        FlashcardRecord {
            front_text: card.content.front_text.clone(),
            romanization: card.content.romanization.clone(),
            translation: card.content.translation.clone(),
            part_of_speech: card.content.part_of_speech.clone(),
            example: card.content.example.clone(),
            interval: card.interval,
            last_review: card.last_review,
            review_count: card.review_count,
        }
    }
}
