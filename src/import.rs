//! Offline conversion of an Anki vocabulary export into card records.
//!
//! Expected row layout (no header row): index, simplified, traditional,
//! pinyin, numbered pinyin, English, part of speech, then free-form columns of
//! which 10 to 14 may hold an example sentence marked up with `<b>`.

use std::io::Read;

use icu_normalizer::ComposingNormalizerBorrowed;
use regex::Regex;

use crate::error::{Error, Result};
use crate::store::schema::{DEFAULT_INTERVAL, FlashcardRecord};

const MIN_COLUMNS: usize = 10;
const EXAMPLE_COLUMNS: std::ops::Range<usize> = 10..15;
const TAG_PATTERN: &str = r"<[^>]+>";

fn nfc(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text)
        .into_owned()
}

/// Rows that are too short or unreadable are skipped.
pub fn parse_anki_csv(input: impl Read) -> Result<Vec<FlashcardRecord>> {
    let tags = Regex::new(TAG_PATTERN).map_err(|e| Error::Import(e.into()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let row_data = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(row, error = %e, "skipping unreadable row");
                continue;
            }
        };
        if row_data.len() < MIN_COLUMNS {
            tracing::debug!(row, columns = row_data.len(), "skipping short row");
            continue;
        }

        let field = |i: usize| nfc(row_data.get(i).unwrap_or_default().trim());
        let example = EXAMPLE_COLUMNS
            .filter_map(|i| row_data.get(i))
            .find(|cell| cell.contains("<b>"))
            .map(|cell| nfc(&tags.replace_all(cell, "")));

        records.push(FlashcardRecord {
            front_text: field(1),
            romanization: field(3),
            translation: field(5),
            part_of_speech: field(6),
            example,
            interval: DEFAULT_INTERVAL,
            last_review: None,
            review_count: 0,
        });
    }

    tracing::info!(cards = records.len(), "parsed Anki export");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
1,学习,學習,xué xí,xue2 xi2,to study,verb,,,,<b>学习</b>中文很有意思。,Studying Chinese is fun.
2,短,短,duǎn,duan3,short,adjective,,,,no markup,,,<b>太</b>短了
3,too,few,columns
";

    #[test]
    fn test_parses_columns_and_example() {
        let records = parse_anki_csv(EXPORT.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.front_text, "学习");
        assert_eq!(first.romanization, "xué xí");
        assert_eq!(first.translation, "to study");
        assert_eq!(first.part_of_speech, "verb");
        assert_eq!(first.example.as_deref(), Some("学习中文很有意思。"));
        assert_eq!(first.interval, DEFAULT_INTERVAL);
        assert_eq!(first.last_review, None);
        assert_eq!(first.review_count, 0);

        assert_eq!(records[1].example.as_deref(), Some("太短了"));
    }

    #[test]
    fn test_missing_example_is_absent() {
        let row = "7,好,好,hǎo,hao3,good,adjective,a,b,c,plain,text\n";
        let records = parse_anki_csv(row.as_bytes()).unwrap();
        assert_eq!(records[0].example, None);
    }

    #[test]
    fn test_text_is_nfc_normalized() {
        // "e" followed by a combining acute accent
        let row = "1,x,x,xue\u{301},x,y,z,,,\n";
        let records = parse_anki_csv(row.as_bytes()).unwrap();
        assert_eq!(records[0].romanization, "xu\u{e9}");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_anki_csv("".as_bytes()).unwrap().is_empty());
    }
}
