//! crates/study_assistant_core/src/parser.rs
//!
//! Turns raw completion text into structured study records.
//!
//! Both routines are best-effort: the flashcard parser never fails, it just
//! drops blocks it cannot read. The quiz parser fails only when the completion
//! holds no usable JSON array at all; individual malformed questions are skipped.

use crate::domain::{Flashcard, QuizQuestion};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

/// Errors produced while reading a quiz completion.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Quiz completion is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Quiz completion is JSON but not an array")]
    NotAnArray,
}

fn fenced_array_regex() -> &'static Regex {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    FENCED.get_or_init(|| {
        Regex::new(r"```(?:json)?\s*(\[[\s\S]*?\])\s*```").expect("fenced block pattern is valid")
    })
}

fn question_marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?i)^Q:\s*").expect("question marker pattern is valid"))
}

fn answer_marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?i)^A:\s*").expect("answer marker pattern is valid"))
}

/// Splits a flashcard completion into question/answer records.
///
/// Cards are separated by blank lines. Within a card the first line is the
/// question (leading `Q:` removed) and the second the answer (leading `A:` removed).
/// Cards with an empty question or answer are dropped.
pub fn parse_flashcards(text: &str) -> Vec<Flashcard> {
    let normalized = text.replace("\r\n", "\n");

    normalized
        .split("\n\n")
        .filter_map(|block| {
            let mut lines = block.trim().lines();
            let question = lines
                .next()
                .map(|line| question_marker_regex().replace(line, "").trim().to_string())?;
            let answer = lines
                .next()
                .map(|line| answer_marker_regex().replace(line, "").trim().to_string())?;

            if question.is_empty() || answer.is_empty() {
                return None;
            }
            Some(Flashcard { question, answer })
        })
        .collect()
}

/// Returns the JSON array inside the first fenced code block, or the whole text
/// when there is no such block.
pub fn extract_json_block(text: &str) -> &str {
    fenced_array_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| text.trim())
}

/// Parses a quiz completion into questions.
///
/// Array elements that do not look like a quiz question are logged and skipped.
pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, ParseError> {
    let json = extract_json_block(text);
    let value: Value = serde_json::from_str(json)?;

    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray);
    };

    let questions = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match quiz_question_from_value(item) {
            Ok(question) => Some(question),
            Err(e) => {
                warn!("Skipping quiz item {}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(questions)
}

/// Options are usually an array, but some completions key them by letter
/// (`{"A": "...", "B": "..."}`). Both shapes end up as an ordered list.
fn quiz_question_from_value(mut item: Value) -> Result<QuizQuestion, serde_json::Error> {
    if let Some(Value::Object(by_letter)) = item.get("options") {
        let mut keyed: Vec<(String, Value)> = by_letter
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        let ordered = keyed.into_iter().map(|(_, v)| v).collect();
        item["options"] = Value::Array(ordered);
    }
    serde_json::from_value(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_well_formed_pair() {
        let text = "Q: What is photosynthesis?\nA: Turning light into chemical energy.\n\n\
                    Q: Where does it happen?\nA: In the chloroplasts.\n\n\
                    q: Which gas is released?\na: Oxygen.";
        let cards = parse_flashcards(text);

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].question, "What is photosynthesis?");
        assert_eq!(cards[0].answer, "Turning light into chemical energy.");
        assert_eq!(cards[2].question, "Which gas is released?");
        assert_eq!(cards[2].answer, "Oxygen.");
    }

    #[test]
    fn drops_blocks_without_an_answer_line() {
        let text = "Here are your flashcards:\n\n\
                    Q: What is chlorophyll?\nA: A green pigment.\n\n\
                    Q: Dangling question with no answer";
        let cards = parse_flashcards(text);

        assert_eq!(
            cards,
            vec![Flashcard {
                question: "What is chlorophyll?".to_string(),
                answer: "A green pigment.".to_string(),
            }]
        );
    }

    #[test]
    fn drops_blocks_with_empty_fields() {
        let cards = parse_flashcards("Q:\nA: orphan answer\n\nQ: orphan question\nA:   ");
        assert!(cards.is_empty());
    }

    #[test]
    fn handles_crlf_and_extra_blank_lines() {
        let text = "Q: One?\r\nA: 1\r\n\r\n\r\n\r\nQ: Two?\r\nA: 2\r\n";
        let cards = parse_flashcards(text);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].answer, "2");
    }

    #[test]
    fn empty_completion_yields_no_cards() {
        assert!(parse_flashcards("").is_empty());
        assert!(parse_flashcards("   \n\n  ").is_empty());
    }

    #[test]
    fn extracts_fenced_json_and_ignores_prose() {
        let text = "Sure! Here is your quiz:\n```json\n[{\"question\": \"Q1\"}]\n```\nGood luck!";
        assert_eq!(extract_json_block(text), "[{\"question\": \"Q1\"}]");

        let untagged = "```\n[1, 2]\n```";
        assert_eq!(extract_json_block(untagged), "[1, 2]");
    }

    #[test]
    fn falls_back_to_raw_text_without_fence() {
        assert_eq!(extract_json_block("  [1]  \n"), "[1]");
    }

    #[test]
    fn parses_fenced_quiz() {
        let text = r#"Here you go:
```json
[
  {
    "question": "What do plants release?",
    "options": ["A) Oxygen", "B) Nitrogen", "C) Helium", "D) Argon"],
    "correct_answer": "A",
    "explanation": "Oxygen is a by-product of photosynthesis."
  },
  {
    "question": "Which pigment absorbs light?",
    "options": ["A) Keratin", "B) Chlorophyll", "C) Melanin", "D) Hemoglobin"],
    "correctAnswer": "B"
  }
]
```"#;
        let quiz = parse_quiz(text).expect("fenced quiz should parse");

        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz[0].options.len(), 4);
        assert_eq!(quiz[0].correct_answer, "A");
        assert_eq!(quiz[1].correct_answer, "B");
        assert_eq!(quiz[1].explanation, "");
    }

    #[test]
    fn orders_letter_keyed_options() {
        let text = r#"[{"question": "Q", "options": {"B": "two", "A": "one", "D": "four", "C": "three"}, "correct_answer": "C"}]"#;
        let quiz = parse_quiz(text).expect("keyed options should parse");
        assert_eq!(quiz[0].options, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn skips_items_without_a_question() {
        let text = r#"[{"options": ["a"]}, {"question": "Kept", "options": ["a", "b", "c", "d"], "correct_answer": "D"}]"#;
        let quiz = parse_quiz(text).expect("array should parse");
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].question, "Kept");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_quiz("```json\n[{\"question\": \"broken\",]\n```").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));

        let err = parse_quiz("Sorry, I cannot produce a quiz for this.").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn json_object_is_not_a_quiz() {
        let err = parse_quiz(r#"{"question": "solo"}"#).unwrap_err();
        assert!(matches!(err, ParseError::NotAnArray));
    }
}
