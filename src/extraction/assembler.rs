//! Word and line assembly from positioned tokens.
//!
//! Tokens are sorted top-to-bottom, then left-to-right. A token joins the
//! pending word when it is within [`WORD_TOLERANCE`] both vertically and
//! horizontally. Words join the pending line when their top is within the
//! coarser [`LINE_TOLERANCE`] of the line's top.

use std::cmp::Ordering;

use crate::models::{BoundingBox, Line, PositionedToken, Word};

/// Maximum vertical and horizontal gap (px) between tokens of one word.
pub const WORD_TOLERANCE: f64 = 5.0;

/// Maximum vertical offset (px) between words of one line.
pub const LINE_TOLERANCE: f64 = 10.0;

fn reading_order(a: (usize, &BoundingBox), b: (usize, &BoundingBox)) -> Ordering {
    a.0.cmp(&b.0)
        .then(a.1.top.total_cmp(&b.1.top))
        .then(a.1.x0.total_cmp(&b.1.x0))
}

/// Merges tokens into words.
///
/// # Example
///
/// ```
/// use tax_credit_engine::extraction::assemble_words;
/// use tax_credit_engine::models::PositionedToken;
///
/// let tokens = vec![
///     PositionedToken::new("급", 100.0, 108.0, 50.0, 60.0),
///     PositionedToken::new("여", 108.0, 116.0, 50.0, 60.0),
///     PositionedToken::new("상여", 200.0, 216.0, 50.0, 60.0),
/// ];
/// let words = assemble_words(&tokens);
/// assert_eq!(words.len(), 2);
/// assert_eq!(words[0].text, "급여");
/// ```
pub fn assemble_words(tokens: &[PositionedToken]) -> Vec<Word> {
    let mut sorted: Vec<&PositionedToken> = tokens.iter().collect();
    sorted.sort_by(|a, b| reading_order((a.page, &a.bbox), (b.page, &b.bbox)));

    let mut words = Vec::new();
    let mut pending: Option<Word> = None;

    for token in sorted {
        match pending.as_mut() {
            Some(word)
                if word.page == token.page
                    && (token.bbox.top - word.bbox.top).abs() < WORD_TOLERANCE
                    && word.bbox.horizontal_gap(&token.bbox) < WORD_TOLERANCE =>
            {
                word.extend(token);
            }
            _ => {
                if let Some(word) = pending.replace(Word::from_token(token)) {
                    words.push(word);
                }
            }
        }
    }

    words.extend(pending);
    words
}

/// Groups words into lines, each ordered left to right.
pub fn group_lines(words: &[Word]) -> Vec<Line> {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| reading_order((a.page, &a.bbox), (b.page, &b.bbox)));

    let mut lines = Vec::new();
    let mut pending: Option<Line> = None;

    for word in sorted {
        match pending.as_mut() {
            Some(line)
                if line.page == word.page && (word.bbox.top - line.top).abs() < LINE_TOLERANCE =>
            {
                line.words.push(word.clone());
            }
            _ => {
                let fresh = Line {
                    page: word.page,
                    top: word.bbox.top,
                    words: vec![word.clone()],
                };
                if let Some(line) = pending.replace(fresh) {
                    lines.push(line);
                }
            }
        }
    }

    lines.extend(pending);
    for line in &mut lines {
        line.words.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines
}

/// Assembles tokens straight into lines.
pub fn assemble_lines(tokens: &[PositionedToken]) -> Vec<Line> {
    group_lines(&assemble_words(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token(text: &str, x0: f64, top: f64) -> PositionedToken {
        PositionedToken::new(text, x0, x0 + 8.0, top, top + 10.0)
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(assemble_words(&[]).is_empty());
        assert!(assemble_lines(&[]).is_empty());
    }

    #[test]
    fn test_zero_gap_tokens_merge() {
        let words = assemble_words(&[
            token("홍", 10.0, 100.0),
            token("길", 18.0, 100.0),
            token("동", 26.0, 100.0),
        ]);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "홍길동");
        assert_eq!(words[0].bbox.x0, 10.0);
        assert_eq!(words[0].bbox.x1, 34.0);
    }

    #[test]
    fn test_horizontal_gap_splits_words() {
        let words = assemble_words(&[token("1", 10.0, 100.0), token("월", 30.0, 100.0)]);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_seven_pixel_offset_shares_line_but_not_word() {
        let tokens = [token("급", 10.0, 100.0), token("여", 18.0, 107.0)];
        let words = assemble_words(&tokens);
        assert_eq!(words.len(), 2);

        let lines = assemble_lines(&tokens);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].compact(), "급여");
    }

    #[test]
    fn test_pages_never_share_words_or_lines() {
        let tokens = [token("가", 10.0, 100.0), token("나", 18.0, 100.0).on_page(1)];
        assert_eq!(assemble_words(&tokens).len(), 2);
        let lines = assemble_lines(&tokens);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].page, 1);
    }

    #[test]
    fn test_lines_are_ordered_left_to_right() {
        let tokens = [token("B", 200.0, 101.0), token("A", 10.0, 104.0), token("C", 10.0, 140.0)];
        let lines = assemble_lines(&tokens);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "A B");
        assert_eq!(lines[0].words[0].text, "A");
        assert_eq!(lines[0].words[1].text, "B");
        assert_eq!(lines[1].text(), "C");
    }

    #[test]
    fn test_last_pending_word_is_flushed() {
        let words = assemble_words(&[token("가", 10.0, 100.0), token("나", 10.0, 200.0)]);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].text, "나");
    }

    proptest! {
        #[test]
        fn prop_vertical_offset_of_five_or_more_never_merges_word(offset in 5.0f64..200.0) {
            let words = assemble_words(&[token("가", 10.0, 100.0), token("나", 18.0, 100.0 + offset)]);
            prop_assert_eq!(words.len(), 2);
        }

        #[test]
        fn prop_vertical_offset_of_ten_or_more_never_shares_line(offset in 10.0f64..200.0) {
            let lines = assemble_lines(&[token("가", 10.0, 100.0), token("나", 18.0, 100.0 + offset)]);
            prop_assert_eq!(lines.len(), 2);
        }

        #[test]
        fn prop_offsets_between_tolerances_share_line_only(offset in 5.0f64..10.0) {
            let tokens = [token("가", 10.0, 100.0), token("나", 18.0, 100.0 + offset)];
            prop_assert_eq!(assemble_words(&tokens).len(), 2);
            prop_assert_eq!(assemble_lines(&tokens).len(), 1);
        }

        #[test]
        fn prop_assembly_preserves_all_text(count in 0usize..20) {
            let tokens: Vec<PositionedToken> = (0..count)
                .map(|i| token("가", (i * 30) as f64, ((i % 3) * 40) as f64))
                .collect();
            let total: usize = assemble_words(&tokens).iter().map(|w| w.text.chars().count()).sum();
            prop_assert_eq!(total, count);
        }
    }
}
