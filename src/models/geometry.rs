//! Positioned text primitives.
//!
//! Tokens arrive from the external PDF text dumper with page-space
//! coordinates: `x0`/`x1` grow to the right and `top`/`bottom` grow
//! downwards. The assembler turns tokens into [`Word`]s and [`Line`]s.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x0: f64,
    /// Right edge.
    pub x1: f64,
    /// Top edge.
    pub top: f64,
    /// Bottom edge.
    pub bottom: f64,
}

impl BoundingBox {
    /// Creates a new bounding box.
    pub fn new(x0: f64, x1: f64, top: f64, bottom: f64) -> Self {
        Self {
            x0,
            x1,
            top,
            bottom,
        }
    }

    /// Returns the smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            x1: self.x1.max(other.x1),
            top: self.top.min(other.top),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) * 0.5
    }

    /// Vertical center.
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) * 0.5
    }

    /// Distance between the horizontal extents, zero when they overlap.
    pub fn horizontal_gap(&self, other: &Self) -> f64 {
        if other.x0 >= self.x1 {
            other.x0 - self.x1
        } else if other.x1 <= self.x0 {
            self.x0 - other.x1
        } else {
            0.0
        }
    }
}

/// A single glyph run as emitted by the text dumper.
///
/// # Example
///
/// ```
/// use tax_credit_engine::models::PositionedToken;
///
/// let token = PositionedToken::new("급", 10.0, 18.0, 100.0, 110.0);
/// assert_eq!(token.page, 0);
/// assert_eq!(token.bbox.center_x(), 14.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    /// The token text.
    pub text: String,
    /// Where the token sits on its page.
    #[serde(flatten)]
    pub bbox: BoundingBox,
    /// Zero-based page index.
    #[serde(default)]
    pub page: usize,
}

impl PositionedToken {
    /// Creates a token on page 0.
    pub fn new(text: impl Into<String>, x0: f64, x1: f64, top: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            bbox: BoundingBox::new(x0, x1, top, bottom),
            page: 0,
        }
    }

    /// Returns the token moved to the given page.
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// Adjacent tokens merged into one unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Concatenated token text.
    pub text: String,
    /// Union of the merged token boxes.
    pub bbox: BoundingBox,
    /// Zero-based page index.
    pub page: usize,
}

impl Word {
    /// Starts a word from a single token.
    pub fn from_token(token: &PositionedToken) -> Self {
        Self {
            text: token.text.clone(),
            bbox: token.bbox,
            page: token.page,
        }
    }

    /// Appends a token, growing the bounding box.
    pub fn extend(&mut self, token: &PositionedToken) {
        self.text.push_str(&token.text);
        self.bbox = self.bbox.union(&token.bbox);
    }

    /// The word text with all whitespace removed.
    pub fn compact(&self) -> String {
        self.text.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

/// Words that share a vertical band on one page, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Zero-based page index.
    pub page: usize,
    /// Top of the first word that opened the line.
    pub top: f64,
    /// The words in reading order.
    pub words: Vec<Word>,
}

impl Line {
    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Line text with all whitespace removed.
    pub fn compact(&self) -> String {
        self.words.iter().map(|w| w.compact()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_covers_both_boxes() {
        let a = BoundingBox::new(0.0, 10.0, 5.0, 15.0);
        let b = BoundingBox::new(12.0, 20.0, 4.0, 14.0);
        assert_eq!(a.union(&b), BoundingBox::new(0.0, 20.0, 4.0, 15.0));
    }

    #[test]
    fn test_horizontal_gap_is_symmetric_and_zero_on_overlap() {
        let a = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        let b = BoundingBox::new(13.0, 20.0, 0.0, 10.0);
        let c = BoundingBox::new(8.0, 12.0, 0.0, 10.0);
        assert_eq!(a.horizontal_gap(&b), 3.0);
        assert_eq!(b.horizontal_gap(&a), 3.0);
        assert_eq!(a.horizontal_gap(&c), 0.0);
    }

    #[test]
    fn test_token_deserializes_flat_coordinates() {
        let json = r#"{"text":"성명","x0":1.0,"x1":9.0,"top":2.0,"bottom":8.0}"#;
        let token: PositionedToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.text, "성명");
        assert_eq!(token.bbox.x1, 9.0);
        assert_eq!(token.page, 0);
    }

    #[test]
    fn test_line_text_and_compact() {
        let line = Line {
            page: 0,
            top: 0.0,
            words: vec![
                Word::from_token(&PositionedToken::new("과세", 0.0, 10.0, 0.0, 8.0)),
                Word::from_token(&PositionedToken::new("표준", 20.0, 30.0, 0.0, 8.0)),
            ],
        };
        assert_eq!(line.text(), "과세 표준");
        assert_eq!(line.compact(), "과세표준");
    }
}
