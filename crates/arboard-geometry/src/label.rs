//! Label truncation and placement.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Marker appended to truncated text
pub const ELLIPSIS: char = '…';

/// Approximate glyph width used to size label backgrounds
const CHAR_WIDTH: f64 = 7.0;
/// Text height of a label line
const TEXT_HEIGHT: f64 = 18.0;
const PADDING_X: f64 = 4.0;
const PADDING_Y: f64 = 2.0;
/// Baseline offset that visually centers text on its anchor
const BASELINE_OFFSET: f64 = 5.0;

/// Display text plus the original it was derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truncated {
    /// Text to draw, at most `max_chars` characters
    pub display: String,
    /// Untouched original, for tooltips and accessible text
    pub full: String,
    pub truncated: bool,
}

impl Truncated {
    /// Tooltip text, present only when the display text lost characters
    pub fn tooltip(&self) -> Option<&str> {
        self.truncated.then_some(self.full.as_str())
    }
}

/// Truncate `text` to at most `max_chars` characters.
///
/// Overlong text keeps its first `max_chars - 1` characters followed by
/// [`ELLIPSIS`]. Lengths are counted in chars, never bytes.
pub fn truncate(text: &str, max_chars: usize) -> Truncated {
    let len = text.chars().count();
    if len <= max_chars {
        return Truncated {
            display: text.to_string(),
            full: text.to_string(),
            truncated: false,
        };
    }

    let mut display: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    if max_chars > 0 {
        display.push(ELLIPSIS);
    }

    Truncated {
        display,
        full: text.to_string(),
        truncated: true,
    }
}

/// Background box and text baseline for a label centered on an anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelBox {
    /// Top-left corner of the background rectangle
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    /// Where the (center-aligned) text is drawn
    pub text_anchor: Point,
}

impl LabelBox {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x
            && p.x <= self.origin.x + self.width
            && p.y >= self.origin.y
            && p.y <= self.origin.y + self.height
    }
}

/// Place a label box for `display_text` centered on `anchor`
pub fn label_box(anchor: Point, display_text: &str) -> LabelBox {
    let text_width = display_text.chars().count() as f64 * CHAR_WIDTH;
    LabelBox {
        origin: Point::new(
            anchor.x - text_width / 2.0 - PADDING_X,
            anchor.y - TEXT_HEIGHT / 2.0 - PADDING_Y,
        ),
        width: text_width + 2.0 * PADDING_X,
        height: TEXT_HEIGHT + 2.0 * PADDING_Y,
        text_anchor: Point::new(anchor.x, anchor.y + BASELINE_OFFSET),
    }
}

/// Baseline for text centered on `anchor` without a background box
pub fn text_baseline(anchor: Point) -> Point {
    Point::new(anchor.x, anchor.y + BASELINE_OFFSET)
}
