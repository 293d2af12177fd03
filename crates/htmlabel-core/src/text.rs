use crate::font::FontId;
use crate::model::{Justification, TextBlock, TextItem, TextSpan};

/// Two-level text buffering: raw runs become styled items, items become justified spans.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    buffer: String,
    /// Set once a run has been appended since the last item flush, even an empty one.
    has_run: bool,
    items: Vec<TextItem>,
    spans: Vec<TextSpan>,
}

impl TextAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.has_run = true;
    }

    pub fn pending_text(&self) -> &str {
        &self.buffer
    }

    /// True when the pending buffer holds a character other than a space.
    pub fn has_non_space(&self) -> bool {
        self.buffer.chars().any(|c| c != ' ')
    }

    /// Drops the pending buffer without producing an item (whitespace around tables).
    pub fn discard_pending(&mut self) {
        self.buffer.clear();
        self.has_run = false;
    }

    /// Turns the pending run into an item under `font`.
    pub fn flush_item(&mut self, font: FontId) {
        if !self.has_run {
            return;
        }
        self.items.push(TextItem {
            text: std::mem::take(&mut self.buffer),
            font,
        });
        self.has_run = false;
    }

    /// Closes the current line. A line without any item gets a single empty item under `font`.
    pub fn flush_line(&mut self, justification: Justification, font: FontId) {
        self.flush_item(font);
        let items = if self.items.is_empty() {
            vec![TextItem {
                text: String::new(),
                font,
            }]
        } else {
            std::mem::take(&mut self.items)
        };
        self.spans.push(TextSpan {
            items,
            justification,
        });
    }

    /// Moves the accumulated lines into a block. Trailing items form an unjustified last line,
    /// and a block with no content at all still gets one empty line.
    pub fn finalize(&mut self, font: FontId) -> TextBlock {
        self.flush_item(font);
        if !self.items.is_empty() || self.spans.is_empty() {
            self.flush_line(Justification::Unset, font);
        }
        TextBlock {
            spans: std::mem::take(&mut self.spans),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.has_run && self.buffer.is_empty() && self.items.is_empty() && self.spans.is_empty()
    }

    /// Discards the buffer and every pending item and span.
    pub fn clear(&mut self) {
        self.buffer = String::new();
        self.has_run = false;
        self.items = Vec::new();
        self.spans = Vec::new();
    }
}
