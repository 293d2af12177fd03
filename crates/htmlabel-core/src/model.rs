use crate::font::FontId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Opaque key/value style data carried by table and cell tags.
pub type Attributes = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justification {
    #[default]
    Unset,
    Left,
    Right,
    Center,
}

/// Separator placement bits for tables and cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleFlags(u8);

impl RuleFlags {
    pub const VERTICAL: Self = Self(1 << 0);
    pub const HORIZONTAL: Self = Self(1 << 1);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for RuleFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RuleFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A run of text sharing one resolved font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub text: String,
    pub font: FontId,
}

/// One visual line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub items: Vec<TextItem>,
    #[serde(default)]
    pub justification: Justification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub spans: Vec<TextSpan>,
}

impl TextBlock {
    /// Concatenated text with spans joined by `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (idx, span) in self.spans.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            for item in &span.items {
                out.push_str(&item.text);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub scale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellContent {
    Text(TextBlock),
    Table(Table),
    Image(Image),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub attrs: Attributes,
    pub content: CellContent,
    pub ruled: RuleFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub ruled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub attrs: Attributes,
    /// Default separators requested by the table tag (`ROWS="*"`, `COLUMNS="*"`).
    pub rules: RuleFlags,
    /// Font active when the table was opened.
    pub font: FontId,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.get(col)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Label {
    Text(TextBlock),
    Table(Table),
}

impl Label {
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Self::Text(block) => Some(block),
            Self::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Text(_) => None,
        }
    }
}
