//! The token boundary shared with the lexer.
//!
//! The lexer (entity decoding, tag recognition, attribute parsing) lives outside this crate; it
//! hands over `(start, Token, end)` triples and may fail with a [`LexError`].

use crate::font::{FontFlags, TextFont};
use crate::model::{Attributes, Image, Justification, RuleFlags};
use std::collections::VecDeque;
use std::fmt;

pub type Spanned = (usize, Token, usize);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub offset: usize,
}

impl LexError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Inline style tags that behave like a font scope with a single flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Italic,
    Bold,
    Underline,
    Overline,
    Superscript,
    Subscript,
    Strike,
}

impl StyleTag {
    pub fn flag(self) -> FontFlags {
        match self {
            Self::Italic => FontFlags::ITALIC,
            Self::Bold => FontFlags::BOLD,
            Self::Underline => FontFlags::UNDERLINE,
            Self::Overline => FontFlags::OVERLINE,
            Self::Superscript => FontFlags::SUPERSCRIPT,
            Self::Subscript => FontFlags::SUBSCRIPT,
            Self::Strike => FontFlags::STRIKE,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Italic => "I",
            Self::Bold => "B",
            Self::Underline => "U",
            Self::Overline => "O",
            Self::Superscript => "SUP",
            Self::Subscript => "SUB",
            Self::Strike => "S",
        }
    }

    /// Styles that may wrap a whole table.
    pub fn wraps_tables(self) -> bool {
        matches!(
            self,
            Self::Italic | Self::Bold | Self::Underline | Self::Overline
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableAttrs {
    pub attrs: Attributes,
    pub rules: RuleFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Html,
    EndHtml,
    Table(TableAttrs),
    EndTable,
    Row,
    EndRow,
    Cell(Attributes),
    EndCell,
    Font(TextFont),
    EndFont,
    StyleOpen(StyleTag),
    StyleClose(StyleTag),
    Br {
        align: Justification,
        self_closing: bool,
    },
    EndBr,
    Img {
        image: Image,
        self_closing: bool,
    },
    EndImg,
    Hr {
        self_closing: bool,
    },
    EndHr,
    Vr {
        self_closing: bool,
    },
    EndVr,
    Text(String),
}

impl Token {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn table() -> Self {
        Self::Table(TableAttrs::default())
    }

    pub fn cell() -> Self {
        Self::Cell(Attributes::new())
    }

    pub fn br() -> Self {
        Self::Br {
            align: Justification::Unset,
            self_closing: true,
        }
    }

    pub fn img(src: impl Into<String>) -> Self {
        Self::Img {
            image: Image {
                src: src.into(),
                scale: None,
            },
            self_closing: true,
        }
    }

    pub fn hr() -> Self {
        Self::Hr { self_closing: true }
    }

    pub fn vr() -> Self {
        Self::Vr { self_closing: true }
    }

    /// The font pushed when this token opens a font scope.
    pub(crate) fn scope_font(&self) -> Option<TextFont> {
        match self {
            Self::Font(font) => Some(font.clone()),
            Self::StyleOpen(tag) => Some(TextFont::with_flags(tag.flag())),
            _ => None,
        }
    }

    pub(crate) fn wraps_tables(&self) -> bool {
        match self {
            Self::Font(_) => true,
            Self::StyleOpen(tag) => tag.wraps_tables(),
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("<HTML>"),
            Self::EndHtml => f.write_str("</HTML>"),
            Self::Table(_) => f.write_str("<TABLE>"),
            Self::EndTable => f.write_str("</TABLE>"),
            Self::Row => f.write_str("<TR>"),
            Self::EndRow => f.write_str("</TR>"),
            Self::Cell(_) => f.write_str("<TD>"),
            Self::EndCell => f.write_str("</TD>"),
            Self::Font(_) => f.write_str("<FONT>"),
            Self::EndFont => f.write_str("</FONT>"),
            Self::StyleOpen(tag) => write!(f, "<{}>", tag.tag_name()),
            Self::StyleClose(tag) => write!(f, "</{}>", tag.tag_name()),
            Self::Br {
                self_closing: true, ..
            } => f.write_str("<BR/>"),
            Self::Br { .. } => f.write_str("<BR>"),
            Self::EndBr => f.write_str("</BR>"),
            Self::Img {
                self_closing: true, ..
            } => f.write_str("<IMG/>"),
            Self::Img { .. } => f.write_str("<IMG>"),
            Self::EndImg => f.write_str("</IMG>"),
            Self::Hr { self_closing: true } => f.write_str("<HR/>"),
            Self::Hr { .. } => f.write_str("<HR>"),
            Self::EndHr => f.write_str("</HR>"),
            Self::Vr { self_closing: true } => f.write_str("<VR/>"),
            Self::Vr { .. } => f.write_str("<VR>"),
            Self::EndVr => f.write_str("</VR>"),
            Self::Text(_) => f.write_str("text"),
        }
    }
}

/// Lookahead buffer over a fallible token source.
pub(crate) struct TokenStream<I> {
    source: I,
    pending: VecDeque<Spanned>,
    /// A lex error stays sticky so that lookahead can never skip past it.
    failed: Option<LexError>,
    last_end: usize,
}

impl<I> TokenStream<I>
where
    I: Iterator<Item = Result<Spanned, LexError>>,
{
    pub(crate) fn new(source: I) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
            failed: None,
            last_end: 0,
        }
    }

    pub(crate) fn peek(&mut self) -> Result<Option<&Token>, LexError> {
        self.peek_nth(0)
    }

    pub(crate) fn peek_nth(&mut self, n: usize) -> Result<Option<&Token>, LexError> {
        while self.pending.len() <= n {
            match self.pull()? {
                Some(tok) => self.pending.push_back(tok),
                None => break,
            }
        }
        Ok(self.pending.get(n).map(|(_, tok, _)| tok))
    }

    pub(crate) fn next(&mut self) -> Result<Option<Spanned>, LexError> {
        let next = match self.pending.pop_front() {
            Some(tok) => Some(tok),
            None => self.pull()?,
        };
        if let Some((_, _, end)) = &next {
            self.last_end = *end;
        }
        Ok(next)
    }

    /// Start offset of the next token, or the end of the last consumed one at end of input.
    pub(crate) fn offset(&mut self) -> usize {
        let has_next = matches!(self.peek_nth(0), Ok(Some(_)));
        match (self.pending.front(), &self.failed) {
            (Some((start, _, _)), _) if has_next => *start,
            (_, Some(err)) => err.offset,
            _ => self.last_end,
        }
    }

    fn pull(&mut self) -> Result<Option<Spanned>, LexError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        match self.source.next() {
            Some(Ok(tok)) => Ok(Some(tok)),
            Some(Err(err)) => {
                self.failed = Some(err.clone());
                Err(err)
            }
            None => Ok(None),
        }
    }

    pub(crate) fn last_end(&self) -> usize {
        self.last_end
    }
}
