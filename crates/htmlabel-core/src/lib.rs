#![forbid(unsafe_code)]

//! Graphviz HTML-like label parser + label tree (headless).
//!
//! The crate sits between a markup lexer and a renderer:
//! - the lexer supplies `(start, Token, end)` triples (entity decoding and attribute parsing
//!   happen there),
//! - [`parse_label`] drives the grammar and assembles a [`Label`] (a text block or a table),
//! - fonts are resolved through a cascading stack and interned in a caller-owned
//!   [`FontRegistry`] so that identical styles share one [`FontId`].
//!
//! A failed parse never returns partial structure: every table, cell and pending text item built
//! by the attempt is released before the error reaches the caller.

pub mod assemble;
pub mod config;
pub mod error;
pub mod font;
pub mod model;
mod parse;
pub mod table;
pub mod text;
pub mod token;

pub use assemble::LabelBuilder;
pub use config::ParseOptions;
pub use error::{Error, Result};
pub use font::{FontFlags, FontId, FontRegistry, FontStack, FontTable, TextFont};
pub use model::{
    Attributes, Cell, CellContent, Image, Justification, Label, Row, RuleFlags, Table, TextBlock,
    TextItem, TextSpan,
};
pub use parse::parse_label;
pub use token::{LexError, Spanned, StyleTag, TableAttrs, Token};

#[cfg(test)]
mod tests;
