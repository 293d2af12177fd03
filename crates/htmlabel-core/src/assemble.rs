//! Per-parse working context: font stack, text accumulator, table stack and the label slot.

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::font::{FontId, FontRegistry, FontStack, TextFont};
use crate::model::{Attributes, CellContent, Justification, Label, Table, TextBlock};
use crate::table::{CellHandle, RowHandle, TableStack};
use crate::text::TextAccumulator;
use crate::token::TableAttrs;

pub struct LabelBuilder<'r> {
    registry: &'r mut dyn FontRegistry,
    options: ParseOptions,
    fonts: FontStack,
    text: TextAccumulator,
    tables: TableStack,
    label: Option<Label>,
}

impl<'r> LabelBuilder<'r> {
    pub fn new(registry: &'r mut dyn FontRegistry, options: ParseOptions) -> Self {
        let fonts = FontStack::new(registry);
        Self {
            registry,
            options,
            fonts,
            text: TextAccumulator::new(),
            tables: TableStack::new(),
            label: None,
        }
    }

    /// Resets every component to its initial state.
    pub fn begin(&mut self) {
        self.label = None;
        self.fonts.reset();
        self.text.clear();
        self.tables.unwind();
    }

    pub fn current_font(&self) -> FontId {
        self.fonts.current()
    }

    pub fn font_depth(&self) -> usize {
        self.fonts.depth()
    }

    pub fn table_depth(&self) -> usize {
        self.tables.depth()
    }

    pub fn push_font(&mut self, attrs: TextFont) -> Result<FontId> {
        if self.fonts.depth() >= self.options.max_font_depth {
            return Err(Error::ResourceExhausted {
                resource: "font",
                limit: self.options.max_font_depth,
            });
        }
        Ok(self.fonts.push(attrs, self.registry))
    }

    pub fn pop_font(&mut self) {
        self.fonts.pop();
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn flush_item(&mut self) {
        self.text.flush_item(self.fonts.current());
    }

    pub fn flush_line(&mut self, justification: Justification) {
        self.text.flush_line(justification, self.fonts.current());
    }

    pub fn finish_text(&mut self) -> TextBlock {
        self.text.finalize(self.fonts.current())
    }

    pub fn has_pending_non_space(&self) -> bool {
        self.text.has_non_space()
    }

    /// Clears whitespace that surrounds a table or an image. Anything else next to them is a
    /// syntax error.
    pub fn expect_blank(&mut self, position: &str, offset: usize) -> Result<()> {
        if self.text.has_non_space() {
            return Err(Error::syntax(
                format!("non-space string used {position}"),
                offset,
            ));
        }
        self.text.discard_pending();
        Ok(())
    }

    pub fn open_table(&mut self, attrs: TableAttrs, offset: usize) -> Result<()> {
        self.expect_blank("before <TABLE>", offset)?;
        let limit = self.options.table_depth_limit();
        if self.tables.depth() >= limit {
            return Err(Error::ResourceExhausted {
                resource: "table",
                limit,
            });
        }
        self.tables.open_table(attrs, self.fonts.current());
        Ok(())
    }

    pub fn close_table(&mut self, offset: usize) -> Result<Table> {
        self.expect_blank("after </TABLE>", offset)?;
        self.tables
            .close_table()
            .ok_or_else(|| Error::syntax("</TABLE> without an open table", offset))
    }

    pub fn add_row(&mut self) -> Result<RowHandle> {
        self.tables.add_row()
    }

    pub fn mark_row_ruled(&mut self, row: RowHandle) -> Result<()> {
        self.tables.mark_row_ruled(row)
    }

    pub fn add_cell(
        &mut self,
        row: RowHandle,
        attrs: Attributes,
        content: CellContent,
    ) -> Result<CellHandle> {
        self.tables.add_cell(row, attrs, content)
    }

    pub fn mark_cell_ruled(&mut self, cell: CellHandle) -> Result<()> {
        self.tables.mark_cell_ruled(cell)
    }

    pub fn finish_as_text(&mut self, block: TextBlock) {
        self.label = Some(Label::Text(block));
    }

    pub fn finish_as_table(&mut self, table: Table) {
        self.label = Some(Label::Table(table));
    }

    pub fn take_label(&mut self) -> Option<Label> {
        self.label.take()
    }

    /// Releases everything the parse attempt built: the label, every open table with its
    /// contents, pending text, and font scopes above the base. Safe to call repeatedly.
    pub fn abort(&mut self) -> usize {
        self.label = None;
        let unwound = self.tables.unwind();
        self.text.clear();
        self.fonts.reset();
        unwound
    }

    /// True when no parse state beyond the base font is held.
    pub fn is_idle(&self) -> bool {
        self.label.is_none()
            && self.tables.is_empty()
            && self.text.is_empty()
            && self.fonts.depth() == 0
    }
}
