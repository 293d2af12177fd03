use crate::error::{Error, Result};
use crate::font::FontId;
use crate::model::{Attributes, Cell, CellContent, Row, RuleFlags, Table};
use crate::token::TableAttrs;

/// Index of a row inside the table on top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHandle {
    row: usize,
    cell: usize,
}

/// Tables that are open but not yet closed, innermost last.
///
/// The enclosing table of an entry is the one just below it; the stack owns every open table
/// until [`TableStack::close_table`] hands it back.
#[derive(Debug, Default)]
pub struct TableStack {
    open: Vec<Table>,
}

impl TableStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn current(&self) -> Option<&Table> {
        self.open.last()
    }

    pub fn open_table(&mut self, attrs: TableAttrs, font: FontId) {
        tracing::trace!(depth = self.open.len() + 1, "open table");
        self.open.push(Table {
            attrs: attrs.attrs,
            rules: attrs.rules,
            font,
            rows: Vec::new(),
        });
    }

    pub fn close_table(&mut self) -> Option<Table> {
        let table = self.open.pop()?;
        tracing::trace!(depth = self.open.len(), rows = table.rows.len(), "close table");
        Some(table)
    }

    pub fn add_row(&mut self) -> Result<RowHandle> {
        let table = self.top_mut("<TR>")?;
        table.rows.push(Row {
            cells: Vec::new(),
            ruled: table.rules.contains(RuleFlags::HORIZONTAL),
        });
        Ok(RowHandle(table.rows.len() - 1))
    }

    /// Marks the row that precedes an explicit separator.
    pub fn mark_row_ruled(&mut self, row: RowHandle) -> Result<()> {
        let table = self.top_mut("<HR>")?;
        let Some(row) = table.rows.get_mut(row.0) else {
            return Err(Error::syntax("<HR> does not follow a row", 0));
        };
        row.ruled = true;
        Ok(())
    }

    pub fn add_cell(
        &mut self,
        row: RowHandle,
        attrs: Attributes,
        content: CellContent,
    ) -> Result<CellHandle> {
        let table = self.top_mut("<TD>")?;
        let ruled = if table.rules.contains(RuleFlags::VERTICAL) {
            RuleFlags::VERTICAL
        } else {
            RuleFlags::empty()
        };
        let Some(cells) = table.rows.get_mut(row.0).map(|r| &mut r.cells) else {
            return Err(Error::syntax("<TD> outside of <TR>", 0));
        };
        cells.push(Cell {
            attrs,
            content,
            ruled,
        });
        Ok(CellHandle {
            row: row.0,
            cell: cells.len() - 1,
        })
    }

    /// Marks the cell that precedes an explicit separator.
    pub fn mark_cell_ruled(&mut self, cell: CellHandle) -> Result<()> {
        let table = self.top_mut("<VR>")?;
        let Some(cell) = table
            .rows
            .get_mut(cell.row)
            .and_then(|r| r.cells.get_mut(cell.cell))
        else {
            return Err(Error::syntax("<VR> does not follow a cell", 0));
        };
        cell.ruled |= RuleFlags::VERTICAL;
        Ok(())
    }

    /// Drops every open table, innermost first, with all of its rows, cells and nested
    /// payloads. Returns how many tables were unwound.
    pub fn unwind(&mut self) -> usize {
        let count = self.open.len();
        while self.open.pop().is_some() {}
        self.open = Vec::new();
        count
    }

    fn top_mut(&mut self, what: &str) -> Result<&mut Table> {
        self.open
            .last_mut()
            .ok_or_else(|| Error::syntax(format!("{what} outside of <TABLE>"), 0))
    }
}
