//! Recursive-descent driver for the label grammar:
//!
//! ```text
//! label      := HTML (text | fonttable) END_HTML
//! fonttable  := table | WRAP table END_WRAP          -- WRAP: FONT, I, B, U, O
//! table      := space* TABLE rows END_TABLE space*
//! rows       := row (HR? row)*
//! row        := TR cells END_TR
//! cells      := cell (VR? cell)*
//! cell       := TD (fonttable | image | text)? END_TD
//! image      := space* IMG space*
//! text       := (STRING | BR | scope_open text scope_close)*
//! ```
//!
//! The driver owns no structure itself; every action goes through [`LabelBuilder`].

use crate::assemble::LabelBuilder;
use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::font::FontRegistry;
use crate::model::{CellContent, Image, Label, Table, TextBlock};
use crate::table::{CellHandle, RowHandle};
use crate::token::{LexError, Spanned, Token, TokenStream};

/// Parses one label from `tokens`, interning fonts into `registry`.
///
/// On failure nothing built by the attempt survives; only fonts added to `registry` remain.
pub fn parse_label<I>(
    tokens: I,
    registry: &mut dyn FontRegistry,
    options: &ParseOptions,
) -> Result<Label>
where
    I: IntoIterator<Item = std::result::Result<Spanned, LexError>>,
{
    let mut parser = Parser {
        tokens: TokenStream::new(tokens.into_iter()),
        state: LabelBuilder::new(registry, *options),
    };
    parser.state.begin();
    match parser.label() {
        Ok(label) => {
            tracing::debug!("label parsed");
            Ok(label)
        }
        Err(err) => {
            let unwound = parser.state.abort();
            tracing::debug!(error = %err, tables_unwound = unwound, "label parse aborted");
            Err(err)
        }
    }
}

/// What a table-bearing body turned out to be.
enum Body {
    Text(TextBlock),
    Table(Table),
    Image(Image),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Label,
    Cell,
}

impl Context {
    fn is_closer(self, tok: &Token) -> bool {
        match self {
            Self::Label => matches!(tok, Token::EndHtml),
            Self::Cell => matches!(tok, Token::EndCell),
        }
    }
}

struct Parser<'r, I> {
    tokens: TokenStream<I>,
    state: LabelBuilder<'r>,
}

impl<I> Parser<'_, I>
where
    I: Iterator<Item = std::result::Result<Spanned, LexError>>,
{
    fn label(&mut self) -> Result<Label> {
        self.expect(|t| matches!(t, Token::Html), "<HTML>")?;
        match self.body(Context::Label)? {
            Body::Text(block) => self.state.finish_as_text(block),
            Body::Table(table) => self.state.finish_as_table(table),
            Body::Image(_) => {
                return Err(self.error_here("<IMG> is only allowed inside a cell"));
            }
        }
        self.expect(|t| matches!(t, Token::EndHtml), "</HTML>")?;
        if let Some((start, tok, _)) = self.tokens.next()? {
            return Err(Error::syntax(format!("unexpected {tok} after </HTML>"), start));
        }
        self.state
            .take_label()
            .ok_or_else(|| Error::syntax("empty label", self.tokens.last_end()))
    }

    /// Decides between the table, image and text forms by looking past an optional wrapping
    /// font scope and leading text.
    fn body(&mut self, ctx: Context) -> Result<Body> {
        let mut n = 0;
        let wrapped = self.peek_nth(0)?.is_some_and(Token::wraps_tables);
        if wrapped {
            n += 1;
        }
        while matches!(self.peek_nth(n)?, Some(Token::Text(_))) {
            n += 1;
        }
        match self.peek_nth(n)? {
            Some(Token::Table(_)) => Ok(Body::Table(self.font_table()?)),
            Some(Token::Img { .. }) if !wrapped && ctx == Context::Cell => {
                Ok(Body::Image(self.image()?))
            }
            _ => Ok(Body::Text(self.text(ctx)?)),
        }
    }

    fn font_table(&mut self) -> Result<Table> {
        let wrapped = matches!(self.tokens.peek()?, Some(tok) if tok.wraps_tables());
        let wrapper = if wrapped {
            self.tokens.next()?.map(|(_, tok, _)| tok)
        } else {
            None
        };
        if let Some(font) = wrapper.as_ref().and_then(Token::scope_font) {
            self.state.push_font(font)?;
        }
        let table = self.table()?;
        if let Some(open) = wrapper {
            self.expect(|t| closes_scope(&open, t), "the closing tag of the table wrapper")?;
            self.state.pop_font();
        }
        Ok(table)
    }

    fn table(&mut self) -> Result<Table> {
        self.leading_text()?;
        let offset = self.tokens.offset();
        let attrs = match self.tokens.next()? {
            Some((_, Token::Table(attrs), _)) => attrs,
            other => return Err(self.unexpected(other, "<TABLE>")),
        };
        self.state.open_table(attrs, offset)?;
        self.rows()?;
        self.expect(|t| matches!(t, Token::EndTable), "</TABLE>")?;
        self.leading_text()?;
        let offset = self.tokens.last_end();
        self.state.close_table(offset)
    }

    fn rows(&mut self) -> Result<()> {
        let mut prev = self.row()?;
        loop {
            match self.tokens.peek()? {
                Some(Token::Row) => prev = self.row()?,
                Some(Token::Hr { .. }) => {
                    self.separator()?;
                    self.state.mark_row_ruled(prev)?;
                    prev = self.row()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn row(&mut self) -> Result<RowHandle> {
        self.expect(|t| matches!(t, Token::Row), "<TR>")?;
        let row = self.state.add_row()?;
        self.cells(row)?;
        self.expect(|t| matches!(t, Token::EndRow), "</TR>")?;
        Ok(row)
    }

    fn cells(&mut self, row: RowHandle) -> Result<()> {
        let mut prev = self.cell(row)?;
        loop {
            match self.tokens.peek()? {
                Some(Token::Cell(_)) => prev = self.cell(row)?,
                Some(Token::Vr { .. }) => {
                    self.separator()?;
                    self.state.mark_cell_ruled(prev)?;
                    prev = self.cell(row)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn cell(&mut self, row: RowHandle) -> Result<CellHandle> {
        let attrs = match self.tokens.next()? {
            Some((_, Token::Cell(attrs), _)) => attrs,
            other => return Err(self.unexpected(other, "<TD>")),
        };
        let content = if matches!(self.tokens.peek()?, Some(Token::EndCell)) {
            CellContent::Text(self.state.finish_text())
        } else {
            match self.body(Context::Cell)? {
                Body::Text(block) => CellContent::Text(block),
                Body::Table(table) => CellContent::Table(table),
                Body::Image(image) => CellContent::Image(image),
            }
        };
        let cell = self.state.add_cell(row, attrs, content)?;
        self.expect(|t| matches!(t, Token::EndCell), "</TD>")?;
        Ok(cell)
    }

    fn image(&mut self) -> Result<Image> {
        self.leading_text()?;
        let offset = self.tokens.offset();
        self.state.expect_blank("before <IMG>", offset)?;
        let (image, self_closing) = match self.tokens.next()? {
            Some((
                _,
                Token::Img {
                    image,
                    self_closing,
                },
                _,
            )) => (image, self_closing),
            other => return Err(self.unexpected(other, "<IMG>")),
        };
        if !self_closing {
            self.expect(|t| matches!(t, Token::EndImg), "</IMG>")?;
        }
        self.leading_text()?;
        let offset = self.tokens.last_end();
        self.state.expect_blank("after <IMG>", offset)?;
        Ok(image)
    }

    /// `HR` / `VR` in either self-closing or paired form.
    fn separator(&mut self) -> Result<()> {
        match self.tokens.next()? {
            Some((_, Token::Hr { self_closing }, _)) => {
                if !self_closing {
                    self.expect(|t| matches!(t, Token::EndHr), "</HR>")?;
                }
                Ok(())
            }
            Some((_, Token::Vr { self_closing }, _)) => {
                if !self_closing {
                    self.expect(|t| matches!(t, Token::EndVr), "</VR>")?;
                }
                Ok(())
            }
            other => Err(self.unexpected(other, "a separator")),
        }
    }

    /// Accumulates text runs, line breaks and font scopes until the closer of `ctx`.
    fn text(&mut self, ctx: Context) -> Result<TextBlock> {
        let mut scopes: Vec<(Token, usize)> = Vec::new();
        loop {
            let offset = self.tokens.offset();
            let Some(tok) = self.tokens.peek()? else {
                return Err(unterminated(&scopes)
                    .unwrap_or_else(|| Error::syntax("unexpected end of input", offset)));
            };
            if ctx.is_closer(tok) {
                if let Some(err) = unterminated(&scopes) {
                    return Err(err);
                }
                break;
            }
            let Some((start, tok, _)) = self.tokens.next()? else {
                continue;
            };
            match tok {
                Token::Text(run) => self.state.push_text(&run),
                Token::Font(_) | Token::StyleOpen(_) => {
                    self.state.flush_item();
                    if let Some(font) = tok.scope_font() {
                        self.state.push_font(font)?;
                    }
                    scopes.push((tok, start));
                }
                Token::EndFont | Token::StyleClose(_) => {
                    let matches_open = scopes
                        .last()
                        .is_some_and(|(open, _)| closes_scope(open, &tok));
                    if !matches_open {
                        return Err(Error::syntax(format!("unexpected {tok}"), start));
                    }
                    self.state.flush_item();
                    self.state.pop_font();
                    scopes.pop();
                }
                Token::Br {
                    align,
                    self_closing,
                } => {
                    if !self_closing {
                        self.expect(|t| matches!(t, Token::EndBr), "</BR>")?;
                    }
                    self.state.flush_line(align);
                }
                Token::Table(_) if self.state.has_pending_non_space() => {
                    return Err(Error::syntax("non-space string used before <TABLE>", start));
                }
                other => {
                    return Err(Error::syntax(format!("unexpected {other}"), start));
                }
            }
        }
        Ok(self.state.finish_text())
    }

    /// Collects text runs into the pending buffer without turning them into items.
    fn leading_text(&mut self) -> Result<()> {
        while matches!(self.tokens.peek()?, Some(Token::Text(_))) {
            if let Some((_, Token::Text(run), _)) = self.tokens.next()? {
                self.state.push_text(&run);
            }
        }
        Ok(())
    }

    fn peek_nth(&mut self, n: usize) -> Result<Option<&Token>> {
        Ok(self.tokens.peek_nth(n)?)
    }

    fn expect(&mut self, pred: impl Fn(&Token) -> bool, what: &str) -> Result<()> {
        match self.tokens.next()? {
            Some((_, tok, _)) if pred(&tok) => Ok(()),
            other => Err(self.unexpected(other, what)),
        }
    }

    fn unexpected(&self, found: Option<Spanned>, what: &str) -> Error {
        match found {
            Some((start, tok, _)) => Error::syntax(format!("expected {what}, found {tok}"), start),
            None => Error::syntax(
                format!("expected {what}, found end of input"),
                self.tokens.last_end(),
            ),
        }
    }

    fn error_here(&mut self, message: &str) -> Error {
        Error::syntax(message, self.tokens.offset())
    }
}

fn closes_scope(open: &Token, close: &Token) -> bool {
    match (open, close) {
        (Token::Font(_), Token::EndFont) => true,
        (Token::StyleOpen(a), Token::StyleClose(b)) => a == b,
        _ => false,
    }
}

fn unterminated(scopes: &[(Token, usize)]) -> Option<Error> {
    let (open, start) = scopes.last()?;
    Some(Error::syntax(format!("unterminated {open}"), *start))
}
