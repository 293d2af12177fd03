use super::{html, open, parse_with, stream, t};
use crate::*;

#[test]
fn abort_releases_every_level_of_state() {
    let mut fonts = FontTable::new();
    let mut builder = LabelBuilder::new(&mut fonts, ParseOptions::default());
    builder.begin();

    builder
        .push_font(TextFont::with_flags(FontFlags::BOLD))
        .unwrap();
    builder.open_table(TableAttrs::default(), 0).unwrap();
    let row = builder.add_row().unwrap();
    builder.push_text("cell");
    let block = builder.finish_text();
    builder
        .add_cell(row, Attributes::new(), CellContent::Text(block))
        .unwrap();
    builder.open_table(TableAttrs::default(), 0).unwrap();
    builder.add_row().unwrap();
    builder.push_text("pending");
    builder.flush_item();
    builder.flush_line(Justification::Center);
    builder.push_text("more");
    builder.finish_as_text(TextBlock::default());

    assert!(!builder.is_idle());
    assert_eq!(builder.abort(), 2);
    assert!(builder.is_idle());
    assert_eq!(builder.table_depth(), 0);
    assert_eq!(builder.font_depth(), 0);
    assert!(builder.take_label().is_none());

    // Idempotent.
    assert_eq!(builder.abort(), 0);
    assert!(builder.is_idle());
}

#[test]
fn begin_resets_a_dirty_builder() {
    let mut fonts = FontTable::new();
    let mut builder = LabelBuilder::new(&mut fonts, ParseOptions::default());
    let base = builder.current_font();
    builder
        .push_font(TextFont::with_flags(FontFlags::ITALIC))
        .unwrap();
    builder.open_table(TableAttrs::default(), 0).unwrap();
    builder.push_text("x");

    builder.begin();
    assert!(builder.is_idle());
    assert_eq!(builder.current_font(), base);
}

#[test]
fn failed_parse_keeps_only_interned_fonts() {
    let mut fonts = FontTable::new();
    let mut body = vec![
        Token::table(),
        Token::Row,
        Token::cell(),
        open(StyleTag::Bold),
    ];
    body.extend([
        Token::table(),
        Token::Row,
        Token::cell(),
        t("deep"),
    ]);
    let err = parse_with(&mut fonts, html(body)).unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }));
    // Fonts interned before the failure stay in the registry.
    assert_eq!(fonts.len(), 2);
}

#[test]
fn each_parse_gets_a_fresh_context() {
    let mut fonts = FontTable::new();
    let bad = html(vec![open(StyleTag::Italic), t("x")]);
    assert!(parse_label(stream(bad), &mut fonts, &ParseOptions::default()).is_err());

    let label = parse_with(&mut fonts, html(vec![t("y")])).unwrap();
    let item = &label.as_text().unwrap().spans[0].items[0];
    assert_eq!(fonts.font(item.font), Some(&TextFont::default()));
}
