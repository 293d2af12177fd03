mod abort;

use crate::*;

pub(crate) type TokenResult = std::result::Result<Spanned, LexError>;

/// Spans every token ten bytes apart so error offsets are easy to predict.
pub(crate) fn stream(tokens: Vec<Token>) -> Vec<TokenResult> {
    tokens
        .into_iter()
        .enumerate()
        .map(|(idx, tok)| Ok((idx * 10, tok, idx * 10 + 5)))
        .collect()
}

pub(crate) fn html(body: Vec<Token>) -> Vec<Token> {
    let mut out = vec![Token::Html];
    out.extend(body);
    out.push(Token::EndHtml);
    out
}

pub(crate) fn t(text: &str) -> Token {
    Token::text(text)
}

pub(crate) fn open(tag: StyleTag) -> Token {
    Token::StyleOpen(tag)
}

pub(crate) fn close(tag: StyleTag) -> Token {
    Token::StyleClose(tag)
}

pub(crate) fn parse_with(fonts: &mut FontTable, tokens: Vec<Token>) -> Result<Label> {
    parse_label(stream(tokens), fonts, &ParseOptions::default())
}

pub(crate) fn parse(tokens: Vec<Token>) -> Result<Label> {
    parse_with(&mut FontTable::new(), tokens)
}

pub(crate) fn texts(span: &TextSpan) -> Vec<&str> {
    span.items.iter().map(|i| i.text.as_str()).collect()
}
