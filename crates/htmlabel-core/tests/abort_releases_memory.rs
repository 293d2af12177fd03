//! Aborted parses must hand back every byte they allocated.
//!
//! Kept as a single test in its own binary so the counting allocator only sees this parse.

use htmlabel_core::{
    Error, FontTable, LexError, ParseOptions, Spanned, StyleTag, TextFont, Token, parse_label,
};
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

struct LiveAlloc;

thread_local! {
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

impl LiveAlloc {
    fn live_bytes(&self) -> isize {
        LIVE_BYTES.with(Cell::get)
    }

    fn adjust(delta: isize) {
        let _ = LIVE_BYTES.try_with(|live| live.set(live.get() + delta));
    }
}

unsafe impl GlobalAlloc for LiveAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            Self::adjust(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        Self::adjust(-(layout.size() as isize));
    }
}

#[global_allocator]
static ALLOC: LiveAlloc = LiveAlloc;

fn stream(tokens: &[Token]) -> Vec<Result<Spanned, LexError>> {
    tokens
        .iter()
        .cloned()
        .enumerate()
        .map(|(idx, tok)| Ok((idx, tok, idx + 1)))
        .collect()
}

fn t(text: &str) -> Token {
    Token::text(text)
}

fn nested_prefix(depth: usize) -> Vec<Token> {
    let mut out = vec![Token::Html];
    for level in 0..depth {
        out.extend([
            Token::table(),
            Token::Row,
            Token::cell(),
            t(&format!("cell {level}")),
            Token::EndCell,
            Token::cell(),
        ]);
    }
    out
}

struct FailingCase {
    tokens: Vec<Result<Spanned, LexError>>,
    options: ParseOptions,
    fails_as: fn(&Error) -> bool,
}

impl FailingCase {
    fn syntax(tokens: Vec<Token>) -> Self {
        Self {
            tokens: stream(&tokens),
            options: ParseOptions::default(),
            fails_as: |err| matches!(err, Error::Syntax { .. }),
        }
    }
}

/// Token streams that each fail somewhere inside partially built structure.
fn failing_cases() -> Vec<FailingCase> {
    let mut cases = Vec::new();

    // Unterminated font scope at the top level.
    cases.push(vec![
        Token::Html,
        t("a"),
        Token::StyleOpen(StyleTag::Bold),
        t("x"),
    ]);

    // Deeply nested tables with finished sibling cells, failing at the innermost text.
    for depth in [1, 2, 5] {
        let mut case = nested_prefix(depth);
        case.extend([
            Token::Font(TextFont::default().with_name("Courier").with_size(9.0)),
            t("left open"),
            Token::br(),
            t("more"),
            Token::EndHtml,
        ]);
        cases.push(case);
    }

    // Text after a nested table closes.
    let mut case = nested_prefix(2);
    case.extend([
        Token::table(),
        Token::Row,
        Token::cell(),
        t("inner"),
        Token::EndCell,
        Token::EndRow,
        Token::EndTable,
        t("not allowed"),
    ]);
    cases.push(case);

    // Image cell followed by a broken row.
    let mut case = nested_prefix(3);
    case.extend([
        Token::img("icon.png"),
        Token::EndCell,
        Token::EndRow,
        Token::hr(),
        Token::EndTable,
    ]);
    cases.push(case);

    // Stream ends while the parser is waiting for a cell body.
    cases.push(nested_prefix(4));

    let mut cases: Vec<FailingCase> = cases.into_iter().map(FailingCase::syntax).collect();

    // Lexer failure inside an open font scope three tables deep.
    let mut case = nested_prefix(3);
    case.extend([Token::StyleOpen(StyleTag::Italic), t("pending")]);
    let mut tokens = stream(&case);
    tokens.push(Err(LexError::new("bad entity &foo;", tokens.len())));
    tokens.extend(stream(&[Token::StyleClose(StyleTag::Italic), Token::EndCell]));
    cases.push(FailingCase {
        tokens,
        options: ParseOptions::default(),
        fails_as: |err| matches!(err, Error::Lex(_)),
    });

    // Nesting limit reached with finished sibling cells in every open table.
    let mut case = nested_prefix(6);
    case.extend([t("deep"), Token::EndCell]);
    cases.push(FailingCase {
        tokens: stream(&case),
        options: ParseOptions::default().with_max_table_depth(4),
        fails_as: |err| matches!(err, Error::ResourceExhausted { .. }),
    });

    cases
}

#[test]
fn aborted_parses_release_everything_they_allocated() {
    let mut fonts = FontTable::new();
    let cases = failing_cases();

    // Warm-up: intern every font the cases use so measured runs only hit existing entries.
    for (idx, case) in cases.iter().enumerate() {
        let err = parse_label(case.tokens.clone(), &mut fonts, &case.options)
            .expect_err("failing case parsed");
        assert!((case.fails_as)(&err), "case {idx} failed with {err:?}");
    }

    for (idx, case) in cases.iter().enumerate() {
        let before = ALLOC.live_bytes();
        let result = parse_label(case.tokens.clone(), &mut fonts, &case.options);
        let failed = result.is_err();
        drop(result);
        let after = ALLOC.live_bytes();

        assert!(failed, "case {idx} unexpectedly parsed");
        assert_eq!(
            after,
            before,
            "case {idx} kept {} bytes after abort",
            after - before
        );
    }
}
