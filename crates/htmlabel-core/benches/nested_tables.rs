use criterion::{Criterion, criterion_group, criterion_main};
use htmlabel_core::{FontTable, LexError, ParseOptions, Spanned, StyleTag, Token, parse_label};
use std::hint::black_box;

/// A `depth`-deep chain of tables, each holding `width` styled text cells beside the nested one.
fn nested_tables(depth: usize, width: usize) -> Vec<Token> {
    let mut out = vec![Token::Html];
    for level in 0..depth {
        out.extend([Token::table(), Token::Row]);
        for col in 0..width {
            out.extend([
                Token::cell(),
                Token::text(format!("r{level}c{col} ")),
                Token::StyleOpen(StyleTag::Bold),
                Token::text("bold"),
                Token::StyleClose(StyleTag::Bold),
                Token::br(),
                Token::text("tail"),
                Token::EndCell,
                Token::vr(),
            ]);
        }
        out.push(Token::cell());
    }
    out.push(Token::text("leaf"));
    for _ in 0..depth {
        out.extend([Token::EndCell, Token::EndRow, Token::EndTable]);
    }
    out.push(Token::EndHtml);
    out
}

fn spanned(tokens: &[Token]) -> impl Iterator<Item = Result<Spanned, LexError>> + '_ {
    tokens
        .iter()
        .cloned()
        .enumerate()
        .map(|(idx, tok)| Ok((idx, tok, idx + 1)))
}

fn bench_nested_tables(c: &mut Criterion) {
    let options = ParseOptions::default();
    let mut group = c.benchmark_group("parse_label");
    group.sample_size(50);

    for (name, depth, width) in [
        ("flat_wide", 1usize, 64usize),
        ("nested_8x8", 8, 8),
        ("nested_deep", 48, 2),
    ] {
        let tokens = nested_tables(depth, width);
        let mut fonts = FontTable::new();
        // Pre-check outside measurement.
        parse_label(spanned(&tokens), &mut fonts, &options).expect("parse");

        group.bench_function(name, |b| {
            b.iter(|| {
                let label =
                    parse_label(spanned(black_box(&tokens)), &mut fonts, &options).expect("parse");
                black_box(label);
            });
        });
    }

    // Failure path: the innermost cell is left unterminated so every open table is unwound.
    let mut broken = nested_tables(32, 4);
    broken.truncate(broken.len() - 1 - 3 * 32);
    let mut fonts = FontTable::new();
    group.bench_function("abort_nested_32", |b| {
        b.iter(|| {
            let err = parse_label(spanned(black_box(&broken)), &mut fonts, &options);
            black_box(err.is_err());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_nested_tables);
criterion_main!(benches);
