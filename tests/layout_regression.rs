mod common;

use common::fixtures::{
    engine, join, sample_texts, ADVANCE, DIALOG, MED_DBCS, MED_FONT, NARROW, SMALL_DBCS,
    SMALL_FONT, WEN, ZHONG,
};
use dbcs_layout::{Glyph, LayoutConfig, LayoutEngine, MarkupScanner, Token};

const WIDTHS: &[i32] = &[0, 1, 7, 8, 13, 14, 24, 31, 48, 80, 160, 1000];

fn scanner() -> MarkupScanner {
    let cfg = LayoutConfig::default();
    MarkupScanner::new(cfg.markup, cfg.dbcs)
}

/// Offsets at which a token starts, plus the end of text.
fn token_boundaries(text: &[u8]) -> Vec<usize> {
    let mut out: Vec<usize> = scanner().tokens(text).map(|token| token.offset()).collect();
    out.push(dbcs_layout::logical_len(text));
    out
}

fn line_widths(engine: &LayoutEngine, font: u32, text: &[u8], width: i32) -> Vec<i32> {
    engine
        .layout_text(font, text, width)
        .iter()
        .map(|line| line.width)
        .collect()
}

#[test]
fn dialog_wraps_at_word_boundaries() {
    let engine = engine();
    let layout = engine.layout_text(MED_FONT, DIALOG, 128);
    let lines: Vec<&[u8]> = layout.texts().collect();
    assert_eq!(
        lines,
        vec![
            &b"Welcome {traveler}."[..],
            b"\xd6\xd0\xce\xc4 {~#ffcc00}gold} and",
            b"{~Light Blue}mana} await.",
            b"",
            b"  Press any key.",
        ]
    );
    assert_eq!(
        layout.iter().map(|line| line.width).collect::<Vec<_>>(),
        vec![124, 96, 80, 0, 124]
    );
}

#[test]
fn dbcs_width_follows_bound_font() {
    let engine = engine();
    let text = join(&[ZHONG, WEN]);
    assert_eq!(engine.longest_line_width(MED_FONT, &text), 2 * MED_DBCS);
    assert_eq!(engine.longest_line_width(SMALL_FONT, &text), 2 * SMALL_DBCS);
}

#[test]
fn simple_two_word_wrap() {
    let engine = engine();
    let layout = engine.layout_text(MED_FONT, b"abc def", 3 * ADVANCE);
    assert_eq!(layout.texts().collect::<Vec<_>>(), vec![&b"abc"[..], b"def"]);
}

#[test]
fn consecutive_newlines_yield_three_empty_lines() {
    let engine = engine();
    let layout = engine.layout_text(MED_FONT, b"\n\n", 100);
    assert_eq!(layout.len(), 3);
    assert!(layout.iter().all(|line| line.text.is_empty()));
    assert_eq!(engine.count_lines(MED_FONT, b"\n\n", 100), 3);
    assert_eq!(engine.max_line_width(MED_FONT, b"\n\n", 100), 0);
}

#[test]
fn long_word_splits_into_ceil_parts() {
    let engine = engine();
    let layout = engine.layout_text(MED_FONT, b"abcdefgh", 3 * ADVANCE);
    assert_eq!(layout.len(), 3);
    assert_eq!(
        layout.iter().map(|line| line.glyphs).collect::<Vec<_>>(),
        vec![3, 3, 2]
    );
}

#[test]
fn oversized_ideograph_goes_alone() {
    let engine = engine();
    let text = join(&[b"a", ZHONG, b"b"]);
    let layout = engine.layout_text(MED_FONT, &text, MED_DBCS - 2);
    assert_eq!(layout.texts().collect::<Vec<_>>(), vec![&b"a"[..], ZHONG, b"b"]);
    assert_eq!(layout.lines()[1].width, MED_DBCS);
}

#[test]
fn narrow_glyphs_use_table_widths() {
    let engine = engine();
    assert_eq!(engine.longest_line_width(MED_FONT, b"ill."), 4 * NARROW);
    assert_eq!(engine.max_word_width(MED_FONT, b"ill. Waaa"), 4 * ADVANCE);
}

#[test]
fn queries_match_layout_for_sample_texts() {
    let engine = engine();
    for text in sample_texts(200) {
        for &width in WIDTHS {
            let layout = engine.layout_text(MED_FONT, &text, width);
            assert_eq!(
                engine.count_lines(MED_FONT, &text, width),
                layout.len(),
                "text={:?} width={}",
                text,
                width
            );
            assert_eq!(
                engine.max_line_width(MED_FONT, &text, width),
                layout.max_width(),
                "text={:?} width={}",
                text,
                width
            );
        }
    }
}

#[test]
fn lines_fit_unless_single_glyph() {
    let engine = engine();
    for text in sample_texts(200) {
        for &width in WIDTHS {
            for line in &engine.layout_text(MED_FONT, &text, width) {
                assert!(
                    line.width <= width || line.glyphs == 1,
                    "text={:?} width={} line={:?}",
                    text,
                    width,
                    line
                );
            }
        }
    }
}

#[test]
fn lines_are_ordered_and_never_split_a_pair() {
    let engine = engine();
    for text in sample_texts(200) {
        let boundaries = token_boundaries(&text);
        for &width in WIDTHS {
            let mut cursor = 0usize;
            for line in &engine.layout_text(MED_FONT, &text, width) {
                assert!(line.offset >= cursor, "text={:?} width={}", text, width);
                let end = line.offset + line.byte_len();
                assert!(boundaries.contains(&line.offset), "start inside a token");
                assert!(boundaries.contains(&end), "end inside a token");
                assert_eq!(line.text, &text[line.offset..end]);
                cursor = end;
            }
        }
    }
}

#[test]
fn layout_is_deterministic() {
    let engine = engine();
    for text in sample_texts(50) {
        for &width in WIDTHS {
            assert_eq!(
                engine.layout_text(MED_FONT, &text, width),
                engine.layout_text(MED_FONT, &text, width)
            );
        }
    }
}

#[test]
fn relayout_of_joined_lines_keeps_line_count() {
    let engine = engine();
    for text in sample_texts(200) {
        for &width in WIDTHS {
            let layout = engine.layout_text(MED_FONT, &text, width);
            let joined = layout.texts().collect::<Vec<_>>().join(&b'\n');
            assert_eq!(
                engine.count_lines(MED_FONT, &joined, width),
                layout.len(),
                "text={:?} joined={:?} width={}",
                text,
                joined,
                width
            );
        }
    }
}

#[test]
fn wide_box_gives_one_line_with_full_width() {
    let engine = engine();
    for text in sample_texts(200) {
        let single_line: Vec<u8> = text.iter().copied().filter(|&b| b != b'\n').collect();
        let trimmed_len = single_line
            .iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |last| last + 1);
        let trimmed = &single_line[..trimmed_len];
        let mut total = 0;
        let mut visible = 0;
        for token in scanner().tokens(trimmed) {
            if let Token::Glyph { glyph, .. } = token {
                total += match glyph {
                    Glyph::Single(b'i' | b'l' | b'.') => NARROW,
                    Glyph::Single(_) => ADVANCE,
                    Glyph::Double(..) => MED_DBCS,
                };
                if !token.is_space() {
                    visible += 1;
                }
            }
        }
        if visible == 0 {
            continue;
        }
        let layout = engine.layout_text(MED_FONT, &single_line, total);
        assert_eq!(layout.len(), 1, "text={:?}", single_line);
        assert_eq!(layout.lines()[0].width, total, "text={:?}", single_line);
    }
}

#[test]
fn word_width_box_never_force_splits() {
    let engine = engine();
    for text in sample_texts(200) {
        let width = engine.max_word_width(MED_FONT, &text);
        for line in &engine.layout_text(MED_FONT, &text, width) {
            assert!(line.width <= width, "text={:?} line={:?}", text, line);
        }
    }
}

#[test]
fn markup_around_glyphs_does_not_move_breaks() {
    let engine = engine();
    let bases: &[&[u8]] = &[
        b"the quick brown fox jumps over the lazy dog",
        b"a\xd6\xd0b \xce\xc4\xce\xc4 cde fghij\n  klm",
        b"Wiiiiiii WWWW i.i.i.i.i.",
        b"\xd6\xd0\xce\xc4\xd6\xd0\xce\xc4 endings",
    ];
    for base in bases {
        let glyph_offsets: Vec<(usize, usize)> = scanner()
            .tokens(base)
            .filter(|token| matches!(token, Token::Glyph { .. }) && !token.is_space())
            .map(|token| (token.offset(), token.byte_len()))
            .collect();
        for (idx, &(offset, len)) in glyph_offsets.iter().enumerate() {
            if idx % 3 != 0 {
                continue;
            }
            let end = offset + len;
            let marked = join(&[&base[..offset], b"{", &base[offset..end], b"}", &base[end..]]);
            for &width in WIDTHS {
                assert_eq!(
                    line_widths(&engine, MED_FONT, base, width),
                    line_widths(&engine, MED_FONT, &marked, width),
                    "marked={:?} width={}",
                    marked,
                    width
                );
            }
        }
    }
}

#[test]
fn markup_at_blank_boundaries_does_not_move_breaks() {
    let engine = engine();
    let cases: &[(&[u8], &[u8])] = &[
        (b"abc  def", b"abc {} def"),
        (b"abc  def", b"abc {~#ff0000} def"),
        (b"one two    three", b"one two { }  three"),
        (b"abc   ", b"abc {}  "),
        (b"abc   ", b"abc   {}"),
        (b"   ", b"   {}"),
        (b"ab\n  cd ef", b"ab\n{}  cd ef"),
        (b"ab\n", b"ab\n{}"),
        (b"\xd6\xd0  \xce\xc4 Wiiii", b"\xd6\xd0 {} \xce\xc4 {~#ffcc00}Wiiii"),
        (b"lead  Supercalifragilistic", b"lead {} Supercalifragilistic"),
    ];
    for &(plain, marked) in cases {
        for &width in WIDTHS {
            assert_eq!(
                line_widths(&engine, MED_FONT, plain, width),
                line_widths(&engine, MED_FONT, marked, width),
                "plain={:?} marked={:?} width={}",
                plain,
                marked,
                width
            );
        }
    }
}

#[test]
fn nul_ends_text_everywhere() {
    let engine = engine();
    let text = b"abc def\0ghi jkl mno";
    assert_eq!(engine.count_lines(MED_FONT, text, 3 * ADVANCE), 2);
    assert_eq!(engine.max_word_width(MED_FONT, text), 3 * ADVANCE);
    assert_eq!(engine.longest_line_width(MED_FONT, text), 7 * ADVANCE);
}
