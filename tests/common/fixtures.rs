use std::sync::Arc;

use dbcs_layout::{
    Compat, ExtFont, FontContext, FontId, FontWidthTable, GlyphWidth, LayoutConfig, LayoutEngine,
};

/// Single-byte font bound to the medium extended font.
pub const MED_FONT: FontId = 1;
/// Single-byte font bound to the small extended font.
pub const SMALL_FONT: FontId = 2;

/// Default single-byte advance of the test font table.
pub const ADVANCE: i32 = 8;
/// Advance of `i`, `l` and `.` in the test font table.
pub const NARROW: i32 = 4;
/// Double-byte advance of the medium extended font (12 + 1 + 1).
pub const MED_DBCS: i32 = 14;
/// Double-byte advance of the small extended font.
pub const SMALL_DBCS: i32 = 10;

/// GBK "中".
pub const ZHONG: &[u8] = b"\xd6\xd0";
/// GBK "文".
pub const WEN: &[u8] = b"\xce\xc4";

/// Dialog-style sample mixing ASCII, ideographs and both markup forms.
pub const DIALOG: &[u8] =
    b"Welcome {traveler}. \xd6\xd0\xce\xc4 {~#ffcc00}gold} and {~Light Blue}mana} await.\n\n  Press any key.";

pub fn width_table() -> FontWidthTable {
    let mut table = FontWidthTable::uniform(GlyphWidth::new(1, 6, 1), 16);
    for code in [b'i', b'l', b'.'] {
        table.set(code, GlyphWidth::new(1, 2, 1));
    }
    table
}

pub fn font_context() -> FontContext {
    let mut fonts = FontContext::new();
    fonts
        .register_ext_font(ExtFont::new("smalfont.fnt", 10, 10).unwrap().with_shadow(false))
        .unwrap();
    fonts
        .register_ext_font(
            ExtFont::new("medfont.fnt", 12, 12)
                .unwrap()
                .with_margins(1, 1, 2),
        )
        .unwrap();
    fonts.bind_font(MED_FONT, "MedFont.fnt").unwrap();
    fonts.bind_font(SMALL_FONT, "SmalFont.fnt").unwrap();
    fonts
}

pub fn engine_with(cfg: LayoutConfig) -> LayoutEngine {
    LayoutEngine::new(cfg, Arc::new(width_table()), Arc::new(font_context()))
}

pub fn engine() -> LayoutEngine {
    engine_with(LayoutConfig::default())
}

pub fn compat_engine(compat: Compat) -> LayoutEngine {
    engine_with(LayoutConfig::default().with_compat(compat))
}

/// Concatenate byte pieces into one buffer.
pub fn join(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

/// Deterministic pseudo-random texts over a small mixed alphabet.
pub fn sample_texts(count: usize) -> Vec<Vec<u8>> {
    const PIECES: &[&[u8]] = &[
        b"a", b"b", b"W", b"i", b"e", b" ", b" ", b" ", b"\n", b"\xd6\xd0", b"\xce\xc4",
        b"{", b"}", b"{~#ff0000}",
    ];
    let mut state: u32 = 0x2545_f491;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    (0..count)
        .map(|_| {
            let len = (next() % 40) as usize;
            let mut text = Vec::with_capacity(len * 2);
            for _ in 0..len {
                text.extend_from_slice(PIECES[(next() as usize) % PIECES.len()]);
            }
            text
        })
        .collect()
}
