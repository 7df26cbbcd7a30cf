//! Single-byte glyph width capability.

use std::collections::BTreeMap;

use crate::font_context::FontId;

/// Width lookup for single-byte glyphs, provided by the host's font tables.
pub trait GlyphMetrics: Send + Sync {
    /// Advance width of `code` in `font`, in device units.
    fn glyph_width(&self, font: FontId, code: u8) -> i32;

    /// Row height of `font`. Layout itself never needs it.
    fn font_height(&self, _font: FontId) -> i32 {
        0
    }
}

/// Per-glyph horizontal metrics of a bitmap font.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphWidth {
    pub left_margin: i32,
    pub span: i32,
    pub right_margin: i32,
}

impl GlyphWidth {
    pub const fn new(left_margin: i32, span: i32, right_margin: i32) -> Self {
        Self {
            left_margin,
            span,
            right_margin,
        }
    }

    /// Pen advance: `left_margin + span + right_margin`.
    pub const fn advance(self) -> i32 {
        self.left_margin + self.span + self.right_margin
    }
}

/// Metrics table of one single-byte font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontWidthTable {
    widths: [GlyphWidth; 256],
    height: i32,
}

impl FontWidthTable {
    /// Table where every glyph has the same metrics.
    pub fn uniform(width: GlyphWidth, height: i32) -> Self {
        Self {
            widths: [width; 256],
            height,
        }
    }

    /// Build a table from a per-code function.
    pub fn from_fn<F>(height: i32, mut f: F) -> Self
    where
        F: FnMut(u8) -> GlyphWidth,
    {
        let mut widths = [GlyphWidth::default(); 256];
        for (code, slot) in widths.iter_mut().enumerate() {
            *slot = f(code as u8);
        }
        Self { widths, height }
    }

    /// Override the metrics of one code.
    pub fn set(&mut self, code: u8, width: GlyphWidth) -> &mut Self {
        self.widths[usize::from(code)] = width;
        self
    }

    pub fn get(&self, code: u8) -> GlyphWidth {
        self.widths[usize::from(code)]
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

impl GlyphMetrics for FontWidthTable {
    fn glyph_width(&self, _font: FontId, code: u8) -> i32 {
        self.get(code).advance()
    }

    fn font_height(&self, _font: FontId) -> i32 {
        self.height
    }
}

/// Every single-byte glyph advances by the same amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedAdvance {
    pub advance: i32,
    pub height: i32,
}

impl FixedAdvance {
    pub const fn new(advance: i32, height: i32) -> Self {
        Self { advance, height }
    }
}

impl GlyphMetrics for FixedAdvance {
    fn glyph_width(&self, _font: FontId, _code: u8) -> i32 {
        self.advance
    }

    fn font_height(&self, _font: FontId) -> i32 {
        self.height
    }
}

/// Width tables for several font identities.
///
/// Unknown identities answer from the fallback table.
#[derive(Clone, Debug)]
pub struct FontWidthTables {
    tables: BTreeMap<FontId, FontWidthTable>,
    fallback: FontWidthTable,
}

impl FontWidthTables {
    pub fn new(fallback: FontWidthTable) -> Self {
        Self {
            tables: BTreeMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, font: FontId, table: FontWidthTable) -> Option<FontWidthTable> {
        self.tables.insert(font, table)
    }

    pub fn table(&self, font: FontId) -> &FontWidthTable {
        self.tables.get(&font).unwrap_or(&self.fallback)
    }
}

impl GlyphMetrics for FontWidthTables {
    fn glyph_width(&self, font: FontId, code: u8) -> i32 {
        self.table(font).get(code).advance()
    }

    fn font_height(&self, font: FontId) -> i32 {
        self.table(font).height()
    }
}
