//! Positioned glyph commands for one text box.

use dbcs_layout::{
    logical_len, ColorResolver, ColorSpec, FontId, Glyph, LayoutDiagnostic, LayoutEngine,
    MarkupKind, MarkupScanner, Token,
};
use serde::{Deserialize, Serialize};

use crate::pixel_format::PixelFormat;

/// Horizontal placement of each line inside the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of the text block inside the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Text colors (ARGB).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextColors {
    /// Color at the start of text and after `}`.
    pub default: u32,
    /// Color after a legacy `{`.
    pub highlight: u32,
    /// Drop shadow of double-byte glyphs.
    pub shadow: u32,
}

impl Default for TextColors {
    fn default() -> Self {
        Self {
            default: 0xFFFF_FFFF,
            highlight: 0xFFE7_C65A,
            shadow: 0xFF00_0000,
        }
    }
}

/// Box geometry and styling for [`DrawPlanner::plan`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawConfig {
    /// Box origin on the target surface.
    pub x: i32,
    pub y: i32,
    pub box_width: i32,
    pub box_height: i32,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub colors: TextColors,
    /// Target pixel layout, from the host's reported bit depth.
    pub format: PixelFormat,
}

impl DrawConfig {
    pub fn new(x: i32, y: i32, box_width: i32, box_height: i32) -> Self {
        Self {
            x,
            y,
            box_width,
            box_height,
            ..Self::default()
        }
    }

    pub fn with_align(mut self, h_align: HAlign, v_align: VAlign) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }

    pub fn with_colors(mut self, colors: TextColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_bit_depth(mut self, depth: u32) -> Self {
        self.format = PixelFormat::from_bit_depth(depth);
        self
    }
}

/// One glyph placed at a pen position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphCommand {
    /// Pen position before the glyph's left margin.
    pub x: i32,
    /// Top of the glyph cell; double-byte cells are already shifted.
    pub y: i32,
    pub glyph: Glyph,
    /// ARGB ink color.
    pub color: u32,
    /// Color of the one-pixel drop shadow, for double-byte glyphs of fonts
    /// that draw one.
    pub shadow: Option<u32>,
}

/// Glyph commands of one text box.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawPlan {
    pub font: FontId,
    pub format: PixelFormat,
    pub commands: Vec<GlyphCommand>,
    /// Row pitch used for the plan.
    pub row_height: i32,
    pub lines_drawn: usize,
    /// Lines skipped because they would overflow the box bottom.
    pub lines_clipped: usize,
}

impl DrawPlan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// JSON form for golden snapshots and host tooling.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Turns text into [`DrawPlan`]s with a layout engine.
pub struct DrawPlanner<'e> {
    engine: &'e LayoutEngine,
    colors: &'e dyn ColorResolver,
}

impl<'e> DrawPlanner<'e> {
    pub fn new(engine: &'e LayoutEngine, colors: &'e dyn ColorResolver) -> Self {
        Self { engine, colors }
    }

    /// Lay out `text` in the box and position every visible glyph.
    pub fn plan(&self, font: FontId, text: &[u8], cfg: &DrawConfig) -> DrawPlan {
        let mut plan = DrawPlan {
            font,
            format: cfg.format,
            ..DrawPlan::default()
        };
        if logical_len(text) == 0 || cfg.box_width == 0 {
            return plan;
        }

        let layout = self.engine.layout_text(font, text, cfg.box_width);
        let metrics = self.engine.metrics();
        let ext = self.engine.fonts().resolve(font).ext;
        let ascii_height = metrics.font_height(font);
        let row_height = ascii_height.max(ext.height);
        let dbcs_shift = ((ascii_height - ext.height) / 2).max(0);
        plan.row_height = row_height;

        let rows = layout.len() as i32;
        let start_y = block_top(cfg, row_height, rows);
        let layout_cfg = self.engine.config();
        let scanner = MarkupScanner::new(layout_cfg.markup, layout_cfg.dbcs);
        let mut color = cfg.colors.default;

        for (row, line) in layout.iter().enumerate() {
            let row = row as i32;
            if start_y + (row + 1) * row_height > cfg.box_height {
                plan.lines_clipped = layout.len() - plan.lines_drawn;
                log::debug!(
                    "clipped {} of {} lines at box height {}",
                    plan.lines_clipped,
                    layout.len(),
                    cfg.box_height
                );
                break;
            }

            let line_x = cfg.x
                + match cfg.h_align {
                    HAlign::Left => 0,
                    HAlign::Center => (cfg.box_width - line.width) / 2,
                    HAlign::Right => cfg.box_width - line.width,
                };
            let line_y = cfg.y + start_y + row * row_height;
            let mut pen = 0i32;
            let mut skip_blanks = line.lead_blanks_dropped;

            for token in scanner.tokens(line.text) {
                match token {
                    Token::Markup { span, .. } => {
                        color = match span.kind {
                            MarkupKind::Highlight => cfg.colors.highlight,
                            MarkupKind::Reset => cfg.colors.default,
                            MarkupKind::Color(spec) => self.resolve_color(spec).unwrap_or(0),
                        };
                    }
                    Token::Glyph { glyph, .. } => {
                        if skip_blanks && token.is_space() {
                            continue;
                        }
                        skip_blanks = false;
                        let (advance, y, shadow) = match glyph {
                            Glyph::Single(code) => (metrics.glyph_width(font, code), line_y, None),
                            Glyph::Double(..) => (
                                ext.glyph_width(),
                                line_y + dbcs_shift,
                                ext.draw_shadow.then_some(cfg.colors.shadow),
                            ),
                        };
                        if glyph != Glyph::Single(b' ') {
                            plan.commands.push(GlyphCommand {
                                x: line_x + pen,
                                y,
                                glyph,
                                color,
                                shadow,
                            });
                        }
                        pen += advance;
                    }
                    Token::Newline { .. } => {}
                }
            }
            plan.lines_drawn += 1;
        }
        plan
    }

    fn resolve_color(&self, spec: ColorSpec<'_>) -> Option<u32> {
        let resolved = spec.resolve(self.colors);
        if let (None, ColorSpec::Name(name)) = (resolved, spec) {
            self.engine
                .diagnostics()
                .emit(LayoutDiagnostic::UnresolvedColorName {
                    name: String::from_utf8_lossy(name).into_owned(),
                });
        }
        resolved
    }
}

fn block_top(cfg: &DrawConfig, row_height: i32, rows: i32) -> i32 {
    let total = row_height.saturating_mul(rows);
    match cfg.v_align {
        VAlign::Top => 0,
        VAlign::Center if total < cfg.box_height => (cfg.box_height - total) / 2,
        // A box shorter than two rows still centers its first row.
        VAlign::Center if cfg.box_height < 2 * row_height => (cfg.box_height - row_height) / 2,
        VAlign::Center => 0,
        VAlign::Bottom if total < cfg.box_height => cfg.box_height - total,
        VAlign::Bottom => 0,
    }
}
