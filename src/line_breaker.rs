//! Word wrapping over raw double-byte text.
//!
//! One walker drives both [`LayoutEngine::layout_text`] and the metrics
//! queries, so line counts and widths always agree with the emitted layout.

use core::cell::Cell;
use core::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::classify::Glyph;
use crate::config::{BlankPolicy, BreakMode, DbcsWords, LayoutConfig, MarkupWidth, RewindPolicy};
use crate::diagnostics::{DiagnosticSink, LayoutDiagnostic};
use crate::font_context::{FontContext, FontId};
use crate::glyph_metrics::GlyphMetrics;
use crate::markup::{MarkupScanner, MarkupSpan, Token};

/// One laid-out line, borrowing its bytes from the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRecord<'a> {
    /// Line bytes. Markup stays in place so renderers can track colors.
    pub text: &'a [u8],
    /// Offset of `text` within the input buffer.
    pub offset: usize,
    /// Visible glyphs, spaces included, markup excluded.
    pub glyphs: usize,
    /// Measured width in device units.
    pub width: i32,
    /// Blanks before the first visible glyph were dropped at a break and are
    /// not part of `glyphs` or `width`. Only happens when markup leads the
    /// line.
    pub lead_blanks_dropped: bool,
}

impl LineRecord<'_> {
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Inline storage for the common case of short dialog texts.
pub type LineBuffer<'a> = SmallVec<[LineRecord<'a>; 8]>;

/// Ordered lines produced by one layout call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout<'a> {
    lines: LineBuffer<'a>,
}

impl<'a> Layout<'a> {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[LineRecord<'a>] {
        &self.lines
    }

    pub fn iter(&self) -> core::slice::Iter<'_, LineRecord<'a>> {
        self.lines.iter()
    }

    /// Line bytes in rendering order.
    pub fn texts(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.lines.iter().map(|line| line.text)
    }

    /// Widest line, `0` for an empty layout.
    pub fn max_width(&self) -> i32 {
        self.lines.iter().map(|line| line.width).max().unwrap_or(0)
    }

    /// Total height for a caller-chosen row height.
    pub fn height(&self, row_height: i32) -> i32 {
        row_height.saturating_mul(self.lines.len() as i32)
    }

    pub fn into_vec(self) -> Vec<LineRecord<'a>> {
        self.lines.into_vec()
    }
}

impl<'l, 'a> IntoIterator for &'l Layout<'a> {
    type Item = &'l LineRecord<'a>;
    type IntoIter = core::slice::Iter<'l, LineRecord<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Layout engine bound to a metrics capability and a font context.
#[derive(Clone)]
pub struct LayoutEngine {
    cfg: LayoutConfig,
    metrics: Arc<dyn GlyphMetrics>,
    fonts: Arc<FontContext>,
    diagnostics: DiagnosticSink,
}

impl fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("cfg", &self.cfg)
            .field("ext_fonts", &self.fonts.ext_font_count())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl LayoutEngine {
    /// Create an engine.
    pub fn new(cfg: LayoutConfig, metrics: Arc<dyn GlyphMetrics>, fonts: Arc<FontContext>) -> Self {
        Self {
            cfg,
            metrics,
            fonts,
            diagnostics: DiagnosticSink::none(),
        }
    }

    /// Forward degradations to `sink` in addition to logging them.
    pub fn with_diagnostics(mut self, sink: DiagnosticSink) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn config(&self) -> LayoutConfig {
        self.cfg
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    pub fn metrics(&self) -> &dyn GlyphMetrics {
        self.metrics.as_ref()
    }

    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    /// Word-wrap `text` into lines no wider than `max_width`.
    pub fn layout_text<'t>(&self, font: FontId, text: &'t [u8], max_width: i32) -> Layout<'t> {
        let mut lines = LineBuffer::new();
        self.layout_with(font, text, max_width, |line| lines.push(line));
        Layout { lines }
    }

    /// Stream each line of `text` to `on_line` without collecting.
    pub fn layout_with<'t, F>(&self, font: FontId, text: &'t [u8], max_width: i32, mut on_line: F)
    where
        F: FnMut(LineRecord<'t>),
    {
        self.measure(font)
            .walk(text, max_width, |span| on_line(span.record(text)));
    }

    pub(crate) fn measure(&self, font: FontId) -> Measure<'_> {
        let resolved = self.fonts.resolve(font);
        Measure {
            metrics: self.metrics.as_ref(),
            font,
            dbcs_width: resolved.ext.glyph_width(),
            space_width: self.metrics.glyph_width(font, b' '),
            cfg: self.cfg,
            scanner: MarkupScanner::new(self.cfg.markup, self.cfg.dbcs),
            diagnostics: &self.diagnostics,
            unbound_font: Cell::new(resolved.unbound),
            report_markup: Cell::new(true),
        }
    }
}

/// Byte range of an emitted line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LineSpan {
    pub start: usize,
    pub end: usize,
    pub glyphs: usize,
    pub width: i32,
    pub lead_dropped: bool,
}

impl LineSpan {
    fn record(self, text: &[u8]) -> LineRecord<'_> {
        LineRecord {
            text: &text[self.start..self.end],
            offset: self.start,
            glyphs: self.glyphs,
            width: self.width,
            lead_blanks_dropped: self.lead_dropped,
        }
    }
}

/// Maximal run of glyphs between blanks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Word {
    pub start: usize,
    pub end: usize,
    pub glyphs: usize,
    pub width: i32,
}

impl Word {
    fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Copy, Debug)]
struct OpenLine {
    start: usize,
    end: usize,
    glyphs: usize,
    width: i32,
    after_newline: bool,
    /// Opened at a wrap point; blanks cannot start it.
    wrapped: bool,
    lead_dropped: bool,
}

impl OpenLine {
    fn at(pos: usize, after_newline: bool) -> Self {
        Self {
            start: pos,
            end: pos,
            glyphs: 0,
            width: 0,
            after_newline,
            wrapped: false,
            lead_dropped: false,
        }
    }

    fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn push_word(&mut self, word: &Word, blanks: usize, blank_width: i32) {
        if self.is_empty() {
            self.start = word.start - blanks;
        }
        self.end = word.end;
        self.glyphs += blanks + word.glyphs;
        self.width = self
            .width
            .saturating_add(blank_width)
            .saturating_add(word.width);
    }

    fn push_token(&mut self, end: usize, glyphs: usize, width: i32) {
        self.end = end;
        self.glyphs += glyphs;
        self.width = self.width.saturating_add(width);
    }

    /// Zero-width markup joins the line without claiming pending blanks.
    fn attach(&mut self, word: &Word, blanks: usize) {
        if self.is_empty() {
            self.start = word.start - blanks;
        }
        self.end = word.end;
    }

    /// Discard pending blanks that already sit inside a markup-only line.
    fn drop_lead_blanks(&mut self, blanks: usize) {
        if blanks > 0 && !self.is_empty() && !self.has_content() {
            self.lead_dropped = true;
        }
    }

    /// Holds a glyph or some width. Markup alone does not count.
    fn has_content(&self) -> bool {
        self.glyphs > 0 || self.width > 0
    }

    /// A line is emitted at the end of text if it has content, or if an
    /// explicit newline opened it.
    fn is_pending(&self) -> bool {
        self.has_content() || self.after_newline
    }

    fn span(&self) -> LineSpan {
        LineSpan {
            start: self.start,
            end: self.end,
            glyphs: self.glyphs,
            width: self.width,
            lead_dropped: self.lead_dropped,
        }
    }
}

/// Per-call measuring state: resolved font widths and the configured variant.
pub(crate) struct Measure<'e> {
    metrics: &'e dyn GlyphMetrics,
    font: FontId,
    dbcs_width: i32,
    space_width: i32,
    cfg: LayoutConfig,
    scanner: MarkupScanner,
    diagnostics: &'e DiagnosticSink,
    unbound_font: Cell<bool>,
    report_markup: Cell<bool>,
}

impl Measure<'_> {
    fn glyph_width(&self, glyph: Glyph) -> i32 {
        match glyph {
            Glyph::Single(code) => self.metrics.glyph_width(self.font, code),
            Glyph::Double(..) => {
                if self.unbound_font.replace(false) {
                    self.diagnostics
                        .emit(LayoutDiagnostic::MissingFontMapping { font: self.font });
                }
                self.dbcs_width
            }
        }
    }

    fn markup_width(&self, text: &[u8], offset: usize, span: &MarkupSpan<'_>) -> i32 {
        match self.cfg.compat.markup_width {
            MarkupWidth::Zero => 0,
            MarkupWidth::Measured => text[offset..offset + span.len]
                .iter()
                .fold(0i32, |acc, &code| {
                    acc.saturating_add(self.metrics.glyph_width(self.font, code))
                }),
        }
    }

    /// Stop reporting malformed escapes, for a second pass over the same text.
    pub(crate) fn mute_markup(&self) {
        self.report_markup.set(false);
    }

    fn note_markup(&self, offset: usize, span: &MarkupSpan<'_>) {
        if span.malformed && self.report_markup.get() {
            self.diagnostics
                .emit(LayoutDiagnostic::MalformedColorEscape { offset });
        }
    }

    /// Width and visible glyph count of a non-newline token.
    fn token_metrics(&self, text: &[u8], token: &Token<'_>) -> (i32, usize) {
        match token {
            Token::Glyph { glyph, .. } => (self.glyph_width(*glyph), 1),
            Token::Markup { offset, span } => (self.markup_width(text, *offset, span), 0),
            Token::Newline { .. } => (0, 0),
        }
    }

    /// Scan the word starting at `start`. Empty at a blank, newline or end.
    pub(crate) fn scan_word(&self, text: &[u8], start: usize) -> Word {
        let atomic = self.cfg.compat.dbcs_words == DbcsWords::Atomic;
        let mut word = Word {
            start,
            end: start,
            glyphs: 0,
            width: 0,
        };
        while let Some(token) = self.scanner.token_at(text, word.end) {
            match token {
                Token::Newline { .. } => break,
                _ if token.is_space() => break,
                Token::Markup { offset, span } => {
                    self.note_markup(offset, &span);
                    word.width = word
                        .width
                        .saturating_add(self.markup_width(text, offset, &span));
                    word.end += span.len;
                }
                Token::Glyph { glyph, .. } if atomic && glyph.is_double() => {
                    if word.glyphs > 0 {
                        break;
                    }
                    word.glyphs = 1;
                    word.width = word.width.saturating_add(self.glyph_width(glyph));
                    word.end += glyph.byte_len();
                    // Markup right after an ideograph stays with it.
                    while let Some(Token::Markup { offset, span }) =
                        self.scanner.token_at(text, word.end)
                    {
                        self.note_markup(offset, &span);
                        word.width = word
                            .width
                            .saturating_add(self.markup_width(text, offset, &span));
                        word.end += span.len;
                    }
                    break;
                }
                Token::Glyph { glyph, .. } => {
                    word.glyphs += 1;
                    word.width = word.width.saturating_add(self.glyph_width(glyph));
                    word.end += glyph.byte_len();
                }
            }
        }
        word
    }

    /// Walk `text`, reporting every line in order.
    pub(crate) fn walk<F>(&self, text: &[u8], max_width: i32, mut on_line: F)
    where
        F: FnMut(LineSpan),
    {
        let max_width = max_width.max(0);
        match self.cfg.compat.break_mode {
            BreakMode::Word => self.walk_words(text, max_width, &mut on_line),
            BreakMode::Glyph => self.walk_glyphs(text, max_width, &mut on_line),
        }
    }

    fn drops_blank(&self, line: &OpenLine) -> bool {
        self.cfg.compat.blanks_after_newline == BlankPolicy::Drop
            && line.after_newline
            && !line.has_content()
    }

    fn walk_words<F>(&self, text: &[u8], max_width: i32, on_line: &mut F)
    where
        F: FnMut(LineSpan),
    {
        let mut line = OpenLine::at(0, false);
        let mut pos = 0usize;
        // Pending blanks are inserted before the next visible word only if it fits.
        let mut blanks = 0usize;
        let mut blank_width = 0i32;

        loop {
            loop {
                match text.get(pos) {
                    Some(b' ') if self.drops_blank(&line) => {
                        pos += 1;
                        if line.is_empty() {
                            line = OpenLine::at(pos, true);
                        } else {
                            line.drop_lead_blanks(1);
                        }
                    }
                    Some(b' ') => {
                        blanks += 1;
                        blank_width = blank_width.saturating_add(self.space_width);
                        pos += 1;
                    }
                    Some(b'\n') => {
                        on_line(line.span());
                        pos += 1;
                        line = OpenLine::at(pos, true);
                        blanks = 0;
                        blank_width = 0;
                    }
                    _ => break,
                }
            }

            let word = self.scan_word(text, pos);
            if word.is_empty() {
                break;
            }
            pos = word.end;
            if word.glyphs == 0 && word.width == 0 {
                line.attach(&word, blanks);
                continue;
            }
            if line.wrapped && !line.has_content() {
                line.drop_lead_blanks(blanks);
                blanks = 0;
                blank_width = 0;
            }

            let projected = line
                .width
                .saturating_add(word.width)
                .saturating_add(blank_width);
            if projected <= max_width {
                line.push_word(&word, blanks, blank_width);
                blanks = 0;
                blank_width = 0;
                continue;
            }
            line.drop_lead_blanks(blanks);
            blanks = 0;
            blank_width = 0;

            if line.has_content() {
                on_line(line.span());
                line = OpenLine::at(word.start, false);
            } else if line.is_empty() {
                line = OpenLine::at(word.start, false);
            }
            // A markup-only line stays open and leads the word.
            if word.width > max_width {
                line = self.force_split(text, &line, &word, max_width, on_line);
            } else {
                line.push_word(&word, 0, 0);
            }
        }

        if line.is_pending() {
            on_line(line.span());
        }
    }

    /// Emit greedy sub-lines of an over-wide word while its remainder still
    /// overflows. The first sub-line takes over `lead`, which covers any
    /// markup left open before the word. Returns the remainder as the open line.
    fn force_split<F>(
        &self,
        text: &[u8],
        lead: &OpenLine,
        word: &Word,
        max_width: i32,
        on_line: &mut F,
    ) -> OpenLine
    where
        F: FnMut(LineSpan),
    {
        let mut remaining_width = word.width;
        let mut remaining_glyphs = word.glyphs;
        let mut pos = word.start;
        let mut lead = Some(*lead);

        while remaining_width > max_width && pos < word.end {
            let first_glyph = pos;
            let mut sub = OpenLine::at(pos, false);
            if let Some(open) = lead.take() {
                sub.start = open.start;
                sub.lead_dropped = open.lead_dropped;
            }
            while pos < word.end {
                let Some(token) = self.scanner.token_at(text, pos) else {
                    break;
                };
                let (width, glyphs) = self.token_metrics(text, &token);
                let fits = width == 0
                    || sub.glyphs == 0
                    || sub.width.saturating_add(width) <= max_width;
                if !fits {
                    break;
                }
                pos += token.byte_len();
                sub.push_token(pos, glyphs, width);
            }

            if sub.width > max_width {
                self.diagnostics.emit(LayoutDiagnostic::OversizedGlyph {
                    offset: first_glyph,
                    width: sub.width,
                    max_width,
                });
            }
            log::trace!(
                "forced break: bytes {}..{} width={}",
                sub.start,
                sub.end,
                sub.width
            );
            on_line(sub.span());
            remaining_width = remaining_width.saturating_sub(sub.width);
            remaining_glyphs = remaining_glyphs.saturating_sub(sub.glyphs);
        }

        OpenLine {
            start: pos,
            end: word.end,
            glyphs: remaining_glyphs,
            width: remaining_width,
            after_newline: false,
            wrapped: true,
            lead_dropped: false,
        }
    }

    fn walk_glyphs<F>(&self, text: &[u8], max_width: i32, on_line: &mut F)
    where
        F: FnMut(LineSpan),
    {
        let mut line = OpenLine::at(0, false);
        let mut pos = 0usize;

        while let Some(token) = self.scanner.token_at(text, pos) {
            if let Token::Newline { .. } = token {
                on_line(line.span());
                pos += 1;
                line = OpenLine::at(pos, true);
                continue;
            }
            if token.is_space() && self.drops_blank(&line) {
                pos += 1;
                if line.is_empty() {
                    line = OpenLine::at(pos, true);
                } else {
                    line.drop_lead_blanks(1);
                }
                continue;
            }
            if let Token::Markup { offset, span } = &token {
                self.note_markup(*offset, span);
            }

            let len = token.byte_len();
            let (width, glyphs) = self.token_metrics(text, &token);
            let fits =
                width == 0 || line.glyphs == 0 || line.width.saturating_add(width) <= max_width;
            if fits {
                if line.glyphs == 0 && width > max_width {
                    self.diagnostics.emit(LayoutDiagnostic::OversizedGlyph {
                        offset: pos,
                        width,
                        max_width,
                    });
                }
                pos += len;
                line.push_token(pos, glyphs, width);
                continue;
            }

            on_line(line.span());
            pos = match self.cfg.compat.rewind {
                RewindPolicy::GlyphBytes => pos,
                // Resumes on the trail byte of an overflowing pair.
                RewindPolicy::SingleByte => pos + len - 1,
            };
            line = OpenLine::at(pos, false);
        }

        if line.is_pending() {
            on_line(line.span());
        }
    }

    /// Widest word of `text`, ignoring any box width.
    pub(crate) fn max_word_width(&self, text: &[u8]) -> i32 {
        let mut widest = 0i32;
        let mut pos = 0usize;
        loop {
            while let Some(token) = self.scanner.token_at(text, pos) {
                if token.is_space() || matches!(token, Token::Newline { .. }) {
                    pos += 1;
                } else {
                    break;
                }
            }
            let word = self.scan_word(text, pos);
            if word.is_empty() {
                return widest;
            }
            widest = widest.max(word.width);
            pos = word.end;
        }
    }
}
