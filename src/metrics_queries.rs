//! Sizing queries sharing the line breaker walk.
//!
//! None of these allocate.

use crate::font_context::FontId;
use crate::line_breaker::LayoutEngine;

/// Combined answer of the sizing queries for one text and box width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub line_count: usize,
    pub max_line_width: i32,
    pub max_word_width: i32,
}

impl LayoutEngine {
    /// Number of lines [`LayoutEngine::layout_text`] would produce.
    pub fn count_lines(&self, font: FontId, text: &[u8], max_width: i32) -> usize {
        let mut count = 0usize;
        self.measure(font).walk(text, max_width, |_| count += 1);
        count
    }

    /// Widest line [`LayoutEngine::layout_text`] would produce.
    pub fn max_line_width(&self, font: FontId, text: &[u8], max_width: i32) -> i32 {
        let mut widest = 0i32;
        self.measure(font)
            .walk(text, max_width, |line| widest = widest.max(line.width));
        widest
    }

    /// Widest single word, raised to [`LayoutConfig::word_width_floor`].
    ///
    /// [`LayoutConfig::word_width_floor`]: crate::LayoutConfig::word_width_floor
    pub fn max_word_width(&self, font: FontId, text: &[u8]) -> i32 {
        self.measure(font)
            .max_word_width(text)
            .max(self.config().word_width_floor)
    }

    /// Widest line when only explicit newlines break.
    pub fn longest_line_width(&self, font: FontId, text: &[u8]) -> i32 {
        self.max_line_width(font, text, i32::MAX)
    }

    /// Line count, widest line and widest word in one call.
    pub fn text_metrics(&self, font: FontId, text: &[u8], max_width: i32) -> TextMetrics {
        let measure = self.measure(font);
        let mut metrics = TextMetrics::default();
        measure.walk(text, max_width, |line| {
            metrics.line_count += 1;
            metrics.max_line_width = metrics.max_line_width.max(line.width);
        });
        measure.mute_markup();
        metrics.max_word_width = measure
            .max_word_width(text)
            .max(self.config().word_width_floor);
        metrics
    }
}
