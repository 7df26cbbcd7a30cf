//! Word wrapping and text metrics for mixed single/double-byte text.
//!
//! `dbcs-layout` works directly on raw GBK or GB2312 byte buffers with
//! inline `{`/`}` and `{~color}` markup. Double-byte glyph widths come from
//! a [`FontContext`] that pairs single-byte fonts with extended bitmap
//! fonts; single-byte widths come from a host-provided [`GlyphMetrics`].
//!
//! ```
//! use std::sync::Arc;
//! use dbcs_layout::{ExtFont, FixedAdvance, FontContext, LayoutConfig, LayoutEngine};
//!
//! let mut fonts = FontContext::new();
//! fonts.register_ext_font(ExtFont::new("medfont.fnt", 12, 12)?)?;
//! fonts.bind_font(0, "MedFont.fnt")?;
//!
//! let engine = LayoutEngine::new(
//!     LayoutConfig::default(),
//!     Arc::new(FixedAdvance::new(8, 16)),
//!     Arc::new(fonts),
//! );
//! let layout = engine.layout_text(0, b"abc def", 24);
//! assert_eq!(layout.len(), 2);
//! assert_eq!(engine.count_lines(0, b"abc def", 24), 2);
//! # Ok::<(), dbcs_layout::FontContextError>(())
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod font_context;
pub mod glyph_metrics;
pub mod line_breaker;
pub mod markup;
mod metrics_queries;

pub use classify::{classify, glyph_at, logical_len, ByteClass, Glyph};
pub use config::{
    BlankPolicy, BreakMode, Compat, DbcsRange, DbcsWords, LayoutConfig, MarkupMode, MarkupWidth,
    RewindPolicy,
};
pub use diagnostics::{DiagnosticSink, LayoutDiagnostic};
pub use font_context::{
    ExtFont, FontBinding, FontContext, FontContextError, FontId, ResolvedFont,
    DEFAULT_EXT_FONT_INDEX, MAX_BOUND_FONTS, MAX_EXT_FONTS, MAX_FONT_NAME_LEN,
};
pub use glyph_metrics::{FixedAdvance, FontWidthTable, FontWidthTables, GlyphMetrics, GlyphWidth};
pub use line_breaker::{Layout, LayoutEngine, LineBuffer, LineRecord};
pub use markup::{
    parse_hex_color, ColorResolver, ColorSpec, ColorTable, MarkupKind, MarkupScanner, MarkupSpan,
    NoColorNames, Token, Tokens,
};
pub use metrics_queries::TextMetrics;
