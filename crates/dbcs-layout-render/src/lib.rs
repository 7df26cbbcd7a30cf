//! Positioned glyph plans for `dbcs-layout` text boxes.
//!
//! A [`DrawPlan`] lists where each visible glyph goes, in which color and
//! with or without a drop shadow. Hosts blit the glyph bitmaps themselves,
//! writing pixels through the plan's [`PixelFormat`].

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

mod draw_plan;
mod pixel_format;

pub use dbcs_layout::{ColorResolver, ColorTable, Glyph, NoColorNames};
pub use draw_plan::{DrawConfig, DrawPlan, DrawPlanner, GlyphCommand, HAlign, TextColors, VAlign};
pub use pixel_format::PixelFormat;
