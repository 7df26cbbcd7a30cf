//! Degradation reports.
//!
//! Layout never fails. Conditions that older renderers silently papered
//! over are logged and, when a sink is installed, forwarded as
//! [`LayoutDiagnostic`] values.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::font_context::FontId;

/// Non-fatal condition observed while laying out or measuring text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutDiagnostic {
    /// No extended font is bound to `font`; the default mapping was used.
    MissingFontMapping { font: FontId },
    /// A `{~` escape had no closing `}` before the line or text ended.
    MalformedColorEscape { offset: usize },
    /// A `{~name}` escape named a color the resolver does not know.
    UnresolvedColorName { name: String },
    /// A single glyph is wider than the box and was emitted alone.
    OversizedGlyph {
        offset: usize,
        width: i32,
        max_width: i32,
    },
}

impl fmt::Display for LayoutDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFontMapping { font } => {
                write!(f, "no extended font bound to font {}", font)
            }
            Self::MalformedColorEscape { offset } => {
                write!(f, "unterminated color escape at byte {}", offset)
            }
            Self::UnresolvedColorName { name } => write!(f, "unknown color name {:?}", name),
            Self::OversizedGlyph {
                offset,
                width,
                max_width,
            } => write!(
                f,
                "glyph at byte {} is wider than the box (width={} max_width={})",
                offset, width, max_width
            ),
        }
    }
}

type DiagnosticCallback = Arc<Mutex<Box<dyn FnMut(LayoutDiagnostic) + Send + 'static>>>;

/// Optional shared callback receiving diagnostics.
#[derive(Clone, Default)]
pub struct DiagnosticSink {
    callback: Option<DiagnosticCallback>,
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("installed", &self.callback.is_some())
            .finish()
    }
}

impl DiagnosticSink {
    /// Sink that only logs.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sink forwarding every diagnostic to `callback`.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(LayoutDiagnostic) + Send + 'static,
    {
        Self {
            callback: Some(Arc::new(Mutex::new(Box::new(callback)))),
        }
    }

    /// Whether a callback is installed.
    pub fn is_installed(&self) -> bool {
        self.callback.is_some()
    }

    /// Log `diagnostic` and hand it to the callback, if any.
    pub fn emit(&self, diagnostic: LayoutDiagnostic) {
        match &diagnostic {
            LayoutDiagnostic::MissingFontMapping { .. } => log::warn!("{}", diagnostic),
            LayoutDiagnostic::OversizedGlyph { .. } => log::trace!("{}", diagnostic),
            _ => log::debug!("{}", diagnostic),
        }
        let Some(callback) = &self.callback else {
            return;
        };
        if let Ok(mut callback) = callback.lock() {
            callback(diagnostic);
        }
    }
}
