//! Explicit mapping from single-byte font identities to double-byte fonts.
//!
//! The context is filled once during initialization and is read-only while
//! laying out text; share it behind an `Arc`.

use core::fmt;

use heapless::{LinearMap, Vec as BoundedVec};

/// Host identity of a single-byte font.
pub type FontId = u32;

/// Maximum number of registered double-byte fonts.
pub const MAX_EXT_FONTS: usize = 16;
/// Maximum number of single-byte font identities that can be bound.
pub const MAX_BOUND_FONTS: usize = 64;
/// Maximum length of the single-byte font name an extended font pairs with.
pub const MAX_FONT_NAME_LEN: usize = 32;

/// Registration index used when a font identity has no binding.
pub const DEFAULT_EXT_FONT_INDEX: usize = 1;

static FALLBACK_EXT_FONT: ExtFont = ExtFont::FALLBACK;

/// Double-byte bitmap font paired with a single-byte font by name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtFont {
    /// Name of the single-byte font this font extends (`"MedFont.fnt"`).
    pub ascii_name: heapless::String<MAX_FONT_NAME_LEN>,
    pub height: i32,
    pub width: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_bottom: i32,
    pub draw_shadow: bool,
}

impl ExtFont {
    /// 16x16 geometry of the common HZK16 tables, used when nothing is registered.
    pub const FALLBACK: Self = Self {
        ascii_name: heapless::String::new(),
        height: 16,
        width: 16,
        margin_left: 0,
        margin_right: 0,
        margin_bottom: 2,
        draw_shadow: true,
    };

    /// New font with zero margins and shadows enabled.
    pub fn new(ascii_name: &str, width: i32, height: i32) -> Result<Self, FontContextError> {
        let mut name = heapless::String::new();
        name.push_str(ascii_name)
            .map_err(|_| FontContextError::NameTooLong {
                len: ascii_name.len(),
            })?;
        Ok(Self {
            ascii_name: name,
            height,
            width,
            margin_left: 0,
            margin_right: 0,
            margin_bottom: 2,
            draw_shadow: true,
        })
    }

    pub fn with_margins(mut self, left: i32, right: i32, bottom: i32) -> Self {
        self.margin_left = left;
        self.margin_right = right;
        self.margin_bottom = bottom;
        self
    }

    pub fn with_shadow(mut self, draw_shadow: bool) -> Self {
        self.draw_shadow = draw_shadow;
        self
    }

    /// Constant advance of every double-byte glyph in this font.
    pub fn glyph_width(&self) -> i32 {
        self.margin_left + self.width + self.margin_right
    }
}

/// Font context initialization failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontContextError {
    /// `MAX_EXT_FONTS` or `MAX_BOUND_FONTS` reached.
    CapacityExceeded { kind: &'static str, limit: usize },
    /// An extended font for this single-byte font name is already registered.
    DuplicateFont { name: String },
    /// Width or height is not positive.
    InvalidGeometry { width: i32, height: i32 },
    /// Font name does not fit `MAX_FONT_NAME_LEN`.
    NameTooLong { len: usize },
    /// Default index points past the registered fonts.
    InvalidDefault { index: usize, registered: usize },
}

impl fmt::Display for FontContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { kind, limit } => {
                write!(f, "font context capacity exceeded: {} (limit={})", kind, limit)
            }
            Self::DuplicateFont { name } => write!(f, "extended font already registered: {}", name),
            Self::InvalidGeometry { width, height } => {
                write!(f, "invalid glyph geometry {}x{}", width, height)
            }
            Self::NameTooLong { len } => write!(
                f,
                "font name too long: {} bytes (limit={})",
                len, MAX_FONT_NAME_LEN
            ),
            Self::InvalidDefault { index, registered } => write!(
                f,
                "default font index {} out of range ({} registered)",
                index, registered
            ),
        }
    }
}

impl std::error::Error for FontContextError {}

/// How a font identity was bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontBinding {
    /// Matched an extended font by name.
    Matched(usize),
    /// No name matched; the default extended font is used.
    Fallback(usize),
}

impl FontBinding {
    pub fn index(self) -> usize {
        match self {
            Self::Matched(index) | Self::Fallback(index) => index,
        }
    }
}

/// Extended font resolved for a layout call.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedFont<'a> {
    pub ext: &'a ExtFont,
    /// The identity was never bound and the default font answered.
    pub unbound: bool,
}

/// Registered double-byte fonts and the identity bindings onto them.
#[derive(Clone, Debug)]
pub struct FontContext {
    ext_fonts: BoundedVec<ExtFont, MAX_EXT_FONTS>,
    bindings: LinearMap<FontId, u8, MAX_BOUND_FONTS>,
    default_index: usize,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            ext_fonts: BoundedVec::new(),
            bindings: LinearMap::new(),
            default_index: DEFAULT_EXT_FONT_INDEX,
        }
    }

    /// Register an extended font, returning its index.
    pub fn register_ext_font(&mut self, font: ExtFont) -> Result<usize, FontContextError> {
        if font.width <= 0 || font.height <= 0 {
            return Err(FontContextError::InvalidGeometry {
                width: font.width,
                height: font.height,
            });
        }
        if self.find_by_name(&font.ascii_name).is_some() {
            return Err(FontContextError::DuplicateFont {
                name: font.ascii_name.as_str().to_string(),
            });
        }
        let index = self.ext_fonts.len();
        self.ext_fonts
            .push(font)
            .map_err(|_| FontContextError::CapacityExceeded {
                kind: "ext_fonts",
                limit: MAX_EXT_FONTS,
            })?;
        Ok(index)
    }

    /// Choose the extended font used for unbound or unmatched identities.
    pub fn set_default_index(&mut self, index: usize) -> Result<(), FontContextError> {
        if index >= self.ext_fonts.len() {
            return Err(FontContextError::InvalidDefault {
                index,
                registered: self.ext_fonts.len(),
            });
        }
        self.default_index = index;
        Ok(())
    }

    /// Bind a single-byte font identity to the extended font registered for
    /// `ascii_name` (case-insensitive). Unmatched names bind to the default.
    pub fn bind_font(
        &mut self,
        font: FontId,
        ascii_name: &str,
    ) -> Result<FontBinding, FontContextError> {
        let binding = match self.find_by_name(ascii_name) {
            Some(index) => FontBinding::Matched(index),
            None => {
                let index = self.default_slot();
                log::warn!(
                    "no extended font named {:?} for font {}; using default index {}",
                    ascii_name,
                    font,
                    index
                );
                FontBinding::Fallback(index)
            }
        };
        // Slot indices are bounded by MAX_EXT_FONTS.
        let slot = binding.index() as u8;
        self.bindings
            .insert(font, slot)
            .map_err(|_| FontContextError::CapacityExceeded {
                kind: "bindings",
                limit: MAX_BOUND_FONTS,
            })?;
        Ok(binding)
    }

    /// Extended font for `font`. Never fails: unbound identities get the
    /// default font and an empty context answers with [`ExtFont::FALLBACK`].
    pub fn resolve(&self, font: FontId) -> ResolvedFont<'_> {
        if let Some(ext) = self
            .bindings
            .get(&font)
            .and_then(|&slot| self.ext_fonts.get(usize::from(slot)))
        {
            return ResolvedFont { ext, unbound: false };
        }
        ResolvedFont {
            ext: self
                .ext_fonts
                .get(self.default_slot())
                .unwrap_or(&FALLBACK_EXT_FONT),
            unbound: true,
        }
    }

    pub fn ext_font(&self, index: usize) -> Option<&ExtFont> {
        self.ext_fonts.get(index)
    }

    pub fn ext_font_count(&self) -> usize {
        self.ext_fonts.len()
    }

    pub fn bound_font_count(&self) -> usize {
        self.bindings.len()
    }

    fn find_by_name(&self, ascii_name: &str) -> Option<usize> {
        self.ext_fonts
            .iter()
            .position(|ext| ext.ascii_name.eq_ignore_ascii_case(ascii_name))
    }

    fn default_slot(&self) -> usize {
        if self.default_index < self.ext_fonts.len() {
            self.default_index
        } else {
            0
        }
    }
}
