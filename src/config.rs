//! Layout configuration and wrap-algorithm compatibility variants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lead/trail byte thresholds used to recognize double-byte glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DbcsRange {
    /// Smallest byte value accepted as a lead (section) byte.
    pub section: u8,
    /// Smallest byte value accepted as a trail (position) byte.
    pub position: u8,
}

impl DbcsRange {
    /// GBK: lead `0x81..=0xFE`, trail `0x40..=0xFE`.
    pub const GBK: Self = Self {
        section: 0x81,
        position: 0x40,
    };

    /// GB2312 (EUC-CN): lead `0xA1..=0xFE`, trail `0xA1..=0xFE`.
    pub const GB2312: Self = Self {
        section: 0xA1,
        position: 0xA1,
    };

    /// Whether `byte` may open a double-byte sequence.
    pub fn is_lead(self, byte: u8) -> bool {
        byte >= self.section && byte != 0xFF
    }

    /// Whether `byte` may close a double-byte sequence.
    pub fn is_trail(self, byte: u8) -> bool {
        byte != 0 && byte != 0xFF && byte >= self.position
    }
}

impl Default for DbcsRange {
    fn default() -> Self {
        Self::GBK
    }
}

/// Which inline color escapes are recognized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarkupMode {
    /// Braces are ordinary glyphs.
    Off,
    /// Only the single-byte `{` / `}` highlight toggles.
    Legacy,
    /// Legacy toggles plus `{~name}` and `{~#RRGGBB}` color escapes.
    #[default]
    Extended,
}

/// Unit of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BreakMode {
    /// Break between words, forcing glyph splits only inside over-wide words.
    #[default]
    Word,
    /// Break before any glyph that overflows, as the legacy metrics hooks do.
    Glyph,
}

/// Whether double-byte glyphs form words on their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DbcsWords {
    /// One ideograph is one complete word.
    #[default]
    Atomic,
    /// Ideographs join adjacent glyphs into space-delimited words.
    Merge,
}

/// Handling of spaces that directly follow an explicit newline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlankPolicy {
    /// Keep them as indentation of the new line.
    #[default]
    Keep,
    /// Drop them like blanks at a wrap point.
    Drop,
}

/// Width accounting for markup bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarkupWidth {
    /// Markup bytes are zero width.
    #[default]
    Zero,
    /// Markup bytes are measured with the single-byte font, as the stock game does.
    Measured,
}

/// How far the glyph walk rewinds when a glyph overflows the line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RewindPolicy {
    /// Rewind by the byte size of the overflowing glyph.
    #[default]
    GlyphBytes,
    /// Rewind one byte regardless of glyph size, resuming double-byte
    /// overflows at the trail byte.
    SingleByte,
}

/// Compatibility switches reproducing divergent revisions of the wrap walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Compat {
    pub break_mode: BreakMode,
    pub dbcs_words: DbcsWords,
    pub blanks_after_newline: BlankPolicy,
    pub markup_width: MarkupWidth,
    /// Only consulted in [`BreakMode::Glyph`].
    pub rewind: RewindPolicy,
}

impl Compat {
    /// Canonical word-wrap behavior.
    pub fn canonical() -> Self {
        Self::default()
    }

    /// Glyph-level walk of the legacy line count and wrap width hooks,
    /// including the one-byte rewind.
    pub fn legacy_metrics() -> Self {
        Self {
            break_mode: BreakMode::Glyph,
            rewind: RewindPolicy::SingleByte,
            ..Self::default()
        }
    }
}

/// Layout configuration shared by line breaking and metrics queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutConfig {
    /// Double-byte detection thresholds.
    pub dbcs: DbcsRange,
    /// Recognized markup.
    pub markup: MarkupMode,
    /// Wrap-walk variant.
    pub compat: Compat,
    /// Lower bound reported by `max_word_width`. The stock dialog code uses 256.
    pub word_width_floor: i32,
}

impl LayoutConfig {
    /// Canonical configuration for a given double-byte encoding.
    pub fn for_encoding(dbcs: DbcsRange) -> Self {
        Self {
            dbcs,
            ..Self::default()
        }
    }

    /// Replace the compatibility variant.
    pub fn with_compat(mut self, compat: Compat) -> Self {
        self.compat = compat;
        self
    }
}
