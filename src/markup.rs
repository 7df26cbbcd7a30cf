//! Inline color markup recognition.
//!
//! Two forms are understood:
//!
//! - legacy toggles: `{` switches following glyphs to the highlight color and
//!   `}` switches back to the default color. Each toggle is one byte.
//! - extended escapes: `{~#RRGGBB}`, `{~#AARRGGBB}` and `{~name}` set an
//!   explicit color. The whole escape through its closing `}` is one span.
//!
//! Every span is zero width and never breaks a word.

use std::collections::BTreeMap;

use crate::classify::{classify, glyph_at, ByteClass, Glyph};
use crate::config::{DbcsRange, MarkupMode};

/// Color carried by an extended escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpec<'a> {
    /// Already parsed `#` literal (ARGB).
    Hex(u32),
    /// Symbolic name, resolved through a [`ColorResolver`].
    Name(&'a [u8]),
}

impl ColorSpec<'_> {
    /// Resolve to ARGB, `None` for unknown names.
    pub fn resolve(&self, resolver: &dyn ColorResolver) -> Option<u32> {
        match *self {
            Self::Hex(argb) => Some(argb),
            Self::Name(name) => resolver.resolve_color_name(name),
        }
    }

    /// Resolve to ARGB; unknown names yield `0`.
    pub fn color(&self, resolver: &dyn ColorResolver) -> u32 {
        self.resolve(resolver).unwrap_or(0)
    }
}

/// What a markup span does to the current color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupKind<'a> {
    Highlight,
    Reset,
    Color(ColorSpec<'a>),
}

/// A recognized markup span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkupSpan<'a> {
    /// Span length in bytes.
    pub len: usize,
    pub kind: MarkupKind<'a>,
    /// An extended escape was opened but never closed; only its `{` was
    /// taken, as a highlight toggle.
    pub malformed: bool,
}

/// Lexical unit of a text buffer as seen by layout and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// A visible glyph. Spaces are single-byte glyphs.
    Glyph { offset: usize, glyph: Glyph },
    Markup { offset: usize, span: MarkupSpan<'a> },
    Newline { offset: usize },
}

impl Token<'_> {
    pub fn offset(&self) -> usize {
        match *self {
            Self::Glyph { offset, .. } | Self::Markup { offset, .. } | Self::Newline { offset } => {
                offset
            }
        }
    }

    /// Bytes covered by the token.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Glyph { glyph, .. } => glyph.byte_len(),
            Self::Markup { span, .. } => span.len,
            Self::Newline { .. } => 1,
        }
    }

    pub fn is_space(&self) -> bool {
        matches!(
            self,
            Self::Glyph {
                glyph: Glyph::Single(b' '),
                ..
            }
        )
    }
}

/// Markup-aware tokenizer over raw bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkupScanner {
    mode: MarkupMode,
    dbcs: DbcsRange,
}

impl MarkupScanner {
    pub fn new(mode: MarkupMode, dbcs: DbcsRange) -> Self {
        Self { mode, dbcs }
    }

    pub fn mode(&self) -> MarkupMode {
        self.mode
    }

    /// Markup span starting at `pos`, if any.
    pub fn scan<'a>(&self, text: &'a [u8], pos: usize) -> Option<MarkupSpan<'a>> {
        if self.mode == MarkupMode::Off {
            return None;
        }
        match classify(text, pos, self.dbcs) {
            ByteClass::MarkupOpen => Some(self.scan_open(text, pos)),
            ByteClass::MarkupClose => Some(MarkupSpan {
                len: 1,
                kind: MarkupKind::Reset,
                malformed: false,
            }),
            _ => None,
        }
    }

    /// Token starting at `pos`; `None` at the logical end of text.
    pub fn token_at<'a>(&self, text: &'a [u8], pos: usize) -> Option<Token<'a>> {
        if let Some(span) = self.scan(text, pos) {
            return Some(Token::Markup { offset: pos, span });
        }
        match classify(text, pos, self.dbcs) {
            ByteClass::End => None,
            ByteClass::Newline => Some(Token::Newline { offset: pos }),
            _ => glyph_at(text, pos, self.dbcs).map(|glyph| Token::Glyph { offset: pos, glyph }),
        }
    }

    /// Iterate tokens of `text` from the start.
    pub fn tokens<'a>(&self, text: &'a [u8]) -> Tokens<'a> {
        Tokens {
            scanner: *self,
            text,
            pos: 0,
        }
    }

    fn scan_open<'a>(&self, text: &'a [u8], pos: usize) -> MarkupSpan<'a> {
        let legacy = MarkupSpan {
            len: 1,
            kind: MarkupKind::Highlight,
            malformed: false,
        };
        if self.mode != MarkupMode::Extended || text.get(pos + 1) != Some(&b'~') {
            return legacy;
        }

        let body_start = pos + 2;
        let mut cursor = body_start;
        loop {
            match classify(text, cursor, self.dbcs) {
                ByteClass::End | ByteClass::Newline => {
                    return MarkupSpan {
                        malformed: true,
                        ..legacy
                    };
                }
                ByteClass::MarkupClose => break,
                ByteClass::DbcsLead => cursor += 2,
                _ => cursor += 1,
            }
        }

        let body = &text[body_start..cursor];
        let spec = match body.split_first() {
            Some((b'#', digits)) => ColorSpec::Hex(parse_hex_color(digits)),
            _ => ColorSpec::Name(body),
        };
        MarkupSpan {
            len: cursor + 1 - pos,
            kind: MarkupKind::Color(spec),
            malformed: false,
        }
    }
}

/// Iterator produced by [`MarkupScanner::tokens`].
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    scanner: MarkupScanner,
    text: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.scanner.token_at(self.text, self.pos)?;
        self.pos += token.byte_len();
        Some(token)
    }
}

/// Parse 1 to 8 hex digits as ARGB. Six digits or fewer get an opaque
/// alpha. Anything else yields `0`.
pub fn parse_hex_color(digits: &[u8]) -> u32 {
    if digits.is_empty() || digits.len() > 8 {
        return 0;
    }
    let mut value = 0u32;
    for &digit in digits {
        let nibble = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            b'A'..=b'F' => digit - b'A' + 10,
            _ => return 0,
        };
        value = (value << 4) | u32::from(nibble);
    }
    if digits.len() <= 6 {
        value |= 0xFF00_0000;
    }
    value
}

/// Name to color lookup for `{~name}` escapes.
pub trait ColorResolver {
    fn resolve_color_name(&self, name: &[u8]) -> Option<u32>;
}

/// Resolver that knows no names.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoColorNames;

impl ColorResolver for NoColorNames {
    fn resolve_color_name(&self, _name: &[u8]) -> Option<u32> {
        None
    }
}

/// Case-insensitive name table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorTable {
    colors: BTreeMap<Vec<u8>, u32>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, argb: u32) -> Option<u32> {
        self.colors.insert(name.as_bytes().to_ascii_lowercase(), argb)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl<'n> FromIterator<(&'n str, u32)> for ColorTable {
    fn from_iter<I: IntoIterator<Item = (&'n str, u32)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, argb) in iter {
            table.insert(name, argb);
        }
        table
    }
}

impl ColorResolver for ColorTable {
    fn resolve_color_name(&self, name: &[u8]) -> Option<u32> {
        self.colors.get(&name.to_ascii_lowercase()).copied()
    }
}
