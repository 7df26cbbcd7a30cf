//! Byte classification for mixed single/double-byte text.

use crate::config::DbcsRange;

/// Classification of the byte at a text position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteClass {
    /// `\0` or past the end of the buffer.
    End,
    Newline,
    Space,
    MarkupOpen,
    MarkupClose,
    /// First byte of a valid double-byte pair.
    DbcsLead,
    /// Any other byte, including a lead byte whose trail is invalid.
    Single,
}

/// One renderable unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Glyph {
    Single(u8),
    Double(u8, u8),
}

impl Glyph {
    /// Encoded size in bytes.
    pub fn byte_len(self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Double(..) => 2,
        }
    }

    pub fn is_double(self) -> bool {
        matches!(self, Self::Double(..))
    }
}

/// Classify `text[pos]`.
pub fn classify(text: &[u8], pos: usize, range: DbcsRange) -> ByteClass {
    let Some(&byte) = text.get(pos) else {
        return ByteClass::End;
    };
    match byte {
        0 => ByteClass::End,
        b'\n' => ByteClass::Newline,
        b' ' => ByteClass::Space,
        b'{' => ByteClass::MarkupOpen,
        b'}' => ByteClass::MarkupClose,
        lead if range.is_lead(lead) => match text.get(pos + 1) {
            Some(&trail) if range.is_trail(trail) => ByteClass::DbcsLead,
            _ => ByteClass::Single,
        },
        _ => ByteClass::Single,
    }
}

/// Decode the glyph starting at `pos`, ignoring markup and whitespace roles.
///
/// Returns `None` at the logical end of text.
pub fn glyph_at(text: &[u8], pos: usize, range: DbcsRange) -> Option<Glyph> {
    match classify(text, pos, range) {
        ByteClass::End => None,
        ByteClass::DbcsLead => Some(Glyph::Double(text[pos], text[pos + 1])),
        _ => Some(Glyph::Single(text[pos])),
    }
}

/// Length of the logical text: everything before the first `\0`.
pub fn logical_len(text: &[u8]) -> usize {
    text.iter().position(|&b| b == 0).unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZHONG: &[u8] = b"\xd6\xd0";

    #[test]
    fn classifies_control_and_markup_bytes() {
        let text = b"a \n{}\0";
        let range = DbcsRange::GBK;
        assert_eq!(classify(text, 0, range), ByteClass::Single);
        assert_eq!(classify(text, 1, range), ByteClass::Space);
        assert_eq!(classify(text, 2, range), ByteClass::Newline);
        assert_eq!(classify(text, 3, range), ByteClass::MarkupOpen);
        assert_eq!(classify(text, 4, range), ByteClass::MarkupClose);
        assert_eq!(classify(text, 5, range), ByteClass::End);
        assert_eq!(classify(text, 99, range), ByteClass::End);
    }

    #[test]
    fn valid_pair_is_a_double_glyph() {
        assert_eq!(classify(ZHONG, 0, DbcsRange::GBK), ByteClass::DbcsLead);
        assert_eq!(
            glyph_at(ZHONG, 0, DbcsRange::GBK),
            Some(Glyph::Double(0xd6, 0xd0))
        );
    }

    #[test]
    fn dangling_lead_falls_back_to_single_byte() {
        let text = b"\xd6";
        assert_eq!(classify(text, 0, DbcsRange::GBK), ByteClass::Single);
        assert_eq!(glyph_at(text, 0, DbcsRange::GBK), Some(Glyph::Single(0xd6)));
    }

    #[test]
    fn invalid_trail_falls_back_to_single_byte() {
        for trail in [0x00u8, 0xFF, 0x20, 0x3F] {
            let text = [0xd6, trail];
            assert_eq!(
                classify(&text, 0, DbcsRange::GBK),
                ByteClass::Single,
                "trail {:#04x}",
                trail
            );
        }
    }

    #[test]
    fn encoding_threshold_changes_classification() {
        let text = b"\x90\x50";
        assert_eq!(classify(text, 0, DbcsRange::GBK), ByteClass::DbcsLead);
        assert_eq!(classify(text, 0, DbcsRange::GB2312), ByteClass::Single);
    }

    #[test]
    fn logical_len_stops_at_nul() {
        assert_eq!(logical_len(b"abc\0def"), 3);
        assert_eq!(logical_len(b"abc"), 3);
        assert_eq!(logical_len(b""), 0);
    }
}
