//! Target pixel encodings.

use serde::{Deserialize, Serialize};

/// Pixel layout of the host surface, chosen once per draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 16-bit little-endian 5:6:5.
    #[default]
    Rgb565,
    /// 32-bit little-endian ARGB.
    Argb8888,
}

impl PixelFormat {
    /// Hosts report 4 bytes (or 32 bits) per pixel for true color; anything
    /// else is treated as 16-bit.
    pub fn from_bit_depth(depth: u32) -> Self {
        match depth {
            4 | 32 => Self::Argb8888,
            _ => Self::Rgb565,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Argb8888 => 4,
        }
    }

    /// Encode an ARGB color. Alpha is dropped for 5:6:5.
    pub fn encode(self, argb: u32) -> u32 {
        match self {
            Self::Rgb565 => {
                let r = (argb >> 16) & 0xFF;
                let g = (argb >> 8) & 0xFF;
                let b = argb & 0xFF;
                ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)
            }
            Self::Argb8888 => argb,
        }
    }

    /// Write one pixel at column `col` of a row. Returns `false` when the
    /// column is outside the row.
    pub fn write_pixel(self, row: &mut [u8], col: usize, argb: u32) -> bool {
        let bpp = self.bytes_per_pixel();
        let Some(slot) = col.checked_mul(bpp).and_then(|start| {
            let end = start.checked_add(bpp)?;
            row.get_mut(start..end)
        }) else {
            return false;
        };
        let encoded = self.encode(argb).to_le_bytes();
        slot.copy_from_slice(&encoded[..bpp]);
        true
    }
}
