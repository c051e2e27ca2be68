//! Wire codec for canvas snapshots.
//!
//! The relay ships the whole canvas as a single string: one hex symbol per
//! pixel, row-major from the top-left corner. Decoding is strict — length,
//! symbol alphabet, and palette range are all checked, and nothing is
//! clamped, padded, or truncated. A snapshot that fails any check is
//! rejected whole so a corrupt frame can never half-apply. Encoding is
//! total for any grid that respects the palette invariant and always emits
//! lowercase symbols; decoding accepts either case.

use thiserror::Error;

use crate::consts::{CANVAS_SIDE, PALETTE_LEN};

/// One color index per pixel, row-major. Always exactly
/// [`GridSpec::pixel_count`] entries, each below the palette length.
pub type Grid = Vec<u8>;

/// Lowercase symbol table for [`encode`].
const HEX_SYMBOLS: &[u8; 16] = b"0123456789abcdef";

/// Shape of the shared canvas: a square grid plus the size of the palette
/// its encoding may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    /// Pixels per side. The canvas is always square.
    pub side: usize,
    /// Number of palette entries; never above [`PALETTE_LEN`].
    pub palette_len: u8,
}

impl GridSpec {
    /// Builds a spec for a `side` by `side` canvas. Palette sizes above
    /// [`PALETTE_LEN`] are capped: one hex symbol per pixel cannot express
    /// more than sixteen colors.
    #[must_use]
    pub fn new(side: usize, palette_len: u8) -> Self {
        Self { side, palette_len: palette_len.min(PALETTE_LEN) }
    }

    /// Total number of pixels in the grid.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.side * self.side
    }

    /// Whether `index` names a pixel on this canvas.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.pixel_count()
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { side: CANVAS_SIDE, palette_len: PALETTE_LEN }
    }
}

/// Why a snapshot encoding was rejected.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The encoding does not hold one symbol per pixel.
    #[error("encoding holds {got} symbols, expected {expected}")]
    WrongLength { got: usize, expected: usize },
    /// A symbol outside the hex alphabet.
    #[error("symbol {symbol:?} at pixel {index} is not a hex digit")]
    InvalidSymbol { index: usize, symbol: char },
    /// A well-formed symbol naming a color the palette does not have.
    #[error("color {color} at pixel {index} is outside the {palette_len}-color palette")]
    OutOfRange { index: usize, color: u8, palette_len: u8 },
}

/// Decodes a full-canvas encoding into a fresh [`Grid`].
///
/// The length check runs first, so a payload of the wrong size is reported
/// as such even when it also contains garbage symbols.
///
/// # Errors
///
/// [`DecodeError`] naming the first offending pixel; no partial grid is
/// ever returned.
pub fn decode(spec: GridSpec, encoding: &str) -> Result<Grid, DecodeError> {
    let expected = spec.pixel_count();
    if encoding.len() != expected {
        return Err(DecodeError::WrongLength { got: encoding.len(), expected });
    }
    let mut grid = Vec::with_capacity(expected);
    for (index, byte) in encoding.bytes().enumerate() {
        let color = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => {
                return Err(DecodeError::InvalidSymbol { index, symbol: char::from(byte) });
            }
        };
        if color >= spec.palette_len {
            return Err(DecodeError::OutOfRange { index, color, palette_len: spec.palette_len });
        }
        grid.push(color);
    }
    Ok(grid)
}

/// Encodes a grid back into the wire form, one lowercase hex symbol per
/// pixel.
#[must_use]
pub fn encode(grid: &[u8]) -> String {
    let mut out = String::with_capacity(grid.len());
    for &color in grid {
        // A well-formed grid never holds a color past 15; the mask keeps
        // the symbol lookup in range regardless.
        out.push(char::from(HEX_SYMBOLS[usize::from(color & 0x0f)]));
    }
    out
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;
