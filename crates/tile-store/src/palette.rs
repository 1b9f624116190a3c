//! Palette-indexed PNG decoding.
//!
//! JMA tiles encode categories as palette slots, so the decoder must keep the
//! raw index data instead of expanding to RGB. Rows are stored packed at the
//! image's native bit depth (1, 2, 4 or 8 bits per pixel).

use png::{BitDepth, ColorType, Decoder, Transformations};
use thiserror::Error;

/// Errors decoding a tile body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("Invalid PNG: {0}")]
    Png(String),

    #[error("Empty tile body")]
    Empty,
}

impl From<png::DecodingError> for ImageError {
    fn from(err: png::DecodingError) -> Self {
        ImageError::Png(err.to_string())
    }
}

/// A decoded tile, pixel data left in its stored (unexpanded) form.
#[derive(Debug, Clone)]
pub struct PaletteImage {
    width: u32,
    height: u32,
    color_type: ColorType,
    bit_depth: BitDepth,
    line_size: usize,
    data: Vec<u8>,
}

impl PaletteImage {
    /// Decode a PNG without palette expansion.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let mut decoder = Decoder::new(bytes);
        decoder.set_transformations(Transformations::IDENTITY);
        let mut reader = decoder.read_info()?;

        let mut data = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut data)?;
        data.truncate(frame.buffer_size());

        Ok(Self {
            width: frame.width,
            height: frame.height,
            color_type: frame.color_type,
            bit_depth: frame.bit_depth,
            line_size: frame.line_size,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth as u8
    }

    /// Whether pixels are palette slots (PNG color type 3).
    pub fn is_indexed(&self) -> bool {
        self.color_type == ColorType::Indexed
    }

    /// Palette slot of the pixel at `(x, y)`.
    ///
    /// Returns `None` for non-indexed images and out-of-bounds positions.
    pub fn palette_index(&self, x: u32, y: u32) -> Option<u8> {
        if !self.is_indexed() || x >= self.width || y >= self.height {
            return None;
        }

        let depth = self.bit_depth as usize;
        let bit = x as usize * depth;
        let byte = *self.data.get(y as usize * self.line_size + bit / 8)?;

        // Pixels are packed MSB-first within each byte.
        let shift = 8 - depth - bit % 8;
        let mask = ((1u16 << depth) - 1) as u8;
        Some((byte >> shift) & mask)
    }
}
