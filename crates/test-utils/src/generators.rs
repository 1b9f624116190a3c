//! Synthetic tile generators.
//!
//! JMA tiles are 256x256 palette-indexed PNGs. These helpers build such
//! tiles from a palette and an index buffer so tests can control exactly
//! which palette slot sits under a projected pixel.

use std::io::Write;

/// Tile edge length in pixels.
pub const TILE_SIZE: usize = 256;

/// A 256x256 index buffer filled with one palette slot.
pub fn uniform_indices(index: u8) -> Vec<u8> {
    vec![index; TILE_SIZE * TILE_SIZE]
}

/// A 256x256 index buffer with `background` everywhere except `(x, y)`.
pub fn marked_indices(background: u8, x: usize, y: usize, index: u8) -> Vec<u8> {
    let mut indices = uniform_indices(background);
    indices[y * TILE_SIZE + x] = index;
    indices
}

/// An 8-bit indexed tile whose pixel at `(x, y)` has palette slot `index`.
pub fn tile_with_pixel(palette: &[(u8, u8, u8)], x: usize, y: usize, index: u8) -> Vec<u8> {
    create_png_indexed(
        TILE_SIZE,
        TILE_SIZE,
        8,
        palette,
        &marked_indices(0, x, y, index),
    )
}

/// An 8-bit indexed tile filled with a single palette slot.
pub fn uniform_tile(palette: &[(u8, u8, u8)], index: u8) -> Vec<u8> {
    create_png_indexed(TILE_SIZE, TILE_SIZE, 8, palette, &uniform_indices(index))
}

/// Create an indexed PNG (color type 3) from palette and indices.
///
/// `bit_depth` may be 1, 2, 4 or 8; indices are packed MSB-first per row
/// as the PNG format requires.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    bit_depth: u8,
    palette: &[(u8, u8, u8)],
    indices: &[u8],
) -> Vec<u8> {
    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(bit_depth);
    ihdr_data.push(3); // color type 3 = indexed
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // PLTE chunk (palette)
    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b) in palette {
        plte_data.push(*r);
        plte_data.push(*g);
        plte_data.push(*b);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // IDAT chunk (image data)
    let mut uncompressed = Vec::new();
    for row in indices.chunks(width).take(height) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(&pack_row(row, bit_depth));
    }
    write_chunk(&mut png, b"IDAT", &deflate(&uncompressed));

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    png
}

/// Create an 8-bit RGBA PNG (color type 6). Used for "not a palette tile" cases.
pub fn create_png_rgba(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut png = Vec::new();

    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    let mut ihdr_data = Vec::new();
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type (RGBA)
    ihdr_data.push(0);
    ihdr_data.push(0);
    ihdr_data.push(0);
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    let mut uncompressed = Vec::with_capacity(height * (1 + width * 4));
    for row in pixels.chunks(width * 4).take(height) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }
    write_chunk(&mut png, b"IDAT", &deflate(&uncompressed));

    write_chunk(&mut png, b"IEND", &[]);

    png
}

/// Pack one row of palette indices at the given bit depth.
fn pack_row(row: &[u8], bit_depth: u8) -> Vec<u8> {
    if bit_depth == 8 {
        return row.to_vec();
    }
    let per_byte = (8 / bit_depth) as usize;
    let mask = (1u8 << bit_depth) - 1;
    row.chunks(per_byte)
        .map(|group| {
            group.iter().enumerate().fold(0u8, |byte, (i, index)| {
                let shift = 8 - bit_depth as usize * (i + 1);
                byte | ((index & mask) << shift)
            })
        })
        .collect()
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let crc_data = [chunk_type.as_slice(), data].concat();
    png.extend_from_slice(&crc32fast::hash(&crc_data).to_be_bytes());
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    // Writing into a Vec cannot fail.
    encoder.write_all(data).expect("in-memory deflate");
    encoder.finish().expect("in-memory deflate")
}
