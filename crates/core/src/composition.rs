//! Final-board composition and placeholder tiles.
//!
//! Neighboring tiles overlap by the seed strip, so tile `(x, y)` is placed at
//! `(x * stride_x, y * stride_y)` with `stride = tile size - overlap`.

use std::fmt::Write as _;

use crate::grid::Cell;
use crate::seeding::{overlap_height, overlap_width, TILE_HEIGHT, TILE_WIDTH};

/// Colors cycled through for placeholder tiles.
pub const PLACEHOLDER_PALETTE: &[&str] = &[
    "#F43F5E", "#6366F1", "#22C55E", "#F59E0B", "#0EA5E9", "#A855F7",
];

/// Pixel size of a composed N×N board.
pub fn board_pixel_size(size: i32) -> (u32, u32) {
    let n = size.max(0) as u32;
    if n == 0 {
        return (0, 0);
    }
    (
        n * TILE_WIDTH - (n - 1) * overlap_width(),
        n * TILE_HEIGHT - (n - 1) * overlap_height(),
    )
}

/// Top-left pixel of a tile on the composed board.
pub fn tile_origin(cell: Cell) -> (u32, u32) {
    let stride_x = TILE_WIDTH - overlap_width();
    let stride_y = TILE_HEIGHT - overlap_height();
    (cell.x.max(0) as u32 * stride_x, cell.y.max(0) as u32 * stride_y)
}

/// Compose every tile into one SVG document on a white background.
pub fn compose_board_svg<'a>(
    size: i32,
    tiles: impl IntoIterator<Item = (Cell, &'a str)>,
) -> String {
    let (width, height) = board_pixel_size(size);
    let mut svg = String::new();
    svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    svg.push_str(r##"<rect width="100%" height="100%" fill="#ffffff" />"##);
    for (cell, image_data) in tiles {
        let (x, y) = tile_origin(cell);
        let _ = write!(
            svg,
            r#"<image href="{}" x="{x}" y="{y}" width="{TILE_WIDTH}" height="{TILE_HEIGHT}" preserveAspectRatio="none" />"#,
            escape_attr(image_data)
        );
    }
    svg.push_str("</svg>");
    svg
}

/// A labelled, solid-color SVG tile encoded as a `data:` URL.
pub fn placeholder_tile(cell: Cell) -> String {
    let color = PLACEHOLDER_PALETTE[(cell.x + cell.y).unsigned_abs() as usize % PLACEHOLDER_PALETTE.len()];
    let label = format!("{},{}", cell.x, cell.y);
    let svg = format!(
        r##"<?xml version="1.0" encoding="UTF-8"?><svg xmlns="http://www.w3.org/2000/svg" width="{TILE_WIDTH}" height="{TILE_HEIGHT}" viewBox="0 0 {TILE_WIDTH} {TILE_HEIGHT}"><rect width="100%" height="100%" fill="{color}" /><text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" font-family="Arial" font-size="48" fill="#ffffff">{label}</text></svg>"##
    );
    format!("data:image/svg+xml;utf8,{}", percent_encode(&svg))
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encode everything outside the URI-component unreserved set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            other => {
                let _ = write!(out, "%{other:02X}");
            }
        }
    }
    out
}
