use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Pixel offsets trimmed from each edge of a source image.
///
/// Invariants (guaranteed by [`detect_edges`]): `left + right < width`
/// and `top + bottom < height`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrimBox {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl TrimBox {
    /// True iff any edge was trimmed.
    pub fn is_trimmed(&self) -> bool {
        self.top > 0 || self.right > 0 || self.bottom > 0 || self.left > 0
    }

    /// Dimensions of the image after trimming.
    pub fn trimmed_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width - self.left - self.right, height - self.top - self.bottom)
    }
}

fn alpha_threshold(tolerance: f32) -> u8 {
    (tolerance.clamp(0.0, 1.0) * 255.0) as u8
}

/// Finds the minimal bounding box of non-transparent pixels.
///
/// A pixel counts as transparent iff its alpha is <= `tolerance * 255`,
/// so `tolerance` of zero means exactly fully transparent. The four edges
/// are scanned inward one line at a time: top over the full width, left
/// over the rows below `top`, bottom over the columns right of `left`,
/// and right over the row band between `top` and `bottom`.
///
/// Returns `None` when the image has no non-transparent pixel at all; an
/// entirely transparent image cannot be trimmed.
pub fn detect_edges(rgba: &RgbaImage, tolerance: f32) -> Option<TrimBox> {
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let thr = alpha_threshold(tolerance);
    let row_opaque =
        |y: u32, x0: u32, x1: u32| (x0..x1).any(|x| rgba.get_pixel(x, y)[3] > thr);
    let col_opaque =
        |x: u32, y0: u32, y1: u32| (y0..y1).any(|y| rgba.get_pixel(x, y)[3] > thr);

    let mut top = 0;
    while top < h && !row_opaque(top, 0, w) {
        top += 1;
    }
    if top == h {
        return None;
    }

    let mut left = 0;
    while left < w && !col_opaque(left, top, h) {
        left += 1;
    }

    let mut bottom = 0;
    while bottom < h - top && !row_opaque(h - 1 - bottom, left, w) {
        bottom += 1;
    }

    let mut right = 0;
    while right < w - left && !col_opaque(w - 1 - right, top, h - bottom) {
        right += 1;
    }

    Some(TrimBox {
        top,
        right,
        bottom,
        left,
    })
}
