use image::RgbaImage;

/// Blit a sub-rectangle from `src` into `canvas` at destination (dx, dy).
///
/// - (sx, sy, sw, sh): source rectangle within `src`
/// - (dx, dy): destination top-left in `canvas`
///
/// Writes that would fall outside the canvas are skipped. The canvas is
/// the only thing mutated; sources are never written to.
pub fn blit_rgba(
    src: &RgbaImage,
    canvas: &mut RgbaImage,
    dx: u32,
    dy: u32,
    sx: u32,
    sy: u32,
    sw: u32,
    sh: u32,
) {
    let (cw, ch) = canvas.dimensions();
    for yy in 0..sh {
        for xx in 0..sw {
            if dx + xx < cw && dy + yy < ch {
                let px = *src.get_pixel(sx + xx, sy + yy);
                canvas.put_pixel(dx + xx, dy + yy, px);
            }
        }
    }
}
