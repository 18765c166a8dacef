//! Pixel-level compositing over straight-alpha RGBA8 rasters.
//!
//! Every placement takes a signed position; whatever falls outside the destination is
//! clipped, never an error.

use image::{Rgba, RgbaImage};

use crate::foundation::core::{Pos, Rgba8};

/// Source-over for straight alpha: `src * a + dst * (1 - a)`, alpha accumulated the same way.
pub fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255 - sa;
    let da = mul_div255(u16::from(dst[3]), inv);
    let out_a = u16::from(src[3]) + u16::from(da);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * u32::from(sa) + u32::from(dst[i]) * u32::from(da);
        out[i] = ((num + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8;
    }
    out[3] = out_a.min(255) as u8;
    out
}

/// Copy `src` onto `dst` at `at`, replacing pixels.
pub fn blit(dst: &mut RgbaImage, src: &RgbaImage, at: Pos) {
    for_each_overlap(dst, src, at, |d, s| *d = *s);
}

/// Alpha-composite `src` onto `dst` at `at`, using `src`'s own alpha as the mask.
pub fn overlay(dst: &mut RgbaImage, src: &RgbaImage, at: Pos) {
    for_each_overlap(dst, src, at, |d, s| *d = Rgba(over(d.0, s.0)));
}

/// Copy a `width x height` window of `src` starting at `at`.
///
/// Pixels outside `src` come back fully transparent.
pub fn crop(src: &RgbaImage, at: Pos, width: u32, height: u32) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    for_each_overlap(&mut out, src, Pos::new(-at.x, -at.y), |d, s| *d = *s);
    out
}

/// Repeat `tile` from the origin right and down until `dst` is covered. Tiles are copied
/// opaque.
pub fn tile(dst: &mut RgbaImage, tile: &RgbaImage) {
    let (tw, th) = tile.dimensions();
    if tw == 0 || th == 0 {
        return;
    }
    let mut y = 0;
    while y < dst.height() {
        let mut x = 0;
        while x < dst.width() {
            for_each_overlap(dst, tile, Pos::new(x.into(), y.into()), |d, s| {
                *d = Rgba([s[0], s[1], s[2], 255]);
            });
            x += tw;
        }
        y += th;
    }
}

/// Fill the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to `dst`.
pub fn fill_rect(dst: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba8) {
    let px = color.to_pixel();
    for y in y0..y1.min(dst.height()) {
        for x in x0..x1.min(dst.width()) {
            dst.put_pixel(x, y, px);
        }
    }
}

fn for_each_overlap(
    dst: &mut RgbaImage,
    src: &RgbaImage,
    at: Pos,
    mut f: impl FnMut(&mut Rgba<u8>, &Rgba<u8>),
) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
    let x0 = at.x.max(0);
    let y0 = at.y.max(0);
    let x1 = (at.x + sw).min(dw);
    let y1 = (at.y + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    for y in y0..y1 {
        for x in x0..x1 {
            let s = src.get_pixel((x - at.x) as u32, (y - at.y) as u32);
            f(dst.get_pixel_mut(x as u32, y as u32), s);
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
