//! Speech and thought balloons: bordered text box, background-sampled corners, and tail.

use image::RgbaImage;

use crate::config::RenderConfig;
use crate::foundation::core::{Extent, Pos};
use crate::foundation::error::StripResult;
use crate::model::Side;
use crate::render::canvas::{LayeredCanvas, Sealed};
use crate::render::composite;
use crate::text::face::TextFace;
use crate::text::wrap::WrappedText;

/// A finished balloon and where it and its tail go on the panel.
#[derive(Clone, Debug)]
pub struct Balloon {
    pub image: RgbaImage,
    pub at: Pos,
    pub tail_at: Pos,
}

impl Balloon {
    pub fn size(&self) -> Extent {
        Extent::new(self.image.width(), self.image.height())
    }

    /// Pixel rectangle `(x0, y0, x1, y1)` the balloon body covers, half-open.
    pub fn bounds(&self) -> (i64, i64, i64, i64) {
        let size = self.size();
        (
            self.at.x,
            self.at.y,
            self.at.x + i64::from(size.width),
            self.at.y + i64::from(size.height),
        )
    }

    /// Copy the balloon body, then alpha-composite the tail over its bottom border.
    pub fn place(&self, canvas: &mut LayeredCanvas<Sealed>, tail: &RgbaImage) {
        canvas.place_opaque(&self.image, self.at);
        canvas.place_over(tail, self.tail_at);
    }
}

/// Inputs for one balloon.
pub struct BalloonRequest<'a> {
    pub wrapped: &'a WrappedText,
    pub side: Side,
    /// Top-left corner of the speaking character's sprite.
    pub anchor: Pos,
    pub corner_mask: &'a RgbaImage,
    pub tail: &'a RgbaImage,
}

/// Outer balloon size: the wrapped text plus the margin on every side.
pub fn balloon_size(wrapped: &WrappedText, config: &RenderConfig) -> Extent {
    let m = config.balloon_margin_px * 2;
    Extent::new(wrapped.max_line_width + m, wrapped.total_height + m)
}

/// Top-left of a balloon of `size` spoken by a character whose sprite starts at `anchor`.
///
/// The balloon sits `tail_gap_px` above the sprite and is nudged one pixel inward on its
/// side so the two balloons of a panel do not touch the panel edges identically.
pub fn balloon_position(anchor: Pos, side: Side, size: Extent, config: &RenderConfig) -> Pos {
    let nudge = match side {
        Side::Left => 1,
        Side::Right => -1,
    };
    Pos::new(
        anchor.x + nudge,
        anchor.y - i64::from(config.tail_gap_px) - i64::from(size.height),
    )
}

/// Top-left of the tail: centered under the balloon, overlapping its bottom border.
pub fn tail_position(at: Pos, size: Extent, tail: &RgbaImage, config: &RenderConfig) -> Pos {
    let dx = (i64::from(size.width) - i64::from(tail.width())).div_euclid(2);
    Pos::new(
        at.x + dx,
        at.y + i64::from(size.height) - i64::from(config.tail_overlap_px),
    )
}

/// Build a balloon against a sealed canvas.
///
/// The corner cells are copied from `canvas` at the exact pixels the balloon will cover,
/// then the corner mask (rotated clockwise 0/90/180/270 for top-left, top-right,
/// bottom-right, bottom-left) is composited over each.
pub fn build_balloon<F: TextFace + ?Sized>(
    req: &BalloonRequest<'_>,
    canvas: &LayeredCanvas<Sealed>,
    face: &mut F,
    config: &RenderConfig,
) -> StripResult<Balloon> {
    let size = balloon_size(req.wrapped, config).renderable();
    let at = balloon_position(req.anchor, req.side, size, config);

    let mut image = RgbaImage::from_pixel(size.width, size.height, config.balloon_bg.to_pixel());
    draw_border(&mut image, config);
    cut_corners(&mut image, at, canvas, req.corner_mask, config);
    draw_text(&mut image, req.wrapped, face, config)?;

    let tail_at = tail_position(at, size, req.tail, config);
    tracing::debug!(
        side = req.side.as_str(),
        x = at.x,
        y = at.y,
        w = size.width,
        h = size.height,
        lines = req.wrapped.line_count(),
        "built balloon"
    );
    Ok(Balloon {
        image,
        at,
        tail_at,
    })
}

fn draw_border(image: &mut RgbaImage, config: &RenderConfig) {
    let (w, h) = image.dimensions();
    let b = config.balloon_border_px;
    let color = config.balloon_border;
    composite::fill_rect(image, 0, 0, w, b, color);
    composite::fill_rect(image, 0, h.saturating_sub(b), w, h, color);
    composite::fill_rect(image, 0, 0, b, h, color);
    composite::fill_rect(image, w.saturating_sub(b), 0, w, h, color);
}

fn cut_corners(
    image: &mut RgbaImage,
    at: Pos,
    canvas: &LayeredCanvas<Sealed>,
    mask: &RgbaImage,
    config: &RenderConfig,
) {
    let (w, h) = image.dimensions();
    let c = config.corner_px.min(w).min(h);
    let masks = [
        mask.clone(),
        image::imageops::rotate90(mask),
        image::imageops::rotate180(mask),
        image::imageops::rotate270(mask),
    ];
    // tl, tr, br, bl
    let cells = [(0, 0), (w - c, 0), (w - c, h - c), (0, h - c)];

    for (mask, (cx, cy)) in masks.iter().zip(cells) {
        let cell = Pos::new(cx.into(), cy.into());
        let behind = canvas.sample(at.offset(cell.x, cell.y), Extent::new(c, c));
        composite::blit(image, &behind, cell);

        let (mw, mh) = mask.dimensions();
        let mx = if cx == 0 { 0 } else { i64::from(w) - i64::from(mw) };
        let my = if cy == 0 { 0 } else { i64::from(h) - i64::from(mh) };
        composite::overlay(image, mask, Pos::new(mx, my));
    }
}

fn draw_text<F: TextFace + ?Sized>(
    image: &mut RgbaImage,
    wrapped: &WrappedText,
    face: &mut F,
    config: &RenderConfig,
) -> StripResult<()> {
    let interior = wrapped.extent();
    if interior.width == 0 || interior.height == 0 {
        return Ok(());
    }

    let mut text_area =
        RgbaImage::from_pixel(interior.width, interior.height, config.text_bg.to_pixel());
    let mut y = 0i64;
    for (line, extent) in wrapped.lines.iter().zip(&wrapped.line_extents) {
        if !line.is_empty() {
            let strip =
                face.render_line(line, config.line_spacing_px, config.text_fg, config.text_bg)?;
            let x = (i64::from(interior.width) - i64::from(extent.width)).div_euclid(2);
            composite::blit(&mut text_area, &strip, Pos::new(x, y));
        }
        y += i64::from(extent.height);
    }

    let m = i64::from(config.balloon_margin_px);
    composite::blit(image, &text_area, Pos::new(m, m));
    Ok(())
}
