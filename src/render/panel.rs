//! One panel: tiled background, two characters anchored to the bottom corners, and a
//! balloon above each.

use image::RgbaImage;

use crate::assets::store::AssetStore;
use crate::config::RenderConfig;
use crate::foundation::core::{Extent, Pos};
use crate::foundation::error::StripResult;
use crate::model::{Panel, Side};
use crate::render::balloon::{Balloon, BalloonRequest, build_balloon};
use crate::render::canvas::LayeredCanvas;
use crate::text::face::TextFace;
use crate::text::wrap::{WrappedText, wrap};

/// Text budget per side. Both sides currently use the configured base width, so the panel
/// width never depends on dialog length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextAreaWidths {
    pub left: u32,
    pub right: u32,
}

impl TextAreaWidths {
    pub fn fixed(config: &RenderConfig) -> Self {
        Self {
            left: config.text_area_px,
            right: config.text_area_px,
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// `panel_base_width + (allowance - left - right)`, at least one pixel.
    pub fn panel_width(&self, config: &RenderConfig) -> u32 {
        let w = i64::from(config.panel_base_width_px) + i64::from(config.text_area_allowance_px)
            - i64::from(self.left)
            - i64::from(self.right);
        w.clamp(1, i64::from(u32::MAX)) as u32
    }
}

/// Size of every panel canvas under `config`.
pub fn panel_size(config: &RenderConfig) -> Extent {
    Extent::new(
        TextAreaWidths::fixed(config).panel_width(config),
        config.panel_height_px,
    )
    .renderable()
}

/// The two balloons of a panel intersect. Reported, never corrected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalloonOverlapDetected {
    pub panel_index: usize,
    pub overlap: Extent,
}

#[derive(Clone, Debug)]
pub struct PanelRaster {
    pub image: RgbaImage,
    pub overlap: Option<BalloonOverlapDetected>,
}

impl PanelRaster {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Compose panel `panel_index` of a strip.
///
/// Layer order is fixed: background, left and right characters, then the left balloon and
/// the right balloon. Each balloon samples the canvas as it stands when it is built.
#[tracing::instrument(skip(panel, assets, face, config), fields(background = %panel.background))]
pub fn compose_panel<F: TextFace + ?Sized>(
    panel_index: usize,
    panel: &Panel,
    assets: &AssetStore,
    face: &mut F,
    config: &RenderConfig,
) -> StripResult<PanelRaster> {
    let widths = TextAreaWidths::fixed(config);
    let size = panel_size(config);

    let background = assets.get(&panel.background)?;
    let corner_mask = assets.get(&config.corner_asset_key)?;
    let mut sprites = Vec::with_capacity(2);
    let mut tails = Vec::with_capacity(2);
    for side in Side::BOTH {
        sprites.push(assets.get(panel.character(side))?);
        tails.push(assets.get(&panel.dialog(side).kind.tail_key(side))?);
    }

    let mut canvas = LayeredCanvas::new(size);
    canvas.paint_background(background);
    let mut anchors = Vec::with_capacity(2);
    for (side, sprite) in Side::BOTH.into_iter().zip(&sprites) {
        let at = sprite_position(side, sprite, size);
        canvas.paint_sprite(sprite, at);
        anchors.push(at);
    }
    let mut canvas = canvas.seal()?;

    let wrapped: Vec<WrappedText> = Side::BOTH
        .into_iter()
        .map(|side| {
            wrap(
                &panel.dialog(side).text,
                widths.get(side),
                &mut *face,
                config.line_spacing_px,
            )
        })
        .collect();

    let mut balloons: Vec<Balloon> = Vec::with_capacity(2);
    for (i, side) in Side::BOTH.into_iter().enumerate() {
        let req = BalloonRequest {
            wrapped: &wrapped[i],
            side,
            anchor: anchors[i],
            corner_mask,
            tail: tails[i],
        };
        let balloon = build_balloon(&req, &canvas, face, config)?;
        balloon.place(&mut canvas, tails[i]);
        balloons.push(balloon);
    }

    let overlap = detect_overlap(&balloons[0], &balloons[1]).map(|overlap| {
        tracing::warn!(
            panel_index,
            overlap_w = overlap.width,
            overlap_h = overlap.height,
            "balloons overlap"
        );
        BalloonOverlapDetected {
            panel_index,
            overlap,
        }
    });

    Ok(PanelRaster {
        image: canvas.into_image(),
        overlap,
    })
}

/// Sprites stand on the bottom edge, flush with their side of the panel.
pub fn sprite_position(side: Side, sprite: &RgbaImage, panel: Extent) -> Pos {
    let y = i64::from(panel.height) - i64::from(sprite.height());
    let x = match side {
        Side::Left => 0,
        Side::Right => i64::from(panel.width) - i64::from(sprite.width()),
    };
    Pos::new(x, y)
}

fn detect_overlap(a: &Balloon, b: &Balloon) -> Option<Extent> {
    let (ax0, ay0, ax1, ay1) = a.bounds();
    let (bx0, by0, bx1, by1) = b.bounds();
    let w = ax1.min(bx1) - ax0.max(bx0);
    let h = ay1.min(by1) - ay0.max(by0);
    (w > 0 && h > 0).then(|| Extent::new(w as u32, h as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_panel_is_234_by_350() {
        assert_eq!(panel_size(&RenderConfig::default()), Extent::new(234, 350));
    }

    #[test]
    fn panel_width_follows_text_budget() {
        let cfg = RenderConfig::default();
        let widths = TextAreaWidths {
            left: 100,
            right: 100,
        };
        assert_eq!(widths.panel_width(&cfg), 256);
        let widths = TextAreaWidths {
            left: 1000,
            right: 1000,
        };
        assert_eq!(widths.panel_width(&cfg), 1);
    }

    #[test]
    fn sprites_stand_on_bottom_corners() {
        let sprite = RgbaImage::new(80, 120);
        let panel = Extent::new(234, 350);
        assert_eq!(sprite_position(Side::Left, &sprite, panel), Pos::new(0, 230));
        assert_eq!(
            sprite_position(Side::Right, &sprite, panel),
            Pos::new(154, 230)
        );
    }

    #[test]
    fn overlap_is_measured_on_balloon_bodies() {
        let a = Balloon {
            image: RgbaImage::new(20, 10),
            at: Pos::new(0, 0),
            tail_at: Pos::default(),
        };
        let b = Balloon {
            image: RgbaImage::new(20, 10),
            at: Pos::new(15, 8),
            tail_at: Pos::default(),
        };
        assert_eq!(detect_overlap(&a, &b), Some(Extent::new(5, 2)));
        let c = Balloon {
            image: RgbaImage::new(20, 10),
            at: Pos::new(20, 0),
            tail_at: Pos::default(),
        };
        assert_eq!(detect_overlap(&a, &c), None);
    }
}
