use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{StripError, StripResult};

/// Immutable styling and geometry for one render.
///
/// Every compositor takes this by reference, so two renders with different
/// configs can run side by side without sharing state. All fields default to
/// the classic strip template; a JSON file only needs the fields it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub body_font_px: f32,
    pub title_font_px: f32,
    pub meta_font_px: f32,
    /// Extra pixels between lines of a multi-line measurement.
    pub line_spacing_px: u32,

    pub text_fg: Rgba8,
    pub text_bg: Rgba8,
    pub narration_bg: Rgba8,
    pub balloon_bg: Rgba8,
    pub balloon_border: Rgba8,
    pub comic_bg: Rgba8,

    /// Width budget for wrapping one side's dialog.
    pub text_area_px: u32,
    /// Combined text budget both sides are measured against when sizing a panel.
    pub text_area_allowance_px: u32,
    pub panel_base_width_px: u32,
    pub panel_height_px: u32,

    pub border_px: u32,
    pub balloon_margin_px: u32,
    pub balloon_border_px: u32,
    pub tail_gap_px: u32,
    pub tail_overlap_px: u32,
    pub corner_px: u32,

    pub header_band_px: u32,
    pub header_top_border_px: u32,
    /// Vertical offset of every panel on the page.
    pub panel_top_px: u32,
    pub title_pos: [u32; 2],
    /// Inset of the right-aligned meta block from the page's right edge.
    pub meta_right_inset_px: u32,
    pub meta_top_px: u32,

    pub corner_asset_key: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            body_font_px: 12.0,
            title_font_px: 16.0,
            meta_font_px: 12.0,
            line_spacing_px: 2,

            text_fg: Rgba8::BLACK,
            text_bg: Rgba8::WHITE,
            narration_bg: Rgba8::opaque(255, 255, 0),
            balloon_bg: Rgba8::WHITE,
            balloon_border: Rgba8::BLACK,
            comic_bg: Rgba8::BLACK,

            text_area_px: 111,
            text_area_allowance_px: 206,
            panel_base_width_px: 250,
            panel_height_px: 350,

            border_px: 7,
            balloon_margin_px: 6,
            balloon_border_px: 2,
            tail_gap_px: 18,
            tail_overlap_px: 2,
            corner_px: 6,

            header_band_px: 61,
            header_top_border_px: 7,
            panel_top_px: 54,
            title_pos: [10, 19],
            meta_right_inset_px: 10,
            meta_top_px: 12,

            corner_asset_key: "balloon/upperleftcorner".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_json_file(path: &Path) -> StripResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> StripResult<()> {
        for (name, px) in [
            ("body_font_px", self.body_font_px),
            ("title_font_px", self.title_font_px),
            ("meta_font_px", self.meta_font_px),
        ] {
            if !px.is_finite() || px <= 0.0 {
                return Err(StripError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if self.text_area_px == 0 {
            return Err(StripError::validation("text_area_px must be > 0"));
        }
        if self.panel_height_px == 0 {
            return Err(StripError::validation("panel_height_px must be > 0"));
        }
        if self.corner_px > self.balloon_margin_px {
            return Err(StripError::validation(
                "corner_px must not exceed balloon_margin_px",
            ));
        }
        if self.balloon_border_px > self.balloon_margin_px {
            return Err(StripError::validation(
                "balloon_border_px must not exceed balloon_margin_px",
            ));
        }
        Ok(())
    }

    /// Page width reserved for borders around and between panels (four borders).
    pub fn border_allowance_px(&self) -> u32 {
        self.border_px * 4
    }
}
