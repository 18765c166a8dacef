//! Page assembly: header band above panels stitched left to right.

use image::RgbaImage;

use crate::config::RenderConfig;
use crate::foundation::core::{Extent, Pos};
use crate::foundation::error::StripResult;
use crate::model::ComicDocument;
use crate::render::composite;
use crate::render::panel::PanelRaster;
use crate::text::face::{FontSet, TextFace};

/// Page size for panels of the given widths.
pub fn page_size(panel_widths: impl IntoIterator<Item = u32>, config: &RenderConfig) -> Extent {
    let width = panel_widths.into_iter().sum::<u32>() + config.border_allowance_px();
    let height = config.panel_height_px + config.header_band_px + config.header_top_border_px;
    Extent::new(width, height)
}

/// Stitch `panels` under a header carrying the title, author, and date.
#[tracing::instrument(skip_all, fields(title = %doc.title, panels = panels.len()))]
pub fn compose_page<F: TextFace>(
    doc: &ComicDocument,
    panels: Vec<PanelRaster>,
    fonts: &mut FontSet<F>,
    config: &RenderConfig,
) -> StripResult<RgbaImage> {
    let size = page_size(panels.iter().map(PanelRaster::width), config).renderable();
    let mut page = RgbaImage::from_pixel(size.width, size.height, config.comic_bg.to_pixel());

    let fg = config.text_bg;
    let bg = config.comic_bg;
    let spacing = config.line_spacing_px;

    let title = fonts.title.render_line(&doc.title, spacing, fg, bg)?;
    let [tx, ty] = config.title_pos;
    composite::blit(&mut page, &title, Pos::new(tx.into(), ty.into()));

    let right_edge = i64::from(size.width) - i64::from(config.meta_right_inset_px);
    let mut y = i64::from(config.meta_top_px);
    for line in [format!("by {}", doc.author), doc.date.mdy()] {
        let extent = fonts.meta.measure(&line, spacing);
        let strip = fonts.meta.render_line(&line, spacing, fg, bg)?;
        composite::blit(
            &mut page,
            &strip,
            Pos::new(right_edge - i64::from(extent.width), y),
        );
        y += i64::from(extent.height);
    }

    let mut x = i64::from(config.border_px);
    let top = i64::from(config.panel_top_px);
    for panel in &panels {
        composite::blit(&mut page, &panel.image, Pos::new(x, top));
        x += i64::from(panel.width()) + i64::from(config.border_px);
    }

    tracing::debug!(w = size.width, h = size.height, "composed page");
    Ok(page)
}
