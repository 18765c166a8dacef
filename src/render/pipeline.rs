use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::assets::store::AssetStore;
use crate::config::RenderConfig;
use crate::foundation::error::StripResult;
use crate::model::ComicDocument;
use crate::render::page::compose_page;
use crate::render::panel::{BalloonOverlapDetected, compose_panel};
use crate::text::face::{FontSet, TextFace};

/// A finished page plus the name it should be saved under.
#[derive(Clone, Debug)]
pub struct RenderedComic {
    pub image: RgbaImage,
    pub file_name: String,
    pub overlaps: Vec<BalloonOverlapDetected>,
}

impl RenderedComic {
    /// Write the page as PNG into `dir` and return the full path.
    pub fn save_png(&self, dir: &Path) -> StripResult<PathBuf> {
        let path = dir.join(&self.file_name);
        self.image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(path)
    }
}

/// Render a whole strip: every panel, then the page around them.
///
/// Either the full page is produced or an error is returned; nothing partial escapes.
#[tracing::instrument(skip_all, fields(id = %doc.external_id, panels = doc.panels.len()))]
pub fn render_comic<F: TextFace>(
    doc: &ComicDocument,
    assets: &AssetStore,
    fonts: &mut FontSet<F>,
    config: &RenderConfig,
) -> StripResult<RenderedComic> {
    doc.validate()?;

    let mut panels = Vec::with_capacity(doc.panels.len());
    for (i, panel) in doc.panels.iter().enumerate() {
        panels.push(compose_panel(i, panel, assets, &mut fonts.body, config)?);
    }
    let overlaps: Vec<BalloonOverlapDetected> = panels.iter().filter_map(|p| p.overlap).collect();

    let image = compose_page(doc, panels, fonts, config)?;
    Ok(RenderedComic {
        image,
        file_name: doc.output_file_name(),
        overlaps,
    })
}
