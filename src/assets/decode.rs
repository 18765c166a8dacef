use anyhow::Context;

use crate::foundation::error::StripResult;

/// Decode any raster format the `image` crate understands into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> StripResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}
