use std::path::Path;

use crate::config::RenderConfig;
use crate::foundation::core::{Extent, Rgba8};
use crate::foundation::error::{StripError, StripResult};

/// Measures and rasterizes single-style text.
///
/// A measurement of text containing `\n` stacks its segments: the height is the face's
/// line height per segment plus `line_spacing` between segments. A measurement never fails.
pub trait TextFace {
    fn measure(&mut self, text: &str, line_spacing: u32) -> Extent;

    /// Rasterize `text` onto an opaque-or-`bg` strip exactly [`TextFace::measure`] in size
    /// (clamped to at least 1x1).
    fn render_line(
        &mut self,
        text: &str,
        line_spacing: u32,
        fg: Rgba8,
        bg: Rgba8,
    ) -> StripResult<image::RgbaImage>;
}

impl<F: TextFace + ?Sized> TextFace for &mut F {
    fn measure(&mut self, text: &str, line_spacing: u32) -> Extent {
        (**self).measure(text, line_spacing)
    }

    fn render_line(
        &mut self,
        text: &str,
        line_spacing: u32,
        fg: Rgba8,
        bg: Rgba8,
    ) -> StripResult<image::RgbaImage> {
        (**self).render_line(text, line_spacing, fg, bg)
    }
}

fn stacked_height(segments: u32, line_height: u32, line_spacing: u32) -> u32 {
    let n = segments.max(1);
    line_height * n + line_spacing * (n - 1)
}

/// Face with a fixed advance per character and solid box glyphs.
///
/// Layout against it is exact integer arithmetic, which makes it useful wherever pixel
/// positions must be predictable without a font file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockFace {
    pub advance_px: u32,
    pub line_height_px: u32,
}

impl BlockFace {
    pub fn new(advance_px: u32, line_height_px: u32) -> Self {
        Self {
            advance_px,
            line_height_px,
        }
    }
}

impl TextFace for BlockFace {
    fn measure(&mut self, text: &str, line_spacing: u32) -> Extent {
        let width = text
            .split('\n')
            .map(|seg| seg.chars().count() as u32 * self.advance_px)
            .max()
            .unwrap_or(0);
        let segments = text.split('\n').count() as u32;
        Extent::new(
            width,
            stacked_height(segments, self.line_height_px, line_spacing),
        )
    }

    fn render_line(
        &mut self,
        text: &str,
        line_spacing: u32,
        fg: Rgba8,
        bg: Rgba8,
    ) -> StripResult<image::RgbaImage> {
        let size = self.measure(text, line_spacing).renderable();
        let mut out = image::RgbaImage::from_pixel(size.width, size.height, bg.to_pixel());
        let glyph_w = self.advance_px.saturating_sub(1);
        for (row, seg) in text.split('\n').enumerate() {
            let top = row as u32 * (self.line_height_px + line_spacing);
            for (col, ch) in seg.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let left = col as u32 * self.advance_px;
                for y in top..(top + self.line_height_px).min(size.height) {
                    for x in left..(left + glyph_w).min(size.width) {
                        out.put_pixel(x, y, fg.to_pixel());
                    }
                }
            }
        }
        Ok(out)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layouts.
struct TextBrushRgba8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// Face backed by a TrueType/OpenType font: Parley shapes and measures, `vello_cpu`
/// rasterizes the glyphs.
pub struct ParleyFace {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    size_px: f32,
    line_height_px: u32,
}

impl ParleyFace {
    /// Register `font_bytes` and prepare a face at `size_px`.
    ///
    /// Any failure here is a [`StripError::FontUnavailable`].
    pub fn from_bytes(font_bytes: Vec<u8>, size_px: f32) -> StripResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StripError::font_unavailable(
                "font size must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StripError::font_unavailable("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StripError::font_unavailable("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        let mut face = Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            size_px,
            line_height_px: 1,
        };
        let probe = face.layout("Ag");
        face.line_height_px = (probe.height().ceil() as u32).max(1);
        Ok(face)
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn line_height_px(&self) -> u32 {
        self.line_height_px
    }

    fn layout(&mut self, text: &str) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 255,
        }));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        layout
    }
}

impl TextFace for ParleyFace {
    fn measure(&mut self, text: &str, line_spacing: u32) -> Extent {
        let mut width = 0u32;
        let mut segments = 0u32;
        for seg in text.split('\n') {
            segments += 1;
            if !seg.is_empty() {
                width = width.max(self.layout(seg).width().ceil() as u32);
            }
        }
        Extent::new(
            width,
            stacked_height(segments, self.line_height_px, line_spacing),
        )
    }

    fn render_line(
        &mut self,
        text: &str,
        line_spacing: u32,
        fg: Rgba8,
        bg: Rgba8,
    ) -> StripResult<image::RgbaImage> {
        let size = self.measure(text, line_spacing).renderable();
        let w: u16 = size
            .width
            .try_into()
            .map_err(|_| StripError::render("text strip width exceeds u16"))?;
        let h: u16 = size
            .height
            .try_into()
            .map_err(|_| StripError::render("text strip height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w as f64, h as f64));

        let pitch = f64::from(self.line_height_px + line_spacing);
        for (row, seg) in text.split('\n').enumerate() {
            if seg.is_empty() {
                continue;
            }
            let layout = self.layout(seg);
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((0.0, row as f64 * pitch)));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(fg.r, fg.g, fg.b, fg.a));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&self.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let mut rgba = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba);
        image::RgbaImage::from_raw(size.width, size.height, rgba)
            .ok_or_else(|| StripError::render("text strip byte len mismatch"))
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// The three faces a page needs: dialog body, header title, and header meta.
pub struct FontSet<F = ParleyFace> {
    pub body: F,
    pub title: F,
    pub meta: F,
}

impl FontSet<ParleyFace> {
    /// Load one font file at the three configured sizes.
    ///
    /// Call this before any render; a missing or unreadable font is fatal.
    pub fn load(path: &Path, config: &RenderConfig) -> StripResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StripError::font_unavailable(format!("failed to read font '{}': {e}", path.display()))
        })?;
        let face = |size_px: f32| ParleyFace::from_bytes(bytes.clone(), size_px);
        let set = Self {
            body: face(config.body_font_px)?,
            title: face(config.title_font_px)?,
            meta: face(config.meta_font_px)?,
        };
        tracing::debug!(
            family = set.body.family_name(),
            path = %path.display(),
            "loaded fonts"
        );
        Ok(set)
    }
}

impl<F: Clone> FontSet<F> {
    /// Use the same face for body, title, and meta text.
    pub fn uniform(face: F) -> Self {
        Self {
            body: face.clone(),
            title: face.clone(),
            meta: face,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_face_measures_chars_and_stacks_lines() {
        let mut face = BlockFace::new(6, 14);
        assert_eq!(face.measure("abc", 2), Extent::new(18, 14));
        assert_eq!(face.measure("", 2), Extent::new(0, 14));
        assert_eq!(face.measure("ab\nabcd", 2), Extent::new(24, 30));
    }

    #[test]
    fn block_face_render_paints_glyph_boxes_only() {
        let mut face = BlockFace::new(4, 5);
        let img = face
            .render_line("a b", 0, Rgba8::BLACK, Rgba8::WHITE)
            .unwrap();
        assert_eq!(img.dimensions(), (12, 5));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(5, 2).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(8, 4).0, [0, 0, 0, 255]);
    }

    #[test]
    fn block_face_empty_render_is_one_pixel_wide() {
        let mut face = BlockFace::new(4, 5);
        let img = face.render_line("", 0, Rgba8::BLACK, Rgba8::WHITE).unwrap();
        assert_eq!(img.dimensions(), (1, 5));
    }

    #[test]
    fn unpremultiply_restores_straight_color() {
        let mut px = [64u8, 0, 128, 128];
        unpremultiply_rgba8_in_place(&mut px);
        assert_eq!(px, [128, 0, 255, 128]);
    }

    fn dejavu_bold(size_px: f32) -> ParleyFace {
        let bytes = std::fs::read("tests/data/fonts/DejaVuSans-Bold.ttf").unwrap();
        ParleyFace::from_bytes(bytes, size_px).unwrap()
    }

    #[test]
    fn parley_face_measures_with_fixed_line_height() {
        let mut face = dejavu_bold(12.0);
        assert!(!face.family_name().trim().is_empty());
        let lh = face.line_height_px();
        assert!((10..=20).contains(&lh), "line height {lh}");

        let one = face.measure("hello world", 2);
        assert_eq!(one.height, lh);
        assert!(one.width > 40 && one.width < 111, "width {}", one.width);
        assert!(face.measure("hello", 2).width < one.width);
        assert_eq!(face.measure("", 2), Extent::new(0, lh));
        assert_eq!(face.measure("hi\nthere", 2).height, 2 * lh + 2);
    }

    #[test]
    fn parley_face_renders_dark_glyphs_on_opaque_strip() {
        let mut face = dejavu_bold(12.0);
        let extent = face.measure("hello", 2);
        let img = face
            .render_line("hello", 2, Rgba8::BLACK, Rgba8::WHITE)
            .unwrap();
        assert_eq!(img.dimensions(), (extent.width, extent.height));
        assert!(img.pixels().all(|p| p.0[3] == 255));

        let dark = img.pixels().filter(|p| p.0[0] < 128).count();
        assert!(dark > 20, "only {dark} dark pixels");
        assert!(dark < (extent.width * extent.height) as usize / 2);
    }

    #[test]
    fn font_set_loads_three_sizes() {
        let set = FontSet::load(
            Path::new("tests/data/fonts/DejaVuSans-Bold.ttf"),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(set.body.size_px(), 12.0);
        assert_eq!(set.title.size_px(), 16.0);
        assert!(set.title.line_height_px() > set.meta.line_height_px());
    }

    #[test]
    fn missing_font_file_is_font_unavailable() {
        let err = FontSet::load(
            Path::new("definitely/not/here.ttf"),
            &RenderConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, StripError::FontUnavailable(_)));
    }

    #[test]
    fn garbage_font_bytes_are_font_unavailable() {
        let err = ParleyFace::from_bytes(b"not a font".to_vec(), 12.0).err().unwrap();
        assert!(matches!(err, StripError::FontUnavailable(_)));
    }
}
