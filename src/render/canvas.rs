//! Two-phase panel canvas.
//!
//! Balloons fake rounded corners by copying the panel pixels they will cover, so those pixels
//! must be final before any balloon is built. [`LayeredCanvas<Painting>`] only accepts base
//! layers; [`LayeredCanvas::seal`] moves it to [`Sealed`], the only phase that can sample
//! regions and place balloons.

use std::marker::PhantomData;

use image::RgbaImage;

use crate::foundation::core::{Extent, Pos};
use crate::foundation::error::{StripError, StripResult};
use crate::render::composite;

/// Base layers (background, characters) are still being painted.
#[derive(Debug)]
pub struct Painting;

/// Base layers are final; regions may be sampled and balloons placed.
#[derive(Debug)]
pub struct Sealed;

#[derive(Debug)]
pub struct LayeredCanvas<Phase> {
    image: RgbaImage,
    background_painted: bool,
    sprites_painted: usize,
    _phase: PhantomData<Phase>,
}

impl<Phase> LayeredCanvas<Phase> {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn sprites_painted(&self) -> usize {
        self.sprites_painted
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl LayeredCanvas<Painting> {
    pub fn new(size: Extent) -> Self {
        let size = size.renderable();
        Self {
            image: RgbaImage::new(size.width, size.height),
            background_painted: false,
            sprites_painted: 0,
            _phase: PhantomData,
        }
    }

    /// Tile `tile` over the whole canvas from the top-left corner.
    pub fn paint_background(&mut self, tile: &RgbaImage) {
        composite::tile(&mut self.image, tile);
        self.background_painted = true;
    }

    /// Alpha-composite a sprite with its top-left corner at `at`.
    pub fn paint_sprite(&mut self, sprite: &RgbaImage, at: Pos) {
        composite::overlay(&mut self.image, sprite, at);
        self.sprites_painted += 1;
    }

    /// Freeze the base layers. Fails if no background was painted.
    pub fn seal(self) -> StripResult<LayeredCanvas<Sealed>> {
        if !self.background_painted {
            return Err(StripError::render(
                "panel canvas sealed before its background was painted",
            ));
        }
        Ok(LayeredCanvas {
            image: self.image,
            background_painted: true,
            sprites_painted: self.sprites_painted,
            _phase: PhantomData,
        })
    }
}

impl LayeredCanvas<Sealed> {
    /// Copy the `size` window at `at`; pixels off the canvas are transparent.
    pub fn sample(&self, at: Pos, size: Extent) -> RgbaImage {
        composite::crop(&self.image, at, size.width, size.height)
    }

    /// Copy a balloon onto the canvas, replacing what is underneath.
    pub fn place_opaque(&mut self, layer: &RgbaImage, at: Pos) {
        composite::blit(&mut self.image, layer, at);
    }

    /// Alpha-composite a layer such as a balloon tail.
    pub fn place_over(&mut self, layer: &RgbaImage, at: Pos) {
        composite::overlay(&mut self.image, layer, at);
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
