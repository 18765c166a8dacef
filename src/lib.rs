//! Stripforge renders a structured comic strip into one raster image.
//!
//! A strip is a [`ComicDocument`]: a title header and one to three panels, each with a tiled
//! background, two characters, and a speech or thought balloon per character. Rendering is a
//! strictly bottom-up pipeline:
//!
//! 1. **Wrap**: dialog text is broken greedily into lines under a pixel width ([`wrap`]).
//! 2. **Balloon**: lines become a bordered box with background-sampled rounded corners and a
//!    tail ([`build_balloon`]).
//! 3. **Panel**: background, characters, and balloons are layered onto a
//!    [`LayeredCanvas`] ([`compose_panel`]).
//! 4. **Page**: panels are stitched under a title/author/date header ([`compose_page`]).
//!
//! Fetching the strip, parsing it, and downloading images happen elsewhere: the engine only
//! reads an already-populated document and an [`AssetStore`] of decoded rasters, and returns
//! the page without touching the filesystem. Styling is an immutable [`RenderConfig`] passed
//! to every stage.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod foundation;
mod model;
mod render;
mod text;

pub use assets::decode::decode_image;
pub use assets::store::AssetStore;
pub use config::RenderConfig;
pub use foundation::core::{Extent, Pos, Rgba8};
pub use foundation::error::{StripError, StripResult};
pub use model::{ComicDate, ComicDocument, DialogKind, DialogSide, MAX_PANELS, Panel, Side};
pub use render::balloon::{
    Balloon, BalloonRequest, balloon_position, balloon_size, build_balloon, tail_position,
};
pub use render::canvas::{LayeredCanvas, Painting, Sealed};
pub use render::composite::{blit, crop, fill_rect, over, overlay, tile};
pub use render::page::{compose_page, page_size};
pub use render::panel::{
    BalloonOverlapDetected, PanelRaster, TextAreaWidths, compose_panel, panel_size,
    sprite_position,
};
pub use render::pipeline::{RenderedComic, render_comic};
pub use text::face::{BlockFace, FontSet, ParleyFace, TextFace};
pub use text::wrap::{WrappedText, wrap};
