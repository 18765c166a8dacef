use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::decode_image;
use crate::foundation::error::{StripError, StripResult};

/// Extensions tried, in order, when an asset key names a file without one.
const KEY_EXTENSIONS: [&str; 2] = ["gif", "png"];

/// Decoded rasters addressed by asset key.
///
/// The store is filled by whoever fetched and decoded the images; renders only read from it.
#[derive(Clone, Debug, Default)]
pub struct AssetStore {
    images: BTreeMap<String, image::RgbaImage>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, image: image::RgbaImage) {
        self.images.insert(key.into(), image);
    }

    pub fn get(&self, key: &str) -> StripResult<&image::RgbaImage> {
        self.images
            .get(key)
            .ok_or_else(|| StripError::missing_asset(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.images.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    /// Load and decode every key from files under `root`.
    ///
    /// A key maps to `root/<key>`; when that file does not exist the `.gif` and `.png`
    /// variants are tried. A key with no file is reported as [`StripError::MissingAsset`].
    pub fn load_keys<I, S>(root: &Path, keys: I) -> StripResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for key in keys {
            let key = key.as_ref();
            if store.contains(key) {
                continue;
            }
            let base = key_path(root, key)?;
            let path = std::iter::once(base.clone())
                .chain(KEY_EXTENSIONS.iter().map(|ext| {
                    let mut p = base.clone().into_os_string();
                    p.push(".");
                    p.push(ext);
                    PathBuf::from(p)
                }))
                .find(|p| p.is_file())
                .ok_or_else(|| StripError::missing_asset(key))?;

            let bytes = std::fs::read(&path)
                .with_context(|| format!("read asset '{}'", path.display()))?;
            let image = decode_image(&bytes)
                .map_err(|e| anyhow::anyhow!("decode asset '{}': {e}", path.display()))?;
            tracing::debug!(key, path = %path.display(), w = image.width(), h = image.height(), "loaded asset");
            store.insert(key, image);
        }
        Ok(store)
    }
}

/// File path of `key` under `root`, without any extension fallback.
///
/// Keys are `/`-separated relative names such as `balloon/upperleftcorner`. Empty and `.`
/// segments are ignored; a leading `/`, a `..` segment, or a key with no name segment is
/// rejected so a document cannot read outside `root`.
fn key_path(root: &Path, key: &str) -> StripResult<PathBuf> {
    if key.starts_with('/') || key.starts_with('\\') {
        return Err(StripError::validation(format!(
            "asset key '{key}' must be relative"
        )));
    }
    let mut path = root.to_path_buf();
    let mut named = false;
    for segment in key.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(StripError::validation(format!(
                    "asset key '{key}' must not contain '..'"
                )));
            }
            name => {
                path.push(name);
                named = true;
            }
        }
    }
    if !named {
        return Err(StripError::validation(format!(
            "asset key '{key}' names no file"
        )));
    }
    Ok(path)
}
