use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context;

use crate::foundation::error::{Error, Result};

/// Resolves an asset reference (LUT bitmap, font file) to raw bytes.
///
/// This is the engine's only IO seam. Implementations may block; callers
/// that need cancellation wrap the render in their own runtime.
pub trait AssetLoader: Send + Sync {
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>>;
}

/// Filesystem-backed loader rooted at a directory.
///
/// References are normalized relative paths; absolute paths and `..`
/// traversal are rejected.
#[derive(Clone, Debug)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for DirLoader {
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        let rel = normalize_rel_path(reference).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        let path = self.root.join(Path::new(&rel));
        std::fs::read(&path).with_context(|| format!("read asset bytes from '{}'", path.display()))
    }
}

/// Normalize and validate a loader-relative asset reference.
///
/// The result uses `/` separators and drops `.` segments. Absolute paths and
/// parent traversal (`..`) are rejected.
pub fn normalize_rel_path(reference: &str) -> Result<String> {
    let s = reference.replace('\\', "/");
    if s.starts_with('/') {
        return Err(Error::validation("asset references must be relative"));
    }
    if s.is_empty() {
        return Err(Error::validation("asset reference must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(Error::validation(
                "asset references must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(Error::validation(
            "asset reference must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Decoded source photograph in straight RGBA8, row-major, tightly packed.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl SourceImage {
    /// Wrap an already-decoded RGBA buffer, validating its length.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| Error::validation("source buffer size overflow"))?;
        if width == 0 || height == 0 {
            return Err(Error::validation("source image must be non-empty"));
        }
        if rgba8.len() != expected {
            return Err(Error::validation(
                "source buffer must match width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into a [`SourceImage`].
///
/// This is the fatal decode boundary of a render: failure here produces no
/// output.
pub fn decode_source(bytes: &[u8]) -> Result<SourceImage> {
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| Error::source_decode(e.to_string()))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::from_rgba8(width, height, rgba.into_raw())
}

/// Process-wide cache of fetched font bytes, keyed by loader reference.
pub(crate) struct FontCache {
    loader: Arc<dyn AssetLoader>,
    bytes_by_ref: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl FontCache {
    pub(crate) fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            bytes_by_ref: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn get(&self, reference: &str) -> anyhow::Result<Arc<Vec<u8>>> {
        if let Some(bytes) = lock_unpoisoned(&self.bytes_by_ref).get(reference) {
            return Ok(bytes.clone());
        }

        let fetched = Arc::new(self.loader.fetch(reference)?);
        let mut cache = lock_unpoisoned(&self.bytes_by_ref);
        let entry = cache
            .entry(reference.to_string())
            .or_insert_with(|| fetched.clone());
        Ok(entry.clone())
    }
}

/// Cache maps stay consistent across a panicked holder; recover the guard.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
