use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    assets::{AssetLoader, lock_unpoisoned},
    foundation::error::{Error, Result},
    foundation::math::lerp,
};

/// Cube edge length of the packed 3-D table.
const CUBE: u32 = 16;

/// Decoded 3-D color table stored as a flat 2-D pixel grid.
///
/// Logically a 16x16x16 cube packed as 16 tiles of 16x16 cells; the
/// canonical bitmap is 512x512. Shared read-only across renders via `Arc`.
#[derive(Clone, Debug)]
pub struct LutImage {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl LutImage {
    /// Validate a decoded bitmap as a packed LUT.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> Result<Self> {
        if width == 0 || width != height {
            return Err(Error::lut_load("lut bitmap must be square"));
        }
        if width % CUBE != 0 {
            return Err(Error::lut_load("lut bitmap width must be divisible by 16"));
        }
        if rgba8.len() != (width as usize) * (height as usize) * 4 {
            return Err(Error::lut_load("lut bitmap byte length mismatch"));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Color of one cube corner, addressed by quantized (r, g, b) indices.
    fn corner(&self, ri: u32, gi: u32, bi: u32) -> [f32; 3] {
        let tile = (self.width / CUBE) as f32;
        let cell = tile / CUBE as f32;

        let tile_x = (bi % CUBE) as f32;
        let tile_y = (bi / CUBE) as f32;

        // Sample the center of the cell.
        let x = tile_x * tile + ri as f32 * cell + cell * 0.5;
        let y = tile_y * tile + gi as f32 * cell + cell * 0.5;

        let ix = (x as u32).min(self.width - 1);
        let iy = (y as u32).min(self.height - 1);
        let idx = (iy * self.width + ix) as usize * 4;

        [
            f32::from(self.rgba8[idx]),
            f32::from(self.rgba8[idx + 1]),
            f32::from(self.rgba8[idx + 2]),
        ]
    }
}

/// Trilinear lookup. Inputs are clamped to [0, 255]; outputs are the
/// interpolated table colors, still float-valued.
pub fn sample(lut: &LutImage, r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max_index = (CUBE - 1) as f32;
    let r_pos = (r.clamp(0.0, 255.0) / 255.0) * max_index;
    let g_pos = (g.clamp(0.0, 255.0) / 255.0) * max_index;
    let b_pos = (b.clamp(0.0, 255.0) / 255.0) * max_index;

    let r0 = r_pos.floor() as u32;
    let g0 = g_pos.floor() as u32;
    let b0 = b_pos.floor() as u32;
    let r1 = (r0 + 1).min(CUBE - 1);
    let g1 = (g0 + 1).min(CUBE - 1);
    let b1 = (b0 + 1).min(CUBE - 1);

    let fr = r_pos - r0 as f32;
    let fg = g_pos - g0 as f32;
    let fb = b_pos - b0 as f32;

    let mix = |a: [f32; 3], b: [f32; 3], t: f32| -> [f32; 3] {
        [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
    };

    // Interpolate along R, then G, then B.
    let c00 = mix(lut.corner(r0, g0, b0), lut.corner(r1, g0, b0), fr);
    let c10 = mix(lut.corner(r0, g1, b0), lut.corner(r1, g1, b0), fr);
    let c01 = mix(lut.corner(r0, g0, b1), lut.corner(r1, g0, b1), fr);
    let c11 = mix(lut.corner(r0, g1, b1), lut.corner(r1, g1, b1), fr);

    let c0 = mix(c00, c10, fg);
    let c1 = mix(c01, c11, fg);

    let out = mix(c0, c1, fb);
    (out[0], out[1], out[2])
}

/// Process-wide LUT cache keyed by loader reference.
///
/// Entries are inserted at most once and never evicted; the catalog is small
/// and fixed. Concurrent first-time loads may both decode, but decoding is
/// deterministic so they converge on identical data.
pub struct LutStore {
    loader: Arc<dyn AssetLoader>,
    cache: Mutex<HashMap<String, Arc<LutImage>>>,
}

impl LutStore {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch, decode and cache the LUT behind `reference`.
    pub fn load(&self, reference: &str) -> Result<Arc<LutImage>> {
        if let Some(lut) = lock_unpoisoned(&self.cache).get(reference) {
            return Ok(lut.clone());
        }

        let bytes = self
            .loader
            .fetch(reference)
            .map_err(|e| Error::lut_load(format!("fetch '{reference}': {e:#}")))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| Error::lut_load(format!("decode '{reference}': {e}")))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let lut = Arc::new(LutImage::from_rgba8(width, height, decoded.into_raw())?);

        tracing::debug!(reference, width, "lut decoded and cached");

        let mut cache = lock_unpoisoned(&self.cache);
        let entry = cache
            .entry(reference.to_string())
            .or_insert_with(|| lut.clone());
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity LUT: tile for blue index `b` holds cells whose color is
    /// exactly the quantized (r, g, b) corner value.
    fn identity_lut() -> LutImage {
        let width = 512u32;
        let mut rgba8 = vec![0u8; (width * width * 4) as usize];
        let tile = width / CUBE; // 32
        let cell = tile / CUBE; // 2
        for bi in 0..CUBE {
            for gi in 0..CUBE {
                for ri in 0..CUBE {
                    let x0 = (bi % CUBE) * tile + ri * cell;
                    let y0 = (bi / CUBE) * tile + gi * cell;
                    for dy in 0..cell {
                        for dx in 0..cell {
                            let idx = (((y0 + dy) * width + x0 + dx) * 4) as usize;
                            rgba8[idx] = (ri * 17) as u8;
                            rgba8[idx + 1] = (gi * 17) as u8;
                            rgba8[idx + 2] = (bi * 17) as u8;
                            rgba8[idx + 3] = 255;
                        }
                    }
                }
            }
        }
        LutImage::from_rgba8(width, width, rgba8).unwrap()
    }

    #[test]
    fn from_rgba8_validates_layout() {
        assert!(LutImage::from_rgba8(512, 512, vec![0; 512 * 512 * 4]).is_ok());
        assert!(LutImage::from_rgba8(512, 256, vec![0; 512 * 256 * 4]).is_err());
        assert!(LutImage::from_rgba8(100, 100, vec![0; 100 * 100 * 4]).is_err());
        assert!(LutImage::from_rgba8(512, 512, vec![0; 16]).is_err());
    }

    #[test]
    fn identity_lut_samples_close_to_input() {
        let lut = identity_lut();
        for &(r, g, b) in &[
            (0.0, 0.0, 0.0),
            (255.0, 255.0, 255.0),
            (128.0, 128.0, 128.0),
            (17.0, 204.0, 68.0),
            (12.5, 99.9, 240.1),
        ] {
            let (or, og, ob) = sample(&lut, r, g, b);
            assert!((or - r).abs() <= 1.0, "r: {or} vs {r}");
            assert!((og - g).abs() <= 1.0, "g: {og} vs {g}");
            assert!((ob - b).abs() <= 1.0, "b: {ob} vs {b}");
        }
    }

    #[test]
    fn sample_clamps_out_of_range_input() {
        let lut = identity_lut();
        let (r, ..) = sample(&lut, 400.0, -20.0, 0.0);
        assert!((r - 255.0).abs() <= 1.0);
    }

    #[test]
    fn sample_interpolates_between_corners() {
        let lut = identity_lut();
        // Halfway between quantized steps along red.
        let (r0, ..) = sample(&lut, 0.0, 0.0, 0.0);
        let (r1, ..) = sample(&lut, 17.0, 0.0, 0.0);
        let (rm, ..) = sample(&lut, 8.5, 0.0, 0.0);
        assert!(rm > r0 && rm < r1);
    }
}
