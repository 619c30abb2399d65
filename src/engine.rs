use std::sync::Arc;

use crate::{
    assets::{AssetLoader, FontCache, SourceImage},
    foundation::error::{Error, Result},
    frame::{self, FrameLayout, stamp},
    lut::LutStore,
    noise::{Mulberry32, NoiseField},
    preset::{self, FrameKind},
    stages::{bloom, effects},
};

/// Default generator seed, so identical requests reproduce byte-identical
/// output without the caller choosing one.
pub const DEFAULT_SEED: u32 = 1337;

/// Caller-tunable knobs of one render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderOptions {
    /// Preset id from the catalog.
    pub preset: String,
    /// Literal timestamp text, e.g. `"26 01 03"`. Drawn only when the
    /// preset's date stamp is enabled.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Literal caption text; drawn only on bordered frames.
    #[serde(default)]
    pub caption: Option<String>,
    /// Seed for grain and dust placement.
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Output scale factor applied to the source before grading.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_seed() -> u32 {
    DEFAULT_SEED
}

fn default_scale() -> f32 {
    1.0
}

impl RenderOptions {
    pub fn new(preset: impl Into<String>) -> Self {
        Self {
            preset: preset.into(),
            timestamp: None,
            caption: None,
            seed: DEFAULT_SEED,
            scale: 1.0,
        }
    }
}

/// Finished render: straight RGBA8, row-major, tightly packed.
#[derive(Clone, Debug)]
pub struct RenderResult {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// True when the preset references a LUT that could not be loaded and
    /// the render fell back to identity color mapping.
    pub lut_degraded: bool,
}

impl RenderResult {
    /// Bridge to the `image` crate so callers can encode the buffer.
    pub fn to_image(&self) -> Result<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| Error::validation("render buffer does not match its dimensions"))
    }
}

/// Render orchestrator. Owns the LUT cache and font cache; cheap to share
/// behind an `Arc` across concurrent renders.
pub struct Engine {
    luts: LutStore,
    fonts: FontCache,
}

impl Engine {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            luts: LutStore::new(loader.clone()),
            fonts: FontCache::new(loader),
        }
    }

    /// Decode an encoded source image, then render it.
    pub fn render_bytes(&self, encoded: &[u8], options: &RenderOptions) -> Result<RenderResult> {
        let source = crate::assets::decode_source(encoded)?;
        self.render(&source, options)
    }

    /// Run one full render: preset resolution, optional LUT load (degrades
    /// to identity on failure), the per-pixel grade, halation, then frame
    /// and text compositing.
    #[tracing::instrument(skip_all, fields(preset = %options.preset, seed = options.seed))]
    pub fn render(&self, source: &SourceImage, options: &RenderOptions) -> Result<RenderResult> {
        let preset = preset::preset_for(&options.preset)?;

        let (region_w, region_h, mut region) = scaled_region(source, options.scale)?;
        let layout = FrameLayout::compute(region_w, region_h, &preset.frame)?;

        let mut lut_degraded = false;
        let lut = match preset.lut {
            None => None,
            Some(reference) => match self.luts.load(reference) {
                Ok(lut) => Some(lut),
                Err(err) => {
                    tracing::warn!(reference, error = %err, "lut unavailable, using identity mapping");
                    lut_degraded = true;
                    None
                }
            },
        };

        tracing::debug!(width = region_w, height = region_h, "processing pixels");
        let mut rng = Mulberry32::new(options.seed);
        let field = NoiseField::fill(&mut rng);
        effects::grade_in_place(
            &mut region,
            region_w,
            region_h,
            preset,
            lut.as_deref(),
            &field,
            &mut rng,
        );

        tracing::debug!("compositing");
        bloom::apply_halation(&mut region, region_w, region_h, preset.halation)?;

        let mut canvas = vec![0u8; layout.canvas_len()];
        frame::paint_background(&mut canvas, &layout, &preset.frame);
        frame::blit_image(&mut canvas, &layout, &region)?;

        if preset.date_stamp.enabled
            && let Some(timestamp) = options.timestamp.as_deref()
        {
            self.overlay_text(preset.date_stamp.font.source, |bytes| {
                stamp::draw_date_stamp(&mut canvas, &layout, &preset.date_stamp, timestamp, bytes)
            })?;
        }

        if let FrameKind::Bordered(border) = &preset.frame
            && let Some(caption) = options.caption.as_deref()
        {
            self.overlay_text(border.caption_font.source, |bytes| {
                stamp::draw_caption(&mut canvas, &layout, border, caption, bytes)
            })?;
        }

        Ok(RenderResult {
            width: layout.out_width,
            height: layout.out_height,
            data: canvas,
            lut_degraded,
        })
    }

    /// Fetch a font and run a text overlay with it. Missing fonts and
    /// shaping failures degrade to a skipped overlay; only an unusable
    /// raster surface is fatal.
    fn overlay_text<F>(&self, font_source: &str, draw: F) -> Result<()>
    where
        F: FnOnce(&[u8]) -> Result<()>,
    {
        match self.fonts.get(font_source) {
            Ok(bytes) => match draw(&bytes) {
                Err(err @ Error::ContextUnavailable(_)) => Err(err),
                Err(err) => {
                    tracing::warn!(font = font_source, error = %err, "text overlay skipped");
                    Ok(())
                }
                Ok(()) => Ok(()),
            },
            Err(err) => {
                tracing::warn!(
                    font = font_source,
                    error = %err,
                    "text overlay font unavailable, skipped"
                );
                Ok(())
            }
        }
    }
}

/// Scale the source into the graded region. Identity scale reuses the
/// decoded buffer; anything else resamples bilinearly.
fn scaled_region(source: &SourceImage, scale: f32) -> Result<(u32, u32, Vec<u8>)> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::validation("scale must be finite and > 0"));
    }
    if scale == 1.0 {
        return Ok((source.width, source.height, source.rgba8.clone()));
    }

    let w = ((source.width as f32) * scale).round().max(1.0) as u32;
    let h = ((source.height as f32) * scale).round().max(1.0) as u32;
    let img =
        image::RgbaImage::from_raw(source.width, source.height, source.rgba8.clone())
            .ok_or_else(|| Error::validation("source buffer does not match its dimensions"))?;
    let resized = image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle);
    Ok((w, h, resized.into_raw()))
}
