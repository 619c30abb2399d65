//! Patina is a deterministic vintage-photo rendering engine.
//!
//! One render turns a decoded photograph plus a named [`FilterPreset`] into
//! a styled RGBA buffer: color grade, film effects, optional paper frame
//! and date stamp.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: look the preset up in the fixed catalog
//! 2. **Prepare**: scale the decoded source; load the preset's 3-D LUT
//!    through the process-wide [`LutStore`] (a missing LUT degrades to
//!    identity mapping, it never fails the render)
//! 3. **Process**: one row-major per-pixel pass (tone adjustment, LUT
//!    sampling, vignette, light leak, grain, dust)
//! 4. **Composite**: halation bloom post-pass, then frame background,
//!    image placement, timestamp and caption overlays
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: identical (source, preset, options)
//!   produce byte-identical buffers; all randomness flows from one seeded
//!   counter-based generator.
//! - **No IO in the pipeline**: bytes enter through the injected
//!   [`AssetLoader`] and [`decode_source`]; the pixel stages are pure CPU.
//! - **Straight RGBA8 end-to-end**: the engine neither premultiplies nor
//!   encodes; callers own encoding and persistence.
#![forbid(unsafe_code)]

mod assets;
mod engine;
mod foundation;
mod frame;
mod lut;
mod noise;
mod preset;
mod raster;
mod stages;

pub use assets::{AssetLoader, DirLoader, SourceImage, decode_source, normalize_rel_path};
pub use engine::{DEFAULT_SEED, Engine, RenderOptions, RenderResult};
pub use foundation::error::{Error, Result};
pub use frame::{FrameLayout, blit_image, paint_background};
pub use lut::{LutImage, LutStore, sample as sample_lut};
pub use noise::{Mulberry32, NOISE_TILE, NoiseField};
pub use preset::{
    BorderSpec, DateStamp, FilterPreset, FontSpec, FrameKind, StampAnchor, preset_for, presets,
};
pub use raster::blur::gaussian_blur_rgba8;
pub use raster::composite::{overlay_premul_in_place, screen_blend_in_place};
pub use stages::bloom::apply_halation;
pub use stages::effects::{grade_in_place, leak_tint, vignette_factor};
pub use stages::tone::adjust as adjust_tone;
