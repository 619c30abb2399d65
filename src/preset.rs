use crate::foundation::error::{Error, Result};

/// One stylistic look: tone curve, film effects, frame and stamp styling.
///
/// Presets are immutable `const` data; [`preset_for`] hands out `'static`
/// references and nothing mutates the catalog after process start.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FilterPreset {
    /// Stable symbolic id (`"ek80"`, `"aesthetic400"`).
    pub id: &'static str,
    /// Human-readable name shown by preset pickers.
    pub name: &'static str,
    /// Loader reference of a 512x512 packed 3-D LUT bitmap. `None` means
    /// identity color mapping.
    pub lut: Option<&'static str>,

    /// Exposure gain, -1..=1.
    pub exposure: f32,
    /// Contrast about the 128 midpoint, 0.5..=1.5.
    pub contrast: f32,
    /// Saturation about luma, 0..=2.
    pub saturation: f32,
    /// Warm/cool cast, -1..=1.
    pub warmth: f32,
    /// Green/magenta cast, -1..=1.
    pub tint: f32,
    /// Lifted-black fade, 0..=1.
    pub fade: f32,

    /// Bloom strength, 0..=1.
    pub halation: f32,
    /// Film grain strength, 0..=1.
    pub grain: f32,
    /// Dust speck density, 0..=1.
    pub dust: f32,
    /// Edge darkening strength, 0..=1.
    pub vignette: f32,
    /// Diagonal light-leak strength, 0..=1.
    pub light_leak: f32,

    /// Output frame style.
    pub frame: FrameKind,
    /// Timestamp overlay styling.
    pub date_stamp: DateStamp,
}

/// Frame style of the output canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum FrameKind {
    /// Graded image fills the canvas.
    None,
    /// Paper border around the image, with room for a caption.
    Bordered(BorderSpec),
}

/// Border geometry and paper styling for [`FrameKind::Bordered`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BorderSpec {
    pub padding_top: u32,
    pub padding_sides: u32,
    pub padding_bottom: u32,
    /// Paper gradient color at the top edge.
    pub paper_top: [u8; 3],
    /// Paper gradient color at the bottom edge.
    pub paper_bottom: [u8; 3],
    pub caption_font: FontSpec,
    pub caption_color: [u8; 3],
}

/// Timestamp overlay configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DateStamp {
    pub enabled: bool,
    pub anchor: StampAnchor,
    pub color: [u8; 3],
    pub font: FontSpec,
    /// Extra advance inserted between characters, in pixels.
    pub letter_spacing_px: f32,
    /// Literal text prepended to the caller's timestamp.
    pub prefix: &'static str,
}

/// Where the timestamp lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum StampAnchor {
    /// Bottom-left of the image area, with a soft drop shadow.
    Corner,
    /// Centered above the image area.
    CenteredTop,
}

/// Font reference plus pixel size. `source` resolves to raw font bytes via
/// the engine's injected loader.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FontSpec {
    pub source: &'static str,
    pub size_px: f32,
}

const EK80: FilterPreset = FilterPreset {
    id: "ek80",
    name: "EK 80",
    lut: Some("luts/fimo-ek80.png"),
    exposure: 0.06,
    contrast: 1.12,
    saturation: 1.10,
    warmth: 0.12,
    tint: -0.04,
    fade: 0.10,
    halation: 0.22,
    grain: 0.35,
    dust: 0.20,
    vignette: 0.55,
    light_leak: 0.0,
    frame: FrameKind::None,
    date_stamp: DateStamp {
        enabled: true,
        anchor: StampAnchor::Corner,
        color: [0xFF, 0x9B, 0x1A],
        font: FontSpec {
            source: "fonts/stamp-mono.ttf",
            size_px: 12.0,
        },
        letter_spacing_px: 1.2,
        prefix: "' ",
    },
};

const AESTHETIC400: FilterPreset = FilterPreset {
    id: "aesthetic400",
    name: "Aesthetic 400",
    lut: Some("luts/fimo-a400.png"),
    exposure: 0.10,
    contrast: 0.92,
    saturation: 0.78,
    warmth: 0.08,
    tint: 0.02,
    fade: 0.22,
    halation: 0.12,
    grain: 0.26,
    dust: 0.28,
    vignette: 0.30,
    light_leak: 0.35,
    frame: FrameKind::Bordered(BorderSpec {
        padding_top: 34,
        padding_sides: 26,
        padding_bottom: 72,
        paper_top: [0xFB, 0xFB, 0xFB],
        paper_bottom: [0xF1, 0xF1, 0xF1],
        caption_font: FontSpec {
            source: "fonts/caption-hand.ttf",
            size_px: 26.0,
        },
        caption_color: [0x2A, 0x2A, 0x2A],
    }),
    date_stamp: DateStamp {
        enabled: true,
        anchor: StampAnchor::CenteredTop,
        color: [0x1B, 0x1B, 0x1B],
        font: FontSpec {
            source: "fonts/stamp-mono.ttf",
            size_px: 14.0,
        },
        letter_spacing_px: 6.0,
        prefix: "",
    },
};

static CATALOG: [FilterPreset; 2] = [EK80, AESTHETIC400];

/// All registered presets, in catalog order.
pub fn presets() -> &'static [FilterPreset] {
    &CATALOG
}

/// Resolve a preset by id.
pub fn preset_for(id: &str) -> Result<&'static FilterPreset> {
    CATALOG
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::unknown_preset(id))
}

impl BorderSpec {
    pub(crate) fn paddings(&self) -> (u32, u32, u32) {
        (self.padding_top, self.padding_sides, self.padding_bottom)
    }
}

/// All-neutral preset: identity tone, no effects, no frame, no stamp.
#[cfg(test)]
pub(crate) fn neutral_test_preset() -> FilterPreset {
    FilterPreset {
        id: "neutral",
        name: "Neutral",
        lut: None,
        exposure: 0.0,
        contrast: 1.0,
        saturation: 1.0,
        warmth: 0.0,
        tint: 0.0,
        fade: 0.0,
        halation: 0.0,
        grain: 0.0,
        dust: 0.0,
        vignette: 0.0,
        light_leak: 0.0,
        frame: FrameKind::None,
        date_stamp: DateStamp {
            enabled: false,
            anchor: StampAnchor::Corner,
            color: [0, 0, 0],
            font: FontSpec {
                source: "fonts/stamp-mono.ttf",
                size_px: 12.0,
            },
            letter_spacing_px: 0.0,
            prefix: "",
        },
    }
}
