use crate::{foundation::math::luma_709, preset::FilterPreset};

/// Per-pixel tone adjustment, applied before LUT sampling.
///
/// Stage order is fixed because each step's output range feeds the next:
/// exposure, contrast, fade, saturation, then warmth/tint. Channels stay
/// float-valued and unclamped; clamping happens when the pixel is written.
pub fn adjust(r: f32, g: f32, b: f32, preset: &FilterPreset) -> (f32, f32, f32) {
    let gain = 1.0 + preset.exposure;
    let mut r = r * gain;
    let mut g = g * gain;
    let mut b = b * gain;

    let c = preset.contrast;
    r = (r - 128.0) * c + 128.0;
    g = (g - 128.0) * c + 128.0;
    b = (b - 128.0) * c + 128.0;

    if preset.fade > 0.0 {
        let f = preset.fade;
        // Blue takes a slightly higher lift target than red/green.
        r = r * (1.0 - f) + 255.0 * (f * 0.08);
        g = g * (1.0 - f) + 255.0 * (f * 0.08);
        b = b * (1.0 - f) + 255.0 * (f * 0.09);
    }

    let lum = luma_709(r, g, b);
    let s = preset.saturation;
    r = lum + (r - lum) * s;
    g = lum + (g - lum) * s;
    b = lum + (b - lum) * s;

    let w = preset.warmth * 18.0;
    let t = preset.tint * 14.0;
    r += w;
    b -= w * 0.9;
    g += t;

    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{FilterPreset, neutral_test_preset as neutral};

    #[test]
    fn neutral_preset_is_identity() {
        let p = neutral();
        for &(r, g, b) in &[(0.0, 0.0, 0.0), (128.0, 64.0, 200.0), (255.0, 255.0, 255.0)] {
            let (or, og, ob) = adjust(r, g, b, &p);
            assert!((or - r).abs() < 1e-3);
            assert!((og - g).abs() < 1e-3);
            assert!((ob - b).abs() < 1e-3);
        }
    }

    #[test]
    fn exposure_scales_all_channels() {
        let p = FilterPreset {
            exposure: 0.5,
            ..neutral()
        };
        let (r, g, b) = adjust(100.0, 100.0, 100.0, &p);
        assert!((r - 150.0).abs() < 1e-3);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn contrast_pivots_around_midpoint() {
        let p = FilterPreset {
            contrast: 1.5,
            ..neutral()
        };
        let (mid, ..) = adjust(128.0, 128.0, 128.0, &p);
        assert!((mid - 128.0).abs() < 1e-3);
        let (dark, ..) = adjust(64.0, 64.0, 64.0, &p);
        assert!(dark < 64.0);
        let (bright, ..) = adjust(192.0, 192.0, 192.0, &p);
        assert!(bright > 192.0);
    }

    #[test]
    fn fade_lifts_blacks_with_blue_bias() {
        let p = FilterPreset {
            fade: 0.5,
            ..neutral()
        };
        let (r, _, b) = adjust(0.0, 0.0, 0.0, &p);
        assert!(r > 0.0);
        assert!(b > r, "blue lift target is higher than red");
    }

    #[test]
    fn zero_saturation_collapses_to_luma() {
        let p = FilterPreset {
            saturation: 0.0,
            ..neutral()
        };
        let (r, g, b) = adjust(250.0, 10.0, 40.0, &p);
        assert!((r - g).abs() < 1e-3);
        assert!((g - b).abs() < 1e-3);
    }

    #[test]
    fn warmth_pushes_red_up_blue_down() {
        let p = FilterPreset {
            warmth: 1.0,
            ..neutral()
        };
        let (r, _, b) = adjust(100.0, 100.0, 100.0, &p);
        assert!((r - 118.0).abs() < 1e-3);
        assert!((b - (100.0 - 16.2)).abs() < 1e-3);
    }

    #[test]
    fn stage_does_not_clamp() {
        let p = FilterPreset {
            exposure: 1.0,
            ..neutral()
        };
        let (r, ..) = adjust(255.0, 255.0, 255.0, &p);
        assert!(r > 255.0);
    }
}
