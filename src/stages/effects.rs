use crate::{
    foundation::math::{clamp255, luma_709},
    lut::{self, LutImage},
    noise::{Mulberry32, NoiseField},
    preset::FilterPreset,
    stages::tone,
};

/// Vignette multiplier at image coordinates, in [0, 1].
///
/// Distance is Euclidean in normalized [-1, 1] coordinates; the inner 0.2
/// radius is untouched.
pub fn vignette_factor(x: u32, y: u32, width: u32, height: u32, strength: f32) -> f32 {
    if strength <= 0.0 {
        return 1.0;
    }
    let nx = (x as f32 / width as f32) * 2.0 - 1.0;
    let ny = (y as f32 / height as f32) * 2.0 - 1.0;
    let d = (nx * nx + ny * ny).sqrt();
    (1.0 - strength * (d - 0.2).max(0.0)).clamp(0.0, 1.0)
}

/// Additive amber tint of the diagonal light-leak band.
pub fn leak_tint(x: u32, y: u32, width: u32, height: u32, amount: f32) -> (f32, f32, f32) {
    if amount <= 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let nx = x as f32 / width as f32;
    let ny = y as f32 / height as f32;
    let band = (nx * 0.85 + (1.0 - ny) * 0.55 - 0.75).max(0.0);
    let a = band * amount;
    (255.0 * a, 120.0 * a, 40.0 * a)
}

/// Run the full per-pixel grade over an owned RGBA8 region, row-major,
/// single pass: tone, LUT, vignette, light leak, grain, dust. Alpha is
/// untouched; channels clamp to [0, 255] only when written back.
///
/// `rng` must be the render's generator, already advanced past the
/// [`NoiseField`] fill, so dust draws land at reproducible stream positions.
pub fn grade_in_place(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    preset: &FilterPreset,
    lut: Option<&LutImage>,
    field: &NoiseField,
    rng: &mut Mulberry32,
) {
    let grain_amp = preset.grain * 18.0;
    let dust_threshold = 0.9992 - preset.dust * 0.0009;

    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) as usize * 4;
            let (mut r, mut g, mut b) = tone::adjust(
                f32::from(pixels[i]),
                f32::from(pixels[i + 1]),
                f32::from(pixels[i + 2]),
                preset,
            );

            if let Some(lut) = lut {
                (r, g, b) = lut::sample(lut, r, g, b);
            }

            let v = vignette_factor(x, y, width, height, preset.vignette);
            r *= v;
            g *= v;
            b *= v;

            let (lr, lg, lb) = leak_tint(x, y, width, height, preset.light_leak);
            r += lr;
            g += lg;
            b += lb;

            if preset.grain > 0.0 {
                let n = field.signed_at(x, y);
                let lum = luma_709(r, g, b);
                let grain = (lum / 255.0) * n * grain_amp;
                // Slight per-channel weighting for a faint chromatic cast.
                r += grain;
                g += grain * 0.95;
                b += grain * 1.05;
            }

            if preset.dust > 0.0 {
                let u = rng.next_unit();
                if u > dust_threshold {
                    let sign = if rng.next_unit() > 0.55 { 1.0 } else { -1.0 };
                    let strength = (0.25 + rng.next_unit() * 0.75) * 90.0 * preset.dust;
                    let speck = sign * strength;
                    r += speck;
                    g += speck;
                    b += speck;
                }
            }

            pixels[i] = clamp255(r);
            pixels[i + 1] = clamp255(g);
            pixels[i + 2] = clamp255(b);
        }
    }
}
