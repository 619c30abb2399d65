use crate::{
    foundation::error::Result,
    raster::{blur, composite},
};

/// Halation post-pass: screen-composite a blurred copy of the processed
/// region back over itself at low opacity, approximating glow around bright
/// edges. Runs after the per-pixel loop because it needs neighborhood
/// access.
///
/// Blur choice: separable Gaussian, sigma `max(0.8, 2.2 * halation)`,
/// radius `ceil(2 * sigma)`.
pub fn apply_halation(pixels: &mut [u8], width: u32, height: u32, halation: f32) -> Result<()> {
    if halation <= 0.0 {
        return Ok(());
    }

    let sigma = (2.2 * halation).max(0.8);
    let radius = (2.0 * sigma).ceil() as u32;
    let blurred = blur::gaussian_blur_rgba8(pixels, width, height, radius, sigma)?;
    composite::screen_blend_in_place(pixels, &blurred, 0.18 * halation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> Vec<u8> {
        let mut px = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                px.extend_from_slice(&[v, v, v, 255]);
            }
        }
        px
    }

    #[test]
    fn zero_halation_is_noop() {
        let mut px = checker(8, 8);
        let before = px.clone();
        apply_halation(&mut px, 8, 8, 0.0).unwrap();
        assert_eq!(px, before);
    }

    #[test]
    fn halation_never_darkens_and_lifts_dark_neighbors() {
        let mut px = checker(8, 8);
        let before = px.clone();
        apply_halation(&mut px, 8, 8, 1.0).unwrap();
        for (after, orig) in px.chunks_exact(4).zip(before.chunks_exact(4)) {
            for c in 0..3 {
                assert!(after[c] >= orig[c]);
            }
        }
        // Dark pixels next to bright ones pick up glow.
        let dark_lifted = px
            .chunks_exact(4)
            .zip(before.chunks_exact(4))
            .any(|(after, orig)| orig[0] == 0 && after[0] > 0);
        assert!(dark_lifted);
    }

    #[test]
    fn halation_is_deterministic() {
        let mut a = checker(9, 7);
        let mut b = checker(9, 7);
        apply_halation(&mut a, 9, 7, 0.5).unwrap();
        apply_halation(&mut b, 9, 7, 0.5).unwrap();
        assert_eq!(a, b);
    }
}
