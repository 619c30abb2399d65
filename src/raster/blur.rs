use crate::foundation::error::{Error, Result};

/// Separable Gaussian blur over straight RGBA8, clamp-to-edge.
///
/// Kernel weights are Q16 fixed-point so the result is bit-stable across
/// platforms. `radius == 0` returns the input unchanged.
pub fn gaussian_blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> Result<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| Error::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(Error::validation(
            "gaussian_blur_rgba8 expects src matching width*height*4",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    // Horizontal: step one pixel within a row; vertical: step one row.
    axis_pass(src, &mut tmp, width, height, &kernel, Axis::X);
    axis_pass(&tmp, &mut out, width, height, &kernel, Axis::Y);
    Ok(out)
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn axis_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: &[u32], axis: Axis) {
    let radius = (kernel.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    let (limit, stride) = match axis {
        Axis::X => (w, 1i64),
        Axis::Y => (h, w),
    };

    for y in 0..h {
        for x in 0..w {
            let along = match axis {
                Axis::X => x,
                Axis::Y => y,
            };
            let base = y * w + x;
            let mut acc = [0u64; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let offset = ki as i64 - radius;
                let clamped = (along + offset).clamp(0, limit - 1);
                let idx = ((base + (clamped - along) * stride) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = (base as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_round(acc[c]);
            }
        }
    }
}

/// Build normalized Q16 weights; the residual rounding error lands on the
/// center tap so the kernel sums to exactly 1<<16.
fn kernel_q16(radius: u32, sigma: f32) -> Result<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let adjusted = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = adjusted as u32;
    }

    Ok(weights)
}

fn q16_round(acc: u64) -> u8 {
    (((acc + 32768) >> 16).min(255)) as u8
}
