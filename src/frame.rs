pub mod stamp;

use crate::{
    foundation::error::{Error, Result},
    foundation::math::lerp,
    preset::{BorderSpec, FrameKind},
};

/// Output canvas geometry: where the graded image lands and how much paper
/// surrounds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    pub out_width: u32,
    pub out_height: u32,
    pub image_x: u32,
    pub image_y: u32,
    pub image_width: u32,
    pub image_height: u32,
}

impl FrameLayout {
    /// Compute the canvas for a graded region of `image_width` x
    /// `image_height` pixels. Paddings are zero unless the preset is
    /// bordered. The text overlay surface is capped at u16 dimensions, so
    /// oversized or empty canvases are rejected here, before any pixels are
    /// produced.
    pub fn compute(image_width: u32, image_height: u32, frame: &FrameKind) -> Result<Self> {
        let (pad_top, pad_sides, pad_bottom) = match frame {
            FrameKind::None => (0, 0, 0),
            FrameKind::Bordered(border) => border.paddings(),
        };

        let out_width = pad_sides
            .checked_mul(2)
            .and_then(|p| image_width.checked_add(p))
            .ok_or_else(|| Error::context_unavailable("canvas width overflow"))?;
        let out_height = image_height
            .checked_add(pad_top)
            .and_then(|h| h.checked_add(pad_bottom))
            .ok_or_else(|| Error::context_unavailable("canvas height overflow"))?;

        if image_width == 0 || image_height == 0 {
            return Err(Error::context_unavailable("canvas must be non-empty"));
        }
        if out_width > u32::from(u16::MAX) || out_height > u32::from(u16::MAX) {
            return Err(Error::context_unavailable(format!(
                "canvas {out_width}x{out_height} exceeds the raster surface limit"
            )));
        }

        Ok(Self {
            out_width,
            out_height,
            image_x: pad_sides,
            image_y: pad_top,
            image_width,
            image_height,
        })
    }

    pub fn canvas_len(&self) -> usize {
        self.out_width as usize * self.out_height as usize * 4
    }
}

/// Fill the canvas background: vertical paper gradient plus a faint inner
/// shadow under the image area when bordered, solid black otherwise.
pub fn paint_background(canvas: &mut [u8], layout: &FrameLayout, frame: &FrameKind) {
    match frame {
        FrameKind::None => {
            for px in canvas.chunks_exact_mut(4) {
                px.copy_from_slice(&[0, 0, 0, 255]);
            }
        }
        FrameKind::Bordered(border) => {
            paint_paper(canvas, layout, border);
            paint_inner_shadow(canvas, layout);
        }
    }
}

fn paint_paper(canvas: &mut [u8], layout: &FrameLayout, border: &BorderSpec) {
    let h = layout.out_height.max(2);
    for y in 0..layout.out_height {
        let t = y as f32 / (h - 1) as f32;
        let row = [
            lerp(f32::from(border.paper_top[0]), f32::from(border.paper_bottom[0]), t) as u8,
            lerp(f32::from(border.paper_top[1]), f32::from(border.paper_bottom[1]), t) as u8,
            lerp(f32::from(border.paper_top[2]), f32::from(border.paper_bottom[2]), t) as u8,
            255,
        ];
        let start = (y * layout.out_width) as usize * 4;
        let end = start + layout.out_width as usize * 4;
        for px in canvas[start..end].chunks_exact_mut(4) {
            px.copy_from_slice(&row);
        }
    }
}

/// Darken a rectangle 2px larger than the image area by 10%, the paper's
/// subtle inset shadow.
fn paint_inner_shadow(canvas: &mut [u8], layout: &FrameLayout) {
    let x0 = layout.image_x.saturating_sub(2);
    let y0 = layout.image_y.saturating_sub(2);
    let x1 = (layout.image_x + layout.image_width + 2).min(layout.out_width);
    let y1 = (layout.image_y + layout.image_height + 2).min(layout.out_height);

    for y in y0..y1 {
        for x in x0..x1 {
            let i = (y * layout.out_width + x) as usize * 4;
            for c in 0..3 {
                canvas[i + c] = ((u16::from(canvas[i + c]) * 230) / 255) as u8;
            }
        }
    }
}

/// Copy the graded region into the canvas at the layout's image origin.
pub fn blit_image(canvas: &mut [u8], layout: &FrameLayout, region: &[u8]) -> Result<()> {
    let expected = layout.image_width as usize * layout.image_height as usize * 4;
    if region.len() != expected || canvas.len() != layout.canvas_len() {
        return Err(Error::validation("blit buffer size mismatch"));
    }

    let row_bytes = (layout.image_width * 4) as usize;
    for y in 0..layout.image_height {
        let src_start = y as usize * row_bytes;
        let dst_start =
            ((layout.image_y + y) * layout.out_width + layout.image_x) as usize * 4;
        canvas[dst_start..dst_start + row_bytes]
            .copy_from_slice(&region[src_start..src_start + row_bytes]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::FontSpec;

    fn border(top: u32, sides: u32, bottom: u32) -> FrameKind {
        FrameKind::Bordered(BorderSpec {
            padding_top: top,
            padding_sides: sides,
            padding_bottom: bottom,
            paper_top: [0xFB, 0xFB, 0xFB],
            paper_bottom: [0xF1, 0xF1, 0xF1],
            caption_font: FontSpec {
                source: "fonts/caption-hand.ttf",
                size_px: 26.0,
            },
            caption_color: [0x2A, 0x2A, 0x2A],
        })
    }

    #[test]
    fn unframed_layout_matches_image() {
        let l = FrameLayout::compute(100, 80, &FrameKind::None).unwrap();
        assert_eq!((l.out_width, l.out_height), (100, 80));
        assert_eq!((l.image_x, l.image_y), (0, 0));
    }

    #[test]
    fn bordered_layout_adds_exact_paddings() {
        let l = FrameLayout::compute(50, 50, &border(34, 26, 72)).unwrap();
        assert_eq!(l.out_width, 50 + 2 * 26);
        assert_eq!(l.out_height, 50 + 34 + 72);
        assert_eq!((l.image_x, l.image_y), (26, 34));
    }

    #[test]
    fn oversized_and_empty_canvases_are_context_errors() {
        assert!(matches!(
            FrameLayout::compute(0, 10, &FrameKind::None),
            Err(Error::ContextUnavailable(_))
        ));
        assert!(matches!(
            FrameLayout::compute(70_000, 10, &FrameKind::None),
            Err(Error::ContextUnavailable(_))
        ));
    }

    #[test]
    fn background_black_when_unframed() {
        let l = FrameLayout::compute(2, 2, &FrameKind::None).unwrap();
        let mut canvas = vec![9u8; l.canvas_len()];
        paint_background(&mut canvas, &l, &FrameKind::None);
        assert!(canvas.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn paper_gradient_runs_top_to_bottom() {
        let frame = border(10, 10, 10);
        let l = FrameLayout::compute(4, 40, &frame).unwrap();
        let mut canvas = vec![0u8; l.canvas_len()];
        paint_background(&mut canvas, &l, &frame);
        let top = canvas[0];
        let bottom_row = ((l.out_height - 1) * l.out_width * 4) as usize;
        let bottom = canvas[bottom_row];
        assert_eq!(top, 0xFB);
        assert_eq!(bottom, 0xF1);
    }

    #[test]
    fn inner_shadow_darkens_under_image_area() {
        let frame = border(10, 10, 10);
        let l = FrameLayout::compute(4, 4, &frame).unwrap();
        let mut canvas = vec![0u8; l.canvas_len()];
        paint_background(&mut canvas, &l, &frame);
        // A paper pixel far from the image keeps its gradient value; one
        // inside the image rect is darker.
        let outside = ((l.out_width + 1) * 4) as usize;
        let inside = ((l.image_y * l.out_width + l.image_x) * 4) as usize;
        assert!(canvas[inside] < canvas[outside]);
    }

    #[test]
    fn blit_places_region_at_offsets() {
        let frame = border(3, 2, 1);
        let l = FrameLayout::compute(2, 2, &frame).unwrap();
        let mut canvas = vec![0u8; l.canvas_len()];
        let region = vec![200u8; 2 * 2 * 4];
        blit_image(&mut canvas, &l, &region).unwrap();
        let at = |x: u32, y: u32| canvas[((y * l.out_width + x) * 4) as usize];
        assert_eq!(at(l.image_x, l.image_y), 200);
        assert_eq!(at(l.image_x + 1, l.image_y + 1), 200);
        assert_eq!(at(0, 0), 0);
    }

    #[test]
    fn blit_rejects_mismatched_region() {
        let l = FrameLayout::compute(2, 2, &FrameKind::None).unwrap();
        let mut canvas = vec![0u8; l.canvas_len()];
        assert!(blit_image(&mut canvas, &l, &[0u8; 3]).is_err());
    }
}
