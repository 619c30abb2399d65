//! Timestamp and caption overlays.
//!
//! Text is drawn one character at a time with a manual advance so letter
//! spacing is exact; glyphs are shaped with Parley and rasterized through a
//! `vello_cpu` surface, then composited onto the opaque canvas.

use std::borrow::Cow;

use crate::{
    foundation::error::{Error, Result},
    frame::FrameLayout,
    preset::{BorderSpec, DateStamp, StampAnchor},
    raster::{blur, composite},
};

/// RGBA brush carried through Parley styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl TextBrush {
    fn opaque(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: 255,
        }
    }

    const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
}

/// Stateful helper owning the Parley shaping contexts for one render.
pub(crate) struct GlyphPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl GlyphPainter {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register raw font bytes and return the primary family name.
    fn register(&mut self, font_bytes: &[u8]) -> Result<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| Error::validation("no font families registered from font bytes"))?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| Error::validation("registered font family has no name"))?
            .to_string();
        Ok(family_name)
    }

    fn layout_str(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// One layout per character, so each advance is under our control.
    fn shape_chars(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> Vec<parley::Layout<TextBrush>> {
        text.chars()
            .map(|ch| {
                let mut buf = [0u8; 4];
                self.layout_str(ch.encode_utf8(&mut buf), family, size_px, brush)
            })
            .collect()
    }
}

/// Per-character x offsets for a run of measured widths plus extra spacing,
/// and the total run width.
pub(crate) fn advance_offsets(widths: &[f32], spacing: f32) -> (Vec<f32>, f32) {
    let mut offsets = Vec::with_capacity(widths.len());
    let mut cursor = 0.0f32;
    for (i, w) in widths.iter().enumerate() {
        offsets.push(cursor);
        cursor += w;
        if i + 1 < widths.len() {
            cursor += spacing;
        }
    }
    (offsets, cursor)
}

/// Draw the timestamp overlay. `font_bytes` must already be fetched; any
/// shaping failure surfaces as an error for the caller's degrade policy.
pub(crate) fn draw_date_stamp(
    canvas: &mut [u8],
    layout: &FrameLayout,
    stamp: &DateStamp,
    timestamp: &str,
    font_bytes: &[u8],
) -> Result<()> {
    let text = format!("{}{}", stamp.prefix, timestamp);
    if text.is_empty() {
        return Ok(());
    }

    let mut painter = GlyphPainter::new();
    let family = painter.register(font_bytes)?;
    let brush = TextBrush::opaque(stamp.color);
    let chars = painter.shape_chars(&text, &family, stamp.font.size_px, brush);
    let widths: Vec<f32> = chars.iter().map(shaped_advance).collect();
    let (offsets, total) = advance_offsets(&widths, stamp.letter_spacing_px);

    let font = font_data(font_bytes);
    let (origin_x, baseline_y) = match stamp.anchor {
        StampAnchor::Corner => (
            layout.image_x as f32 + 10.0,
            (layout.image_y + layout.image_height) as f32 - 10.0,
        ),
        StampAnchor::CenteredTop => (layout.out_width as f32 / 2.0 - total / 2.0, 18.0),
    };

    if stamp.anchor == StampAnchor::Corner {
        // Soft drop shadow: the same run in black, offset by one pixel,
        // blurred, at 0.65 opacity.
        let shadow_chars = painter.shape_chars(&text, &family, stamp.font.size_px, TextBrush::BLACK);
        let mut shadow = rasterize_run(
            layout,
            &font,
            &shadow_chars,
            &offsets,
            origin_x + 1.0,
            baseline_y + 1.0,
        )?;
        shadow = blur::gaussian_blur_rgba8(&shadow, layout.out_width, layout.out_height, 6, 3.0)?;
        scale_premul_in_place(&mut shadow, 0.65);
        composite::overlay_premul_in_place(canvas, &shadow)?;
    }

    let overlay = rasterize_run(layout, &font, &chars, &offsets, origin_x, baseline_y)?;
    composite::overlay_premul_in_place(canvas, &overlay)
}

/// Draw the bordered frame's caption, centered near the bottom of the full
/// canvas at 0.78 opacity.
pub(crate) fn draw_caption(
    canvas: &mut [u8],
    layout: &FrameLayout,
    border: &BorderSpec,
    caption: &str,
    font_bytes: &[u8],
) -> Result<()> {
    if caption.is_empty() {
        return Ok(());
    }

    let mut painter = GlyphPainter::new();
    let family = painter.register(font_bytes)?;
    let brush = TextBrush::opaque(border.caption_color);
    let shaped = painter.layout_str(caption, &family, border.caption_font.size_px, brush);
    let width = shaped_advance(&shaped);

    let font = font_data(font_bytes);
    let origin_x = layout.out_width as f32 / 2.0 - width / 2.0;
    let baseline_y = layout.out_height as f32 - 18.0;

    let mut overlay = rasterize_run(layout, &font, &[shaped], &[0.0], origin_x, baseline_y)?;
    scale_premul_in_place(&mut overlay, 0.78);
    composite::overlay_premul_in_place(canvas, &overlay)
}

/// Advance width of a single-line layout, including trailing whitespace.
fn shaped_advance(shaped: &parley::Layout<TextBrush>) -> f32 {
    shaped
        .lines()
        .next()
        .map(|line| line.metrics().advance)
        .unwrap_or(0.0)
}

fn font_data(font_bytes: &[u8]) -> vello_cpu::peniko::FontData {
    vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0)
}

/// Rasterize positioned single-line layouts into a transparent canvas-sized
/// surface and return its premultiplied pixels.
fn rasterize_run(
    layout: &FrameLayout,
    font: &vello_cpu::peniko::FontData,
    runs: &[parley::Layout<TextBrush>],
    offsets: &[f32],
    origin_x: f32,
    baseline_y: f32,
) -> Result<Vec<u8>> {
    let width: u16 = layout
        .out_width
        .try_into()
        .map_err(|_| Error::context_unavailable("surface width exceeds u16"))?;
    let height: u16 = layout
        .out_height
        .try_into()
        .map_err(|_| Error::context_unavailable("surface height exceeds u16"))?;

    let mut ctx = vello_cpu::RenderContext::new(width, height);
    for (shaped, dx) in runs.iter().zip(offsets) {
        let Some(line) = shaped.lines().next() else {
            continue;
        };
        let top = f64::from(baseline_y - line.metrics().baseline);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            f64::from(origin_x + dx),
            top,
        )));

        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }

    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

/// Scale premultiplied RGBA bytes by a uniform opacity factor.
fn scale_premul_in_place(pixels: &mut [u8], factor: f32) {
    let f = ((factor.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    for px in pixels.chunks_exact_mut(4) {
        for c in px.iter_mut() {
            *c = crate::foundation::math::mul_div255(u16::from(*c), f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_offsets_accumulate_width_plus_spacing() {
        let (offsets, total) = advance_offsets(&[10.0, 20.0, 5.0], 2.0);
        assert_eq!(offsets, vec![0.0, 12.0, 34.0]);
        assert_eq!(total, 39.0);
    }

    #[test]
    fn advance_offsets_no_trailing_spacing() {
        let (offsets, total) = advance_offsets(&[8.0], 4.0);
        assert_eq!(offsets, vec![0.0]);
        assert_eq!(total, 8.0);
    }

    #[test]
    fn advance_offsets_empty_run() {
        let (offsets, total) = advance_offsets(&[], 3.0);
        assert!(offsets.is_empty());
        assert_eq!(total, 0.0);
    }

    #[test]
    fn scale_premul_halves_all_channels() {
        let mut px = vec![200u8, 100, 50, 255];
        scale_premul_in_place(&mut px, 0.5);
        assert!(px[0] >= 99 && px[0] <= 101);
        assert!(px[3] >= 127 && px[3] <= 129);
    }

    #[test]
    fn register_rejects_non_font_bytes() {
        let mut painter = GlyphPainter::new();
        assert!(painter.register(b"definitely not a font").is_err());
    }
}
