//! Software raster surfaces.
//!
//! The engine draws on two of these per scene: actors are stroked onto a
//! primary surface, which the compositor then blits onto the visible
//! surface, optionally blurred and brightened. Pixels are straight-alpha
//! RGBA with `f32` channels in `[0, 1]`.
//!
//! Stroking uses signed-distance coverage with a one-pixel soft edge, the
//! same shaping a fragment shader would do with `smoothstep`, just
//! evaluated on the CPU. Blur approximates a Gaussian with three box
//! passes per axis; samples outside the surface are transparent.

use std::path::Path;

use glam::Vec2;

use crate::color::Hsla;

/// How a [`blit`](Surface::blit) combines source and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Standard source-over alpha compositing.
    Over,
    /// Per-channel addition, clamped at 1.0. Overlapping strokes bloom.
    Additive,
}

/// Optional per-blit post effect: Gaussian-like blur and brightness gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    /// Blur radius in pixels (Gaussian sigma is half of it).
    pub blur: f32,
    /// Color gain applied before compositing; 1.0 leaves the source as-is.
    pub brightness: f32,
}

impl Filter {
    /// A pure blur filter.
    pub fn blur(radius: f32) -> Self {
        Self {
            blur: radius,
            brightness: 1.0,
        }
    }

    /// Add a brightness gain to this filter.
    pub fn brightness(mut self, gain: f32) -> Self {
        self.brightness = gain;
        self
    }
}

/// A CPU raster target with the stroke and compositing operations the
/// backdrop themes need.
pub struct Surface {
    width: usize,
    height: usize,
    px: Vec<f32>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            px: vec![0.0; width as usize * height as usize * 4],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Whether either dimension is zero. Every operation on an empty
    /// surface is a no-op; a minimized viewport is degenerate but valid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Resize to the new dimensions. Contents are invalidated, not scaled.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as usize;
        self.height = height as usize;
        self.px = vec![0.0; self.width * self.height * 4];
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.px.fill(0.0);
    }

    /// Fill the whole surface with an opaque-or-not color.
    pub fn fill(&mut self, color: Hsla) {
        let rgba = color.to_rgba();
        for chunk in self.px.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Read one pixel (straight alpha). Panics out of range.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = (y as usize * self.width + x as usize) * 4;
        [self.px[i], self.px[i + 1], self.px[i + 2], self.px[i + 3]]
    }

    // =========================================================================
    // STROKE PRIMITIVES
    // =========================================================================

    /// Stroke a segment from `a` to `b` with the given line width and
    /// round caps.
    pub fn stroke_segment(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        if self.is_empty() {
            return;
        }
        let hw = 0.5 * width.max(0.0);
        let pad = hw + 1.0;
        let (x0, y0, x1, y1) = self.clip_bbox(
            a.x.min(b.x) - pad,
            a.y.min(b.y) - pad,
            a.x.max(b.x) + pad,
            a.y.max(b.y) + pad,
        );
        let ab = b - a;
        let len_sq = ab.length_squared();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let dist = (p - (a + ab * t)).length();
                let coverage = (hw + 0.5 - dist).clamp(0.0, 1.0);
                self.blend_pixel(x, y, color, coverage);
            }
        }
    }

    /// Stroke a one-pixel ring of the given radius.
    pub fn stroke_ring(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        if self.is_empty() {
            return;
        }
        let pad = radius + 1.5;
        let (x0, y0, x1, y1) = self.clip_bbox(
            center.x - pad,
            center.y - pad,
            center.x + pad,
            center.y + pad,
        );
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let dist = ((p - center).length() - radius).abs();
                let coverage = (1.0 - dist).clamp(0.0, 1.0);
                self.blend_pixel(x, y, color, coverage);
            }
        }
    }

    /// Stroke a one-pixel square outline of side `size`, centered on
    /// `pos`, rotated by `angle` about its top-left corner.
    ///
    /// The corner pivot (rather than the center) is what gives the halo
    /// theme its off-axis tumble.
    pub fn stroke_square(&mut self, pos: Vec2, size: f32, angle: f32, color: [f32; 4]) {
        if self.is_empty() {
            return;
        }
        let pivot = pos - Vec2::splat(0.5 * size);
        let (sin, cos) = angle.sin_cos();
        // Bounding box of the four rotated corners.
        let corners = [
            Vec2::ZERO,
            Vec2::new(size, 0.0),
            Vec2::new(0.0, size),
            Vec2::new(size, size),
        ];
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for c in corners {
            let world = pivot + Vec2::new(c.x * cos - c.y * sin, c.x * sin + c.y * cos);
            min = min.min(world);
            max = max.max(world);
        }
        let (x0, y0, x1, y1) = self.clip_bbox(min.x - 1.5, min.y - 1.5, max.x + 1.5, max.y + 1.5);
        let half = 0.5 * size;
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - pivot;
                // Inverse-rotate into the square's local frame.
                let local = Vec2::new(p.x * cos + p.y * sin, -p.x * sin + p.y * cos);
                let q = (local - Vec2::splat(half)).abs() - Vec2::splat(half);
                let outside = q.max(Vec2::ZERO).length();
                let inside = q.x.max(q.y).min(0.0);
                let dist = (outside + inside).abs();
                let coverage = (1.0 - dist).clamp(0.0, 1.0);
                self.blend_pixel(x, y, color, coverage);
            }
        }
    }

    /// Stroke a vertical ray at `x` spanning `y1..y2`, `width` pixels
    /// wide, with alpha rising from 0 at both ends to `peak_alpha` at the
    /// midpoint (a linear three-stop gradient).
    pub fn stroke_gradient_ray(
        &mut self,
        x: f32,
        y1: f32,
        y2: f32,
        width: f32,
        color: Hsla,
        peak_alpha: f32,
    ) {
        if self.is_empty() {
            return;
        }
        let hw = 0.5 * width.max(0.0);
        let (top, bottom) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let (x0, y0, x1, yb) =
            self.clip_bbox(x - hw - 1.0, top - 1.0, x + hw + 1.0, bottom + 1.0);
        let span = (bottom - top).max(f32::MIN_POSITIVE);
        let rgba = color.to_rgba();
        for y in y0..yb {
            let py = y as f32 + 0.5;
            // Butt-capped vertical coverage.
            let vcov = (py - top + 0.5).clamp(0.0, 1.0) * (bottom - py + 0.5).clamp(0.0, 1.0);
            if vcov <= 0.0 {
                continue;
            }
            let t = ((py - top) / span).clamp(0.0, 1.0);
            let alpha = peak_alpha * (1.0 - (2.0 * t - 1.0).abs());
            if alpha <= 0.0 {
                continue;
            }
            for px in x0..x1 {
                let hcov = (hw + 0.5 - (px as f32 + 0.5 - x).abs()).clamp(0.0, 1.0);
                let mut c = rgba;
                c[3] *= alpha;
                self.blend_pixel(px, y, c, hcov * vcov);
            }
        }
    }

    // =========================================================================
    // COMPOSITING
    // =========================================================================

    /// Draw `src` onto this surface with a blend mode and optional filter.
    ///
    /// Both surfaces must have the same dimensions (they always do inside
    /// a scene; resize goes through both).
    pub fn blit(&mut self, src: &Surface, blend: Blend, filter: Option<Filter>) {
        if self.is_empty() || src.is_empty() {
            return;
        }
        debug_assert_eq!(self.width, src.width);
        debug_assert_eq!(self.height, src.height);

        // Work on a premultiplied copy so blur does not bleed color out of
        // transparent regions.
        let brightness = filter.map(|f| f.brightness).unwrap_or(1.0);
        let mut scratch = vec![0.0f32; src.px.len()];
        for (s, d) in src.px.chunks_exact(4).zip(scratch.chunks_exact_mut(4)) {
            let a = s[3];
            d[0] = s[0] * brightness * a;
            d[1] = s[1] * brightness * a;
            d[2] = s[2] * brightness * a;
            d[3] = a;
        }

        if let Some(f) = filter {
            if f.blur > 0.0 {
                blur_premultiplied(&mut scratch, src.width, src.height, 0.5 * f.blur);
            }
        }

        for (d, s) in self.px.chunks_exact_mut(4).zip(scratch.chunks_exact(4)) {
            let da = d[3];
            let dp = [d[0] * da, d[1] * da, d[2] * da, da];
            let out = match blend {
                Blend::Over => {
                    let inv = 1.0 - s[3];
                    [
                        s[0] + dp[0] * inv,
                        s[1] + dp[1] * inv,
                        s[2] + dp[2] * inv,
                        s[3] + dp[3] * inv,
                    ]
                }
                Blend::Additive => [
                    (s[0] + dp[0]).min(1.0),
                    (s[1] + dp[1]).min(1.0),
                    (s[2] + dp[2]).min(1.0),
                    (s[3] + dp[3]).min(1.0),
                ],
            };
            if out[3] > 1e-6 {
                d[0] = (out[0] / out[3]).min(1.0);
                d[1] = (out[1] / out[3]).min(1.0);
                d[2] = (out[2] / out[3]).min(1.0);
                d[3] = out[3].min(1.0);
            } else {
                d.fill(0.0);
            }
        }
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    /// Export as tightly packed RGBA8 into `out` (cleared first).
    pub fn to_rgba8(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.px.len());
        for &c in &self.px {
            out.push((c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8);
        }
    }

    /// Write the surface as a PNG snapshot.
    pub fn write_png(&self, path: &Path) -> image::ImageResult<()> {
        let mut bytes = Vec::new();
        self.to_rgba8(&mut bytes);
        image::save_buffer(
            path,
            &bytes,
            self.width as u32,
            self.height as u32,
            image::ExtendedColorType::Rgba8,
        )
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Clamp a float bbox to pixel bounds, returning `x0, y0, x1, y1`.
    fn clip_bbox(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (usize, usize, usize, usize) {
        let x0 = min_x.floor().max(0.0) as usize;
        let y0 = min_y.floor().max(0.0) as usize;
        let x1 = (max_x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (max_y.ceil().max(0.0) as usize).min(self.height);
        (x0, y0, x1, y1)
    }

    /// Source-over blend one pixel with straight-alpha `rgba` scaled by
    /// `coverage`.
    fn blend_pixel(&mut self, x: usize, y: usize, rgba: [f32; 4], coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        let sa = (rgba[3] * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = (y * self.width + x) * 4;
        let da = self.px[i + 3];
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            return;
        }
        for c in 0..3 {
            let d = self.px[i + c];
            self.px[i + c] = (rgba[c] * sa + d * da * (1.0 - sa)) / out_a;
        }
        self.px[i + 3] = out_a;
    }
}

/// Three-pass box blur approximating a Gaussian of the given sigma, on a
/// premultiplied RGBA buffer. Samples outside the buffer are transparent,
/// matching how a browser canvas blurs its edges.
fn blur_premultiplied(px: &mut [f32], width: usize, height: usize, sigma: f32) {
    if sigma <= 0.0 || width == 0 || height == 0 {
        return;
    }
    let radii = box_radii_for_gauss(sigma);
    let mut tmp = vec![0.0f32; px.len()];
    for r in radii {
        if r == 0 {
            continue;
        }
        box_blur_axis(px, &mut tmp, width, height, r, true);
        box_blur_axis(&tmp, px, width, height, r, false);
    }
}

/// Box radii whose triple application approximates a Gaussian blur.
fn box_radii_for_gauss(sigma: f32) -> [usize; 3] {
    let n = 3.0;
    let w_ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wl = wl.max(1);
    let wu = wl + 2;
    let m_ideal = (12.0 * sigma * sigma - n * (wl * wl) as f32 - 4.0 * n * wl as f32 - 3.0 * n)
        / (-4.0 * wl as f32 - 4.0);
    let m = m_ideal.round() as i64;
    let mut radii = [0usize; 3];
    for (i, r) in radii.iter_mut().enumerate() {
        let w = if (i as i64) < m { wl } else { wu };
        *r = ((w - 1) / 2).max(0) as usize;
    }
    radii
}

/// One box-blur pass along an axis with zero (transparent) padding.
fn box_blur_axis(src: &[f32], dst: &mut [f32], width: usize, height: usize, radius: usize, horizontal: bool) {
    let norm = 1.0 / (2 * radius + 1) as f32;
    let (lines, line_len) = if horizontal { (height, width) } else { (width, height) };
    let idx = |line: usize, i: usize| -> usize {
        if horizontal {
            (line * width + i) * 4
        } else {
            (i * width + line) * 4
        }
    };
    for line in 0..lines {
        let mut acc = [0.0f32; 4];
        // Prime the window for position 0.
        for i in 0..=radius.min(line_len.saturating_sub(1)) {
            let s = idx(line, i);
            for c in 0..4 {
                acc[c] += src[s + c];
            }
        }
        for i in 0..line_len {
            let d = idx(line, i);
            for c in 0..4 {
                dst[d + c] = acc[c] * norm;
            }
            // Slide: add the incoming sample, drop the outgoing one.
            let add = i + radius + 1;
            if add < line_len {
                let s = idx(line, add);
                for c in 0..4 {
                    acc[c] += src[s + c];
                }
            }
            if i >= radius {
                let s = idx(line, i - radius);
                for c in 0..4 {
                    acc[c] -= src[s + c];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(h: f32) -> Hsla {
        Hsla::new(h, 1.0, 0.5, 1.0)
    }

    #[test]
    fn test_fill_and_pixel() {
        let mut s = Surface::new(4, 3);
        s.fill(solid(0.0));
        let [r, g, b, a] = s.pixel(3, 2);
        assert!((r - 1.0).abs() < 1e-5 && g < 1e-5 && b < 1e-5 && (a - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_covers_center() {
        let mut s = Surface::new(21, 21);
        s.stroke_segment(
            Vec2::new(2.0, 10.5),
            Vec2::new(19.0, 10.5),
            3.0,
            [0.0, 1.0, 0.0, 1.0],
        );
        let [_, g, _, a] = s.pixel(10, 10);
        assert!(g > 0.9, "segment center not covered: g={}", g);
        assert!(a > 0.9);
        // Far corner untouched.
        assert_eq!(s.pixel(0, 0)[3], 0.0);
    }

    #[test]
    fn test_ring_touches_radius_not_center() {
        let mut s = Surface::new(31, 31);
        s.stroke_ring(Vec2::new(15.5, 15.5), 8.0, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(s.pixel(15, 15)[3], 0.0);
        // A point on the circle (15.5 + 8, 15.5).
        assert!(s.pixel(23, 15)[3] > 0.3);
    }

    #[test]
    fn test_square_outline_open_in_middle() {
        let mut s = Surface::new(41, 41);
        s.stroke_square(Vec2::new(20.5, 20.5), 12.0, 0.0, [1.0, 0.0, 1.0, 1.0]);
        // Center stays empty, edge midpoint is stroked.
        assert_eq!(s.pixel(20, 20)[3], 0.0);
        assert!(s.pixel(14, 20)[3] > 0.3);
    }

    #[test]
    fn test_gradient_ray_peaks_at_midpoint() {
        let mut s = Surface::new(9, 64);
        s.stroke_gradient_ray(4.5, 8.0, 56.0, 3.0, solid(120.0), 1.0);
        let mid = s.pixel(4, 32)[3];
        let near_end = s.pixel(4, 9)[3];
        assert!(mid > 0.8, "midpoint alpha {}", mid);
        assert!(near_end < 0.15, "end alpha {}", near_end);
    }

    #[test]
    fn test_additive_blit_clamps() {
        let mut a = Surface::new(2, 2);
        let mut b = Surface::new(2, 2);
        a.fill(Hsla::new(0.0, 0.0, 0.9, 1.0));
        b.fill(Hsla::new(0.0, 0.0, 0.8, 1.0));
        a.blit(&b, Blend::Additive, None);
        let [r, g, bch, al] = a.pixel(0, 0);
        assert_eq!([r, g, bch, al], [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_over_blit_keeps_background_where_src_transparent() {
        let mut dst = Surface::new(3, 3);
        dst.fill(solid(240.0));
        let src = Surface::new(3, 3);
        let before = dst.pixel(1, 1);
        dst.blit(&src, Blend::Over, None);
        assert_eq!(dst.pixel(1, 1), before);
    }

    #[test]
    fn test_blur_spreads_energy() {
        let mut src = Surface::new(17, 17);
        src.stroke_segment(
            Vec2::new(8.5, 8.5),
            Vec2::new(8.5, 8.5),
            2.0,
            [1.0, 1.0, 1.0, 1.0],
        );
        let mut dst = Surface::new(17, 17);
        dst.blit(&src, Blend::Over, Some(Filter::blur(6.0)));
        // The dot bled outward.
        assert!(dst.pixel(12, 8)[3] > 0.0);
        // And the peak dropped below the unblurred source.
        assert!(dst.pixel(8, 8)[3] < src.pixel(8, 8)[3]);
    }

    #[test]
    fn test_rgba8_export() {
        let mut s = Surface::new(5, 4);
        s.fill(Hsla::new(0.0, 0.0, 1.0, 1.0));
        let mut out = Vec::new();
        s.to_rgba8(&mut out);
        assert_eq!(out.len(), 5 * 4 * 4);
        assert!(out.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_empty_surface_is_noop() {
        let mut s = Surface::new(0, 0);
        s.fill(solid(0.0));
        s.stroke_segment(Vec2::ZERO, Vec2::new(5.0, 5.0), 2.0, [1.0; 4]);
        s.stroke_ring(Vec2::ZERO, 3.0, [1.0; 4]);
        s.stroke_square(Vec2::ZERO, 4.0, 1.0, [1.0; 4]);
        s.stroke_gradient_ray(0.0, 0.0, 5.0, 2.0, solid(0.0), 1.0);
        let other = Surface::new(0, 0);
        s.blit(&other, Blend::Additive, Some(Filter::blur(8.0)));
        assert!(s.is_empty());
    }

    #[test]
    fn test_resize_invalidates() {
        let mut s = Surface::new(4, 4);
        s.fill(solid(60.0));
        s.resize(6, 2);
        assert_eq!(s.width(), 6);
        assert_eq!(s.height(), 2);
        assert_eq!(s.pixel(0, 0)[3], 0.0);
    }
}
