use crate::model::{Ball, Rgb};
use crate::render::{Pixel, PixelCanvas};

/// Offscreen coverage raster, one alpha value per braille subpixel.
/// The metaball trick runs entirely on this layer: stamp flat disks,
/// blur, binarize, then pour the gradient through the result.
pub(crate) struct AlphaField {
    pub(crate) w: usize,
    pub(crate) h: usize,
    pub(crate) a: Vec<f32>,
}

impl AlphaField {
    pub(crate) fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            a: vec![0.0; w * h],
        }
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    /// Flat opaque disk, max-blended so draw order is irrelevant.
    /// The half-pixel feather on the rim only tames aliasing; the
    /// threshold pass re-hardens the edge anyway.
    pub(crate) fn stamp_disk(&mut self, cx: f32, cy: f32, diameter: f32) {
        if diameter <= 0.0 || self.w == 0 || self.h == 0 {
            return;
        }
        let r = diameter * 0.5;
        let x0 = ((cx - r - 1.0).floor().max(0.0)) as usize;
        let y0 = ((cy - r - 1.0).floor().max(0.0)) as usize;
        let x1 = ((cx + r + 1.0).ceil() as usize).min(self.w.saturating_sub(1));
        let y1 = ((cy + r + 1.0).ceil() as usize).min(self.h.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                let cover = (r + 0.5 - dist).clamp(0.0, 1.0);
                if cover > 0.0 {
                    let i = self.idx(x, y);
                    self.a[i] = self.a[i].max(cover);
                }
            }
        }
    }

    /// Gaussian-style blur: three iterated separable box passes.
    /// Outside the canvas counts as transparent, same as the source
    /// layer the original draws into.
    pub(crate) fn blur(&mut self, radius: f32) {
        let r = (radius * 0.5).round() as usize;
        if r == 0 || self.w == 0 || self.h == 0 {
            return;
        }
        let mut tmp = vec![0.0f32; self.a.len()];
        for _ in 0..3 {
            box_pass_h(&self.a, &mut tmp, self.w, self.h, r);
            box_pass_v(&tmp, &mut self.a, self.w, self.h, r);
        }
    }

    /// Hard alpha threshold: restores a crisp outline after the blur,
    /// which is what makes nearby blobs read as one merged shape.
    pub(crate) fn threshold(&mut self, tau: f32) {
        for v in &mut self.a {
            *v = if *v >= tau { 1.0 } else { 0.0 };
        }
    }
}

fn box_pass_h(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    for y in 0..h {
        let row = y * w;
        let mut acc = 0.0f32;
        for x in 0..=r.min(w - 1) {
            acc += src[row + x];
        }
        for x in 0..w {
            dst[row + x] = acc * norm;
            let add = x + r + 1;
            if add < w {
                acc += src[row + add];
            }
            if x >= r {
                acc -= src[row + x - r];
            }
        }
    }
}

fn box_pass_v(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    for x in 0..w {
        let mut acc = 0.0f32;
        for y in 0..=r.min(h - 1) {
            acc += src[y * w + x];
        }
        for y in 0..h {
            dst[y * w + x] = acc * norm;
            let add = y + r + 1;
            if add < h {
                acc += src[add * w + x];
            }
            if y >= r {
                acc -= src[(y - r) * w + x];
            }
        }
    }
}

/// Run the whole metaball pipeline. Balls are in pixel units, offsets
/// relative to the canvas center; the result is a binary silhouette.
/// Deterministic and stateless, so identical inputs give identical
/// output. Zero balls or a zero-sized canvas yield an empty mask.
pub(crate) fn composite(balls: &[Ball], w: usize, h: usize, blur_radius: f32, tau: f32) -> AlphaField {
    let mut field = AlphaField::new(w, h);
    if w == 0 || h == 0 {
        return field;
    }
    let cx = w as f32 * 0.5;
    let cy = h as f32 * 0.5;
    for b in balls {
        field.stamp_disk(cx + b.offset.x, cy + b.offset.y, b.diameter);
    }
    field.blur(blur_radius);
    field.threshold(tau);
    field
}

/// Pour the fixed top-to-bottom two-stop gradient through the
/// silhouette into the pixel canvas. Outside the mask the canvas stays
/// fully transparent.
pub(crate) fn fill_gradient(field: &AlphaField, top: Rgb, bottom: Rgb, canvas: &mut PixelCanvas) {
    if field.w == 0 || field.h == 0 {
        return;
    }
    let denom = (field.h.saturating_sub(1)).max(1) as f32;
    for y in 0..field.h.min(canvas.h as usize) {
        let col = Rgb::lerp(top, bottom, y as f32 / denom);
        for x in 0..field.w.min(canvas.w as usize) {
            let a = field.a[y * field.w + x];
            let i = canvas.idx(x as u32, y as u32);
            canvas.px[i] = Pixel {
                r: col.r,
                g: col.g,
                b: col.b,
                a: (a * 255.0 + 0.5) as u8,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vec2;

    fn ball(x: f32, y: f32, d: f32) -> Ball {
        Ball::new(Vec2::new(x, y), d, 1.0)
    }

    /// Count 4-connected regions of the binary silhouette.
    fn region_count(field: &AlphaField) -> usize {
        let mut seen = vec![false; field.a.len()];
        let mut count = 0;
        let mut stack = Vec::new();
        for start in 0..field.a.len() {
            if seen[start] || field.a[start] < 0.5 {
                continue;
            }
            count += 1;
            stack.push(start);
            seen[start] = true;
            while let Some(i) = stack.pop() {
                let (x, y) = (i % field.w, i / field.w);
                let mut push = |nx: usize, ny: usize| {
                    let ni = ny * field.w + nx;
                    if !seen[ni] && field.a[ni] >= 0.5 {
                        seen[ni] = true;
                        stack.push(ni);
                    }
                };
                if x > 0 {
                    push(x - 1, y);
                }
                if x + 1 < field.w {
                    push(x + 1, y);
                }
                if y > 0 {
                    push(x, y - 1);
                }
                if y + 1 < field.h {
                    push(x, y + 1);
                }
            }
        }
        count
    }

    fn lit_extent_on_row(field: &AlphaField, y: usize) -> Option<(usize, usize)> {
        let row = &field.a[y * field.w..(y + 1) * field.w];
        let min = row.iter().position(|&v| v >= 0.5)?;
        let max = row.iter().rposition(|&v| v >= 0.5)?;
        Some((min, max))
    }

    #[test]
    fn single_ball_silhouette_keeps_its_diameter() {
        let field = composite(&[ball(0.0, 0.0, 160.0)], 240, 240, 12.0, 0.5);
        let (min, max) = lit_extent_on_row(&field, 120).expect("disk missing");
        let width = (max - min + 1) as f32;
        assert!(
            (width - 160.0).abs() <= 4.0,
            "silhouette width {width} too far from 160"
        );
        assert_eq!(region_count(&field), 1);
    }

    #[test]
    fn near_balls_merge_into_one_region() {
        let balls = [ball(-35.0, 0.0, 60.0), ball(35.0, 0.0, 60.0)];
        let field = composite(&balls, 300, 160, 30.0, 0.5);
        assert_eq!(region_count(&field), 1);
    }

    #[test]
    fn far_balls_stay_disjoint() {
        let balls = [ball(-100.0, 0.0, 60.0), ball(100.0, 0.0, 60.0)];
        let field = composite(&balls, 400, 160, 30.0, 0.5);
        assert_eq!(region_count(&field), 2);
    }

    #[test]
    fn compositing_is_deterministic() {
        let balls = [ball(-20.0, 10.0, 90.0), ball(30.0, -15.0, 70.0)];
        let a = composite(&balls, 200, 200, 30.0, 0.5);
        let b = composite(&balls, 200, 200, 30.0, 0.5);
        assert_eq!(a.a, b.a);
    }

    #[test]
    fn zero_balls_give_an_empty_mask() {
        let field = composite(&[], 120, 120, 30.0, 0.5);
        assert!(field.a.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_canvas_is_a_noop() {
        let field = composite(&[ball(0.0, 0.0, 100.0)], 0, 0, 30.0, 0.5);
        assert!(field.a.is_empty());

        let mut canvas = PixelCanvas::new(0, 0);
        fill_gradient(
            &field,
            Rgb { r: 255, g: 0, b: 0 },
            Rgb { r: 0, g: 0, b: 255 },
            &mut canvas,
        );
        assert!(canvas.px.is_empty());
    }

    #[test]
    fn gradient_runs_top_to_bottom_inside_the_mask() {
        // One huge ball covers the whole canvas; no blur so the edge
        // rows stay fully covered.
        let field = composite(&[ball(0.0, 0.0, 400.0)], 64, 64, 0.0, 0.5);
        let mut canvas = PixelCanvas::new(64, 64);
        let top = Rgb { r: 200, g: 10, b: 10 };
        let bottom = Rgb { r: 10, g: 10, b: 200 };
        fill_gradient(&field, top, bottom, &mut canvas);

        let p0 = canvas.px[canvas.idx(32, 0)];
        let p1 = canvas.px[canvas.idx(32, 63)];
        assert_eq!((p0.r, p0.g, p0.b, p0.a), (200, 10, 10, 255));
        assert_eq!((p1.r, p1.g, p1.b, p1.a), (10, 10, 200, 255));
    }
}
