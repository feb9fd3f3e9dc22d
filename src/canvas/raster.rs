//! Software rasterizer backing the window and snapshot export.
//!
//! Every shape is first turned into a coverage mask over its (clipped)
//! bounding box. Glow is the union of a shape's masks, box-blurred and
//! composited underneath it. All compositing is straight-alpha source-over.

use std::path::Path;

use glam::Vec2;
use image::{Rgba as Pixel, RgbaImage};

use super::font;
use super::{Canvas, DrawState, Rgba};
use crate::error::{Error, Result};

/// Box blur passes approximating a gaussian halo
const BLUR_PASSES: usize = 2;

/// Subsample offsets for polygon coverage (2x2 grid inside the pixel)
const SUBSAMPLES: [(f32, f32); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];

/// RGBA frame buffer implementing [`Canvas`]
pub struct Raster {
    image: RgbaImage,
    state: DrawState,
}

impl Raster {
    /// Create a transparent black raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
            state: DrawState::default(),
        }
    }

    /// Reallocate to a new size; contents are discarded
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width.max(1), height.max(1));
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the current frame as an image (format from extension)
    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path).map_err(|source| Error::Export {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Allocate a mask covering `[min, max]` grown by `pad`, clipped to the image
    fn mask(&self, min: Vec2, max: Vec2, pad: f32) -> Option<Mask> {
        let x0 = ((min.x - pad).floor() as i64).max(0);
        let y0 = ((min.y - pad).floor() as i64).max(0);
        let x1 = ((max.x + pad).ceil() as i64).min(self.image.width() as i64);
        let y1 = ((max.y + pad).ceil() as i64).min(self.image.height() as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let (w, h) = ((x1 - x0) as usize, (y1 - y0) as usize);
        Some(Mask {
            x0: x0 as u32,
            y0: y0 as u32,
            w,
            h,
            cov: vec![0.0; w * h],
        })
    }

    /// Padding that keeps stroke and glow inside the mask
    fn pad(&self) -> f32 {
        let style = &self.state.style;
        let stroke = if style.stroke.is_some() {
            style.stroke_weight * 0.5
        } else {
            0.0
        };
        let glow = style.glow.map(|(blur, _)| blur).unwrap_or(0.0);
        stroke + glow + 2.0
    }

    /// Composite fill and stroke masks with the current style
    fn paint(&mut self, fill: Option<Mask>, stroke: Option<Mask>) {
        let style = self.state.style;

        if let Some((blur, glow_color)) = style.glow {
            let shape_alpha = style
                .fill
                .filter(|_| fill.is_some())
                .or(style.stroke.filter(|_| stroke.is_some()))
                .map(|c| c.a as f32 / 255.0)
                .unwrap_or(0.0);
            let union = match (&fill, &stroke) {
                (Some(f), Some(s)) => Some(f.union(s)),
                (Some(f), None) => Some(f.clone()),
                (None, Some(s)) => Some(s.clone()),
                (None, None) => None,
            };
            if let Some(mut halo) = union {
                let radius = ((blur * 0.5).round() as usize).max(1);
                for _ in 0..BLUR_PASSES {
                    halo.box_blur(radius);
                }
                let alpha = glow_color.a as f32 * shape_alpha;
                self.blend(&halo, glow_color.with_alpha(alpha));
            }
        }

        if let (Some(mask), Some(color)) = (&fill, style.fill) {
            self.blend(mask, color);
        }
        if let (Some(mask), Some(color)) = (&stroke, style.stroke) {
            self.blend(mask, color);
        }
    }

    fn blend(&mut self, mask: &Mask, color: Rgba) {
        let base = color.a as f32 / 255.0;
        if base <= 0.0 {
            return;
        }
        for my in 0..mask.h {
            for mx in 0..mask.w {
                let cov = mask.cov[my * mask.w + mx];
                if cov <= 0.0 {
                    continue;
                }
                let a = (cov * base).min(1.0);
                let px = self
                    .image
                    .get_pixel_mut(mask.x0 + mx as u32, mask.y0 + my as u32);
                let Pixel([r, g, b, da]) = *px;
                let mix = |d: u8, s: u8| (d as f32 * (1.0 - a) + s as f32 * a).round() as u8;
                let out_a = (a * 255.0 + da as f32 * (1.0 - a)).round().min(255.0) as u8;
                *px = Pixel([mix(r, color.r), mix(g, color.g), mix(b, color.b), out_a]);
            }
        }
    }

    /// Stroke mask of a polyline in canvas space
    fn stroke_polyline(&self, points: &[Vec2], closed: bool) -> Option<Mask> {
        let (min, max) = bounds(points)?;
        let mut mask = self.mask(min, max, self.pad())?;
        let half = self.state.style.stroke_weight * 0.5;
        let count = if closed { points.len() } else { points.len() - 1 };
        for i in 0..count {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            mask.segment(a, b, half);
        }
        Some(mask)
    }
}

impl Canvas for Raster {
    fn width(&self) -> f32 {
        self.image.width() as f32
    }

    fn height(&self) -> f32 {
        self.image.height() as f32
    }

    fn state(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn background(&mut self, color: Rgba) {
        self.state.reset();
        let fill = Pixel([color.r, color.g, color.b, 255]);
        for px in self.image.pixels_mut() {
            *px = fill;
        }
    }

    fn ellipse(&mut self, x: f32, y: f32, diameter: f32) {
        let center = self.state.transform.apply(Vec2::new(x, y));
        let r = diameter.abs() * 0.5;
        let style = self.state.style;
        let half = style.stroke_weight * 0.5;
        let extent = Vec2::splat(r);
        let pad = self.pad();

        let fill = style
            .fill
            .and_then(|_| self.mask(center - extent, center + extent, pad))
            .map(|mut mask| {
                mask.fill_with(|p| (r - p.distance(center) + 0.5).clamp(0.0, 1.0));
                mask
            });
        let stroke = style
            .stroke
            .and_then(|_| self.mask(center - extent, center + extent, pad))
            .map(|mut mask| {
                mask.fill_with(|p| (half - (p.distance(center) - r).abs() + 0.5).clamp(0.0, 1.0));
                mask
            });
        self.paint(fill, stroke);
    }

    fn polygon(&mut self, points: &[Vec2]) {
        if points.len() < 2 {
            return;
        }
        let transform = self.state.transform;
        let world: Vec<Vec2> = points.iter().map(|&p| transform.apply(p)).collect();
        let style = self.state.style;

        let fill = match (style.fill, bounds(&world)) {
            (Some(_), Some((min, max))) if world.len() >= 3 => {
                self.mask(min, max, self.pad()).map(|mut mask| {
                    mask.fill_with_subsampled(|p| contains(&world, p));
                    mask
                })
            }
            _ => None,
        };
        let stroke = style
            .stroke
            .and_then(|_| self.stroke_polyline(&world, true));
        self.paint(fill, stroke);
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, stop: f32) {
        if self.state.style.stroke.is_none() || stop <= start {
            return;
        }
        let segments = (((stop - start) * radius / 4.0).ceil() as usize).max(8);
        let transform = self.state.transform;
        let center = Vec2::new(x, y);
        let world: Vec<Vec2> = (0..=segments)
            .map(|i| {
                let a = start + (stop - start) * i as f32 / segments as f32;
                transform.apply(center + Vec2::from_angle(a) * radius)
            })
            .collect();
        let stroke = self.stroke_polyline(&world, false);
        self.paint(None, stroke);
    }

    fn text(&mut self, x: f32, y: f32, text: &str, size: f32) {
        if self.state.style.fill.is_none() || text.is_empty() {
            return;
        }
        let scale = font::scale_for(size);
        let (tw, th) = font::measure(text, scale);
        let anchor = self.state.transform.apply(Vec2::new(x, y));
        let origin = (anchor - Vec2::new(tw as f32, th as f32)).round();
        let Some(mut mask) = self.mask(origin, origin + Vec2::new(tw as f32, th as f32), 0.0)
        else {
            return;
        };

        for (i, ch) in text.chars().enumerate() {
            let cell_x = origin.x as i64 + (i as u32 * font::ADVANCE * scale) as i64;
            for (row, bits) in font::glyph(ch).iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if bits & (1 << (font::GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = cell_x + (col * scale) as i64;
                    let py = origin.y as i64 + (row as u32 * scale) as i64;
                    mask.set_block(px, py, scale as i64);
                }
            }
        }

        let glow = self.state.style.glow.take();
        self.paint(Some(mask), None);
        self.state.style.glow = glow;
    }
}

/// Per-pixel coverage over a clipped rectangle of the image
#[derive(Clone)]
struct Mask {
    x0: u32,
    y0: u32,
    w: usize,
    h: usize,
    cov: Vec<f32>,
}

impl Mask {
    /// Pixel center in canvas space
    fn center(&self, mx: usize, my: usize) -> Vec2 {
        Vec2::new(
            self.x0 as f32 + mx as f32 + 0.5,
            self.y0 as f32 + my as f32 + 0.5,
        )
    }

    fn fill_with(&mut self, coverage: impl Fn(Vec2) -> f32) {
        for my in 0..self.h {
            for mx in 0..self.w {
                self.cov[my * self.w + mx] = coverage(self.center(mx, my));
            }
        }
    }

    fn fill_with_subsampled(&mut self, inside: impl Fn(Vec2) -> bool) {
        for my in 0..self.h {
            for mx in 0..self.w {
                let corner = Vec2::new(self.x0 as f32 + mx as f32, self.y0 as f32 + my as f32);
                let hits = SUBSAMPLES
                    .iter()
                    .filter(|(dx, dy)| inside(corner + Vec2::new(*dx, *dy)))
                    .count();
                self.cov[my * self.w + mx] = hits as f32 / SUBSAMPLES.len() as f32;
            }
        }
    }

    /// Max-accumulate a thick segment of half width `half`
    fn segment(&mut self, a: Vec2, b: Vec2, half: f32) {
        let reach = half + 1.0;
        let lo = a.min(b) - Vec2::splat(reach);
        let hi = a.max(b) + Vec2::splat(reach);
        let mx0 = ((lo.x.floor() as i64) - self.x0 as i64).max(0) as usize;
        let my0 = ((lo.y.floor() as i64) - self.y0 as i64).max(0) as usize;
        let mx1 = ((hi.x.ceil() as i64) - self.x0 as i64).clamp(0, self.w as i64) as usize;
        let my1 = ((hi.y.ceil() as i64) - self.y0 as i64).clamp(0, self.h as i64) as usize;

        for my in my0..my1 {
            for mx in mx0..mx1 {
                let d = distance_to_segment(self.center(mx, my), a, b);
                let c = (half - d + 0.5).clamp(0.0, 1.0);
                let slot = &mut self.cov[my * self.w + mx];
                *slot = slot.max(c);
            }
        }
    }

    /// Fully cover a `size`x`size` block at canvas pixel (x, y)
    fn set_block(&mut self, x: i64, y: i64, size: i64) {
        for py in y..y + size {
            for px in x..x + size {
                let mx = px - self.x0 as i64;
                let my = py - self.y0 as i64;
                if mx >= 0 && my >= 0 && (mx as usize) < self.w && (my as usize) < self.h {
                    self.cov[my as usize * self.w + mx as usize] = 1.0;
                }
            }
        }
    }

    /// Per-pixel max of two masks over the same rectangle
    fn union(&self, other: &Mask) -> Mask {
        debug_assert!(self.x0 == other.x0 && self.w == other.w && self.h == other.h);
        let mut out = self.clone();
        for (o, c) in out.cov.iter_mut().zip(&other.cov) {
            *o = o.max(*c);
        }
        out
    }

    /// Separable box blur; samples outside the mask count as empty
    fn box_blur(&mut self, radius: usize) {
        let mut line = Vec::with_capacity(self.w.max(self.h));
        let mut out = vec![0.0; self.w.max(self.h)];

        for my in 0..self.h {
            let row = &mut self.cov[my * self.w..(my + 1) * self.w];
            blur_line(row, &mut out[..self.w], radius);
            row.copy_from_slice(&out[..self.w]);
        }
        for mx in 0..self.w {
            line.clear();
            line.extend((0..self.h).map(|my| self.cov[my * self.w + mx]));
            blur_line(&line, &mut out[..self.h], radius);
            for my in 0..self.h {
                self.cov[my * self.w + mx] = out[my];
            }
        }
    }
}

/// Sliding-window mean over `[i - r, i + r]`
fn blur_line(input: &[f32], output: &mut [f32], r: usize) {
    let n = input.len();
    if n == 0 {
        return;
    }
    let norm = 1.0 / (2 * r + 1) as f32;
    let mut sum: f32 = input[..=r.min(n - 1)].iter().sum();
    for i in 0..n {
        output[i] = sum * norm;
        if i + r + 1 < n {
            sum += input[i + r + 1];
        }
        if i >= r {
            sum -= input[i - r];
        }
    }
}

fn bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
    )
}

/// Even-odd point in polygon test
fn contains(polygon: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
