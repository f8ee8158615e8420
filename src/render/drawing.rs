//! Vector drawing tree shared by the SVG writer and the rasterizer.

use crate::models::color::Color;
use crate::render::normalize::{Gradient, GradientKind, Logo};

/// Axis-aligned rectangle with an independent radius per corner.
///
/// Radii are ordered top-left, top-right, bottom-right, bottom-left. A radius
/// equal to the full side turns that corner into a quarter disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub radii: [f64; 4],
}

impl RoundRect {
    pub fn square(x: f64, y: f64, side: f64) -> Self {
        Self {
            x,
            y,
            w: side,
            h: side,
            radii: [0.0; 4],
        }
    }

    pub fn with_radii(mut self, radii: [f64; 4]) -> Self {
        self.radii = radii;
        self
    }

    pub fn with_radius(self, r: f64) -> Self {
        self.with_radii([r; 4])
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        RoundRect::square(cx - r, cy - r, 2.0 * r).with_radius(r)
    }

    pub fn is_circle(&self) -> bool {
        self.w == self.h && self.radii.iter().all(|r| *r == self.w / 2.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        if px < self.x || py < self.y || px >= self.x + self.w || py >= self.y + self.h {
            return false;
        }
        let [tl, tr, br, bl] = self.radii;
        let (right, bottom) = (self.x + self.w, self.y + self.h);
        let corners = [
            (tl, px < self.x + tl && py < self.y + tl, self.x + tl, self.y + tl),
            (tr, px >= right - tr && py < self.y + tr, right - tr, self.y + tr),
            (br, px >= right - br && py >= bottom - br, right - br, bottom - br),
            (bl, px < self.x + bl && py >= bottom - bl, self.x + bl, bottom - bl),
        ];
        corners.iter().all(|&(r, in_box, cx, cy)| {
            !(r > 0.0 && in_box) || (px - cx).powi(2) + (py - cy).powi(2) <= r * r
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(RoundRect),
    /// `outer` minus `inner`; the inner rect lies strictly inside.
    Ring { outer: RoundRect, inner: RoundRect },
    /// Quarter annulus around `(cx, cy)`.
    Arc {
        cx: f64,
        cy: f64,
        outer_r: f64,
        inner_r: f64,
        quadrant: Quadrant,
    },
}

impl Shape {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match self {
            Shape::Rect(rect) => rect.contains(px, py),
            Shape::Ring { outer, inner } => outer.contains(px, py) && !inner.contains(px, py),
            Shape::Arc {
                cx,
                cy,
                outer_r,
                inner_r,
                quadrant,
            } => {
                let (dx, dy) = (px - cx, py - cy);
                let in_quadrant = match quadrant {
                    Quadrant::TopLeft => dx <= 0.0 && dy <= 0.0,
                    Quadrant::TopRight => dx >= 0.0 && dy <= 0.0,
                    Quadrant::BottomRight => dx >= 0.0 && dy >= 0.0,
                    Quadrant::BottomLeft => dx <= 0.0 && dy >= 0.0,
                };
                let d2 = dx * dx + dy * dy;
                in_quadrant && d2 <= outer_r * outer_r && d2 >= inner_r * inner_r
            }
        }
    }

    /// `(x0, y0, x1, y1)` bounds.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        match self {
            Shape::Rect(r) | Shape::Ring { outer: r, .. } => (r.x, r.y, r.x + r.w, r.y + r.h),
            Shape::Arc {
                cx,
                cy,
                outer_r,
                quadrant,
                ..
            } => match quadrant {
                Quadrant::TopLeft => (cx - outer_r, cy - outer_r, *cx, *cy),
                Quadrant::TopRight => (*cx, cy - outer_r, cx + outer_r, *cy),
                Quadrant::BottomRight => (*cx, *cy, cx + outer_r, cy + outer_r),
                Quadrant::BottomLeft => (cx - outer_r, *cy, *cx, cy + outer_r),
            },
        }
    }
}

/// Box a gradient is laid out against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Gradient { gradient: Gradient, frame: Frame },
}

/// Endpoints of a linear gradient spanning `frame` at `rotation`.
pub fn linear_endpoints(rotation: f64, frame: &Frame) -> ((f64, f64), (f64, f64)) {
    let (cx, cy) = (frame.x + frame.w / 2.0, frame.y + frame.h / 2.0);
    let (cos, sin) = (rotation.cos(), rotation.sin());
    let half = (frame.w * cos.abs() + frame.h * sin.abs()) / 2.0;
    ((cx - half * cos, cy - half * sin), (cx + half * cos, cy + half * sin))
}

pub fn radial_radius(frame: &Frame) -> f64 {
    (frame.w * frame.w + frame.h * frame.h).sqrt() / 2.0
}

impl Paint {
    /// Color at a point, with the pad spread the SVG output uses.
    pub fn color_at(&self, px: f64, py: f64) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Gradient { gradient, frame } => {
                let t = match gradient.kind {
                    GradientKind::Linear => {
                        let ((x0, y0), (x1, y1)) = linear_endpoints(gradient.rotation, frame);
                        let (dx, dy) = (x1 - x0, y1 - y0);
                        let len2 = dx * dx + dy * dy;
                        if len2 == 0.0 {
                            0.0
                        } else {
                            ((px - x0) * dx + (py - y0) * dy) / len2
                        }
                    }
                    GradientKind::Radial => {
                        let (cx, cy) = (frame.x + frame.w / 2.0, frame.y + frame.h / 2.0);
                        let r = radial_radius(frame);
                        if r == 0.0 {
                            0.0
                        } else {
                            ((px - cx).powi(2) + (py - cy).powi(2)).sqrt() / r
                        }
                    }
                };
                sample_stops(&gradient.stops, t)
            }
        }
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

fn sample_stops(stops: &[(f64, Color)], t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Color::BLACK,
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    for pair in stops.windows(2) {
        let ((o0, c0), (o1, c1)) = (pair[0], pair[1]);
        if t >= o0 && t <= o1 {
            let span = o1 - o0;
            let local = if span == 0.0 { 1.0 } else { (t - o0) / span };
            return Color {
                r: lerp_channel(c0.r, c1.r, local),
                g: lerp_channel(c0.g, c1.g, local),
                b: lerp_channel(c0.b, c1.b, local),
                a: lerp_channel(c0.a, c1.a, local),
            };
        }
    }
    last.1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Border,
    Dots,
    CornerSquares,
    CornerDots,
}

impl LayerKind {
    pub fn id(&self) -> &'static str {
        match self {
            LayerKind::Border => "border",
            LayerKind::Dots => "dots",
            LayerKind::CornerSquares => "corners-square",
            LayerKind::CornerDots => "corners-dot",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub paint: Paint,
    pub shapes: Vec<Shape>,
}

/// Centered logo box; modules under it are not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoOverlay {
    pub x: f64,
    pub y: f64,
    pub side: f64,
    pub logo: Logo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// Painted in order.
    pub layers: Vec<Layer>,
    pub logo: Option<LogoOverlay>,
}

impl Drawing {
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }
}
