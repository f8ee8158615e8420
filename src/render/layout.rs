//! Turns an encoded module matrix and a [`ResolvedStyle`] into a [`Drawing`].

use std::borrow::Cow;

use qrcode::QrCode;

use crate::render::RenderError;
use crate::render::border::border_layer;
use crate::render::drawing::{
    Drawing, Frame, Layer, LayerKind, LogoOverlay, Paint, RoundRect, Shape,
};
use crate::render::normalize::{ModuleShape, ResolvedStyle};

/// Dark/light modules of an encoded symbol, quiet zone excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    pub count: usize,
    dark: Vec<bool>,
}

impl Matrix {
    pub fn encode(content: &str, style: &ResolvedStyle) -> Result<Matrix, RenderError> {
        let code = QrCode::with_error_correction_level(
            content.as_bytes(),
            style.error_correction.to_qrcode(),
        )?;
        let count = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();
        Ok(Matrix { count, dark })
    }

    pub fn is_dark(&self, row: isize, col: isize) -> bool {
        let n = self.count as isize;
        if row < 0 || col < 0 || row >= n || col >= n {
            return false;
        }
        self.dark[row as usize * self.count + col as usize]
    }

    /// Inside one of the three 7×7 finder patterns.
    pub fn in_finder(&self, row: usize, col: usize) -> bool {
        let far = self.count.saturating_sub(7);
        (row < 7 && col < 7) || (row < 7 && col >= far) || (row >= far && col < 7)
    }
}

/// Pixel placement of the module grid on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub module: f64,
    pub count: usize,
}

impl Grid {
    pub fn place(style: &ResolvedStyle, count: usize) -> Grid {
        let inset = style.border.as_ref().map_or(0, |b| b.width + b.margin);
        let area = style.size.saturating_sub(2 * inset);
        let usable = area.saturating_sub(2 * style.margin);
        let module = (usable / count.max(1) as u32).max(1);
        let code = i64::from(module) * count as i64;
        let offset = i64::from(inset) + (i64::from(area) - code) / 2;
        Grid {
            origin_x: offset as f64,
            origin_y: offset as f64,
            module: f64::from(module),
            count,
        }
    }

    pub fn frame(&self) -> Frame {
        let side = self.module * self.count as f64;
        Frame {
            x: self.origin_x,
            y: self.origin_y,
            w: side,
            h: side,
        }
    }

    fn cell(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.module,
            self.origin_y + row as f64 * self.module,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Neighbours {
    top: bool,
    right: bool,
    bottom: bool,
    left: bool,
}

impl Neighbours {
    fn of(matrix: &Matrix, row: usize, col: usize) -> Self {
        let (r, c) = (row as isize, col as isize);
        Neighbours {
            top: matrix.is_dark(r - 1, c),
            right: matrix.is_dark(r, c + 1),
            bottom: matrix.is_dark(r + 1, c),
            left: matrix.is_dark(r, c - 1),
        }
    }

    fn count(&self) -> usize {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .filter(|n| **n)
            .count()
    }

    /// Corners (tl, tr, br, bl) whose two adjacent sides have no neighbour.
    fn free_corners(&self) -> [bool; 4] {
        [
            !self.top && !self.left,
            !self.top && !self.right,
            !self.bottom && !self.right,
            !self.bottom && !self.left,
        ]
    }
}

fn dot_radii(shape: ModuleShape, s: f64, neighbours: Neighbours) -> [f64; 4] {
    let free = neighbours.free_corners();
    let pick = |r: f64, mask: [bool; 4]| {
        let mut radii = [0.0; 4];
        for i in 0..4 {
            if free[i] && mask[i] {
                radii[i] = r;
            }
        }
        radii
    };
    const ALL: [bool; 4] = [true; 4];
    const DIAGONAL: [bool; 4] = [true, false, true, false];

    match shape {
        ModuleShape::Square => [0.0; 4],
        ModuleShape::Dots | ModuleShape::Dot => [s / 2.0; 4],
        ModuleShape::Rounded => pick(s / 2.0, ALL),
        ModuleShape::ExtraRounded if neighbours.count() == 2 => pick(s, ALL),
        ModuleShape::ExtraRounded => pick(s / 2.0, ALL),
        ModuleShape::Classy => pick(s / 2.0, DIAGONAL),
        ModuleShape::ClassyRounded => pick(s, DIAGONAL),
    }
}

/// Outer and inner radii of the 7×7 corner ring.
fn corner_square_radii(shape: ModuleShape, s: f64) -> ([f64; 4], [f64; 4]) {
    match shape {
        ModuleShape::Square => ([0.0; 4], [0.0; 4]),
        ModuleShape::Dots | ModuleShape::Dot => ([3.5 * s; 4], [2.5 * s; 4]),
        ModuleShape::Rounded => ([1.5 * s; 4], [0.5 * s; 4]),
        ModuleShape::ExtraRounded => ([2.5 * s; 4], [1.5 * s; 4]),
        ModuleShape::Classy => ([2.5 * s, 0.0, 2.5 * s, 0.0], [1.5 * s, 0.0, 1.5 * s, 0.0]),
        ModuleShape::ClassyRounded => ([3.5 * s, s, 3.5 * s, s], [2.5 * s, 0.0, 2.5 * s, 0.0]),
    }
}

/// Radii of the 3×3 corner dot.
fn corner_dot_radii(shape: ModuleShape, s: f64) -> [f64; 4] {
    match shape {
        ModuleShape::Square => [0.0; 4],
        ModuleShape::Dots | ModuleShape::Dot => [1.5 * s; 4],
        ModuleShape::Rounded => [0.5 * s; 4],
        ModuleShape::ExtraRounded => [s; 4],
        ModuleShape::Classy => [1.5 * s, 0.0, 1.5 * s, 0.0],
        ModuleShape::ClassyRounded => [1.5 * s, 0.5 * s, 1.5 * s, 0.5 * s],
    }
}

/// Logo box as `(x, y, side)` in canvas pixels.
fn logo_box(style: &ResolvedStyle) -> Option<(f64, f64, f64)> {
    let logo = style.logo.as_ref()?;
    let size = f64::from(style.size);
    let side = (logo.relative_size * size).round();
    let origin = ((size - side) / 2.0).floor();
    Some((origin, origin, side))
}

fn overlaps(rect: (f64, f64, f64), other: (f64, f64, f64)) -> bool {
    let (x, y, s) = rect;
    let (ox, oy, os) = other;
    x < ox + os && x + s > ox && y < oy + os && y + s > oy
}

/// Smallest canvas that holds `count` one-pixel modules plus quiet zone and border.
pub fn min_canvas(style: &ResolvedStyle, count: usize) -> u32 {
    let inset = style.border.as_ref().map_or(0, |b| b.width + b.margin);
    count as u32 + 2 * (style.margin + inset)
}

/// Grow the canvas when the symbol would not fit at one pixel per module.
fn fit_canvas(style: &ResolvedStyle, count: usize) -> Cow<'_, ResolvedStyle> {
    let required = min_canvas(style, count);
    if style.size >= required {
        return Cow::Borrowed(style);
    }
    log::debug!(
        "{} modules do not fit a {}px canvas, using {}px",
        count,
        style.size,
        required
    );
    Cow::Owned(ResolvedStyle {
        size: required,
        ..style.clone()
    })
}

pub fn build(matrix: &Matrix, style: &ResolvedStyle) -> Drawing {
    let style = fit_canvas(style, matrix.count);
    let style = style.as_ref();
    let grid = Grid::place(style, matrix.count);
    let s = grid.module;
    let reserved = logo_box(style);

    let mut dots = Vec::new();
    for row in 0..matrix.count {
        for col in 0..matrix.count {
            if !matrix.is_dark(row as isize, col as isize) || matrix.in_finder(row, col) {
                continue;
            }
            let (x, y) = grid.cell(row, col);
            if reserved.is_some_and(|area| overlaps((x, y, s), area)) {
                continue;
            }
            let radii = dot_radii(style.dot_style, s, Neighbours::of(matrix, row, col));
            dots.push(Shape::Rect(RoundRect::square(x, y, s).with_radii(radii)));
        }
    }

    let far = matrix.count.saturating_sub(7);
    let finders = [(0, 0), (0, far), (far, 0)];
    let (outer_radii, inner_radii) = corner_square_radii(style.eye_style, s);
    let dot_corner_radii = corner_dot_radii(style.eye_ball_style, s);

    let mut corner_squares = Vec::new();
    let mut corner_dots = Vec::new();
    for (row, col) in finders {
        let (x, y) = grid.cell(row, col);
        corner_squares.push(Shape::Ring {
            outer: RoundRect::square(x, y, 7.0 * s).with_radii(outer_radii),
            inner: RoundRect::square(x + s, y + s, 5.0 * s).with_radii(inner_radii),
        });
        corner_dots.push(Shape::Rect(
            RoundRect::square(x + 2.0 * s, y + 2.0 * s, 3.0 * s).with_radii(dot_corner_radii),
        ));
    }

    let dot_paint = match &style.gradient {
        Some(gradient) => Paint::Gradient {
            gradient: gradient.clone(),
            frame: grid.frame(),
        },
        None => Paint::Solid(style.foreground),
    };

    let mut layers = Vec::with_capacity(4);
    if let Some(border) = &style.border {
        layers.push(border_layer(border, style.size));
    }
    layers.push(Layer {
        kind: LayerKind::Dots,
        paint: dot_paint,
        shapes: dots,
    });
    layers.push(Layer {
        kind: LayerKind::CornerSquares,
        paint: Paint::Solid(style.corner_square_color),
        shapes: corner_squares,
    });
    layers.push(Layer {
        kind: LayerKind::CornerDots,
        paint: Paint::Solid(style.corner_dot_color),
        shapes: corner_dots,
    });

    let logo = match (reserved, &style.logo) {
        (Some((x, y, side)), Some(logo)) => Some(LogoOverlay {
            x,
            y,
            side,
            logo: logo.clone(),
        }),
        _ => None,
    };

    Drawing {
        width: style.size,
        height: style.size,
        background: style.background,
        layers,
        logo,
    }
}
