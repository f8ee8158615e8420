use crate::render::drawing::{Frame, Layer, LayerKind, Paint, Quadrant, RoundRect, Shape};
use crate::render::normalize::{Border, BorderStyle};

#[derive(Clone, Copy)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Rect inset by `d` on every side, radius shrunk to match.
fn inset(side: f64, radius: f64, d: f64) -> RoundRect {
    RoundRect::square(d, d, side - 2.0 * d).with_radius((radius - d).max(0.0))
}

fn band(side: f64, radius: f64, from: f64, to: f64) -> Shape {
    Shape::Ring {
        outer: inset(side, radius, from),
        inner: inset(side, radius, to),
    }
}

/// Dash starts along a run of `length`, centered, with `dash` pieces and `gap` spacing.
fn dash_starts(length: f64, dash: f64, gap: f64) -> Vec<f64> {
    let count = ((length + gap) / (dash + gap)).floor();
    if count < 1.0 {
        return Vec::new();
    }
    let count = count as usize;
    let total = count as f64 * dash + (count - 1) as f64 * gap;
    let first = (length - total) / 2.0;
    (0..count).map(|i| first + i as f64 * (dash + gap)).collect()
}

fn patterned(side: f64, border: &Border, dotted: bool) -> Vec<Shape> {
    let w = f64::from(border.width);
    let r = f64::from(border.radius);
    let arcs = r > 0.0 && r >= w;
    let corner = if arcs { r } else { w };
    let mut shapes = Vec::new();

    if arcs {
        let inner_r = r - w;
        for (cx, cy, quadrant) in [
            (r, r, Quadrant::TopLeft),
            (side - r, r, Quadrant::TopRight),
            (side - r, side - r, Quadrant::BottomRight),
            (r, side - r, Quadrant::BottomLeft),
        ] {
            shapes.push(Shape::Arc {
                cx,
                cy,
                outer_r: r,
                inner_r,
                quadrant,
            });
        }
    } else {
        for (x, y) in [(0.0, 0.0), (side - w, 0.0), (side - w, side - w), (0.0, side - w)] {
            let piece = if dotted {
                RoundRect::circle(x + w / 2.0, y + w / 2.0, w / 2.0)
            } else {
                RoundRect::square(x, y, w)
            };
            shapes.push(Shape::Rect(piece));
        }
    }

    let (mut dash, gap) = if dotted { (w, w) } else { (3.0 * w, 2.0 * w) };
    let run = side - 2.0 * corner;
    let mut starts = dash_starts(run, dash, gap);
    if starts.is_empty() && !dotted && run > 0.0 {
        // too short for the pattern: one dash spanning the run
        dash = run;
        starts.push(0.0);
    }

    for edge in [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left] {
        for start in &starts {
            let along = corner + start;
            let (x, y, horizontal) = match edge {
                Edge::Top => (along, 0.0, true),
                Edge::Bottom => (along, side - w, true),
                Edge::Left => (0.0, along, false),
                Edge::Right => (side - w, along, false),
            };
            let piece = if dotted {
                RoundRect::circle(x + w / 2.0, y + w / 2.0, w / 2.0)
            } else if horizontal {
                RoundRect {
                    x,
                    y,
                    w: dash,
                    h: w,
                    radii: [0.0; 4],
                }
            } else {
                RoundRect {
                    x,
                    y,
                    w,
                    h: dash,
                    radii: [0.0; 4],
                }
            };
            shapes.push(Shape::Rect(piece));
        }
    }
    shapes
}

/// Decorative ring around the whole `side × side` canvas.
pub fn border_layer(border: &Border, side: u32) -> Layer {
    let side_f = f64::from(side);
    let w = f64::from(border.width);
    let r = f64::from(border.radius).min(side_f / 2.0);

    let shapes = match border.style {
        BorderStyle::Solid => vec![band(side_f, r, 0.0, w)],
        BorderStyle::Double if border.width >= 3 => {
            let t = (w / 3.0).round().max(1.0);
            vec![band(side_f, r, 0.0, t), band(side_f, r, w - t, w)]
        }
        BorderStyle::Double => vec![band(side_f, r, 0.0, w)],
        BorderStyle::Dashed => patterned(side_f, border, false),
        BorderStyle::Dotted => patterned(side_f, border, true),
    };

    let paint = match &border.gradient {
        Some(gradient) => Paint::Gradient {
            gradient: gradient.clone(),
            frame: Frame {
                x: 0.0,
                y: 0.0,
                w: side_f,
                h: side_f,
            },
        },
        None => Paint::Solid(border.color),
    };

    Layer {
        kind: LayerKind::Border,
        paint,
        shapes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::color::Color;

    fn border(style: BorderStyle, width: u32, radius: u32) -> Border {
        Border {
            width,
            style,
            color: Color::rgb(10, 20, 30),
            radius,
            margin: 10,
            gradient: None,
        }
    }

    #[test]
    fn solid_border_is_one_ring() {
        let layer = border_layer(&border(BorderStyle::Solid, 4, 0), 200);
        assert_eq!(layer.shapes.len(), 1);
        assert_eq!(layer.paint, Paint::Solid(Color::rgb(10, 20, 30)));
        let ring = &layer.shapes[0];
        assert!(ring.contains(1.0, 100.0));
        assert!(!ring.contains(5.0, 100.0));
        assert!(ring.contains(199.0, 199.0));
    }

    #[test]
    fn rounded_solid_border_clears_canvas_corner() {
        let layer = border_layer(&border(BorderStyle::Solid, 4, 20), 200);
        assert!(!layer.shapes[0].contains(0.5, 0.5));
        assert!(layer.shapes[0].contains(100.0, 0.5));
    }

    #[test]
    fn double_border_has_gap() {
        let layer = border_layer(&border(BorderStyle::Double, 9, 0), 200);
        assert_eq!(layer.shapes.len(), 2);
        let covered = |x: f64| layer.shapes.iter().any(|s| s.contains(x, 100.0));
        assert!(covered(1.0));
        assert!(!covered(4.5));
        assert!(covered(7.5));
        assert!(!covered(9.5));
    }

    #[test]
    fn thin_double_border_falls_back_to_solid() {
        let layer = border_layer(&border(BorderStyle::Double, 2, 0), 200);
        assert_eq!(layer.shapes.len(), 1);
    }

    #[test]
    fn dashed_border_alternates() {
        let layer = border_layer(&border(BorderStyle::Dashed, 4, 0), 200);
        // four corner squares plus dashes on each edge
        assert!(layer.shapes.len() > 4);
        assert_eq!((layer.shapes.len() - 4) % 4, 0);
        let top: Vec<bool> = (0..200)
            .map(|x| layer.shapes.iter().any(|s| s.contains(x as f64 + 0.5, 1.0)))
            .collect();
        assert!(top.contains(&false));
        assert!(top[0] && top[199]);
    }

    #[test]
    fn dotted_border_with_radius_uses_arcs() {
        let layer = border_layer(&border(BorderStyle::Dotted, 4, 16), 200);
        let arcs = layer
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Arc { .. }))
            .count();
        assert_eq!(arcs, 4);
        assert!(
            layer
                .shapes
                .iter()
                .filter(|s| matches!(s, Shape::Rect(r) if r.is_circle()))
                .count()
                > 0
        );
    }

    #[test]
    fn dash_starts_are_centered() {
        assert_eq!(dash_starts(10.0, 2.0, 2.0), vec![0.0, 4.0, 8.0]);
        assert_eq!(dash_starts(11.0, 2.0, 2.0), vec![0.5, 4.5, 8.5]);
        assert!(dash_starts(1.0, 2.0, 2.0).is_empty());
    }
}
