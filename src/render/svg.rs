//! SVG serialization of a [`Drawing`].

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::models::color::Color;
use crate::render::drawing::{
    Drawing, Layer, Paint, Quadrant, RoundRect, Shape, linear_endpoints, radial_radius,
};
use crate::render::normalize::GradientKind;

/// Two decimals, trailing zeros dropped, so output is stable across runs.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn color_attrs(attr: &str, opacity_attr: &str, color: Color) -> String {
    let mut out = format!("{}=\"#{}\"", attr, color.hex_digits());
    if !color.is_opaque() {
        let _ = write!(out, " {}=\"{}\"", opacity_attr, num(color.opacity()));
    }
    out
}

fn round_rect_path(out: &mut String, rect: &RoundRect) {
    let RoundRect { x, y, w, h, radii } = *rect;
    let [tl, tr, br, bl] = radii;
    fn arc(out: &mut String, r: f64, ex: f64, ey: f64) {
        if r > 0.0 {
            let _ = write!(out, "A{} {} 0 0 1 {} {}", num(r), num(r), num(ex), num(ey));
        }
    }

    let _ = write!(out, "M{} {}", num(x + tl), num(y));
    let _ = write!(out, "H{}", num(x + w - tr));
    arc(out, tr, x + w, y + tr);
    let _ = write!(out, "V{}", num(y + h - br));
    arc(out, br, x + w - br, y + h);
    let _ = write!(out, "H{}", num(x + bl));
    arc(out, bl, x, y + h - bl);
    let _ = write!(out, "V{}", num(y + tl));
    arc(out, tl, x + tl, y);
    out.push('Z');
}

fn arc_path(out: &mut String, cx: f64, cy: f64, outer_r: f64, inner_r: f64, quadrant: Quadrant) {
    let start = match quadrant {
        Quadrant::BottomRight => 0.0,
        Quadrant::BottomLeft => 90.0,
        Quadrant::TopLeft => 180.0,
        Quadrant::TopRight => 270.0,
    };
    let point = |r: f64, deg: f64| {
        let rad = f64::to_radians(deg);
        (cx + r * rad.cos(), cy + r * rad.sin())
    };
    let (ox0, oy0) = point(outer_r, start);
    let (ox1, oy1) = point(outer_r, start + 90.0);
    let _ = write!(
        out,
        "M{} {}A{} {} 0 0 1 {} {}",
        num(ox0),
        num(oy0),
        num(outer_r),
        num(outer_r),
        num(ox1),
        num(oy1)
    );
    if inner_r > 0.0 {
        let (ix1, iy1) = point(inner_r, start + 90.0);
        let (ix0, iy0) = point(inner_r, start);
        let _ = write!(
            out,
            "L{} {}A{} {} 0 0 0 {} {}",
            num(ix1),
            num(iy1),
            num(inner_r),
            num(inner_r),
            num(ix0),
            num(iy0)
        );
    } else {
        let _ = write!(out, "L{} {}", num(cx), num(cy));
    }
    out.push('Z');
}

fn shape_element(out: &mut String, shape: &Shape) {
    match shape {
        Shape::Rect(rect) if rect.radii == [0.0; 4] => {
            let _ = write!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                num(rect.x),
                num(rect.y),
                num(rect.w),
                num(rect.h)
            );
        }
        Shape::Rect(rect) if rect.is_circle() => {
            let r = rect.w / 2.0;
            let _ = write!(
                out,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"/>",
                num(rect.x + r),
                num(rect.y + r),
                num(r)
            );
        }
        Shape::Rect(rect) => {
            out.push_str("<path d=\"");
            round_rect_path(out, rect);
            out.push_str("\"/>");
        }
        Shape::Ring { outer, inner } => {
            out.push_str("<path fill-rule=\"evenodd\" d=\"");
            round_rect_path(out, outer);
            round_rect_path(out, inner);
            out.push_str("\"/>");
        }
        Shape::Arc {
            cx,
            cy,
            outer_r,
            inner_r,
            quadrant,
        } => {
            out.push_str("<path d=\"");
            arc_path(out, *cx, *cy, *outer_r, *inner_r, *quadrant);
            out.push_str("\"/>");
        }
    }
}

fn gradient_def(out: &mut String, layer: &Layer) {
    let Paint::Gradient { gradient, frame } = &layer.paint else {
        return;
    };
    let id = format!("{}-gradient", layer.kind.id());
    let tag = match gradient.kind {
        GradientKind::Linear => {
            let ((x1, y1), (x2, y2)) = linear_endpoints(gradient.rotation, frame);
            let _ = write!(
                out,
                "<linearGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">",
                id,
                num(x1),
                num(y1),
                num(x2),
                num(y2)
            );
            "linearGradient"
        }
        GradientKind::Radial => {
            let _ = write!(
                out,
                "<radialGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" cx=\"{}\" cy=\"{}\" r=\"{}\">",
                id,
                num(frame.x + frame.w / 2.0),
                num(frame.y + frame.h / 2.0),
                num(radial_radius(frame))
            );
            "radialGradient"
        }
    };
    for (offset, color) in &gradient.stops {
        let _ = write!(
            out,
            "<stop offset=\"{}\" {}/>",
            num(*offset),
            color_attrs("stop-color", "stop-opacity", *color)
        );
    }
    let _ = write!(out, "</{}>", tag);
}

pub fn to_svg(drawing: &Drawing) -> String {
    let mut out = String::new();
    let (w, h) = (drawing.width, drawing.height);
    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );

    if drawing
        .layers
        .iter()
        .any(|l| matches!(l.paint, Paint::Gradient { .. }))
    {
        out.push_str("<defs>");
        for layer in &drawing.layers {
            gradient_def(&mut out, layer);
        }
        out.push_str("</defs>");
    }

    let _ = write!(
        out,
        "<rect width=\"{w}\" height=\"{h}\" {}/>",
        color_attrs("fill", "fill-opacity", drawing.background)
    );

    for layer in &drawing.layers {
        let fill = match &layer.paint {
            Paint::Solid(color) => color_attrs("fill", "fill-opacity", *color),
            Paint::Gradient { .. } => format!("fill=\"url(#{}-gradient)\"", layer.kind.id()),
        };
        let _ = write!(out, "<g id=\"{}\" {}>", layer.kind.id(), fill);
        for shape in &layer.shapes {
            shape_element(&mut out, shape);
        }
        out.push_str("</g>");
    }

    if let Some(overlay) = &drawing.logo {
        let _ = write!(
            out,
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" href=\"data:{};base64,{}\"/>",
            num(overlay.x),
            num(overlay.y),
            num(overlay.side),
            num(overlay.side),
            overlay.logo.mime,
            STANDARD.encode(&overlay.logo.bytes)
        );
    }

    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::style::{GradientConfig, LogoConfig, QrStyleConfig};
    use crate::render::layout::{Matrix, build};
    use crate::render::normalize::ResolvedStyle;
    use crate::render::test_support::tiny_png_base64;

    fn render(config: QrStyleConfig) -> String {
        let style = ResolvedStyle::resolve(&config);
        let matrix = Matrix::encode("https://example.com", &style).unwrap();
        to_svg(&build(&matrix, &style))
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(3.0), "3");
        assert_eq!(num(3.5), "3.5");
        assert_eq!(num(0.333333), "0.33");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn rounded_rect_path_skips_square_corners() {
        let mut d = String::new();
        round_rect_path(
            &mut d,
            &RoundRect::square(0.0, 0.0, 10.0).with_radii([5.0, 0.0, 0.0, 0.0]),
        );
        assert_eq!(d, "M5 0H10V10H0V5A5 5 0 0 1 5 0Z");
    }

    #[test]
    fn quarter_arc_path() {
        let mut d = String::new();
        arc_path(&mut d, 10.0, 10.0, 10.0, 6.0, Quadrant::TopLeft);
        assert_eq!(d, "M0 10A10 10 0 0 1 10 0L10 4A6 6 0 0 0 4 10Z");
    }

    #[test]
    fn default_svg_layout() {
        let svg = render(QrStyleConfig::default());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"200\""));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<rect width=\"200\" height=\"200\" fill=\"#ffffff\"/>"));
        assert!(svg.contains("<g id=\"dots\" fill=\"#000000\">"));
        assert!(svg.contains("<g id=\"corners-square\" fill=\"#000000\">"));
        assert!(!svg.contains("<defs>"));
        assert!(!svg.contains("id=\"border\""));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn svg_is_deterministic() {
        let config = QrStyleConfig {
            dot_style: Some("classy-rounded".to_string()),
            eye_style: Some("extra-rounded".to_string()),
            ..Default::default()
        };
        assert_eq!(render(config.clone()), render(config));
    }

    #[test]
    fn gradient_and_alpha_are_emitted() {
        let svg = render(QrStyleConfig {
            background: Some("#ffffff80".to_string()),
            gradient: Some(GradientConfig::two_stop(
                Some("radial".to_string()),
                "#ff0000",
                "#0000ff",
            )),
            ..Default::default()
        });
        assert!(svg.contains("<radialGradient id=\"dots-gradient\""));
        assert!(svg.contains("<stop offset=\"0\" stop-color=\"#ff0000\"/>"));
        assert!(svg.contains("fill=\"url(#dots-gradient)\""));
        assert!(svg.contains("fill=\"#ffffff\" fill-opacity=\"0.5\""));
    }

    #[test]
    fn logo_is_embedded_as_data_url() {
        let svg = render(QrStyleConfig {
            logo: Some(LogoConfig {
                image_data: Some(tiny_png_base64()),
                relative_size: None,
            }),
            ..Default::default()
        });
        let expected = format!(
            "<image x=\"80\" y=\"80\" width=\"40\" height=\"40\" preserveAspectRatio=\"xMidYMid meet\" href=\"data:image/png;base64,{}\"/>",
            tiny_png_base64()
        );
        assert!(svg.contains(&expected));
    }
}
