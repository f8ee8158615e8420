//! Software rasterizer for a [`Drawing`], producing RGBA pixels and PNG bytes.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::models::color::Color;
use crate::render::RenderError;
use crate::render::drawing::{Drawing, LogoOverlay, Paint, Shape};

/// Sub-pixel sample offsets (2×2 grid).
const SAMPLES: [(f64, f64); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];

/// Source-over compositing of `src` at the given coverage.
fn blend(dst: &mut Rgba<u8>, src: Color, coverage: f64) {
    let sa = src.opacity() * coverage;
    if sa <= 0.0 {
        return;
    }
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let channels = [src.r, src.g, src.b];
    for (i, sc) in channels.iter().enumerate() {
        let sc = f64::from(*sc);
        let dc = f64::from(dst[i]);
        dst[i] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

fn fill_shape(canvas: &mut RgbaImage, shape: &Shape, paint: &Paint) {
    let (width, height) = canvas.dimensions();
    let (x0, y0, x1, y1) = shape.bounds();
    let px0 = x0.floor().max(0.0) as u32;
    let py0 = y0.floor().max(0.0) as u32;
    let px1 = (x1.ceil().max(0.0) as u32).min(width);
    let py1 = (y1.ceil().max(0.0) as u32).min(height);

    for py in py0..py1 {
        for px in px0..px1 {
            let (fx, fy) = (f64::from(px), f64::from(py));
            let hits = SAMPLES
                .iter()
                .filter(|(dx, dy)| shape.contains(fx + dx, fy + dy))
                .count();
            if hits == 0 {
                continue;
            }
            let color = paint.color_at(fx + 0.5, fy + 0.5);
            blend(
                canvas.get_pixel_mut(px, py),
                color,
                hits as f64 / SAMPLES.len() as f64,
            );
        }
    }
}

fn draw_logo(canvas: &mut RgbaImage, overlay: &LogoOverlay) {
    let source = overlay.logo.image.to_rgba8();
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 || overlay.side < 1.0 {
        return;
    }
    // fit inside the box, keeping the aspect ratio
    let scale = overlay.side / f64::from(w.max(h));
    let nw = ((f64::from(w) * scale).round() as u32).max(1);
    let nh = ((f64::from(h) * scale).round() as u32).max(1);
    let resized = imageops::resize(&source, nw, nh, FilterType::Triangle);

    let x = (overlay.x + (overlay.side - f64::from(nw)) / 2.0).floor() as i64;
    let y = (overlay.y + (overlay.side - f64::from(nh)) / 2.0).floor() as i64;
    imageops::overlay(canvas, &resized, x, y);
}

pub fn rasterize(drawing: &Drawing) -> RgbaImage {
    let mut canvas =
        RgbaImage::from_pixel(drawing.width, drawing.height, drawing.background.to_rgba());
    for layer in &drawing.layers {
        for shape in &layer.shapes {
            fill_shape(&mut canvas, shape, &layer.paint);
        }
    }
    if let Some(overlay) = &drawing.logo {
        draw_logo(&mut canvas, overlay);
    }
    canvas
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn to_png(drawing: &Drawing) -> Result<Vec<u8>, RenderError> {
    encode_png(&rasterize(drawing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::style::{BorderConfig, GradientConfig, LogoConfig, QrStyleConfig};
    use crate::render::layout::{Matrix, build};
    use crate::render::normalize::ResolvedStyle;
    use crate::render::test_support::tiny_png_base64;

    fn render(config: &QrStyleConfig) -> (RgbaImage, Vec<u8>) {
        let style = ResolvedStyle::resolve(config);
        let matrix = Matrix::encode("https://example.com", &style).unwrap();
        let image = rasterize(&build(&matrix, &style));
        let png = encode_png(&image).unwrap();
        (image, png)
    }

    #[test]
    fn blend_is_source_over() {
        let mut px = Rgba([255, 255, 255, 255]);
        blend(&mut px, Color::BLACK, 0.5);
        assert_eq!(px, Rgba([128, 128, 128, 255]));

        let mut px = Rgba([0, 0, 0, 0]);
        blend(&mut px, Color::rgb(10, 20, 30), 1.0);
        assert_eq!(px, Rgba([10, 20, 30, 255]));

        let mut px = Rgba([9, 9, 9, 255]);
        blend(&mut px, Color::WHITE, 0.0);
        assert_eq!(px, Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn default_png_is_200_square_and_crisp() {
        let (image, png) = render(&QrStyleConfig::default());
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));

        // quiet corner is background, finder outer ring starts at the grid origin
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(12, 12), &Rgba([0, 0, 0, 255]));
        assert!(
            image
                .pixels()
                .all(|p| *p == Rgba([0, 0, 0, 255]) || *p == Rgba([255, 255, 255, 255]))
        );
    }

    #[test]
    fn png_output_is_deterministic() {
        let config = QrStyleConfig {
            dot_style: Some("dots".to_string()),
            gradient: Some(GradientConfig::two_stop(None, "#ff0000", "#00ff00")),
            ..Default::default()
        };
        assert_eq!(render(&config).1, render(&config).1);
    }

    #[test]
    fn single_stop_gradient_renders_like_none() {
        let mut gradient = GradientConfig::two_stop(None, "#ff0000", "#0000ff");
        gradient.color_stops.truncate(1);
        let config = QrStyleConfig {
            gradient: Some(gradient),
            ..Default::default()
        };
        assert_eq!(render(&config).1, render(&QrStyleConfig::default()).1);
    }

    #[test]
    fn zero_width_border_renders_like_none() {
        let config = QrStyleConfig {
            border: Some(BorderConfig {
                width: Some(0.0),
                style: Some("dashed".to_string()),
                color: Some("#ff0000".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(render(&config).1, render(&QrStyleConfig::default()).1);
    }

    #[test]
    fn border_paints_canvas_edge() {
        let (image, _) = render(&QrStyleConfig {
            border: Some(BorderConfig {
                width: Some(4.0),
                color: Some("#ff0000".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(image.get_pixel(100, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 100), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(100, 6), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn logo_only_changes_the_center() {
        let (plain, _) = render(&QrStyleConfig::default());
        let (with_logo, _) = render(&QrStyleConfig {
            logo: Some(LogoConfig {
                image_data: Some(tiny_png_base64()),
                relative_size: Some(0.2),
            }),
            ..Default::default()
        });

        let center = with_logo.get_pixel(100, 100);
        assert!(center[0] > 150 && center[1] < 80 && center[3] == 255);

        // the 40px box at (80, 80) plus the modules it hides, at most one 7px module wide
        let near_box = |x: u32, y: u32| (73..127).contains(&x) && (73..127).contains(&y);
        for (x, y, pixel) in plain.enumerate_pixels() {
            if !near_box(x, y) {
                assert_eq!(pixel, with_logo.get_pixel(x, y), "pixel {},{}", x, y);
            }
        }
    }
}
