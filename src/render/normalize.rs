//! Normalization of loosely typed style input into a [`ResolvedStyle`].
//!
//! Nothing in here fails: every missing or malformed field is replaced by a
//! documented default and the substitution is logged at `debug` level.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;

use crate::models::color::Color;
use crate::models::style::{BorderConfig, GradientConfig, LogoConfig, QrStyleConfig};

pub const DEFAULT_SIZE: u32 = 200;
pub const MIN_SIZE: u32 = 50;
pub const MAX_SIZE: u32 = 2000;
pub const DEFAULT_MARGIN: u32 = 1;
pub const DEFAULT_LOGO_SIZE: f64 = 0.2;
pub const DEFAULT_BORDER_WIDTH: u32 = 2;
pub const MAX_BORDER_WIDTH: u32 = 50;
pub const DEFAULT_BORDER_MARGIN: u32 = 10;
pub const MAX_BORDER_MARGIN: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    fn parse(value: &str) -> Option<EcLevel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Some(EcLevel::L),
            "m" | "medium" => Some(EcLevel::M),
            "q" | "quartile" => Some(EcLevel::Q),
            "h" | "high" => Some(EcLevel::H),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        }
    }

    pub fn to_qrcode(self) -> qrcode::EcLevel {
        match self {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Shape family shared by the dot, corner-square and corner-dot layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleShape {
    Square,
    Dots,
    Rounded,
    ExtraRounded,
    Classy,
    ClassyRounded,
    Dot,
}

impl ModuleShape {
    pub const ALL: [ModuleShape; 7] = [
        ModuleShape::Square,
        ModuleShape::Dots,
        ModuleShape::Rounded,
        ModuleShape::ExtraRounded,
        ModuleShape::Classy,
        ModuleShape::ClassyRounded,
        ModuleShape::Dot,
    ];

    fn parse(value: &str) -> Option<ModuleShape> {
        let key = value.trim().to_ascii_lowercase().replace('_', "-");
        ModuleShape::ALL.into_iter().find(|shape| shape.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleShape::Square => "square",
            ModuleShape::Dots => "dots",
            ModuleShape::Rounded => "rounded",
            ModuleShape::ExtraRounded => "extra-rounded",
            ModuleShape::Classy => "classy",
            ModuleShape::ClassyRounded => "classy-rounded",
            ModuleShape::Dot => "dot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    /// Radians, clockwise from the positive x axis.
    pub rotation: f64,
    /// Sorted by offset, offsets within `[0, 1]`, at least two entries.
    pub stops: Vec<(f64, Color)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    fn parse(value: &str) -> Option<BorderStyle> {
        match value.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(BorderStyle::Solid),
            "dashed" => Some(BorderStyle::Dashed),
            "dotted" => Some(BorderStyle::Dotted),
            "double" => Some(BorderStyle::Double),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub width: u32,
    pub style: BorderStyle,
    pub color: Color,
    pub radius: u32,
    pub margin: u32,
    pub gradient: Option<Gradient>,
}

#[derive(Debug, Clone)]
pub struct Logo {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub image: DynamicImage,
    pub relative_size: f64,
}

impl PartialEq for Logo {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes && self.relative_size == other.relative_size
    }
}

/// Fully populated style; every field holds a usable value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub size: u32,
    pub margin: u32,
    pub foreground: Color,
    pub background: Color,
    pub error_correction: EcLevel,
    pub dot_style: ModuleShape,
    pub eye_style: ModuleShape,
    pub eye_ball_style: ModuleShape,
    pub corner_square_color: Color,
    pub corner_dot_color: Color,
    pub gradient: Option<Gradient>,
    pub logo: Option<Logo>,
    pub border: Option<Border>,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        ResolvedStyle::resolve(&QrStyleConfig::default())
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn normalize_size(value: Option<f64>) -> u32 {
    match finite(value).map(f64::round) {
        None => DEFAULT_SIZE,
        Some(v) if v >= f64::from(MIN_SIZE) && v <= f64::from(MAX_SIZE) => v as u32,
        Some(v) => {
            log::debug!("size {} out of range, using {}", v, DEFAULT_SIZE);
            DEFAULT_SIZE
        }
    }
}

fn normalize_margin(value: Option<f64>, size: u32) -> u32 {
    match finite(value).map(f64::floor) {
        Some(v) if v >= 0.0 && v <= f64::from(size / 4) => v as u32,
        None => DEFAULT_MARGIN,
        Some(v) => {
            log::debug!("margin {} out of range, using {}", v, DEFAULT_MARGIN);
            DEFAULT_MARGIN
        }
    }
}

fn normalize_shape(value: Option<&str>, field: &str) -> ModuleShape {
    match value {
        None => ModuleShape::Square,
        Some(raw) => ModuleShape::parse(raw).unwrap_or_else(|| {
            log::debug!("unknown {} {:?}, using square", field, raw);
            ModuleShape::Square
        }),
    }
}

/// `None` when fewer than two stops are supplied.
fn normalize_gradient(config: Option<&GradientConfig>) -> Option<Gradient> {
    let config = config?;
    let count = config.color_stops.len();
    if count < 2 {
        log::debug!("gradient with {} stop(s) ignored", count);
        return None;
    }

    let kind = match config.kind.as_deref().map(str::trim) {
        Some(k) if k.eq_ignore_ascii_case("radial") => GradientKind::Radial,
        _ => GradientKind::Linear,
    };

    let mut stops: Vec<(f64, Color)> = config
        .color_stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let spread = i as f64 / (count - 1) as f64;
            let offset = finite(stop.offset).unwrap_or(spread).clamp(0.0, 1.0);
            let color = Color::parse_or(stop.color.as_deref(), Color::BLACK, "gradient stop");
            (offset, color)
        })
        .collect();
    // stable sort keeps submission order for equal offsets
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));

    Some(Gradient {
        kind,
        rotation: finite(config.rotation).unwrap_or(0.0),
        stops,
    })
}

/// Decode bare base64 or a `data:<mime>;base64,` URL.
fn decode_image_data(data: &str) -> Option<Vec<u8>> {
    let data = data.trim();
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, body)| body)?,
        None => data,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned.as_bytes()).ok()
}

fn normalize_logo(config: Option<&LogoConfig>) -> Option<Logo> {
    let config = config?;
    let raw = config.image_data.as_deref().filter(|d| !d.trim().is_empty())?;

    let Some(bytes) = decode_image_data(raw) else {
        log::debug!("logo image data is not valid base64, logo dropped");
        return None;
    };
    let format = image::guess_format(&bytes).ok();
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(e) => {
            log::debug!("logo image could not be decoded ({}), logo dropped", e);
            return None;
        }
    };

    let relative_size = match finite(config.relative_size) {
        Some(v) if v > 0.0 && v < 1.0 => v,
        _ => DEFAULT_LOGO_SIZE,
    };

    Some(Logo {
        bytes,
        mime: format.map(|f| f.to_mime_type()).unwrap_or("image/png"),
        image,
        relative_size,
    })
}

fn normalize_border(config: Option<&BorderConfig>, size: u32) -> Option<Border> {
    let config = config?;
    let width = match finite(config.width).map(f64::round) {
        Some(w) if w >= 1.0 && w <= f64::from(MAX_BORDER_WIDTH) => w as u32,
        Some(w) if w > f64::from(MAX_BORDER_WIDTH) => {
            log::debug!("border width {} too large, using {}", w, DEFAULT_BORDER_WIDTH);
            DEFAULT_BORDER_WIDTH
        }
        _ => return None,
    };

    let margin = match finite(config.margin).map(f64::round) {
        Some(m) if m >= 0.0 && m <= f64::from(MAX_BORDER_MARGIN) => m as u32,
        _ => DEFAULT_BORDER_MARGIN,
    };

    if width + margin > size / 4 {
        log::debug!(
            "border width {} + margin {} leaves no room on a {}px canvas, border dropped",
            width,
            margin,
            size
        );
        return None;
    }

    let radius = match finite(config.radius).map(f64::round) {
        Some(r) if r > 0.0 => (r as u32).min(size / 2),
        _ => 0,
    };

    let style = match config.style.as_deref() {
        None => BorderStyle::Solid,
        Some(raw) => BorderStyle::parse(raw).unwrap_or(BorderStyle::Solid),
    };

    Some(Border {
        width,
        style,
        color: Color::parse_or(config.color.as_deref(), Color::BLACK, "border color"),
        radius,
        margin,
        gradient: normalize_gradient(config.gradient.as_ref()),
    })
}

impl ResolvedStyle {
    pub fn resolve(config: &QrStyleConfig) -> ResolvedStyle {
        let size = normalize_size(config.size);
        let foreground = Color::parse_or(config.foreground.as_deref(), Color::BLACK, "foreground");

        let error_correction = match config.error_correction_level.as_deref() {
            None => EcLevel::M,
            Some(raw) => EcLevel::parse(raw).unwrap_or_else(|| {
                log::debug!("unknown error correction level {:?}, using M", raw);
                EcLevel::M
            }),
        };

        ResolvedStyle {
            size,
            margin: normalize_margin(config.margin, size),
            foreground,
            background: Color::parse_or(config.background.as_deref(), Color::WHITE, "background"),
            error_correction,
            dot_style: normalize_shape(config.dot_style.as_deref(), "dot style"),
            eye_style: normalize_shape(config.eye_style.as_deref(), "eye style"),
            eye_ball_style: normalize_shape(config.eye_ball_style.as_deref(), "eye ball style"),
            corner_square_color: Color::parse_or(
                config.corner_square_color.as_deref(),
                foreground,
                "corner square color",
            ),
            corner_dot_color: Color::parse_or(
                config.corner_dot_color.as_deref(),
                foreground,
                "corner dot color",
            ),
            gradient: normalize_gradient(config.gradient.as_ref()),
            logo: normalize_logo(config.logo.as_ref()),
            border: normalize_border(config.border.as_ref(), size),
        }
    }

    /// Style fields echoed back as a fully populated config (logo excluded).
    pub fn to_config(&self) -> QrStyleConfig {
        let gradient_config = |g: &Gradient| GradientConfig {
            kind: Some(
                match g.kind {
                    GradientKind::Linear => "linear",
                    GradientKind::Radial => "radial",
                }
                .to_string(),
            ),
            rotation: Some(g.rotation),
            color_stops: g
                .stops
                .iter()
                .map(|(offset, color)| crate::models::style::ColorStopConfig {
                    offset: Some(*offset),
                    color: Some(color.to_string()),
                })
                .collect(),
        };

        QrStyleConfig {
            foreground: Some(self.foreground.to_string()),
            background: Some(self.background.to_string()),
            margin: Some(f64::from(self.margin)),
            size: Some(f64::from(self.size)),
            error_correction_level: Some(self.error_correction.as_str().to_string()),
            dot_style: Some(self.dot_style.as_str().to_string()),
            eye_style: Some(self.eye_style.as_str().to_string()),
            eye_ball_style: Some(self.eye_ball_style.as_str().to_string()),
            corner_square_color: Some(self.corner_square_color.to_string()),
            corner_dot_color: Some(self.corner_dot_color.to_string()),
            gradient: self.gradient.as_ref().map(gradient_config),
            logo: None,
            border: self.border.as_ref().map(|b| BorderConfig {
                width: Some(f64::from(b.width)),
                style: Some(
                    match b.style {
                        BorderStyle::Solid => "solid",
                        BorderStyle::Dashed => "dashed",
                        BorderStyle::Dotted => "dotted",
                        BorderStyle::Double => "double",
                    }
                    .to_string(),
                ),
                color: Some(b.color.to_string()),
                radius: Some(f64::from(b.radius)),
                margin: Some(f64::from(b.margin)),
                gradient: b.gradient.as_ref().map(gradient_config),
            }),
        }
    }
}
