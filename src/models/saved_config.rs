use serde::{Deserialize, Serialize};

use crate::models::style::{BorderConfig, GradientConfig, LogoConfig, QrStyleConfig};
use crate::utils::lenient;

/// Flat configuration blob the dashboard stores on each QR-code entity.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedQrConfig {
    pub foreground: Option<String>,
    pub background: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub margin: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub size: Option<f64>,
    pub error_correction_level: Option<String>,
    pub logo: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub logo_size: Option<f64>,
    pub body: Option<String>,
    pub eye: Option<String>,
    pub eye_ball: Option<String>,
    pub corner_square_color: Option<String>,
    pub corner_dot_color: Option<String>,
    pub gradient: Option<bool>,
    pub gradient_colors: Option<Vec<String>>,
    pub gradient_type: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub border_width: Option<f64>,
    pub border_style: Option<String>,
    pub border_color: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub border_radius: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub border_margin: Option<f64>,
    pub border_gradient: Option<bool>,
    pub border_gradient_colors: Option<Vec<String>>,
    pub border_gradient_type: Option<String>,
}

fn flagged_gradient(
    enabled: Option<bool>,
    colors: Option<&Vec<String>>,
    kind: Option<&String>,
) -> Option<GradientConfig> {
    match (enabled, colors) {
        (Some(true), Some(colors)) if colors.len() >= 2 => Some(GradientConfig::two_stop(
            kind.cloned(),
            &colors[0],
            &colors[1],
        )),
        _ => None,
    }
}

impl From<SavedQrConfig> for QrStyleConfig {
    fn from(saved: SavedQrConfig) -> Self {
        let gradient = flagged_gradient(
            saved.gradient,
            saved.gradient_colors.as_ref(),
            saved.gradient_type.as_ref(),
        );

        let logo = saved
            .logo
            .filter(|data| !data.is_empty())
            .map(|image_data| LogoConfig {
                image_data: Some(image_data),
                relative_size: saved.logo_size,
            });

        let border = match saved.border_width {
            Some(width) if width > 0.0 => Some(BorderConfig {
                width: Some(width),
                style: saved.border_style,
                color: saved.border_color,
                radius: saved.border_radius,
                margin: saved.border_margin,
                gradient: flagged_gradient(
                    saved.border_gradient,
                    saved.border_gradient_colors.as_ref(),
                    saved.border_gradient_type.as_ref(),
                ),
            }),
            _ => None,
        };

        QrStyleConfig {
            foreground: saved.foreground,
            background: saved.background,
            margin: saved.margin,
            size: saved.size,
            error_correction_level: saved.error_correction_level,
            dot_style: saved.body,
            eye_style: saved.eye,
            eye_ball_style: saved.eye_ball,
            corner_square_color: saved.corner_square_color,
            corner_dot_color: saved.corner_dot_color,
            gradient,
            logo,
            border,
        }
    }
}
