use serde::{Deserialize, Serialize};

use crate::utils::lenient;

/// Visual configuration of a QR code, as submitted by the dashboard.
///
/// Every field is optional and loosely typed; the renderer normalizes
/// missing or malformed values to documented defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QrStyleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_correction_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_ball_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_square_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_dot_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<GradientConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GradientConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    pub color_stops: Vec<ColorStopConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ColorStopConfig {
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoConfig {
    /// Base64 image bytes, bare or as a `data:` URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub relative_size: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BorderConfig {
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<GradientConfig>,
}

impl GradientConfig {
    /// Two-stop gradient at offsets 0 and 1.
    pub fn two_stop(kind: Option<String>, start: &str, end: &str) -> Self {
        Self {
            kind,
            rotation: None,
            color_stops: vec![
                ColorStopConfig {
                    offset: Some(0.0),
                    color: Some(start.to_string()),
                },
                ColorStopConfig {
                    offset: Some(1.0),
                    color: Some(end.to_string()),
                },
            ],
        }
    }
}
