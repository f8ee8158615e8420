pub mod border;
pub mod drawing;
pub mod layout;
pub mod local;
pub mod normalize;
pub mod raster;
pub mod remote;
pub mod svg;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::str::FromStr;

use qrcode::types::QrError;
use serde::Serialize;

use crate::models::style::QrStyleConfig;
use crate::render::drawing::Drawing;
use crate::render::normalize::ResolvedStyle;

/// Encoded in place of empty content.
pub const PLACEHOLDER_CONTENT: &str = "https://example.com";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("content is too long to fit in a QR code")]
    DataTooLong,
    #[error("QR encoding failed: {0}")]
    Encode(QrError),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

impl From<QrError> for RenderError {
    fn from(e: QrError) -> Self {
        match e {
            QrError::DataTooLong => RenderError::DataTooLong,
            other => RenderError::Encode(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Local,
    Remote,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Local => "local",
            Backend::Remote => "remote",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Backend::Local),
            "remote" => Ok(Backend::Remote),
            other => Err(format!("unknown render backend {:?}, expected local or remote", other)),
        }
    }
}

/// Output of a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendering {
    /// Drawn in-process; serialize with [`svg::to_svg`] or [`raster::to_png`].
    Drawing(Drawing),
    /// Image hosted by an external service.
    Remote { url: String },
}

/// Content substituted by [`PLACEHOLDER_CONTENT`] when blank.
pub fn effective_content(content: &str) -> &str {
    if content.trim().is_empty() {
        log::debug!("empty content, encoding placeholder");
        PLACEHOLDER_CONTENT
    } else {
        content
    }
}

pub trait QrRenderer: Send + Sync {
    fn backend(&self) -> Backend;

    /// Render already normalized input.
    fn render(&self, content: &str, style: &ResolvedStyle) -> Result<Rendering, RenderError>;

    /// Normalize `config`, substitute blank content and render.
    fn resolve(&self, content: &str, config: &QrStyleConfig) -> Result<Rendering, RenderError> {
        let style = ResolvedStyle::resolve(config);
        self.render(effective_content(content), &style)
    }
}
