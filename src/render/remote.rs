use url::Url;

use crate::render::layout::Matrix;
use crate::render::normalize::{ModuleShape, ResolvedStyle};
use crate::render::{Backend, QrRenderer, RenderError, Rendering};

pub const DEFAULT_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Hands rendering off to a public QR image service, addressed by URL.
///
/// Only colors, size, margin and error correction survive; shapes, gradients,
/// logo and border are dropped.
#[derive(Debug, Clone)]
pub struct RemoteRenderer {
    endpoint: Url,
}

impl RemoteRenderer {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    fn log_dropped(style: &ResolvedStyle) {
        let mut dropped = Vec::new();
        if [style.dot_style, style.eye_style, style.eye_ball_style]
            .iter()
            .any(|s| *s != ModuleShape::Square)
        {
            dropped.push("shapes");
        }
        if style.corner_square_color != style.foreground || style.corner_dot_color != style.foreground
        {
            dropped.push("corner colors");
        }
        if style.gradient.is_some() {
            dropped.push("gradient");
        }
        if style.logo.is_some() {
            dropped.push("logo");
        }
        if style.border.is_some() {
            dropped.push("border");
        }
        if !dropped.is_empty() {
            log::info!(
                "remote renderer ignores unsupported styling: {}",
                dropped.join(", ")
            );
        }
    }

    pub fn image_url(&self, content: &str, style: &ResolvedStyle) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("data", content)
            .append_pair("size", &format!("{}x{}", style.size, style.size))
            .append_pair("color", &style.foreground.hex_digits())
            .append_pair("bgcolor", &style.background.hex_digits())
            .append_pair("margin", &style.margin.to_string())
            .append_pair("ecc", style.error_correction.as_str());
        url.into()
    }
}

impl QrRenderer for RemoteRenderer {
    fn backend(&self) -> Backend {
        Backend::Remote
    }

    fn render(&self, content: &str, style: &ResolvedStyle) -> Result<Rendering, RenderError> {
        // the service fails silently on oversized data, so check capacity here
        Matrix::encode(content, style)?;
        Self::log_dropped(style);
        Ok(Rendering::Remote {
            url: self.image_url(content, style),
        })
    }
}
