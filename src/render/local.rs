use crate::render::layout::{Matrix, build};
use crate::render::normalize::ResolvedStyle;
use crate::render::{Backend, QrRenderer, RenderError, Rendering};

/// Draws the code in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRenderer;

impl QrRenderer for LocalRenderer {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    fn render(&self, content: &str, style: &ResolvedStyle) -> Result<Rendering, RenderError> {
        let matrix = Matrix::encode(content, style)?;
        log::debug!(
            "encoded {} bytes into {}x{} modules at level {}",
            content.len(),
            matrix.count,
            matrix.count,
            style.error_correction.as_str()
        );
        Ok(Rendering::Drawing(build(&matrix, style)))
    }
}
