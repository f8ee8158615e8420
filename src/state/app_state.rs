use std::sync::Arc;

use crate::render::local::LocalRenderer;
use crate::render::remote::RemoteRenderer;
use crate::render::{Backend, QrRenderer};
use crate::utils::settings::Settings;

/// Shared by every worker; the renderer is chosen once at startup.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn QrRenderer>,
}

impl AppState {
    pub fn new(renderer: Arc<dyn QrRenderer>) -> Self {
        Self { renderer }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let renderer: Arc<dyn QrRenderer> = match settings.backend {
            Backend::Local => Arc::new(LocalRenderer),
            Backend::Remote => Arc::new(RemoteRenderer::new(settings.remote_endpoint.clone())),
        };
        Self::new(renderer)
    }
}
