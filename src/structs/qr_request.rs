use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::content::QrContent;
use crate::models::saved_config::SavedQrConfig;
use crate::models::style::QrStyleConfig;
use crate::render::Backend;

/// Download names end up in `qrcode-{name}.png`.
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("name")
            .with_message("Name must be 1-64 letters, digits, '-' or '_'".into()))
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct RenderRequest {
    #[serde(default)]
    #[validate(length(max = 4096, message = "Content must be at most 4096 characters"))]
    pub content: String,
    /// Structured content; takes precedence over `content`.
    pub payload: Option<QrContent>,
    pub style: Option<QrStyleConfig>,
    /// Saved dashboard blob; takes precedence over `style`.
    pub config: Option<SavedQrConfig>,
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,
}

impl RenderRequest {
    pub fn content(&self) -> String {
        match &self.payload {
            Some(payload) => payload.to_payload(),
            None => self.content.clone(),
        }
    }

    pub fn style_config(&self) -> QrStyleConfig {
        match (&self.config, &self.style) {
            (Some(saved), _) => QrStyleConfig::from(saved.clone()),
            (None, Some(style)) => style.clone(),
            (None, None) => QrStyleConfig::default(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PayloadResponse {
    pub content: String,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum RenderResponse {
    Local {
        backend: Backend,
        width: u32,
        height: u32,
        etag: String,
        svg: String,
        png_base64: String,
        generated_at: DateTime<Utc>,
    },
    Remote {
        backend: Backend,
        url: String,
        generated_at: DateTime<Utc>,
    },
}
