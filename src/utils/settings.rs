use std::env;

use anyhow::{Context, Result, anyhow};
use url::Url;

use crate::render::Backend;
use crate::render::remote::DEFAULT_ENDPOINT;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:4173";

/// Service configuration, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub bind_address: String,
    pub backend: Backend,
    pub remote_endpoint: Url,
    pub cors_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset and blank values take the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let backend = match get("QR_RENDER_BACKEND") {
            Some(raw) => raw
                .parse::<Backend>()
                .map_err(|e| anyhow!(e))
                .context("invalid QR_RENDER_BACKEND")?,
            None => Backend::Local,
        };

        let endpoint = get("QR_REMOTE_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let remote_endpoint = Url::parse(endpoint.trim())
            .with_context(|| format!("QR_REMOTE_ENDPOINT is not a valid URL: {:?}", endpoint))?;
        if !matches!(remote_endpoint.scheme(), "http" | "https") {
            return Err(anyhow!(
                "QR_REMOTE_ENDPOINT must use http or https, got {}",
                remote_endpoint.scheme()
            ));
        }

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Settings {
            port,
            bind_address: get("BIND_ADDRESS")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            backend,
            remote_endpoint,
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.port, 8080);
        assert_eq!(s.bind_address, "127.0.0.1");
        assert_eq!(s.backend, Backend::Local);
        assert_eq!(s.remote_endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(
            s.cors_origins,
            vec!["http://localhost:5173", "http://localhost:4173"]
        );
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("PORT", "9000"),
            ("BIND_ADDRESS", "0.0.0.0"),
            ("QR_RENDER_BACKEND", "Remote"),
            ("QR_REMOTE_ENDPOINT", "http://qr.local/make"),
            ("CORS_ORIGINS", " https://app.example.com , ,https://admin.example.com"),
        ])
        .unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.bind_address, "0.0.0.0");
        assert_eq!(s.backend, Backend::Remote);
        assert_eq!(s.remote_endpoint.as_str(), "http://qr.local/make");
        assert_eq!(
            s.cors_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
    }

    #[test]
    fn blank_values_fall_back() {
        let s = settings(&[("PORT", "  "), ("QR_RENDER_BACKEND", "")]).unwrap();
        assert_eq!(s.port, DEFAULT_PORT);
        assert_eq!(s.backend, Backend::Local);
    }

    #[test]
    fn rejects_bad_values() {
        let err = settings(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = settings(&[("QR_RENDER_BACKEND", "cloud")]).unwrap_err();
        assert!(err.to_string().contains("QR_RENDER_BACKEND"));

        assert!(settings(&[("QR_REMOTE_ENDPOINT", "not a url")]).is_err());
        assert!(settings(&[("QR_REMOTE_ENDPOINT", "ftp://qr.local/")]).is_err());
        assert!(settings(&[("PORT", "70000")]).is_err());
    }
}
