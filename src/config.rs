//! Service configuration: URL prefix and canonical base URL.
//!
//! The parsing core takes no global state. The boundary loads a
//! [`ServiceConfig`] once (from TOML or defaults), strips the configured
//! prefix off each inbound path, and hands the remainder to
//! [`request::parse`](crate::request::parse).
//!
//! ```toml
//! prefix = "/iiif"
//! base_url = "https://images.example.org"
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Path prefix the service is mounted under, with a leading slash and
    /// no trailing slash (empty for the root).
    pub prefix: String,
    /// Scheme plus host for canonical `@id` URIs, no trailing slash.
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load a config file, falling back to field defaults for anything
    /// the file omits.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Strip the configured prefix off a request path, yielding the
    /// remainder the tokenizer consumes. `None` when the path is not
    /// under the prefix.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return Some(path);
        }
        path.strip_prefix(self.prefix.as_str())
    }

    /// Canonical image id: scheme + host + prefix + identifier.
    pub fn image_id(&self, identifier: &str) -> String {
        format!("{}{}/{}", self.base_url, self.prefix, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_to_empty_prefix() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.prefix, "");
        assert_eq!(
            cfg.strip_prefix("/img/full/full/0/default.jpg"),
            Some("/img/full/full/0/default.jpg")
        );
    }

    #[test]
    fn strips_configured_prefix() {
        let cfg = ServiceConfig {
            prefix: "/iiif".to_string(),
            ..ServiceConfig::default()
        };
        assert_eq!(
            cfg.strip_prefix("/iiif/img/full/full/0/default.jpg"),
            Some("/img/full/full/0/default.jpg")
        );
        assert_eq!(cfg.strip_prefix("/other/img/info.json"), None);
    }

    #[test]
    fn builds_image_id_with_prefix() {
        let cfg = ServiceConfig {
            prefix: "/iiif".to_string(),
            base_url: "https://images.example.org".to_string(),
        };
        assert_eq!(
            cfg.image_id("photo.jpg"),
            "https://images.example.org/iiif/photo.jpg"
        );
    }

    #[test]
    fn loads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prefix = \"/images\"").unwrap();
        let cfg = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(cfg.prefix, "/images");
        assert_eq!(cfg.base_url, "http://localhost:8080");
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prefixes = \"/images\"").unwrap();
        assert!(matches!(
            ServiceConfig::load(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ServiceConfig::load(Path::new("/nonexistent/config.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
