//! Load options, optionally read from a TOML file
//!
//! ```toml
//! skip_tilesets = ["Internal_Icons"]
//! load_backgrounds = true
//! image_source = "declared"
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Identifier of the editor's built-in icon tileset
pub const INTERNAL_ICONS: &str = "Internal_Icons";

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where image sizes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Read every referenced image from disk
    #[default]
    Filesystem,
    /// Trust the sizes declared in the document, never touch the disk
    Declared,
}

/// Settings that shape a project load
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Tilesets skipped by identifier (logged, never an error)
    pub skip_tilesets: Vec<String>,
    /// Whether level background images are requested from the image provider
    pub load_backgrounds: bool,
    pub image_source: ImageSource,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_tilesets: vec![INTERNAL_ICONS.to_string()],
            load_backgrounds: true,
            image_source: ImageSource::Filesystem,
        }
    }
}

impl LoadOptions {
    pub fn from_toml_str(content: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Whether a tileset with this identifier is skipped
    pub fn skips_tileset(&self, identifier: &str) -> bool {
        self.skip_tilesets.iter().any(|s| s == identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let options = LoadOptions::from_toml_str("").unwrap();
        assert_eq!(options, LoadOptions::default());
        assert!(options.skips_tileset(INTERNAL_ICONS));
        assert!(!options.skips_tileset("Cavernas"));
    }

    #[test]
    fn test_partial_toml() {
        let options = LoadOptions::from_toml_str(
            r#"
            load_backgrounds = false
            image_source = "declared"
            "#,
        )
        .unwrap();
        assert!(!options.load_backgrounds);
        assert_eq!(options.image_source, ImageSource::Declared);
        assert_eq!(options.skip_tilesets, vec![INTERNAL_ICONS.to_string()]);
    }

    #[test]
    fn test_unknown_image_source_is_rejected() {
        let result = LoadOptions::from_toml_str(r#"image_source = "network""#);
        assert!(matches!(result, Err(OptionsError::Parse(_))));
    }
}
