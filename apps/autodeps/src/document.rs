//! # Model Documents
//!
//! Models are read from JSON or TOML documents. Entry values are externally
//! tagged:
//!
//! ```toml
//! name = "pricing"
//! id = 12
//!
//! [entries.base]
//! value = 100
//!
//! [entries.quote.signature]
//! selector = "quote"
//! return_path = { name = "price", inputs = ["base"] }
//! ```
//!
//! Annotated models are always written back as JSON.

use crate::AppError;
use autodeps_core::Model;
use std::fmt;
use std::path::Path;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// Parse a `--format` argument.
    pub fn parse(name: &str) -> Result<Self, AppError> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(AppError::UnknownFormat(name.to_string())),
        }
    }

    /// Pick the format: an explicit name wins, otherwise the file extension
    /// decides, falling back to JSON.
    pub fn resolve(explicit: Option<&str>, path: &Path) -> Result<Self, AppError> {
        if let Some(name) = explicit {
            return Self::parse(name);
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Ok(Self::Json),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// Parse a model document.
pub fn parse_model(contents: &[u8], format: Format) -> Result<Model, AppError> {
    match format {
        Format::Json => Ok(serde_json::from_slice(contents)?),
        Format::Toml => {
            let text = std::str::from_utf8(contents)
                .map_err(|e| AppError::DocumentError(format!("Not UTF-8: {}", e)))?;
            Ok(toml::from_str(text)?)
        }
    }
}

/// Render a model as pretty JSON.
pub fn render_model(model: &Model) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(model)?)
}
