//! Color-scheme files.
//!
//! A scheme is a JSON document mapping single residue characters to color
//! strings, in the layout used by Gecos:
//!
//! ```text
//! {
//!   "name": "hydrophobicity",
//!   "colors": { "A": "#ff0000", "C": "lightblue", "-": "darkgray" }
//! }
//! ```
//!
//! Keys other than `colors` are ignored. Colors use ratatui's grammar:
//! named colors, `#rrggbb` or a 256-color palette index.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use ratatui::style::{Color, Style};
use serde::Deserialize;
use thiserror::Error;

use crate::color::bold;

/// Errors that can occur while loading a color scheme.
#[derive(Error, Debug)]
pub enum SchemeError {
    #[error("Failed to open color scheme: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid color scheme JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Color scheme key '{0}' is not a single character")]
    InvalidKey(String),

    #[error("Invalid color '{color}' for residue '{residue}'")]
    InvalidColor { residue: char, color: String },
}

/// Result type for scheme operations.
pub type SchemeResult<T> = Result<T, SchemeError>;

/// A parsed, not yet validated color scheme.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorScheme {
    colors: BTreeMap<String, String>,
}

impl ColorScheme {
    /// Loads a scheme from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> SchemeResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parses a scheme from a JSON string.
    pub fn from_json_str(content: &str) -> SchemeResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Number of entries in the scheme.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the scheme defines no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Resolves every entry to a bold style.
    pub fn styles(&self) -> SchemeResult<HashMap<char, Style>> {
        self.colors
            .iter()
            .map(|(key, spec)| {
                let residue = single_char(key)?;
                let color = Color::from_str(spec.trim()).map_err(|_| SchemeError::InvalidColor {
                    residue,
                    color: spec.clone(),
                })?;
                Ok((residue, bold(color)))
            })
            .collect()
    }
}

fn single_char(key: &str) -> SchemeResult<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SchemeError::InvalidKey(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_named_and_hex_colors() {
        let scheme =
            ColorScheme::from_json_str(r##"{"colors": {"A": "red", "C": "#00ff00"}}"##).unwrap();
        let styles = scheme.styles().unwrap();

        assert_eq!(scheme.len(), 2);
        assert_eq!(styles[&'A'], bold(Color::Red));
        assert_eq!(styles[&'C'], bold(Color::Rgb(0, 255, 0)));
    }

    #[test]
    fn test_extra_keys_ignored() {
        let scheme =
            ColorScheme::from_json_str(r#"{"name": "test", "colors": {"-": "darkgray"}}"#).unwrap();
        assert_eq!(scheme.styles().unwrap()[&'-'], bold(Color::DarkGray));
    }

    #[test]
    fn test_missing_colors_key() {
        let result = ColorScheme::from_json_str(r#"{"name": "test"}"#);
        assert!(matches!(result, Err(SchemeError::JsonError(_))));
    }

    #[test]
    fn test_invalid_key() {
        let scheme = ColorScheme::from_json_str(r#"{"colors": {"AB": "red"}}"#).unwrap();
        match scheme.styles() {
            Err(SchemeError::InvalidKey(key)) => assert_eq!(key, "AB"),
            other => panic!("expected invalid key, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_color() {
        let scheme = ColorScheme::from_json_str(r#"{"colors": {"A": "not-a-color"}}"#).unwrap();
        assert!(matches!(
            scheme.styles(),
            Err(SchemeError::InvalidColor { residue: 'A', .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"colors": {{"W": "blue"}}}}"#).unwrap();

        let scheme = ColorScheme::load(file.path()).unwrap();
        assert_eq!(scheme.styles().unwrap()[&'W'], bold(Color::Blue));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ColorScheme::load("/nonexistent/scheme.json");
        assert!(matches!(result, Err(SchemeError::IoError(_))));
    }
}
