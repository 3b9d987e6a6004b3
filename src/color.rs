//! Residue color classification.
//!
//! Maps a single residue character to the [`Style`] it is rendered with.
//! Lookup is total: characters missing from the style map resolve to the
//! classifier's default style.

use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};

/// Anything that can style a residue character.
///
/// This trait allows for different color schemes to be plugged into the
/// layout engine.
pub trait StyleProvider {
    fn classify(&self, residue: char) -> Style;
}

/// Residue groups of the built-in scheme, with their foreground color.
const DEFAULT_GROUPS: [(&str, Color); 4] = [
    // Hydrophobic
    ("AVFPMILW", Color::Red),
    // Acidic
    ("DE", Color::Blue),
    // Basic
    ("RK", Color::Magenta),
    // Polar and other
    ("STYHCNGQ", Color::Green),
];

/// Bold style with the given foreground, the shape of every built-in entry.
pub fn bold(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Table-driven classifier with an explicit fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorClassifier {
    styles: HashMap<char, Style>,
    default_style: Style,
}

impl ColorClassifier {
    /// Creates a classifier; `None` selects the built-in map or default style.
    ///
    /// A custom map replaces the built-in one entirely.
    pub fn new(styles: Option<HashMap<char, Style>>, default_style: Option<Style>) -> Self {
        Self {
            styles: styles.unwrap_or_else(Self::default_styles),
            default_style: default_style.unwrap_or_else(Self::default_fallback),
        }
    }

    /// The built-in amino acid classification.
    pub fn default_styles() -> HashMap<char, Style> {
        DEFAULT_GROUPS
            .iter()
            .flat_map(|&(members, color)| members.chars().map(move |c| (c, bold(color))))
            .collect()
    }

    /// Style for gaps and unclassified characters: gray30 of the 256-color
    /// palette, independent of the terminal's own bright black.
    pub fn default_fallback() -> Style {
        bold(Color::Indexed(239))
    }

    /// Returns a copy of this classifier with `overrides` applied on top.
    pub fn with_overrides(mut self, overrides: HashMap<char, Style>) -> Self {
        self.styles.extend(overrides);
        self
    }

    /// The character-to-style map.
    pub fn style_map(&self) -> &HashMap<char, Style> {
        &self.styles
    }

    /// The style used for characters absent from the map.
    pub fn fallback(&self) -> Style {
        self.default_style
    }
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl StyleProvider for ColorClassifier {
    fn classify(&self, residue: char) -> Style {
        self.styles
            .get(&residue)
            .copied()
            .unwrap_or(self.default_style)
    }
}
