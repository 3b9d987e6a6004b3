//! Block layout and residue coordinates.
//!
//! Given an [`Alignment`] and an available width, the layout engine decides
//! how many columns fit next to the name and offset columns, then produces
//! the alignment as a lazy sequence of [`Block`]s:
//!
//! ```text
//! seq1  1  AC-GTAC
//! seq2  1  ACGGTAC
//!
//! seq1  7  GT-A
//! seq2  8  GTTA
//! ```
//!
//! Offsets are 1-based residue coordinates that do not count gaps.

use std::iter::FusedIterator;
use std::ops::Range;
use std::str::FromStr;

use ratatui::style::Style;
use serde::Serialize;
use thiserror::Error;

use crate::color::{ColorClassifier, StyleProvider};
use crate::model::{Alignment, ValidationError, ValidationResult};

/// Character appended to truncated names.
pub const ELLIPSIS: char = '…';

/// Errors that can occur while laying out an alignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("insufficient width: {available} columns available, at least {required} required")]
    InsufficientWidth { available: usize, required: usize },
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Spacing around blocks and columns, in terminal cells.
///
/// Vertical padding separates blocks; horizontal padding separates columns.
/// The left edge gap is `left`, capped at `right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Padding {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

impl Padding {
    pub const fn new(top: usize, right: usize, bottom: usize, left: usize) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Indent of every block line.
    ///
    /// The width budget reserves one `right`-wide gap for the left edge, so a
    /// wider `left` is capped to keep lines within the available width.
    pub const fn indent(&self) -> usize {
        if self.left < self.right {
            self.left
        } else {
            self.right
        }
    }

    /// Same padding on all four sides.
    pub const fn uniform(value: usize) -> Self {
        Self::new(value, value, value, value)
    }

    /// Unpacks 1, 2 or 4 values: `[all]`, `[vertical, horizontal]` or
    /// `[top, right, bottom, left]`.
    pub fn unpack(values: &[usize]) -> ValidationResult<Self> {
        match *values {
            [all] => Ok(Self::uniform(all)),
            [vertical, horizontal] => Ok(Self::new(vertical, horizontal, vertical, horizontal)),
            [top, right, bottom, left] => Ok(Self::new(top, right, bottom, left)),
            _ => Err(ValidationError::InvalidPadding(values.len())),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::new(1, 2, 1, 2)
    }
}

impl FromStr for Padding {
    type Err = String;

    /// Parses comma-separated values, e.g. `1,2,1,2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid padding value '{}'", part.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::unpack(&values).map_err(|err| err.to_string())
    }
}

/// Layout parameters shared by every block of a render.
#[derive(Debug, Clone)]
pub struct LayoutConfig<S = ColorClassifier> {
    max_name_width: usize,
    padding: Padding,
    styles: S,
}

impl LayoutConfig<ColorClassifier> {
    /// Creates a configuration with default padding and the built-in colors.
    pub fn new(max_name_width: usize) -> ValidationResult<Self> {
        Self::with_styles(max_name_width, ColorClassifier::default())
    }
}

impl<S: StyleProvider> LayoutConfig<S> {
    /// Creates a configuration with a custom style provider.
    pub fn with_styles(max_name_width: usize, styles: S) -> ValidationResult<Self> {
        if max_name_width == 0 {
            return Err(ValidationError::InvalidMaxNameWidth(max_name_width));
        }
        Ok(Self {
            max_name_width,
            padding: Padding::default(),
            styles,
        })
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn max_name_width(&self) -> usize {
        self.max_name_width
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn styles(&self) -> &S {
        &self.styles
    }
}

impl Default for LayoutConfig<ColorClassifier> {
    fn default() -> Self {
        Self {
            max_name_width: 10,
            padding: Padding::default(),
            styles: ColorClassifier::default(),
        }
    }
}

/// Widths of the three columns of every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnWidths {
    pub name: usize,
    pub offset: usize,
    pub sequence: usize,
}

/// One sequence within one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Name, truncated with [`ELLIPSIS`] if longer than the name column
    pub display_name: String,
    /// 1-based, gap-adjusted coordinate of the first residue of the slice
    pub offset: usize,
    /// Characters of the slice paired with their style
    pub residues: Vec<(char, Style)>,
}

impl Row {
    /// The slice without styles.
    pub fn text(&self) -> String {
        self.residues.iter().map(|&(c, _)| c).collect()
    }
}

/// A contiguous column range `[start, end)` with one row per sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
    pub rows: Vec<Row>,
}

impl Block {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of alignment columns in this block.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Decimal digit count of `n` (`0` has one digit).
pub fn digit_count(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// Truncates `name` to `max_width` characters, marking the cut with [`ELLIPSIS`].
pub fn truncate_name(name: &str, max_width: usize) -> String {
    if name.chars().count() <= max_width {
        return name.to_string();
    }
    let mut truncated: String = name.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// Partitions `alignment` into blocks fitting `available_width` columns.
///
/// With `no_wrap` the whole alignment is a single block regardless of width.
/// Otherwise the sequence column gets whatever is left after the name column,
/// the offset column and three horizontal paddings; if nothing is left the
/// layout fails before any block is produced.
pub fn compute_blocks<'a, S: StyleProvider>(
    alignment: &'a Alignment,
    config: &'a LayoutConfig<S>,
    available_width: usize,
    no_wrap: bool,
) -> LayoutResult<Blocks<'a, S>> {
    let offset_width = digit_count(alignment.sequence_length());
    let name_width = config.max_name_width.min(alignment.max_name_length());

    let block_length = if no_wrap {
        alignment.sequence_length()
    } else {
        let reserved = name_width + offset_width + config.padding.right * 3;
        match available_width.checked_sub(reserved) {
            Some(length) if length > 0 => length,
            _ => {
                return Err(LayoutError::InsufficientWidth {
                    available: available_width,
                    required: reserved + 1,
                })
            }
        }
    };

    log::debug!(
        "layout: name width {}, offset width {}, block length {} ({} columns, {} sequences)",
        name_width,
        offset_width,
        block_length,
        alignment.sequence_length(),
        alignment.sequence_count()
    );

    let cursors = alignment
        .sequences()
        .iter()
        .map(|sequence| RowCursor {
            rest: sequence.as_str(),
            gaps_before: 0,
        })
        .collect();

    Ok(Blocks {
        alignment,
        config,
        widths: ColumnWidths {
            name: name_width,
            offset: offset_width,
            sequence: block_length,
        },
        next_start: 0,
        cursors,
    })
}

/// Remaining input of one sequence and the gaps already consumed.
#[derive(Debug, Clone)]
struct RowCursor<'a> {
    rest: &'a str,
    gaps_before: usize,
}

impl<'a> RowCursor<'a> {
    /// Takes the next `count` characters.
    fn take(&mut self, count: usize) -> &'a str {
        let split = self
            .rest
            .char_indices()
            .nth(count)
            .map_or(self.rest.len(), |(idx, _)| idx);
        let (head, tail) = self.rest.split_at(split);
        self.rest = tail;
        head
    }
}

/// Lazy sequence of blocks produced by [`compute_blocks`].
///
/// Each call to [`compute_blocks`] starts a fresh, independent sequence.
#[derive(Debug, Clone)]
pub struct Blocks<'a, S = ColorClassifier> {
    alignment: &'a Alignment,
    config: &'a LayoutConfig<S>,
    widths: ColumnWidths,
    next_start: usize,
    cursors: Vec<RowCursor<'a>>,
}

impl<S> Blocks<'_, S> {
    /// Column widths shared by all blocks of this layout.
    pub fn widths(&self) -> ColumnWidths {
        self.widths
    }

    /// Number of alignment columns per block (the last may be shorter).
    pub fn block_length(&self) -> usize {
        self.widths.sequence
    }

    fn remaining(&self) -> usize {
        let length = self.alignment.sequence_length();
        if self.next_start >= length {
            0
        } else {
            (length - self.next_start).div_ceil(self.widths.sequence)
        }
    }
}

impl<S: StyleProvider> Iterator for Blocks<'_, S> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        let length = self.alignment.sequence_length();
        if self.next_start >= length {
            return None;
        }

        let start = self.next_start;
        let end = (start + self.widths.sequence).min(length);
        let (alignment, config) = (self.alignment, self.config);
        let gap = alignment.gap_character();

        let rows = alignment
            .names()
            .iter()
            .zip(self.cursors.iter_mut())
            .map(|(name, cursor)| {
                let offset = start - cursor.gaps_before + 1;
                let slice = cursor.take(end - start);
                let residues: Vec<(char, Style)> =
                    slice.chars().map(|c| (c, config.styles.classify(c))).collect();
                cursor.gaps_before += residues.iter().filter(|&&(c, _)| c == gap).count();
                Row {
                    display_name: truncate_name(name, config.max_name_width),
                    offset,
                    residues,
                }
            })
            .collect();

        self.next_start = end;
        Some(Block { start, end, rows })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<S: StyleProvider> ExactSizeIterator for Blocks<'_, S> {}

impl<S: StyleProvider> FusedIterator for Blocks<'_, S> {}
