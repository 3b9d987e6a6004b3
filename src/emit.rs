//! Declarative render tree.
//!
//! Converts laid-out [`Block`]s into a plain, serializable structure: a
//! vertical stack of three-column tables (name, offset, sequence). The tree
//! says nothing about terminals; see [`crate::render`] for the ratatui
//! adapter that draws it.

use ratatui::style::{Color, Modifier, Style};
use serde::Serialize;

use crate::layout::{Block, ColumnWidths, Padding, Row};

/// Horizontal alignment of a column's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    Left,
    Right,
}

/// What a renderer does with content wider than its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Ellipsis,
    Crop,
}

/// Fixed-width column description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub width: usize,
    pub justify: Justify,
    pub overflow: Overflow,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledRun {
    pub text: String,
    pub style: Style,
}

/// One table row: name cell, offset cell and the styled sequence slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub name: String,
    pub offset: StyledRun,
    pub sequence: Vec<StyledRun>,
}

/// One block, rendered as a table with one row per sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTable {
    pub start: usize,
    pub end: usize,
    pub columns: [ColumnSpec; 3],
    pub rows: Vec<TableRow>,
}

/// The outer vertical stack of blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    pub padding: Padding,
    pub widths: ColumnWidths,
    pub blocks: Vec<BlockTable>,
}

impl RenderTree {
    /// Width of one block line.
    pub fn width(&self) -> usize {
        line_width(self.widths, self.padding)
    }
}

/// Width of one block line: indent, three columns and two gaps.
pub fn line_width(widths: ColumnWidths, padding: Padding) -> usize {
    padding.indent() + widths.name + widths.offset + widths.sequence + padding.right * 2
}

/// Style of the offset column.
pub fn offset_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Builds render-tree nodes from blocks of one layout.
#[derive(Debug, Clone, Copy)]
pub struct BlockEmitter {
    widths: ColumnWidths,
    padding: Padding,
}

impl BlockEmitter {
    pub fn new(widths: ColumnWidths, padding: Padding) -> Self {
        Self { widths, padding }
    }

    /// Width of every line this emitter's blocks render to.
    pub fn line_width(&self) -> usize {
        line_width(self.widths, self.padding)
    }

    fn columns(&self) -> [ColumnSpec; 3] {
        [
            ColumnSpec {
                width: self.widths.name,
                justify: Justify::Left,
                overflow: Overflow::Ellipsis,
            },
            ColumnSpec {
                width: self.widths.offset,
                justify: Justify::Right,
                overflow: Overflow::Crop,
            },
            ColumnSpec {
                width: self.widths.sequence,
                justify: Justify::Left,
                overflow: Overflow::Crop,
            },
        ]
    }

    /// Converts one block into its table.
    pub fn emit_block(&self, block: &Block) -> BlockTable {
        BlockTable {
            start: block.start,
            end: block.end,
            columns: self.columns(),
            rows: block.rows.iter().map(emit_row).collect(),
        }
    }

    /// Converts a whole block sequence into the render tree.
    pub fn emit<I>(&self, blocks: I) -> RenderTree
    where
        I: IntoIterator<Item = Block>,
    {
        RenderTree {
            padding: self.padding,
            widths: self.widths,
            blocks: blocks
                .into_iter()
                .map(|block| self.emit_block(&block))
                .collect(),
        }
    }
}

fn emit_row(row: &Row) -> TableRow {
    TableRow {
        name: row.display_name.clone(),
        offset: StyledRun {
            text: row.offset.to_string(),
            style: offset_style(),
        },
        sequence: merge_runs(&row.residues),
    }
}

/// Groups adjacent residues with identical styles.
fn merge_runs(residues: &[(char, Style)]) -> Vec<StyledRun> {
    let mut runs: Vec<StyledRun> = Vec::new();
    for &(c, style) in residues {
        match runs.last_mut() {
            Some(run) if run.style == style => run.text.push(c),
            _ => runs.push(StyledRun {
                text: c.to_string(),
                style,
            }),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::bold;
    use crate::layout::{compute_blocks, LayoutConfig};
    use crate::model::Alignment;

    fn sample_tree(width: usize) -> RenderTree {
        let alignment = Alignment::new(
            vec!["seq1".to_string(), "seq2".to_string()],
            vec!["AAC-GTTW".to_string(), "ACGGTTTW".to_string()],
        )
        .unwrap();
        let config = LayoutConfig::new(10).unwrap();
        let blocks = compute_blocks(&alignment, &config, width, false).unwrap();
        BlockEmitter::new(blocks.widths(), config.padding()).emit(blocks)
    }

    #[test]
    fn test_merge_runs() {
        let red = bold(Color::Red);
        let green = bold(Color::Green);
        let runs = merge_runs(&[('A', red), ('V', red), ('S', green), ('L', red)]);
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["AV", "S", "L"]);
        assert_eq!(runs[0].style, red);
        assert!(merge_runs(&[]).is_empty());
    }

    #[test]
    fn test_emit_single_block() {
        let tree = sample_tree(80);
        assert_eq!(tree.blocks.len(), 1);

        let block = &tree.blocks[0];
        assert_eq!((block.start, block.end), (0, 8));
        assert_eq!(block.columns[0].width, 4);
        assert_eq!(block.columns[0].overflow, Overflow::Ellipsis);
        assert_eq!(block.columns[1].justify, Justify::Right);
        assert_eq!(block.columns[2].width, 80 - 4 - 1 - 6);

        let row = &block.rows[0];
        assert_eq!(row.name, "seq1");
        assert_eq!(row.offset.text, "1");
        assert_eq!(row.offset.style, offset_style());
        let texts: Vec<&str> = row.sequence.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["AA", "C", "-", "GTT", "W"]);
    }

    #[test]
    fn test_emit_wrapped_offsets() {
        // name 4 + offset 1 + 6 padding -> 3 columns per block
        let tree = sample_tree(14);
        let offsets: Vec<&str> = tree
            .blocks
            .iter()
            .map(|b| b.rows[0].offset.text.as_str())
            .collect();
        assert_eq!(offsets, vec!["1", "4", "6"]);
    }

    #[test]
    fn test_tree_width() {
        let tree = sample_tree(14);
        assert_eq!(tree.width(), 2 + 4 + 1 + 3 + 4);
        assert_eq!(tree.width(), 14);
    }

    #[test]
    fn test_line_width_fits_budget_with_wide_left_padding() {
        let alignment = Alignment::new(vec!["seq1".to_string()], vec!["ACGT".repeat(30)]).unwrap();
        let config = LayoutConfig::new(10)
            .unwrap()
            .with_padding(Padding::new(0, 1, 0, 5));
        let blocks = compute_blocks(&alignment, &config, 36, false).unwrap();
        let emitter = BlockEmitter::new(blocks.widths(), config.padding());

        // indent 1 + name 4 + offset 3 + 26 residues + 2 gaps
        assert_eq!(emitter.line_width(), 36);
    }

    #[test]
    fn test_tree_serializes() {
        let tree = sample_tree(80);
        let value = serde_json::to_value(&tree).unwrap();

        assert_eq!(value["widths"]["name"], 4);
        assert_eq!(value["padding"]["right"], 2);
        assert_eq!(value["blocks"][0]["columns"][1]["justify"], "right");
        assert_eq!(value["blocks"][0]["rows"][1]["name"], "seq2");
        assert_eq!(value["blocks"][0]["rows"][1]["sequence"][0]["text"], "A");
    }
}
