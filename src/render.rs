//! Terminal rendering.
//!
//! This module draws the render tree with ratatui and writes it out with
//! crossterm:
//! - A bordered panel titled with the input file name
//! - One ratatui `Table` row per sequence (name, right-justified offset, residues)
//! - Blank lines between blocks, from the vertical padding
//!
//! Every panel line is drawn into its own one-line `Buffer` and written
//! immediately, so blocks stream out as the layout produces them.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::{Alignment as TextAlignment, Constraint, Flex, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{self, Borders, Table, Widget};
use thiserror::Error;

use crate::emit::{BlockTable, ColumnSpec, Justify, Overflow, RenderTree, StyledRun, TableRow};
use crate::layout::{truncate_name, Padding};

/// Errors that can occur while drawing the panel.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Panel width {width} exceeds the {max} columns a line can hold")]
    PanelTooWide { width: usize, max: usize },

    #[error("Failed to write output: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Columns taken by the panel: two borders and one space of padding per side.
pub const PANEL_CHROME: usize = 4;
/// Width used when neither `COLUMNS` nor the terminal report one.
pub const DEFAULT_WIDTH: usize = 80;

/// Available width query: `COLUMNS`, then the terminal size, then 80.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&width| width > 0)
        .or_else(|| {
            crossterm::terminal::size()
                .ok()
                .map(|(width, _)| usize::from(width))
                .filter(|&width| width > 0)
        })
        .unwrap_or(DEFAULT_WIDTH)
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn panel(borders: Borders) -> widgets::Block<'static> {
    widgets::Block::default()
        .borders(borders)
        .padding(widgets::Padding::horizontal(1))
}

/// Top edge of the panel, with the centered title.
pub fn top_border(title: &str, width: u16) -> Buffer {
    let area = Rect::new(0, 0, width, 1);
    let mut buf = Buffer::empty(area);
    panel(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .title(format!(" {} ", title))
        .title_alignment(TextAlignment::Center)
        .render(area, &mut buf);
    buf
}

/// Bottom edge of the panel.
pub fn bottom_border(width: u16) -> Buffer {
    let area = Rect::new(0, 0, width, 1);
    let mut buf = Buffer::empty(area);
    panel(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT).render(area, &mut buf);
    buf
}

/// One empty panel line, repeated between blocks.
pub fn spacer(width: u16) -> Buffer {
    let area = Rect::new(0, 0, width, 1);
    let mut buf = Buffer::empty(area);
    panel(Borders::LEFT | Borders::RIGHT).render(area, &mut buf);
    buf
}

/// One table row drawn inside the panel's side borders.
///
/// Rows get a buffer each: a buffer never holds more than one line, so
/// ratatui's cell limit on a `Rect` cannot crop a block.
pub fn row_line(
    row: &TableRow,
    columns: &[ColumnSpec; 3],
    padding: Padding,
    width: u16,
) -> Buffer {
    let area = Rect::new(0, 0, width, 1);
    let mut buf = Buffer::empty(area);

    let frame = panel(Borders::LEFT | Borders::RIGHT);
    let inner = frame.inner(area);
    frame.render(area, &mut buf);

    let indent = to_u16(padding.indent()).min(inner.width);
    let table_area = Rect::new(inner.x + indent, inner.y, inner.width - indent, inner.height);
    row_table(row, columns, padding.right).render(table_area, &mut buf);
    buf
}

/// The lines of one block, in row order.
pub fn block_lines(
    block: &BlockTable,
    padding: Padding,
    width: u16,
) -> impl Iterator<Item = Buffer> + '_ {
    block
        .rows
        .iter()
        .map(move |row| row_line(row, &block.columns, padding, width))
}

fn row_table<'a>(row: &'a TableRow, columns: &[ColumnSpec; 3], spacing: usize) -> Table<'a> {
    let [name, offset, sequence] = columns;
    let cells = widgets::Row::new([
        cell_line(vec![Span::raw(fit(&row.name, name))], name.justify),
        cell_line(vec![run_span(&row.offset)], offset.justify),
        cell_line(row.sequence.iter().map(run_span).collect(), sequence.justify),
    ]);
    let widths = columns
        .iter()
        .map(|column| Constraint::Length(to_u16(column.width)));

    Table::new([cells], widths)
        .column_spacing(to_u16(spacing))
        .flex(Flex::Start)
}

fn run_span(run: &StyledRun) -> Span<'_> {
    Span::styled(run.text.as_str(), run.style)
}

fn cell_line(spans: Vec<Span<'_>>, justify: Justify) -> Line<'_> {
    let alignment = match justify {
        Justify::Left => TextAlignment::Left,
        Justify::Right => TextAlignment::Right,
    };
    Line::from(spans).alignment(alignment)
}

/// Applies the column's overflow rule to a plain cell.
fn fit(text: &str, column: &ColumnSpec) -> String {
    match column.overflow {
        Overflow::Ellipsis if column.width > 0 => truncate_name(text, column.width),
        _ => text.chars().take(column.width).collect(),
    }
}

/// Panel width needed for block lines `line_width` columns wide.
pub fn panel_width(available: usize, line_width: usize) -> usize {
    available.max(line_width + PANEL_CHROME)
}

/// Streams a titled panel of blocks to a writer.
pub struct PanelWriter<W: Write> {
    out: W,
    width: u16,
    padding: Padding,
    colored: bool,
    blocks_written: usize,
}

impl<W: Write> PanelWriter<W> {
    /// Creates a writer for a panel `width` columns wide.
    ///
    /// Fails if a panel line cannot hold `width` cells.
    pub fn new(out: W, width: usize, padding: Padding, colored: bool) -> RenderResult<Self> {
        let width = u16::try_from(width).map_err(|_| RenderError::PanelTooWide {
            width,
            max: usize::from(u16::MAX),
        })?;
        Ok(Self {
            out,
            width,
            padding,
            colored,
            blocks_written: 0,
        })
    }

    /// Writes the top border.
    pub fn begin(&mut self, title: &str) -> RenderResult<()> {
        write_buffer(&top_border(title, self.width), &mut self.out, self.colored)?;
        Ok(())
    }

    /// Writes one block, preceded by the vertical padding after the first.
    pub fn write_block(&mut self, block: &BlockTable) -> RenderResult<()> {
        if self.blocks_written > 0 {
            let gap = spacer(self.width);
            for _ in 0..self.padding.top + self.padding.bottom {
                write_buffer(&gap, &mut self.out, self.colored)?;
            }
        }
        for line in block_lines(block, self.padding, self.width) {
            write_buffer(&line, &mut self.out, self.colored)?;
        }
        self.blocks_written += 1;
        Ok(())
    }

    /// Writes the bottom border, flushes, and hands back the writer.
    pub fn finish(mut self) -> RenderResult<W> {
        write_buffer(&bottom_border(self.width), &mut self.out, self.colored)?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Writes a whole render tree as a titled panel.
pub fn write_tree<W: Write>(
    out: W,
    tree: &RenderTree,
    title: &str,
    available: usize,
    colored: bool,
) -> RenderResult<W> {
    let width = panel_width(available, tree.width());
    let mut writer = PanelWriter::new(out, width, tree.padding, colored)?;
    writer.begin(title)?;
    for block in &tree.blocks {
        writer.write_block(block)?;
    }
    writer.finish()
}

/// Writes a buffer line by line, as ANSI-styled runs or as plain text.
pub fn write_buffer<W: Write>(buf: &Buffer, out: &mut W, colored: bool) -> io::Result<()> {
    let width = usize::from(buf.area.width).max(1);
    for line in buf.content().chunks(width) {
        if colored {
            write_styled_line(line, out)?;
        } else {
            let text: String = line.iter().map(Cell::symbol).collect();
            writeln!(out, "{}", text.trim_end())?;
        }
    }
    Ok(())
}

fn write_styled_line<W: Write>(line: &[Cell], out: &mut W) -> io::Result<()> {
    let mut start = 0;
    while start < line.len() {
        let style = cell_style(&line[start]);
        let end = line[start..]
            .iter()
            .position(|cell| cell_style(cell) != style)
            .map_or(line.len(), |len| start + len);
        let text: String = line[start..end].iter().map(Cell::symbol).collect();

        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        if let Some(fg) = style.fg.and_then(term_color) {
            queue!(out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg.and_then(term_color) {
            queue!(out, SetBackgroundColor(bg))?;
        }
        for attribute in attributes(style.add_modifier) {
            queue!(out, SetAttribute(attribute))?;
        }
        queue!(out, Print(text))?;

        start = end;
    }
    queue!(out, SetAttribute(Attribute::Reset), ResetColor, Print("\n"))?;
    Ok(())
}

fn cell_style(cell: &Cell) -> Style {
    Style::default()
        .fg(cell.fg)
        .bg(cell.bg)
        .add_modifier(cell.modifier)
}

fn attributes(modifier: Modifier) -> Vec<Attribute> {
    [
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
        (Modifier::REVERSED, Attribute::Reverse),
    ]
    .into_iter()
    .filter(|(flag, _)| modifier.contains(*flag))
    .map(|(_, attribute)| attribute)
    .collect()
}

fn term_color(color: Color) -> Option<TermColor> {
    let color = match color {
        Color::Reset => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    };
    Some(color)
}
