//! msawrap - Wrapped Alignment Printer
//!
//! Prints a sequence alignment as colored blocks that fit the terminal.
//!
//! ## Usage
//!
//! ```bash
//! msawrap -i <alignment_file>
//! msawrap -f clustal -i <alignment_file>     # Force format
//! msawrap -i aln.fa -c scheme.json -p 0,1     # Custom colors, tight padding
//! msawrap -i aln.fa --no-wrap | less -R       # One block, full length
//! ```
//!
//! ## Supported Formats
//!
//! - FASTA (.fasta, .fa, .fna, .faa, .fas)
//! - Clustal (.aln, .clustal, .clw)
//! - Stockholm (.sto, .stk, .stockholm)
//! - NEXUS (.nex, .nexus, .nxs)
//! - PHYLIP (.phy, .phylip)

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};

use msawrap::color::ColorClassifier;
use msawrap::emit::BlockEmitter;
use msawrap::formats::{read_alignment, FileFormat};
use msawrap::layout::{compute_blocks, LayoutConfig, Padding};
use msawrap::model::Alignment;
use msawrap::render::{panel_width, terminal_width, PanelWriter, PANEL_CHROME};
use msawrap::scheme::ColorScheme;

/// File format specification for command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// FASTA format
    Fasta,
    /// Clustal format
    Clustal,
    /// Stockholm format
    Stockholm,
    /// NEXUS format
    Nexus,
    /// PHYLIP format, sequential or interleaved
    Phylip,
    /// PHYLIP format, sequential
    PhylipSequential,
    /// PHYLIP format with names longer than 10 characters
    PhylipRelaxed,
    /// Auto-detect from extension and content
    Auto,
}

impl From<FormatArg> for Option<FileFormat> {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Fasta => Some(FileFormat::Fasta),
            FormatArg::Clustal => Some(FileFormat::Clustal),
            FormatArg::Stockholm => Some(FileFormat::Stockholm),
            FormatArg::Nexus => Some(FileFormat::Nexus),
            // One reader handles every PHYLIP flavour
            FormatArg::Phylip | FormatArg::PhylipSequential | FormatArg::PhylipRelaxed => {
                Some(FileFormat::Phylip)
            }
            FormatArg::Auto => None,
        }
    }
}

/// msawrap - print a multiple sequence alignment wrapped to the terminal width
///
/// Sequences are cut into blocks of columns; each block shows the sequence
/// name, the number of its first residue and the colored residues.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Alignment file to display
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Alignment file format
    #[arg(short = 'f', long = "format", value_enum, default_value = "fasta")]
    format: FormatArg,

    /// Longest sequence name shown before truncation
    #[arg(short = 'n', long = "max-name-width", default_value = "10")]
    max_name_width: usize,

    /// JSON color scheme overriding the default residue colors
    #[arg(short = 'c', long = "colors")]
    colors: Option<PathBuf>,

    /// Character counted as a gap in residue numbering
    #[arg(short = 'g', long = "gap-character", default_value = "-")]
    gap_character: char,

    /// Padding as top,right,bottom,left (1, 2 or 4 comma-separated values)
    #[arg(short = 'p', long = "padding", default_value = "1,2,1,2")]
    padding: Padding,

    /// Available width in columns (default: terminal width)
    #[arg(short = 'w', long = "width")]
    width: Option<usize>,

    /// Print the whole alignment as a single block
    #[arg(long = "no-wrap")]
    no_wrap: bool,

    /// Print the render tree as JSON instead of drawing it
    #[arg(long = "json")]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Builds the residue classifier, layering the scheme file over the defaults.
fn load_classifier(colors: Option<&PathBuf>) -> Result<ColorClassifier> {
    let classifier = ColorClassifier::default();
    let Some(path) = colors else {
        return Ok(classifier);
    };

    let scheme = ColorScheme::load(path)
        .with_context(|| format!("Failed to load color scheme {}", path.display()))?;
    let overrides = scheme
        .styles()
        .with_context(|| format!("Invalid color scheme {}", path.display()))?;
    log::info!("loaded {} color overrides from {}", overrides.len(), path.display());
    Ok(classifier.with_overrides(overrides))
}

fn run(args: &Args) -> Result<()> {
    let classifier = load_classifier(args.colors.as_ref())?;

    let records = read_alignment(&args.input, args.format.into())
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let alignment = Alignment::from_records(records, args.gap_character)
        .with_context(|| format!("{} is not a valid alignment", args.input.display()))?;

    let config =
        LayoutConfig::with_styles(args.max_name_width, classifier)?.with_padding(args.padding);

    let available = args.width.unwrap_or_else(terminal_width);
    let blocks = compute_blocks(
        &alignment,
        &config,
        available.saturating_sub(PANEL_CHROME),
        args.no_wrap,
    )
    .context("Cannot lay out the alignment")?;
    let emitter = BlockEmitter::new(blocks.widths(), config.padding());

    let stdout = io::stdout();
    if args.json {
        let tree = emitter.emit(blocks);
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, &tree)?;
        writeln!(out)?;
        return Ok(());
    }

    let title = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let colored = stdout.is_terminal();
    let mut writer = PanelWriter::new(
        stdout.lock(),
        panel_width(available, emitter.line_width()),
        config.padding(),
        colored,
    )
    .context("Cannot draw the alignment")?;

    writer.begin(&title)?;
    for block in blocks {
        writer.write_block(&emitter.emit_block(&block))?;
    }
    writer.finish()?;
    Ok(())
}

/// Exit status for a failed run: the OS code of an underlying I/O error, else 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .filter_map(io::Error::raw_os_error)
        .find_map(|code| u8::try_from(code).ok().filter(|&code| code > 0))
        .unwrap_or(1)
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level())
        .format_timestamp(None) // Don't show timestamps
        .format_target(false) // Don't show module names
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["msawrap", "-i", "aln.fa"]).unwrap();
        assert_eq!(args.format, FormatArg::Fasta);
        assert_eq!(args.max_name_width, 10);
        assert_eq!(args.gap_character, '-');
        assert_eq!(args.padding, Padding::new(1, 2, 1, 2));
        assert!(!args.no_wrap);
        assert_eq!(args.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_parse_options() {
        let args = Args::try_parse_from([
            "msawrap", "-i", "aln.phy", "-f", "phylip-relaxed", "-p", "0,1", "-w", "120", "-vv",
        ])
        .unwrap();
        assert_eq!(Option::<FileFormat>::from(args.format), Some(FileFormat::Phylip));
        assert_eq!(args.padding, Padding::new(0, 1, 0, 1));
        assert_eq!(args.width, Some(120));
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_padding_rejected() {
        assert!(Args::try_parse_from(["msawrap", "-i", "a.fa", "-p", "1,2,3"]).is_err());
        assert!(Args::try_parse_from(["msawrap", "-i", "a.fa", "-p", "x"]).is_err());
    }

    #[test]
    fn test_input_required() {
        assert!(Args::try_parse_from(["msawrap"]).is_err());
    }

    #[test]
    fn test_exit_code_from_io_error() {
        let io_err = io::Error::from_raw_os_error(2);
        let err = anyhow::Error::new(io_err).context("Failed to read aln.fa");
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_defaults_to_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("bad alignment")), 1);

        let custom = io::Error::new(io::ErrorKind::Other, "no os code");
        assert_eq!(exit_code(&anyhow::Error::new(custom)), 1);

        let out_of_range = io::Error::from_raw_os_error(300);
        assert_eq!(exit_code(&anyhow::Error::new(out_of_range)), 1);
    }

    #[test]
    fn test_exit_code_through_render_error() {
        use msawrap::render::RenderError;

        let broken_pipe = RenderError::from(io::Error::from_raw_os_error(32));
        assert_eq!(exit_code(&anyhow::Error::new(broken_pipe)), 32);

        let too_wide = RenderError::PanelTooWide {
            width: 70_000,
            max: 65_535,
        };
        assert_eq!(exit_code(&anyhow::Error::new(too_wide)), 1);
    }

    #[test]
    fn test_default_classifier_without_scheme() {
        let classifier = load_classifier(None).unwrap();
        assert_eq!(classifier.style_map(), &ColorClassifier::default_styles());
    }

    #[test]
    fn test_scheme_overrides_merge() {
        use msawrap::color::{bold, StyleProvider};
        use ratatui::style::Color;

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"colors": {"A": "blue"}}"#).unwrap();

        let classifier = load_classifier(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(classifier.classify('A'), bold(Color::Blue));
        assert_eq!(classifier.classify('C'), ColorClassifier::default().classify('C'));
    }

    #[test]
    fn test_missing_scheme_keeps_os_code() {
        let err = load_classifier(Some(&PathBuf::from("/nonexistent/scheme.json"))).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }
}
