//! Multi-format alignment readers.
//!
//! Every reader turns file content into an ordered list of
//! [`Record`]s; validating that they form an alignment is left to
//! [`crate::model::Alignment`].
//!
//! Supported formats:
//! - FASTA (.fasta, .fa, .fna, .faa, .fas)
//! - Clustal (.aln, .clustal, .clw)
//! - Stockholm (.sto, .stk, .stockholm)
//! - NEXUS (.nex, .nexus, .nxs)
//! - PHYLIP (.phy, .phylip) - sequential and interleaved
//!
//! Format detection priority when no format is forced:
//! 1. File extension
//! 2. Content-based detection
//! 3. Trying every reader in turn

pub mod clustal;
pub mod fasta;
pub mod nexus;
pub mod phylip;
pub mod stockholm;

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::model::Record;

/// Known alignment file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Clustal,
    Stockholm,
    Nexus,
    Phylip,
}

impl FileFormat {
    /// All formats, in the order they are tried as a last resort.
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Fasta,
        FileFormat::Clustal,
        FileFormat::Stockholm,
        FileFormat::Nexus,
        FileFormat::Phylip,
    ];
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::Clustal => write!(f, "Clustal"),
            FileFormat::Stockholm => write!(f, "Stockholm"),
            FileFormat::Phylip => write!(f, "PHYLIP"),
            FileFormat::Nexus => write!(f, "NEXUS"),
        }
    }
}

/// Errors that can occur during file parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("Could not determine file format.\n\
             Hint: Use -f/--format to specify the format explicitly:\n  \
             msawrap -f fasta -i <file>\n  \
             msawrap -f clustal -i <file>\n  \
             msawrap -f stockholm -i <file>\n  \
             msawrap -f nexus -i <file>\n  \
             msawrap -f phylip -i <file>")]
    UnknownFormat,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),

    #[error("Clustal error: {0}")]
    ClustalError(#[from] clustal::ClustalError),

    #[error("Stockholm error: {0}")]
    StockholmError(#[from] stockholm::StockholmError),

    #[error("PHYLIP error: {0}")]
    PhylipError(#[from] phylip::PhylipError),

    #[error("NEXUS error: {0}")]
    NexusError(#[from] nexus::NexusError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Detects format from file extension.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        "fa" | "fas" | "fasta" | "fna" | "faa" | "ffn" | "frn" | "mfa" => Some(FileFormat::Fasta),
        "aln" | "clustal" | "clw" => Some(FileFormat::Clustal),
        "sto" | "stk" | "stockholm" => Some(FileFormat::Stockholm),
        "nex" | "nexus" | "nxs" => Some(FileFormat::Nexus),
        "phy" | "phylip" | "ph" => Some(FileFormat::Phylip),
        _ => None,
    }
}

/// Detects the file format by examining the first non-empty line.
pub fn detect_format_from_content(content: &str) -> Option<FileFormat> {
    let trimmed = content.lines().map(str::trim).find(|line| !line.is_empty())?;
    let upper = trimmed.to_uppercase();

    if upper.starts_with("#NEXUS") {
        return Some(FileFormat::Nexus);
    }
    if upper.starts_with("# STOCKHOLM") {
        return Some(FileFormat::Stockholm);
    }
    if trimmed.starts_with("CLUSTAL") {
        return Some(FileFormat::Clustal);
    }
    if trimmed.starts_with('>') {
        return Some(FileFormat::Fasta);
    }

    // PHYLIP: first line is "ntax nchar" (two integers)
    let mut parts = trimmed.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(ntax), Some(nchar))
            if ntax.parse::<usize>().is_ok() && nchar.parse::<usize>().is_ok() =>
        {
            Some(FileFormat::Phylip)
        }
        _ => None,
    }
}

/// Parses content with a specific format.
pub fn parse_content(content: &str, format: FileFormat) -> ParseResult<Vec<Record>> {
    let records = match format {
        FileFormat::Fasta => fasta::parse_fasta_str(content)?,
        FileFormat::Clustal => clustal::parse_clustal_str(content)?,
        FileFormat::Stockholm => stockholm::parse_stockholm_str(content)?,
        FileFormat::Phylip => phylip::parse_phylip_str(content)?,
        FileFormat::Nexus => nexus::parse_nexus_str(content)?,
    };
    Ok(records)
}

/// Parses content, guessing the format when none is forced.
pub fn parse_content_with_options(
    content: &str,
    forced_format: Option<FileFormat>,
    extension_hint: Option<FileFormat>,
) -> ParseResult<(Vec<Record>, FileFormat)> {
    if let Some(format) = forced_format {
        return parse_content(content, format).map(|records| (records, format));
    }

    if let Some(format) = extension_hint {
        match parse_content(content, format) {
            Ok(records) => return Ok((records, format)),
            Err(err) => log::debug!("extension suggested {} but parsing failed: {}", format, err),
        }
    }

    if let Some(format) = detect_format_from_content(content) {
        return parse_content(content, format).map(|records| (records, format));
    }

    for format in FileFormat::ALL {
        match parse_content(content, format) {
            Ok(records) => return Ok((records, format)),
            Err(err) => log::debug!("not {}: {}", format, err),
        }
    }
    Err(ParseError::UnknownFormat)
}

/// Reads an alignment file into records.
///
/// With `forced_format` the matching reader is used directly; otherwise the
/// format is detected from the extension, then the content.
pub fn read_alignment<P: AsRef<Path>>(
    path: P,
    forced_format: Option<FileFormat>,
) -> ParseResult<Vec<Record>> {
    let file = File::open(&path)?;
    let file_size = file.metadata()?.len() as usize;

    if file_size == 0 {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;

    let hint = detect_format_from_extension(&path);
    let (records, format) = parse_content_with_options(&content, forced_format, hint)?;
    log::info!(
        "read {} {} records from {}",
        records.len(),
        format,
        path.as_ref().display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_fasta() {
        let content = ">seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Fasta));
    }

    #[test]
    fn test_detect_phylip() {
        let content = "  3   10\nseq1      ACGTACGTAC\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Phylip));
    }

    #[test]
    fn test_detect_nexus() {
        let content = "#NEXUS\nBEGIN DATA;\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Nexus));

        // Case insensitive
        let content2 = "#nexus\nbegin data;\n";
        assert_eq!(detect_format_from_content(content2), Some(FileFormat::Nexus));
    }

    #[test]
    fn test_detect_clustal_and_stockholm() {
        let clustal = "CLUSTAL W (1.83) multiple sequence alignment\n\nseq1 ACGT\n";
        assert_eq!(detect_format_from_content(clustal), Some(FileFormat::Clustal));

        let stockholm = "# STOCKHOLM 1.0\nseq1 ACGT\n//\n";
        assert_eq!(detect_format_from_content(stockholm), Some(FileFormat::Stockholm));
    }

    #[test]
    fn test_detect_unknown() {
        let content = "This is not a valid sequence file\n";
        assert_eq!(detect_format_from_content(content), None);
    }

    #[test]
    fn test_detect_with_leading_empty_lines() {
        let content = "\n\n  \n>seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Fasta));
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("test.fa"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.FASTA"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.aln"), Some(FileFormat::Clustal));
        assert_eq!(detect_format_from_extension("test.sto"), Some(FileFormat::Stockholm));
        assert_eq!(detect_format_from_extension("test.nex"), Some(FileFormat::Nexus));
        assert_eq!(detect_format_from_extension("test.phy"), Some(FileFormat::Phylip));
        assert_eq!(detect_format_from_extension("test.txt"), None);
        assert_eq!(detect_format_from_extension("noext"), None);
    }

    #[test]
    fn test_forced_format_wins() {
        let content = ">seq1\nACGT\n";
        let result = parse_content_with_options(content, Some(FileFormat::Phylip), None);
        assert!(matches!(result, Err(ParseError::PhylipError(_))));
    }

    #[test]
    fn test_wrong_extension_falls_back_to_content() {
        let content = ">seq1\nACGT\n>seq2\nAC-T\n";
        let (records, format) =
            parse_content_with_options(content, None, Some(FileFormat::Nexus)).unwrap();
        assert_eq!(format, FileFormat::Fasta);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_undetectable_content() {
        let result = parse_content_with_options("hello world\n", None, None);
        assert!(matches!(result, Err(ParseError::UnknownFormat)));
    }

    #[test]
    fn test_read_alignment_from_file() {
        let mut file = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
        write!(file, ">seq1 first\nAC-GT\n>seq2\nACGGT\n").unwrap();

        let records = read_alignment(file.path(), None).unwrap();
        assert_eq!(records, vec![Record::new("seq1", "AC-GT"), Record::new("seq2", "ACGGT")]);
    }

    #[test]
    fn test_read_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = read_alignment(file.path(), Some(FileFormat::Fasta));
        assert!(matches!(result, Err(ParseError::EmptyFile)));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_alignment("/nonexistent/alignment.fa", None);
        match result {
            Err(ParseError::IoError(err)) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }
}
