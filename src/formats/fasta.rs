//! FASTA format parser.
//!
//! Supports both single-line and multi-line sequences.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGT-ACGT-ACGT...
//! >another_sequence
//! TGCATGCA--GCA...
//! ```

use thiserror::Error;

use crate::model::Record;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Empty sequence identifier at line {0}")]
    EmptyIdentifier(usize),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses FASTA content from a string.
///
/// The identifier is the first whitespace-separated word of the header.
/// Whitespace inside sequence lines is dropped.
///
/// # Examples
///
/// ```
/// use msawrap::formats::fasta::parse_fasta_str;
///
/// let records = parse_fasta_str(">seq1 desc\nAC-GT\n>seq2\nACGGT\n").unwrap();
/// assert_eq!(records[0].id, "seq1");
/// assert_eq!(records[1].sequence, "ACGGT");
/// ```
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut current_id: Option<&str> = None;
    let mut current_seq: Vec<u8> = Vec::new();
    let mut prev_seq_len: usize = 1000; // alignments have uniform length

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                prev_seq_len = current_seq.len();
                records.push(Record::from_bytes(id, std::mem::take(&mut current_seq)));
            }

            let id = header.split_whitespace().next().unwrap_or("");
            if id.is_empty() {
                return Err(FastaError::EmptyIdentifier(line_number));
            }

            current_id = Some(id);
            current_seq = Vec::with_capacity(prev_seq_len);
        } else {
            if current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }

            // Fast append: most FASTA lines don't have internal whitespace
            if line.bytes().all(|b| !b.is_ascii_whitespace()) {
                current_seq.extend_from_slice(line.as_bytes());
            } else {
                current_seq.extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
            }
        }
    }

    if let Some(id) = current_id {
        records.push(Record::from_bytes(id, current_seq));
    }

    if records.is_empty() {
        return Err(FastaError::EmptyFile);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fasta() {
        let content = ">seq1\nACGT\n>seq2\nTGCA\n";
        let records = parse_fasta_str(content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].sequence, "ACGT");
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].sequence, "TGCA");
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let content = ">seq1\nACGT\nTG-A\nAAAA\n";
        let records = parse_fasta_str(content).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, "ACGTTG-AAAAA");
    }

    #[test]
    fn test_parse_with_description() {
        let content = ">seq1 This is a description\nACGT\n";
        let records = parse_fasta_str(content).unwrap();
        assert_eq!(records[0].id, "seq1");
    }

    #[test]
    fn test_parse_with_empty_lines_and_spaces() {
        let content = ">seq1\nAC GT\n\n>seq2\n\nTGCA\n";
        let records = parse_fasta_str(content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, "ACGT");
        assert_eq!(records[1].sequence, "TGCA");
    }

    #[test]
    fn test_header_without_sequence_kept() {
        // An all-empty record is still a record; the alignment check decides
        let content = ">seq1\n>seq2\nACGT\n";
        let records = parse_fasta_str(content).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_empty());
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_fasta_str(""), Err(FastaError::EmptyFile)));
    }

    #[test]
    fn test_empty_identifier() {
        let result = parse_fasta_str(">\nACGT\n");
        assert!(matches!(result, Err(FastaError::EmptyIdentifier(1))));
    }

    #[test]
    fn test_sequence_without_header() {
        let result = parse_fasta_str("ACGT\n>seq1\nTGCA\n");
        assert!(matches!(result, Err(FastaError::SequenceWithoutHeader(1))));
    }

    #[test]
    fn test_case_preservation() {
        let records = parse_fasta_str(">seq1\nacgt\n").unwrap();
        assert_eq!(records[0].sequence, "acgt");
    }
}
