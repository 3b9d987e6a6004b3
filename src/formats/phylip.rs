//! PHYLIP format parser.
//!
//! Supports both sequential and interleaved PHYLIP formats.
//!
//! ## PHYLIP Format
//!
//! The first line contains the number of sequences and the sequence length:
//! ```text
//!  3 10
//! ```
//!
//! ### Sequential Format
//! Each sequence name (10 chars, padded) followed by all its data:
//! ```text
//!  3 10
//! Seq1      ACGTACGTAC
//! Seq2      TGCATGCATG
//! Seq3      AAAACCCCGG
//! ```
//!
//! ### Interleaved Format
//! Names on first block, then data continues in subsequent blocks:
//! ```text
//!  3 20
//! Seq1      ACGTACGTAC
//! Seq2      TGCATGCATG
//! Seq3      AAAACCCCGG
//!
//! GTGTGTGTGT
//! CACACACACA
//! TTTTTTTTTT
//! ```
//!
//! ## Relaxed Parsing
//!
//! Names are not required to be exactly 10 characters: a name followed by
//! whitespace is accepted too.

use thiserror::Error;

use crate::model::Record;

/// Errors that can occur during PHYLIP parsing.
#[derive(Error, Debug)]
pub enum PhylipError {
    #[error("Empty PHYLIP file")]
    EmptyFile,

    #[error("Invalid header: expected 'ntax nchar' (two integers), got '{0}'")]
    InvalidHeader(String),

    #[error("Invalid sequence count in header: '{0}' is not a valid number")]
    InvalidSequenceCount(String),

    #[error("Invalid sequence length in header: '{0}' is not a valid number")]
    InvalidSequenceLength(String),

    #[error("Sequence '{name}' has length {found}, expected {expected}")]
    SequenceLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("No sequence data found after header")]
    NoSequenceData,
}

/// Result type for PHYLIP operations.
pub type PhylipResult<T> = Result<T, PhylipError>;

/// Parses PHYLIP content from a string.
pub fn parse_phylip_str(content: &str) -> PhylipResult<Vec<Record>> {
    let mut lines = content.lines().skip_while(|line| line.trim().is_empty());
    let header = lines.next().ok_or(PhylipError::EmptyFile)?.trim();

    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(PhylipError::InvalidHeader(header.to_string()));
    }

    let ntax: usize = parts[0]
        .parse()
        .map_err(|_| PhylipError::InvalidSequenceCount(parts[0].to_string()))?;
    let nchar: usize = parts[1]
        .parse()
        .map_err(|_| PhylipError::InvalidSequenceLength(parts[1].to_string()))?;

    if ntax == 0 {
        return Err(PhylipError::InvalidSequenceCount("0".to_string()));
    }

    // Empty lines are kept: they separate interleaved blocks
    let data_lines: Vec<&str> = lines.collect();
    if data_lines.iter().all(|line| line.trim().is_empty()) {
        return Err(PhylipError::NoSequenceData);
    }

    let records = parse_phylip_data(&data_lines, ntax, nchar)?;

    if nchar > 0 {
        if let Some(record) = records.iter().find(|record| record.len() != nchar) {
            return Err(PhylipError::SequenceLengthMismatch {
                name: record.id.clone(),
                expected: nchar,
                found: record.len(),
            });
        }
    }

    Ok(records)
}

/// Splits a line into name and sequence parts.
///
/// Handles both strict PHYLIP (10-char names) and relaxed formats.
fn split_name_and_sequence(line: &str) -> (Option<String>, String) {
    let line = line.trim();
    if line.is_empty() {
        return (None, String::new());
    }

    let squeeze = |s: &str| -> String { s.chars().filter(|c| !c.is_whitespace()).collect() };

    // Strict format: name is exactly the first 10 chars, padded with spaces
    if let Some((potential_name, potential_seq)) = line
        .char_indices()
        .nth(10)
        .map(|(idx, _)| line.split_at(idx))
    {
        let name = potential_name.trim();
        let seq = squeeze(potential_seq);
        if !name.is_empty()
            && name.split_whitespace().count() == 1
            && !seq.is_empty()
            && seq.chars().all(is_sequence_char)
        {
            return (Some(name.to_string()), seq);
        }
    }

    // Relaxed format: whitespace-separated name and sequence
    if let Some((name, rest)) = line.split_once(char::is_whitespace) {
        let seq = squeeze(rest);
        if !name.is_empty() && !seq.is_empty() && seq.chars().all(is_sequence_char) {
            return (Some(name.to_string()), seq);
        }
    }

    // Just sequence data (continuation line)
    let seq = squeeze(line);
    if seq.chars().all(is_sequence_char) {
        return (None, seq);
    }

    (Some(line.to_string()), String::new())
}

/// Checks if a character is a valid sequence character.
fn is_sequence_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '-' | '.' | '*' | '?')
}

/// Parses PHYLIP data lines. Handles both sequential and interleaved formats.
fn parse_phylip_data(lines: &[&str], ntax: usize, nchar: usize) -> PhylipResult<Vec<Record>> {
    let mut sequences: Vec<(String, String)> = Vec::with_capacity(ntax);
    let mut in_interleaved_continuation = false;
    let mut interleaved_idx = 0;

    for line in lines {
        let trimmed = line.trim();

        // Empty line indicates block boundary in interleaved format
        if trimmed.is_empty() {
            if sequences.len() == ntax {
                in_interleaved_continuation = true;
                interleaved_idx = 0;
            }
            continue;
        }

        let (name, seq) = split_name_and_sequence(trimmed);

        if in_interleaved_continuation {
            // Continuation blocks carry no names; a strict-looking split is just data
            let data = match name {
                Some(n) if seq.is_empty() => n,
                Some(n) => n + &seq,
                None => seq,
            };
            if let Some((_, existing)) = sequences.get_mut(interleaved_idx) {
                existing.push_str(&data);
                interleaved_idx = (interleaved_idx + 1) % ntax;
            }
        } else if let Some(n) = name {
            if sequences.len() < ntax {
                sequences.push((n, seq));
            } else if let Some((_, existing)) = sequences.iter_mut().find(|(sn, _)| sn == &n) {
                existing.push_str(&seq);
            }
        } else if let Some((_, existing)) = sequences.last_mut() {
            // Continuation of previous sequence in sequential format
            existing.push_str(&seq);
        }

        if sequences.len() == ntax
            && nchar > 0
            && sequences.iter().all(|(_, data)| data.len() >= nchar)
        {
            break;
        }
    }

    if sequences.is_empty() {
        return Err(PhylipError::NoSequenceData);
    }

    Ok(sequences
        .into_iter()
        .map(|(name, data)| Record::new(name, data))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequential_simple() {
        let content = " 3 10
Seq1      ACGTACGTAC
Seq2      TGCATGCATG
Seq3      AAAACCCCGG
";
        let records = parse_phylip_str(content).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "Seq1");
        assert_eq!(records[0].sequence, "ACGTACGTAC");
        assert_eq!(records[1].id, "Seq2");
        assert_eq!(records[2].id, "Seq3");
    }

    #[test]
    fn test_parse_sequential_multiline() {
        let content = " 2 20
Seq1      ACGTACGTAC
GGGGGGGGGG
Seq2      TGCATGCATG
CCCCCCCCCC
";
        let records = parse_phylip_str(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, "ACGTACGTACGGGGGGGGGG");
        assert_eq!(records[1].sequence, "TGCATGCATGCCCCCCCCCC");
    }

    #[test]
    fn test_parse_interleaved() {
        let content = " 3 20
Seq1      ACGTACGTAC
Seq2      TGCATGCATG
Seq3      AAAACCCCGG

GGGGGGGGGG
CCCCCCCCCC
TTTTTTTTTT
";
        let records = parse_phylip_str(content).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sequence, "ACGTACGTACGGGGGGGGGG");
        assert_eq!(records[1].sequence, "TGCATGCATGCCCCCCCCCC");
        assert_eq!(records[2].sequence, "AAAACCCCGGTTTTTTTTTT");
    }

    #[test]
    fn test_parse_relaxed_names() {
        let content = "3 10
seq1 ACGTACGTAC
seq2 TGCATGCATG
seq3 AAAACCCCGG
";
        let records = parse_phylip_str(content).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[2].sequence, "AAAACCCCGG");
    }

    #[test]
    fn test_parse_with_gaps() {
        let content = " 2 10
Seq1      ACGT--GTAC
Seq2      TG--TGCATG
";
        let records = parse_phylip_str(content).unwrap();
        assert_eq!(records[0].sequence, "ACGT--GTAC");
        assert_eq!(records[1].sequence, "TG--TGCATG");
    }

    #[test]
    fn test_length_mismatch() {
        let content = " 2 10
Seq1      ACGTACGTAC
Seq2      TGCA
";
        assert!(matches!(
            parse_phylip_str(content),
            Err(PhylipError::SequenceLengthMismatch { expected: 10, found: 4, .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_phylip_str(""), Err(PhylipError::EmptyFile)));
        assert!(matches!(parse_phylip_str("\n  \n"), Err(PhylipError::EmptyFile)));
    }

    #[test]
    fn test_invalid_header() {
        let result = parse_phylip_str("not a valid header\nSeq1 ACGT\n");
        assert!(matches!(result, Err(PhylipError::InvalidSequenceCount(_))));

        let result = parse_phylip_str("invalid\nSeq1 ACGT\n");
        assert!(matches!(result, Err(PhylipError::InvalidHeader(_))));
    }

    #[test]
    fn test_no_sequence_data() {
        assert!(matches!(
            parse_phylip_str(" 2 10\n\n"),
            Err(PhylipError::NoSequenceData)
        ));
    }
}
