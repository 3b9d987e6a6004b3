//! Data model for alignment rendering.
//!
//! This module contains the data structures for representing:
//! - Sequence records as produced by the format readers
//! - A validated, immutable multiple sequence alignment
//!
//! An [`Alignment`] is only ever built through a validating constructor, so
//! every consumer (the layout engine in particular) can rely on all
//! sequences having the same length.

use thiserror::Error;

/// Errors raised when an alignment or a layout configuration is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("names and sequences must have the same length (got {names} names and {sequences} sequences)")]
    CountMismatch { names: usize, sequences: usize },

    #[error("all sequences must have the same length: '{name}' (#{index}) has length {found}, expected {expected}")]
    LengthMismatch {
        name: String,
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("max name width must be strictly positive (got {0})")]
    InvalidMaxNameWidth(usize),

    #[error("padding takes 1, 2 or 4 values (got {0})")]
    InvalidPadding(usize),
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A single sequence with its identifier, as yielded by a format reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The sequence identifier (e.g. from the FASTA header, without '>')
    pub id: String,
    /// The aligned sequence data, gaps included
    pub sequence: String,
}

impl Record {
    /// Creates a new record.
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Creates a record from raw bytes collected by a parser.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; readers only push
    /// bytes from `&str` input, so this never loses data in practice.
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        let sequence = String::from_utf8(data)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
        Self {
            id: id.into(),
            sequence,
        }
    }

    /// Returns the length of the sequence in characters.
    pub fn len(&self) -> usize {
        self.sequence.chars().count()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// A validated multiple sequence alignment.
///
/// Immutable after construction. Lengths are counted in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    names: Vec<String>,
    sequences: Vec<String>,
    gap_character: char,
    sequence_length: usize,
}

impl Alignment {
    /// The gap character used when none is given.
    pub const DEFAULT_GAP: char = '-';

    /// Creates an alignment using the default gap character.
    pub fn new(names: Vec<String>, sequences: Vec<String>) -> ValidationResult<Self> {
        Self::with_gap_character(names, sequences, Self::DEFAULT_GAP)
    }

    /// Creates an alignment with an explicit gap character.
    pub fn with_gap_character(
        names: Vec<String>,
        sequences: Vec<String>,
        gap_character: char,
    ) -> ValidationResult<Self> {
        if names.len() != sequences.len() {
            return Err(ValidationError::CountMismatch {
                names: names.len(),
                sequences: sequences.len(),
            });
        }

        let sequence_length = Self::validate_lengths(&names, &sequences)?;

        Ok(Self {
            names,
            sequences,
            gap_character,
            sequence_length,
        })
    }

    /// Builds an alignment from reader output, preserving record order.
    pub fn from_records(
        records: impl IntoIterator<Item = Record>,
        gap_character: char,
    ) -> ValidationResult<Self> {
        let (names, sequences) = records
            .into_iter()
            .map(|record| (record.id, record.sequence))
            .unzip();
        Self::with_gap_character(names, sequences, gap_character)
    }

    /// Checks that every sequence matches the first one's length.
    fn validate_lengths(names: &[String], sequences: &[String]) -> ValidationResult<usize> {
        let Some(first) = sequences.first() else {
            return Ok(0);
        };
        let expected = first.chars().count();

        for (index, (name, sequence)) in names.iter().zip(sequences).enumerate().skip(1) {
            let found = sequence.chars().count();
            if found != expected {
                return Err(ValidationError::LengthMismatch {
                    name: name.clone(),
                    index,
                    expected,
                    found,
                });
            }
        }

        Ok(expected)
    }

    /// Sequence names, in input order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Aligned sequences, in input order.
    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    /// The character that marks an absent residue.
    pub fn gap_character(&self) -> char {
        self.gap_character
    }

    /// The alignment width (0 for an empty alignment).
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns true if the alignment holds no sequences.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Returns the longest name length in characters (0 if there are none).
    pub fn max_name_length(&self) -> usize {
        self.names
            .iter()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Iterates over `(name, sequence)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.sequences.iter().map(String::as_str))
    }

    /// 1-based, gap-adjusted coordinate of the residue at `column` in
    /// sequence `index`: gaps strictly before `column` do not count.
    ///
    /// Returns `None` if `index` is out of range or `column` is past the end.
    pub fn residue_offset(&self, index: usize, column: usize) -> Option<usize> {
        let sequence = self.sequences.get(index)?;
        if column > self.sequence_length {
            return None;
        }
        let gaps = sequence
            .chars()
            .take(column)
            .filter(|&c| c == self.gap_character)
            .count();
        Some(column - gaps + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_creation() {
        let record = Record::new("seq1", "AC-GT");
        assert_eq!(record.id, "seq1");
        assert_eq!(record.sequence, "AC-GT");
        assert_eq!(record.len(), 5);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_record_from_bytes() {
        let record = Record::from_bytes("seq1", b"ACGT".to_vec());
        assert_eq!(record.sequence, "ACGT");
    }

    #[test]
    fn test_alignment_valid() {
        let alignment =
            Alignment::new(strings(&["seq1", "seq2"]), strings(&["AC-GT", "ACGGT"])).unwrap();
        assert_eq!(alignment.sequence_count(), 2);
        assert_eq!(alignment.sequence_length(), 5);
        assert_eq!(alignment.gap_character(), '-');
        assert_eq!(alignment.names()[1], "seq2");
        assert_eq!(alignment.sequences()[0], "AC-GT");
        assert_eq!(alignment.max_name_length(), 4);
    }

    #[test]
    fn test_alignment_empty() {
        let alignment = Alignment::new(Vec::new(), Vec::new()).unwrap();
        assert!(alignment.is_empty());
        assert_eq!(alignment.sequence_length(), 0);
        assert_eq!(alignment.max_name_length(), 0);
    }

    #[test]
    fn test_alignment_count_mismatch() {
        let result = Alignment::new(strings(&["seq1", "seq2"]), strings(&["ACGT"]));
        assert_eq!(
            result,
            Err(ValidationError::CountMismatch {
                names: 2,
                sequences: 1
            })
        );
    }

    #[test]
    fn test_alignment_length_mismatch() {
        let result = Alignment::new(
            strings(&["seq1", "seq2", "seq3"]),
            strings(&["ACGT", "ACGT", "AC"]),
        );
        match result {
            Err(ValidationError::LengthMismatch {
                name,
                index,
                expected,
                found,
            }) => {
                assert_eq!(name, "seq3");
                assert_eq!(index, 2);
                assert_eq!(expected, 4);
                assert_eq!(found, 2);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_alignment_from_records() {
        let records = vec![Record::new("a", "A.C"), Record::new("b", "AGC")];
        let alignment = Alignment::from_records(records, '.').unwrap();
        assert_eq!(alignment.gap_character(), '.');
        let rows: Vec<_> = alignment.rows().collect();
        assert_eq!(rows, vec![("a", "A.C"), ("b", "AGC")]);
    }

    #[test]
    fn test_residue_offset_skips_gaps() {
        let alignment = Alignment::new(strings(&["s"]), strings(&["A-CGT"])).unwrap();
        assert_eq!(alignment.residue_offset(0, 0), Some(1));
        assert_eq!(alignment.residue_offset(0, 2), Some(2));
        assert_eq!(alignment.residue_offset(0, 3), Some(3));
        assert_eq!(alignment.residue_offset(0, 6), None);
        assert_eq!(alignment.residue_offset(1, 0), None);
    }

    #[test]
    fn test_lengths_counted_in_characters() {
        // Multi-byte characters count once
        let alignment = Alignment::new(strings(&["s", "t"]), strings(&["AÅC", "ACG"])).unwrap();
        assert_eq!(alignment.sequence_length(), 3);
    }
}
