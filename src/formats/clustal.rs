//! Clustal format parser.
//!
//! ```text
//! CLUSTAL W (1.83) multiple sequence alignment
//!
//! seq1      ACGTACGTAC 10
//! seq2      ACGT--GTAC 8
//!           ****  ****
//!
//! seq1      GGGG 14
//! seq2      GGCC 12
//! ```
//!
//! Blocks are separated by blank lines. Lines starting with whitespace
//! carry the conservation markup and are skipped, as are the optional
//! residue counts after each sequence chunk.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::Record;

/// Header words accepted on the first line.
const HEADERS: [&str; 3] = ["CLUSTAL", "MUSCLE", "PROBCONS"];

/// Errors that can occur during Clustal parsing.
#[derive(Error, Debug)]
pub enum ClustalError {
    #[error("Empty Clustal file")]
    EmptyFile,

    #[error("Missing CLUSTAL header, got '{0}'")]
    MissingHeader(String),

    #[error("Line {0}: expected a name followed by sequence data")]
    MalformedLine(usize),

    #[error("No sequences found")]
    NoSequences,
}

/// Result type for Clustal operations.
pub type ClustalResult<T> = Result<T, ClustalError>;

/// Parses Clustal content from a string.
///
/// Sequences keep the order of their first appearance.
pub fn parse_clustal_str(content: &str) -> ClustalResult<Vec<Record>> {
    let mut lines = content
        .lines()
        .enumerate()
        .skip_while(|(_, line)| line.trim().is_empty());

    let (_, header) = lines.next().ok_or(ClustalError::EmptyFile)?;
    if !HEADERS.iter().any(|word| header.trim_start().starts_with(word)) {
        return Err(ClustalError::MissingHeader(header.trim().to_string()));
    }

    let mut sequences: Vec<(String, String)> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for (index, line) in lines {
        if line.trim().is_empty() || line.starts_with(char::is_whitespace) {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(name), Some(chunk)) = (fields.next(), fields.next()) else {
            return Err(ClustalError::MalformedLine(index + 1));
        };

        match index_of.get(name) {
            Some(&idx) => sequences[idx].1.push_str(chunk),
            None => {
                index_of.insert(name.to_string(), sequences.len());
                sequences.push((name.to_string(), chunk.to_string()));
            }
        }
    }

    if sequences.is_empty() {
        return Err(ClustalError::NoSequences);
    }

    Ok(sequences
        .into_iter()
        .map(|(name, data)| Record::new(name, data))
        .collect())
}
