//! Stockholm format parser.
//!
//! ```text
//! # STOCKHOLM 1.0
//! #=GF ID example
//! seq1  ACGU-ACGU
//! seq2  ACGUUACGU
//! #=GC SS_cons <<<...>>>
//! //
//! ```
//!
//! Markup lines (`#=GF`, `#=GS`, `#=GR`, `#=GC`) and comments are skipped.
//! Only the first alignment of a multi-alignment file is read.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::Record;

/// Errors that can occur during Stockholm parsing.
#[derive(Error, Debug)]
pub enum StockholmError {
    #[error("Empty Stockholm file")]
    EmptyFile,

    #[error("Missing '# STOCKHOLM' header, got '{0}'")]
    MissingHeader(String),

    #[error("Line {0}: expected a name followed by sequence data")]
    MalformedLine(usize),

    #[error("No sequences found")]
    NoSequences,
}

/// Result type for Stockholm operations.
pub type StockholmResult<T> = Result<T, StockholmError>;

/// Parses the first alignment of Stockholm content.
///
/// Interleaved blocks append to sequences by name, in order of first
/// appearance. Reading stops at the `//` terminator.
pub fn parse_stockholm_str(content: &str) -> StockholmResult<Vec<Record>> {
    let mut lines = content
        .lines()
        .enumerate()
        .skip_while(|(_, line)| line.trim().is_empty());

    let (_, header) = lines.next().ok_or(StockholmError::EmptyFile)?;
    if !header.trim().to_uppercase().starts_with("# STOCKHOLM") {
        return Err(StockholmError::MissingHeader(header.trim().to_string()));
    }

    let mut sequences: Vec<(String, String)> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for (index, line) in lines {
        let line = line.trim();
        if line == "//" {
            break;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(name), Some(chunk)) = (fields.next(), fields.next()) else {
            return Err(StockholmError::MalformedLine(index + 1));
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
        return Err(StockholmError::NoSequences);
    }

    Ok(sequences
        .into_iter()
        .map(|(name, data)| Record::new(name, data))
        .collect())
}
