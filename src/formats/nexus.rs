//! NEXUS format parser.
//!
//! Supports the DATA and CHARACTERS blocks commonly used for sequence alignments.
//!
//! ## NEXUS Format
//!
//! NEXUS files start with `#NEXUS` and contain blocks:
//! ```text
//! #NEXUS
//! BEGIN DATA;
//!   DIMENSIONS NTAX=3 NCHAR=10;
//!   FORMAT DATATYPE=DNA GAP=- MISSING=?;
//!   MATRIX
//!     seq1 ACGTACGTAC
//!     seq2 TGCATGCATG
//!     seq3 AAAACCCCGG
//!   ;
//! END;
//! ```
//!
//! ## Supported Features
//!
//! - DATA and CHARACTERS blocks
//! - DIMENSIONS command (NTAX, NCHAR)
//! - FORMAT command (INTERLEAVE, MATCHCHAR)
//! - MATRIX command (sequential and interleaved)
//! - Bracketed comments anywhere, quoted taxon names
//!
//! Commands are case insensitive and may span several lines.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::Record;

/// Errors that can occur during NEXUS parsing.
#[derive(Error, Debug)]
pub enum NexusError {
    #[error("Not a NEXUS file (must start with #NEXUS)")]
    NotNexus,

    #[error("Empty NEXUS file")]
    EmptyFile,

    #[error("No DATA or CHARACTERS block found")]
    NoDataBlock,

    #[error("Missing MATRIX command in data block")]
    MissingMatrix,

    #[error("Unterminated MATRIX (missing ';')")]
    UnterminatedMatrix,

    #[error("Expected {expected} sequences (NTAX), found {found}")]
    SequenceCountMismatch { expected: usize, found: usize },

    #[error("Sequence '{name}' has length {found}, expected {expected} (NCHAR)")]
    SequenceLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Result type for NEXUS operations.
pub type NexusResult<T> = Result<T, NexusError>;

/// A `;`-terminated NEXUS command with comments removed.
#[derive(Debug)]
struct Command {
    text: String,
    terminated: bool,
}

impl Command {
    fn keyword(&self) -> String {
        self.text
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_uppercase()
    }
}

/// Settings gathered from the DIMENSIONS and FORMAT commands.
#[derive(Debug, Default)]
struct MatrixFormat {
    ntax: usize,
    nchar: usize,
    interleave: bool,
    matchchar: Option<char>,
}

/// Parses NEXUS content from a string.
pub fn parse_nexus_str(content: &str) -> NexusResult<Vec<Record>> {
    let body = content.trim_start();
    if body.is_empty() {
        return Err(NexusError::EmptyFile);
    }
    if !body
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("#NEXUS"))
    {
        return Err(NexusError::NotNexus);
    }

    let mut format = MatrixFormat::default();
    let mut matrix: Option<Command> = None;
    let mut in_block = false;
    let mut found_block = false;

    for command in split_commands(&body[6..]) {
        let keyword = command.keyword();
        if !in_block {
            if keyword == "BEGIN" {
                let block = command.text.split_whitespace().nth(1).unwrap_or("");
                in_block = block.eq_ignore_ascii_case("DATA")
                    || block.eq_ignore_ascii_case("CHARACTERS");
                found_block |= in_block;
            }
            continue;
        }

        let upper = command.text.to_uppercase();
        match keyword.as_str() {
            "END" | "ENDBLOCK" => break,
            "DIMENSIONS" => {
                if let Some(n) = extract_param(&upper, "NTAX").and_then(|v| v.parse().ok()) {
                    format.ntax = n;
                }
                if let Some(n) = extract_param(&upper, "NCHAR").and_then(|v| v.parse().ok()) {
                    format.nchar = n;
                }
            }
            "FORMAT" => {
                format.interleave = upper.split_whitespace().any(|w| w.starts_with("INTERLEAVE"))
                    && extract_param(&upper, "INTERLEAVE") != Some("NO");
                format.matchchar =
                    extract_param(&upper, "MATCHCHAR").and_then(|v| v.chars().next());
            }
            "MATRIX" => {
                matrix = Some(command);
                break;
            }
            _ => {}
        }
    }

    if !found_block {
        return Err(NexusError::NoDataBlock);
    }
    let matrix = matrix.ok_or(NexusError::MissingMatrix)?;
    if !matrix.terminated {
        return Err(NexusError::UnterminatedMatrix);
    }

    // Drop the MATRIX keyword itself
    let data = matrix.text.trim_start();
    let data = data.split_once(char::is_whitespace).map_or("", |(_, rest)| rest);
    parse_matrix(data, &format)
}

/// Splits text into `;`-terminated commands, removing `[...]` comments.
fn split_commands(text: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut current = String::new();
    let mut comment_depth = 0usize;
    let mut in_quote = false;

    for c in text.chars() {
        if comment_depth > 0 {
            match c {
                '[' => comment_depth += 1,
                ']' => comment_depth -= 1,
                _ => {}
            }
            continue;
        }

        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            '[' if !in_quote => {
                comment_depth = 1;
                // Comments separate tokens
                current.push(' ');
            }
            ';' if !in_quote => {
                commands.push(Command {
                    text: std::mem::take(&mut current),
                    terminated: true,
                });
            }
            _ => current.push(c),
        }
    }

    if !current.trim().is_empty() {
        commands.push(Command {
            text: current,
            terminated: false,
        });
    }
    commands
}

/// Extracts a parameter value from an upper-cased NEXUS command.
fn extract_param<'a>(line: &'a str, param: &str) -> Option<&'a str> {
    let idx = line.find(param)?;
    let after = line[idx + param.len()..].trim_start();
    let after_eq = after.strip_prefix('=')?.trim_start();

    let end = after_eq
        .find(|c: char| c.is_whitespace() || c == ';')
        .unwrap_or(after_eq.len());
    let value = &after_eq[..end];
    (!value.is_empty()).then_some(value)
}

/// Splits matrix data on whitespace, keeping quoted names whole.
fn tokenize_matrix(data: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for c in data.chars() {
        if c == '\'' {
            in_quote = !in_quote;
            current.push(c);
        } else if c.is_whitespace() && !in_quote {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_matrix(data: &str, format: &MatrixFormat) -> NexusResult<Vec<Record>> {
    let tokens = tokenize_matrix(data);

    let mut sequences = if format.interleave {
        parse_interleaved_tokens(&tokens, format.ntax)
    } else {
        parse_sequential_tokens(&tokens, format.ntax, format.nchar)
    };

    if let Some(mc) = format.matchchar {
        apply_matchchar(&mut sequences, mc);
    }

    if format.ntax > 0 && sequences.len() != format.ntax {
        return Err(NexusError::SequenceCountMismatch {
            expected: format.ntax,
            found: sequences.len(),
        });
    }
    if format.nchar > 0 {
        if let Some((name, data)) = sequences
            .iter()
            .find(|(_, data)| data.chars().count() != format.nchar)
        {
            return Err(NexusError::SequenceLengthMismatch {
                name: name.clone(),
                expected: format.nchar,
                found: data.chars().count(),
            });
        }
    }

    Ok(sequences
        .into_iter()
        .map(|(name, data)| Record::new(name, data))
        .collect())
}

/// Sequential layout: name, then data tokens until NCHAR characters.
///
/// Without NCHAR, a token that looks like a name starts the next sequence.
fn parse_sequential_tokens(tokens: &[String], ntax: usize, nchar: usize) -> Vec<(String, String)> {
    let mut sequences = Vec::new();
    let mut tokens = tokens.iter().peekable();

    while let Some(name) = tokens.next() {
        if ntax > 0 && sequences.len() == ntax {
            break;
        }
        let mut data = String::new();
        while let Some(token) = tokens.peek() {
            if nchar > 0 && data.len() >= nchar {
                break;
            }
            if nchar == 0 && !data.is_empty() && looks_like_name(token) {
                break;
            }
            data.push_str(token);
            tokens.next();
        }
        sequences.push((unquote(name), data));
    }
    sequences
}

/// Interleaved layout: `name data` pairs, names repeating in every block.
fn parse_interleaved_tokens(tokens: &[String], ntax: usize) -> Vec<(String, String)> {
    let mut sequences: Vec<(String, String)> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for pair in tokens.chunks(2) {
        let name = unquote(&pair[0]);
        let data = pair.get(1).map_or("", String::as_str);
        match index_of.get(&name) {
            Some(&idx) => sequences[idx].1.push_str(data),
            None if ntax == 0 || sequences.len() < ntax => {
                index_of.insert(name.clone(), sequences.len());
                sequences.push((name, data.to_string()));
            }
            None => log::debug!("NEXUS: ignoring unknown taxon '{}' in interleaved matrix", name),
        }
    }
    sequences
}

/// Replaces MATCHCHAR positions with the first sequence's character.
fn apply_matchchar(sequences: &mut [(String, String)], matchchar: char) {
    let Some(((_, reference), rest)) = sequences.split_first_mut() else {
        return;
    };
    let reference: Vec<char> = reference.chars().collect();

    for (_, data) in rest {
        *data = data
            .chars()
            .enumerate()
            .map(|(i, c)| match reference.get(i) {
                Some(&r) if c == matchchar => r,
                _ => c,
            })
            .collect();
    }
}

/// Removes surrounding single quotes.
fn unquote(s: &str) -> String {
    s.strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .unwrap_or(s)
        .to_string()
}

/// Heuristic to detect if a token is a sequence name rather than data.
/// Only used when NCHAR is not available.
fn looks_like_name(token: &str) -> bool {
    if token.starts_with('\'') || token.contains('_') {
        return true;
    }
    // Letters mixed with digits, like "seq1" or "AelongD09"
    token.chars().any(|c| c.is_ascii_alphabetic()) && token.chars().any(|c| c.is_ascii_digit())
}
