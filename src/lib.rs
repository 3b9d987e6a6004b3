//! # msawrap - Wrapped Alignment Printer
//!
//! Prints a multiple sequence alignment as a stack of width-bounded blocks,
//! one colored residue per cell, with a running residue number per row.
//!
//! ## Architecture
//!
//! The pipeline runs one way, each stage feeding the next:
//! - `formats`: alignment file readers (FASTA, Clustal, Stockholm, NEXUS, PHYLIP)
//! - `model`: the validated alignment
//! - `color` / `scheme`: residue classification and JSON color overrides
//! - `layout`: column widths and lazy block partitioning
//! - `emit`: serializable render tree built from blocks
//! - `render`: ratatui buffers written to the terminal through crossterm

pub mod color;
pub mod emit;
pub mod formats;
pub mod layout;
pub mod model;
pub mod render;
pub mod scheme;
