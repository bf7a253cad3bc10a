// file: src/bowtie2/mod.rs
// version: 1.0.0
// guid: 721cd596-8549-4a8d-9b6e-6e506b9e1278

//! Typed model of the bowtie2 options this crate drives.
//!
//! Covers FASTQ queries only, phred33 qualities, presets only (no scoring, effort or
//! reporting tweaks beyond `-k`/`-a`), fw/rev mates, and a metrics file as the only
//! extra output. bowtie2 always runs with `--quiet` so stderr carries errors only.

pub mod command;
pub mod options;
pub mod preset;
pub mod runner;

pub use command::{AlignmentJob, ReadInput};
pub use options::{OutputFormat, PairedEndOptions, ReportAlns, ToolPaths};
pub use preset::{AlignMode, MapPreset};
pub use runner::{detect_aligner_error, AlignmentOutcome, Bowtie2Runner, ERROR_SENTINEL};
