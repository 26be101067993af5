// ATS Scoring Analyzer
// Pure, synchronous and deterministic: recomputed in full on every document read.

pub mod analyzer;
pub mod lexicon;

pub use analyzer::{analyze, AnalysisReport};
