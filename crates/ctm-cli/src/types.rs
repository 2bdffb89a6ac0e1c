use std::path::PathBuf;

use ctm_core::PipelineReport;
use ctm_ingest::{PairMismatch, SkippedFile};
use ctm_rules::LabelSummary;
use ctm_synth::GenerationSummary;

#[derive(Debug)]
pub struct GenerateOutcome {
    pub data_dir: PathBuf,
    pub trials: usize,
    pub summary: GenerationSummary,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug)]
pub struct LabelOutcome {
    pub data_dir: PathBuf,
    pub summary: LabelSummary,
    /// Stored pairs that disagreed with the rules before re-labeling.
    pub mismatches: Vec<PairMismatch>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug)]
pub struct TrainOutcome {
    pub model_path: PathBuf,
    pub report: PipelineReport,
    pub skipped: Vec<SkippedFile>,
}
