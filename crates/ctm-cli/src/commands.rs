use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use ctm_core::{DecisionEngine, DecisionResult, PipelineOptions, rank_by_probability, run_training};
use ctm_features::TfidfConfig;
use ctm_ingest::{
    DataDir, SkippedFile, load_pair_records, load_pairs, load_patients, load_trials,
    verify_pairs, write_generation_summary, write_label_summary, write_pairs, write_patients,
    write_trials,
};
use ctm_model::{Patient, PatientRecord, Trial, TrialRecord};
use ctm_rules::{LabelSummary, label_all};
use ctm_synth::{BalanceConfig, GeneratorConfig, builtin_trials, generate};
use ctm_train::{ModelArtifact, TrainConfig};

use crate::cli::{DecideArgs, GenerateArgs, InspectArgs, LabelArgs, TrainArgs};
use crate::types::{GenerateOutcome, LabelOutcome, TrainOutcome};

pub fn run_generate(args: &GenerateArgs) -> Result<GenerateOutcome> {
    let span = info_span!("generate", seed = args.seed, patients = args.patients);
    let _guard = span.enter();
    let data = DataDir::new(&args.out);

    let mut skipped = Vec::new();
    let trials = match &args.trials {
        Some(dir) => {
            let loaded = load_trials(dir)
                .with_context(|| format!("load trials from {}", dir.display()))?;
            skipped.extend(loaded.skipped);
            loaded.items
        }
        None => builtin_trials().context("build trial catalog")?,
    };

    let config = GeneratorConfig::default()
        .with_seed(args.seed)
        .with_patient_count(args.patients)
        .with_eligible_fraction(args.eligible_fraction);
    let generated = generate(&config, &trials).context("generate patients")?;

    write_trials(&data.trials(), &trials).context("write trials")?;
    write_patients(&data.patients(), &generated.patients).context("write patients")?;
    write_pairs(&data.pairs(), &generated.pairs).context("write pairs")?;
    write_generation_summary(&data.pairs(), &generated.summary)
        .context("write generation summary")?;

    Ok(GenerateOutcome {
        data_dir: data.root().to_path_buf(),
        trials: trials.len(),
        summary: generated.summary,
        skipped,
    })
}

pub fn run_label(args: &LabelArgs) -> Result<LabelOutcome> {
    let span = info_span!("label", data = %args.data.display());
    let _guard = span.enter();
    let data = DataDir::new(&args.data);
    let (patients, trials, skipped) = load_inputs(&data)?;

    let pairs_dir = data.pairs();
    let mismatches = if pairs_dir.is_dir() {
        let records = load_pair_records(&pairs_dir).context("load stored pairs")?;
        verify_pairs(&records.items, &patients, &trials)
    } else {
        Vec::new()
    };
    if !mismatches.is_empty() {
        warn!(count = mismatches.len(), "stored pairs disagree with the rules");
    }

    let pairs = label_all(&patients, &trials);
    write_pairs(&pairs_dir, &pairs).context("write pairs")?;
    let summary = LabelSummary::from_pairs(&pairs);
    write_label_summary(&pairs_dir, &summary).context("write label summary")?;

    Ok(LabelOutcome {
        data_dir: data.root().to_path_buf(),
        summary,
        mismatches,
        skipped,
    })
}

pub fn run_train(args: &TrainArgs) -> Result<TrainOutcome> {
    let span = info_span!("train", seed = args.seed);
    let _guard = span.enter();
    let data = DataDir::new(&args.data);
    let (patients, trials, mut skipped) = load_inputs(&data)?;
    let pairs = load_pairs(&data.pairs(), &patients, &trials).context("load pairs")?;
    skipped.extend(pairs.skipped);

    let options = PipelineOptions {
        balance: BalanceConfig::default()
            .with_target_ratio(args.ratio)
            .with_tolerance(args.tolerance),
        tfidf: TfidfConfig::default().with_max_features(args.max_features),
        train: TrainConfig::default().with_test_fraction(args.test_fraction),
    }
    .with_seed(args.seed);

    let (artifact, report) =
        run_training(&patients, &trials, &pairs.items, &options).context("train model")?;
    artifact
        .save(&args.model)
        .with_context(|| format!("save model to {}", args.model.display()))?;
    info!(model = %args.model.display(), chosen = %report.chosen_model, "training finished");

    Ok(TrainOutcome {
        model_path: args.model.clone(),
        report,
        skipped,
    })
}

pub fn run_decide(args: &DecideArgs) -> Result<Vec<DecisionResult>> {
    let artifact = load_model(&args.model)?;
    let engine = DecisionEngine::new(Arc::new(artifact)).context("prepare decision engine")?;
    let patient = read_patient(&args.patient)?;
    let trials = args
        .trials
        .iter()
        .map(|path| read_trial(path))
        .collect::<Result<Vec<_>>>()?;

    let mut results = engine
        .decide_batch(&patient, &trials)
        .context("decide eligibility")?;
    rank_by_probability(&mut results);
    Ok(results)
}

pub fn run_inspect(args: &InspectArgs) -> Result<ModelArtifact> {
    load_model(&args.model)
}

fn load_model(path: &Path) -> Result<ModelArtifact> {
    ModelArtifact::load(path).with_context(|| format!("load model from {}", path.display()))
}

fn load_inputs(data: &DataDir) -> Result<(Vec<Patient>, Vec<Trial>, Vec<SkippedFile>)> {
    let patients = load_patients(&data.patients()).context("load patients")?;
    let trials = load_trials(&data.trials()).context("load trials")?;
    let mut skipped = patients.skipped;
    skipped.extend(trials.skipped);
    Ok((patients.items, trials.items, skipped))
}

fn read_patient(path: &Path) -> Result<Patient> {
    let json = read_file(path)?;
    let record: PatientRecord = serde_json::from_str(&json)
        .with_context(|| format!("parse patient record {}", path.display()))?;
    Patient::try_from(record).with_context(|| format!("invalid patient record {}", path.display()))
}

fn read_trial(path: &Path) -> Result<Trial> {
    let json = read_file(path)?;
    let record: TrialRecord = serde_json::from_str(&json)
        .with_context(|| format!("parse trial record {}", path.display()))?;
    Trial::try_from(record).with_context(|| format!("invalid trial record {}", path.display()))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}
