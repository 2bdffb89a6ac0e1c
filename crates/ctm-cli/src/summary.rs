use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ctm_core::DecisionResult;
use ctm_ingest::SkippedFile;
use ctm_model::Label;
use ctm_train::{CandidateReport, ModelArtifact};

use crate::types::{GenerateOutcome, LabelOutcome, TrainOutcome};

pub fn print_generation(outcome: &GenerateOutcome) {
    let summary = &outcome.summary;
    println!("Data: {}", outcome.data_dir.display());
    println!(
        "Generated {} patients across {} trials ({} pairs, {} eligible)",
        summary.patients_generated, outcome.trials, summary.pairs_created, summary.eligible_pairs
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Trial"),
        header_cell("Eligible"),
        header_cell("Not eligible"),
        header_cell("Rate"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (trial_id, counts) in &summary.per_trial {
        let total = counts.eligible + counts.not_eligible;
        table.add_row(vec![
            Cell::new(trial_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(counts.eligible),
            Cell::new(counts.not_eligible),
            Cell::new(format_rate(counts.eligible, total)),
        ]);
    }
    println!("{table}");
    if !summary.intents.is_empty() {
        let intents: Vec<String> = summary
            .intents
            .iter()
            .map(|(intent, count)| format!("{intent}={count}"))
            .collect();
        println!("Planned intents: {}", intents.join(", "));
    }
    print_skipped(&outcome.skipped);
}

pub fn print_label(outcome: &LabelOutcome) {
    let summary = &outcome.summary;
    println!("Data: {}", outcome.data_dir.display());
    println!(
        "Labeled {} pairs: {} eligible ({:.1}%)",
        summary.pairs_created,
        summary.eligible_pairs,
        summary.eligible_rate * 100.0
    );
    if !outcome.mismatches.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Replaced pair"), header_cell("Reason")]);
        apply_table_style(&mut table);
        for mismatch in &outcome.mismatches {
            table.add_row(vec![
                Cell::new(&mismatch.pair_id).fg(Color::Yellow),
                Cell::new(&mismatch.reason),
            ]);
        }
        println!("{table}");
    }
    print_skipped(&outcome.skipped);
}

pub fn print_training(outcome: &TrainOutcome) {
    let report = &outcome.report;
    println!("Model: {}", outcome.model_path.display());
    println!(
        "Samples: {} ({} skipped), balanced to {} ({} dropped, eligible ratio {:.3})",
        report.samples, report.skipped, report.balanced, report.dropped, report.eligible_ratio
    );
    println!(
        "Features: {} (fingerprint {})",
        report.feature_dimension,
        short_fingerprint(&report.fingerprint)
    );
    println!("{}", metrics_table(&report.candidates, &report.chosen_model));
    print_skipped(&outcome.skipped);
}

pub fn print_inspect(artifact: &ModelArtifact) {
    let training = artifact.training();
    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);
    let rows = [
        ("Model", artifact.model_name().to_string()),
        ("Feature dimension", artifact.feature_dimension().to_string()),
        ("Fingerprint", artifact.fingerprint().to_string()),
        ("Trained at", training.trained_at.clone()),
        ("Seed", training.seed.to_string()),
        (
            "Samples",
            format!(
                "{} ({} train / {} test)",
                training.samples, training.train_samples, training.test_samples
            ),
        ),
        ("Eligible ratio", format!("{:.3}", training.eligible_ratio)),
    ];
    for (property, value) in rows {
        table.add_row(vec![Cell::new(property).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    println!("{table}");
    println!("{}", metrics_table(artifact.candidates(), artifact.model_name()));
}

pub fn print_decisions(results: &[DecisionResult]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Trial"),
        header_cell("Rules"),
        header_cell("Model"),
        header_cell("P(eligible)"),
        header_cell("Agree"),
        header_cell("Similarity"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);
    for result in results {
        table.add_row(vec![
            Cell::new(&result.trial_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            label_cell(result.rule_label),
            label_cell(result.ml_label),
            Cell::new(format!("{:.3}", result.probability)),
            agreement_cell(result.agreement),
            Cell::new(format!("{:.3}", result.similarity)),
        ]);
    }
    if let Some(first) = results.first() {
        println!("Patient: {}", first.patient_id);
    }
    println!("{table}");
    for result in results {
        println!();
        println!("{}: {}", result.trial_id, result.explanation);
        for line in &result.rule_lines {
            let mark = if line.passed { "pass" } else { "FAIL" };
            println!("  [{mark}] {}: {}", line.rule.as_str(), line.detail);
        }
    }
}

fn print_skipped(skipped: &[SkippedFile]) {
    if skipped.is_empty() {
        return;
    }
    eprintln!("Skipped {} file(s):", skipped.len());
    for file in skipped {
        eprintln!("- {}: {}", file.path.display(), file.reason);
    }
}

fn metrics_table(candidates: &[CandidateReport], chosen: &str) -> Table {
    let mut table = Table::new();
    table.set_header(METRIC_HEADERS.into_iter().map(header_cell).collect::<Vec<_>>());
    apply_wide_table_style(&mut table);
    for index in 1..METRIC_HEADERS.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (row, report) in metrics_rows(candidates, chosen).into_iter().zip(candidates) {
        let mut cells: Vec<Cell> = row.into_iter().map(Cell::new).collect();
        if report.model_name == chosen
            && let Some(name) = cells.first_mut()
        {
            *name = name.clone().fg(Color::Green).add_attribute(Attribute::Bold);
        }
        table.add_row(cells);
    }
    table
}

const METRIC_HEADERS: [&str; 9] = [
    "Model",
    "Accuracy",
    "Precision",
    "Recall",
    "F1",
    "TP",
    "FP",
    "TN",
    "FN",
];

fn metrics_rows(candidates: &[CandidateReport], chosen: &str) -> Vec<Vec<String>> {
    candidates
        .iter()
        .map(|report| {
            let metrics = &report.metrics;
            let confusion = &metrics.confusion;
            let name = if report.model_name == chosen {
                format!("{} *", report.model_name)
            } else {
                report.model_name.clone()
            };
            vec![
                name,
                format!("{:.3}", metrics.accuracy),
                format!("{:.3}", metrics.precision),
                format!("{:.3}", metrics.recall),
                format!("{:.3}", metrics.f1),
                confusion.true_positives.to_string(),
                confusion.false_positives.to_string(),
                confusion.true_negatives.to_string(),
                confusion.false_negatives.to_string(),
            ]
        })
        .collect()
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

fn format_rate(part: usize, total: usize) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    }
}

fn label_cell(label: Label) -> Cell {
    match label {
        Label::Eligible => Cell::new("eligible").fg(Color::Green),
        Label::NotEligible => Cell::new("not eligible").fg(Color::Red),
    }
}

fn agreement_cell(agreement: bool) -> Cell {
    if agreement {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Yellow).add_attribute(Attribute::Bold)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
