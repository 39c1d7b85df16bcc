//! Terminal summaries for each command, rendered with comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use donor_store::ExportInfo;
use donor_transform::StandardizeReport;
use donor_validate::{BatchProfile, DropReport, QualityReport, ValueAnomaly, Verdict};

use donor_cli::pipeline::{CleanOutcome, IngestOutcome, InspectOutcome};

use crate::commands::RunOutcome;

pub fn print_run_summary(outcome: &RunOutcome) {
    let result = &outcome.result;
    print_ingest(&result.ingest);
    println!("Raw relation: {} rows", result.raw_rows);
    print_clean(&result.clean);
    print_quality(&result.quality);
    if let Some(info) = &outcome.export {
        print_export(info);
    }
}

pub fn print_ingest(outcome: &IngestOutcome) {
    println!("Snapshot: {}", outcome.snapshot.path.display());
    println!(
        "  {} rows, {} columns, sha256 {}",
        outcome.snapshot.rows, outcome.snapshot.columns, outcome.snapshot.sha256
    );
    print_standardize_report(&outcome.standardize);
}

pub fn print_load_raw(rows: usize) {
    println!("Raw relation replaced: {rows} rows");
}

pub fn print_clean(outcome: &CleanOutcome) {
    print_drop_report(&outcome.drops);
    println!("Clean relation stored: {} rows", outcome.stored_rows);
}

pub fn print_quality(report: &QualityReport) {
    let verdict = match &report.verdict {
        Verdict::Pass => Cell::new("PASS").fg(Color::Green),
        Verdict::Fail { .. } => Cell::new("FAIL").fg(Color::Red),
    }
    .add_attribute(Attribute::Bold);

    let mut table = Table::new();
    table.set_header(vec![header_cell("Quality gate"), header_cell("Result")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("Rows"), Cell::new(report.rows)]);
    table.add_row(vec![Cell::new("Verdict"), verdict]);
    for reason in report.reasons() {
        table.add_row(vec![
            Cell::new("Reason").fg(Color::Red),
            Cell::new(reason.to_string()),
        ]);
    }
    for warning in &report.warnings {
        table.add_row(vec![
            Cell::new("Warning").fg(Color::Yellow),
            Cell::new(warning.to_string()),
        ]);
    }
    println!("{table}");
}

pub fn print_export(info: &ExportInfo) {
    println!("Exported {} rows to {}", info.rows, info.destination);
}

pub fn print_inspect(outcome: &InspectOutcome) {
    println!(
        "Rows: {}  Columns: {}",
        outcome.raw.rows,
        outcome.raw.columns.len()
    );
    print_profile_columns(&outcome.raw, &outcome.standardized);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Anomaly"),
        header_cell("Count"),
        header_cell("Examples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let profile = &outcome.standardized;
    add_anomaly_row(&mut table, "Invalid sex codes", &profile.invalid_sex);
    add_anomaly_row(&mut table, "Invalid blood groups", &profile.invalid_blood_groups);
    for (field, invalid) in &outcome.standardize.invalid_dates {
        table.add_row(vec![
            Cell::new(format!("Unparseable {field}")),
            count_cell(*invalid, Color::Yellow),
            dim_cell("-"),
        ]);
    }
    for (field, missing) in &profile.missing_dates {
        table.add_row(vec![
            Cell::new(format!("Missing {field}")),
            count_cell(*missing, Color::Yellow),
            dim_cell("-"),
        ]);
    }
    println!("{table}");
}

fn print_profile_columns(raw: &BatchProfile, standardized: &BatchProfile) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Source type"),
        header_cell("Standard type"),
        header_cell("Nulls"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in &raw.columns {
        let standard = standardized
            .columns
            .iter()
            .find(|candidate| candidate.name == column.name);
        table.add_row(vec![
            Cell::new(&column.name),
            dim_cell(&column.dtype),
            standard.map_or_else(|| dim_cell("-"), |c| Cell::new(&c.dtype)),
            count_cell(standard.map_or(column.null_count, |c| c.null_count), Color::Yellow),
        ]);
    }
    println!("{table}");
}

fn print_standardize_report(report: &StandardizeReport) {
    let total_numbers: usize = report.invalid_numbers.values().sum();
    if report.total_invalid_dates() == 0 && report.invalid_phones == 0 && total_numbers == 0 {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Replaced by sentinel"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (field, count) in report.invalid_dates.iter().chain(&report.invalid_numbers) {
        table.add_row(vec![Cell::new(field), count_cell(*count, Color::Yellow)]);
    }
    table.add_row(vec![
        Cell::new("telephone"),
        count_cell(report.invalid_phones, Color::Yellow),
    ]);
    println!("{table}");
}

fn print_drop_report(report: &DropReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Cleaning rule"), header_cell("Dropped")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for stage in &report.stages {
        table.add_row(vec![
            Cell::new(stage.rule.label()),
            count_cell(stage.dropped, Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("Kept")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} / {}", report.kept_rows, report.input_rows))
            .add_attribute(Attribute::Bold),
    ]);
    if report.invalid_sex > 0 {
        table.add_row(vec![
            Cell::new("Invalid sex codes kept").fg(Color::Yellow),
            count_cell(report.invalid_sex, Color::Yellow),
        ]);
    }
    println!("{table}");
}

fn add_anomaly_row(table: &mut Table, label: &str, anomaly: &ValueAnomaly) {
    let examples = if anomaly.examples.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(
            anomaly
                .examples
                .iter()
                .map(|value| format!("{value:?}"))
                .collect::<Vec<_>>()
                .join(", "),
        )
    };
    table.add_row(vec![
        Cell::new(label),
        count_cell(anomaly.count, Color::Red),
        examples,
    ]);
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
