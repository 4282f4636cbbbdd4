use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use clean_cli::pipeline::StepReport;
use clean_model::ArtifactHandle;

const DIGEST_PREFIX_LEN: usize = 12;

pub fn print_summary(report: &StepReport) {
    println!("Run: {}", report.run_id);
    if let Some(path) = &report.output_path {
        println!("Output file: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Role"),
        header_cell("Artifact"),
        header_cell("Type"),
        header_cell("Rows"),
        header_cell("Size"),
        header_cell("Digest"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    table.add_row(artifact_row("input", &report.input, report.input_rows));
    table.add_row(artifact_row("output", &report.output, report.output_rows));
    table.add_row(vec![
        Cell::new("dropped")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("price outside bounds"),
        dim_cell("-"),
        dropped_cell(report.dropped_rows()),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
    println!("Finished in {} ms", report.duration.as_millis());
}

pub fn print_import(handle: &ArtifactHandle) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Artifact"),
        header_cell("Type"),
        header_cell("Size"),
        header_cell("Digest"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        artifact_cell(handle),
        Cell::new(&handle.artifact_type),
        Cell::new(handle.size),
        digest_cell(&handle.digest),
    ]);
    println!("{table}");
}

fn artifact_row(role: &str, handle: &ArtifactHandle, rows: usize) -> Vec<Cell> {
    vec![
        Cell::new(role).fg(Color::Cyan).add_attribute(Attribute::Bold),
        artifact_cell(handle),
        Cell::new(&handle.artifact_type),
        Cell::new(rows),
        Cell::new(handle.size),
        digest_cell(&handle.digest),
    ]
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn artifact_cell(handle: &ArtifactHandle) -> Cell {
    Cell::new(handle.qualified_name())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn digest_cell(digest: &str) -> Cell {
    let short = digest.get(..DIGEST_PREFIX_LEN).unwrap_or(digest);
    dim_cell(short)
}

fn dropped_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
