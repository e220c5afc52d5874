use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use oru_model::LabResult;

use crate::types::{DecodeResult, EventResult};

pub fn print_decode(result: &DecodeResult, json: bool) {
    for file in &result.files {
        match &file.outcome {
            Ok(decoded) if json => {
                for lab in &decoded.results {
                    match serde_json::to_string(lab) {
                        Ok(line) => println!("{line}"),
                        Err(error) => eprintln!("error: {error}"),
                    }
                }
            }
            Ok(decoded) => {
                println!(
                    "File: {} (control id {}, {} results)",
                    file.path.display(),
                    decoded.header.control_id,
                    decoded.results.len()
                );
                if !decoded.results.is_empty() {
                    println!("{}", results_table(&decoded.results));
                }
            }
            Err(error) => eprintln!("error: {}: {error}", file.path.display()),
        }
    }
}

pub fn print_event(result: &EventResult) {
    println!("Table: {}", result.table);
    println!("Output: {}", result.output_file.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Object"),
        header_cell("Control ID"),
        header_cell("Bytes"),
        header_cell("Results"),
        header_cell("Fallback times"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let mut total = 0usize;
    for report in &result.reports {
        match &report.outcome {
            Ok(outcome) => {
                total += outcome.results;
                let fallback = if outcome.fallback_times > 0 {
                    Cell::new(outcome.fallback_times).fg(Color::Yellow)
                } else {
                    Cell::new(0)
                };
                table.add_row(vec![
                    Cell::new(&report.locator),
                    Cell::new(&outcome.control_id),
                    Cell::new(outcome.bytes),
                    Cell::new(outcome.results),
                    fallback,
                    Cell::new("stored").fg(Color::Green),
                ]);
            }
            Err(error) => {
                table.add_row(vec![
                    Cell::new(&report.locator),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new(format!("{error:#}")).fg(Color::Red),
                ]);
            }
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
}

fn results_table(results: &[LabResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Patient"),
        header_cell("Order"),
        header_cell("Test"),
        header_cell("Value"),
        header_cell("Units"),
        header_cell("Range"),
        header_cell("Flag"),
        header_cell("Status"),
        header_cell("Observed"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for result in results {
        let flag = if result.abnormal_flag.is_empty() || result.abnormal_flag == "N" {
            Cell::new(&result.abnormal_flag)
        } else {
            Cell::new(&result.abnormal_flag).fg(Color::Red)
        };
        let observed = result
            .observation_date_time
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let observed = if result.observation_time_source.is_fallback() {
            Cell::new(format!("{observed} (processing time)")).fg(Color::Yellow)
        } else {
            Cell::new(observed)
        };
        table.add_row(vec![
            Cell::new(result.patient_pk()),
            Cell::new(&result.order_id),
            Cell::new(format!("{} {}", result.test_code, result.test_description).trim()),
            Cell::new(&result.result_value),
            Cell::new(&result.units),
            Cell::new(&result.reference_range),
            flag,
            Cell::new(&result.result_status),
            observed,
        ]);
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(value: &str) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
