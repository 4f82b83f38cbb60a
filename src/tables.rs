use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        emission::NationalEmissions,
        pivot::RegionTable,
        scenario::ScenarioSummary,
        series::Chart,
    },
    fmt::{FormattedCell, FormattedPercentage},
};

const MONTHS: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn value_cell(value: Option<f64>, precision: usize) -> Cell {
    let cell = Cell::new(FormattedCell(value, precision)).set_alignment(CellAlignment::Right);
    if value.is_some() { cell } else { cell.add_attribute(Attribute::Dim) }
}

/// One row per label, one column per series.
pub fn build_chart_table(chart: &Chart) -> Table {
    let mut table = new_table();
    table.set_header(
        std::iter::once("Month").chain(chart.series.iter().map(|series| series.name.as_str())),
    );
    for (index, label) in chart.labels.iter().enumerate() {
        let mut row = vec![Cell::new(label.label())];
        row.extend(chart.series.iter().map(|series| value_cell(series.values[index], 2)));
        table.add_row(row);
    }
    table
}

pub fn build_region_table(region_table: &RegionTable, precision: usize) -> Table {
    let mut table = new_table();
    table.set_header(std::iter::once("Region").chain(MONTHS));
    for (index, row) in region_table.rows().enumerate() {
        let name = Cell::new(&row.name);
        let mut cells = vec![if index == 0 { name.add_attribute(Attribute::Bold) } else { name }];
        cells.extend(row.months.iter().map(|value| value_cell(*value, precision)));
        table.add_row(cells);
    }
    table
}

pub fn build_scenario_summary_table(summary: &ScenarioSummary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Total predicted emissions"),
        Cell::new(format!("{:.2}", summary.total_predicted)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} target", summary.target_year)),
        Cell::new(format!("{:.2}", summary.target)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} predicted", summary.target_year)),
        Cell::new(format!("{:.2}", summary.predicted_in_target_year))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Over the target"),
        Cell::new(format!("{:+.2}", summary.delta.0))
            .set_alignment(CellAlignment::Right)
            .fg(if summary.delta.0 > 0.0 { Color::Red } else { Color::Green }),
    ]);
    table.add_row(vec![
        Cell::new("Achievement"),
        Cell::new(FormattedPercentage(summary.achievement)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Electricity share"),
        Cell::new(FormattedPercentage(summary.electricity_share))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Gas share"),
        Cell::new(FormattedPercentage(summary.gas_share)).set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn build_national_emissions_table(emissions: &NationalEmissions) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Month", "Electricity", "Gas"]);
    for ((month, electricity), gas) in MONTHS.iter().zip(emissions.electricity).zip(emissions.gas)
    {
        table.add_row(vec![
            Cell::new(month),
            Cell::new(format!("{electricity:.1}")).set_alignment(CellAlignment::Right),
            Cell::new(format!("{gas:.1}")).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
