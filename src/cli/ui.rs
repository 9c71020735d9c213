use crate::core::{RateEntry, RateSnapshot};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn rate_row(entry: &RateEntry) -> Vec<Cell> {
    vec![
        Cell::new(&entry.code).add_attribute(Attribute::Bold),
        number_cell(entry.nominal.to_string()),
        Cell::new(&entry.name),
        number_cell(entry.value.to_string()),
        number_cell(entry.unit_rate().round_dp(4).to_string()).fg(Color::Green),
    ]
}

/// Renders a snapshot as a titled table, keeping only entries accepted by
/// `show`.
pub fn rates_table(snapshot: &RateSnapshot, show: impl Fn(&str) -> bool) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Nominal"),
        header_cell("Currency"),
        header_cell("Rate"),
        header_cell("Per unit"),
    ]);

    let mut shown = 0;
    for entry in snapshot.entries.iter().filter(|e| show(&e.code)) {
        table.add_row(rate_row(entry));
        shown += 1;
    }

    let as_of = snapshot
        .as_of
        .map_or("latest".to_string(), |date| date.format("%d.%m.%Y").to_string());
    let mut output = format!(
        "Exchange rates ({})\n",
        style_text(&as_of, StyleType::Title)
    );
    if let Some(source) = &snapshot.source_name {
        output.push_str(&style_text(source, StyleType::Subtle));
        output.push('\n');
    }

    if shown == 0 {
        output.push_str(&style_text(
            "No matching currencies in this snapshot",
            StyleType::Warning,
        ));
    } else {
        output.push_str(&table.to_string());
    }
    output
}

/// Creates the spinner shown while rates are loading.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
