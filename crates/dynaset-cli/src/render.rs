//! Terminal tables for dynasets and their SQL log.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dynaset_core::{DynasetView, SqlLog, StatementKind};
use dynaset_model::{Row, Value};

pub fn print_dynaset(view: &DynasetView<'_>) {
    let mut heading = format!("{} ({} rows", view.name(), view.row_count());
    if let Some(parent) = view.parent() {
        heading.push_str(&format!(", child of {}", parent.name()));
    }
    heading.push(')');
    println!("{heading}");
    println!("{}", dynaset_table(view));
}

pub fn print_sql_log(log: &SqlLog) {
    if log == &SqlLog::default() {
        return;
    }
    println!("{}", sql_log_table(log));
}

/// One line per row. The first column marks the current row and pending
/// changes; bound columns follow in result order.
pub fn dynaset_table(view: &DynasetView<'_>) -> Table {
    let mut bound: Vec<(usize, &str)> = view
        .columns()
        .iter()
        .filter_map(|(_, column)| Some((column.ordinal()?, column.name())))
        .collect();
    bound.sort_unstable();

    let mut table = Table::new();
    let mut header = vec![header_cell("")];
    header.extend(bound.iter().map(|(_, name)| header_cell(name)));
    table.set_header(header);

    for (index, row) in view.rows().enumerate() {
        let mut cells = vec![marker_cell(row, view.current_row() == Some(index))];
        cells.extend(
            bound
                .iter()
                .map(|(ordinal, _)| value_cell(row.data().get(*ordinal).unwrap_or(&Value::Null))),
        );
        table.add_row(cells);
    }
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Center);
    }
    table
}

/// Last statement of each kind and the parameters of the most recent one.
pub fn sql_log_table(log: &SqlLog) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Kind"), header_cell("SQL")]);
    for kind in [StatementKind::Insert, StatementKind::Update, StatementKind::Delete] {
        if let Some(sql) = log.last(kind) {
            table.add_row(vec![Cell::new(kind).fg(kind_color(kind)), Cell::new(sql)]);
        }
    }
    if !log.last_params.is_empty() {
        let params = log
            .last_params
            .iter()
            .map(param_text)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![dim_cell("params"), Cell::new(params)]);
    }
    apply_table_style(&mut table);
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn marker_cell(row: &Row, current: bool) -> Cell {
    let mut marker = String::new();
    if current {
        marker.push('>');
    }
    if row.is_deleted() {
        marker.push('-');
    } else if row.is_new() {
        marker.push('+');
    } else if row.is_dirty() {
        marker.push('*');
    }
    let cell = Cell::new(marker);
    if row.is_deleted() {
        cell.fg(Color::Red)
    } else if current {
        cell.fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        cell.fg(Color::Yellow)
    }
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => dim_cell("NULL"),
        Value::Integer(_) | Value::Real(_) => Cell::new(value).set_alignment(CellAlignment::Right),
        _ => Cell::new(value),
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Text(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}

fn kind_color(kind: StatementKind) -> Color {
    match kind {
        StatementKind::Insert => Color::Green,
        StatementKind::Update => Color::Yellow,
        StatementKind::Delete => Color::Red,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .add_attribute(Attribute::Bold)
        .fg(Color::Cyan)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
