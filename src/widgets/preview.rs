//! DataFrame preview pane.

use polars::prelude::*;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Widget};

/// Columns shown before the preview truncates horizontally.
const MAX_PREVIEW_COLS: usize = 12;

fn cell_text(series: &Series, row: usize) -> String {
    match series.get(row) {
        Ok(AnyValue::Null) => String::new(),
        Ok(value) => value.str_value().to_string(),
        Err(_) => String::new(),
    }
}

/// Render the head of a DataFrame as a bordered table.
pub fn render_preview(area: Rect, buf: &mut Buffer, df: &DataFrame, title: &str, max_rows: usize) {
    let (height, width) = df.shape();
    if height == 0 || width == 0 {
        let empty = Paragraph::new("No rows to display")
            .block(Block::default().borders(Borders::ALL).title(title.to_string()));
        Widget::render(empty, area, buf);
        return;
    }

    let shown_cols = width.min(MAX_PREVIEW_COLS);
    let shown_rows = height.min(max_rows);
    let columns = df.get_columns();

    let mut names: Vec<String> = columns
        .iter()
        .take(shown_cols)
        .map(|c| c.name().to_string())
        .collect();
    if shown_cols < width {
        names.push(format!("(+{} more)", width - shown_cols));
    }

    let header = Row::new(names.clone()).style(Style::default().add_modifier(Modifier::BOLD));
    let rows = (0..shown_rows).map(|r| {
        let mut cells: Vec<String> = columns
            .iter()
            .take(shown_cols)
            .map(|c| cell_text(c.as_materialized_series(), r))
            .collect();
        if shown_cols < width {
            cells.push("...".to_string());
        }
        Row::new(cells)
    });

    let widths = vec![Constraint::Fill(1); names.len()];
    let caption = format!("{title} ({height} rows x {width} cols)");
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(caption));
    Widget::render(table, area, buf);
}
