//! List-style menu rendering shared by the group and operation pages.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, Widget};

/// Render a titled list with one highlighted row.
pub fn render_menu(area: Rect, buf: &mut Buffer, title: &str, items: &[String], cursor: usize) {
    let rows: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let item = ListItem::new(format!(" {label} "));
            if i == cursor {
                item.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                item
            }
        })
        .collect();
    let list = List::new(rows).block(Block::default().borders(Borders::ALL).title(title.to_string()));
    Widget::render(list, area, buf);
}

/// Render a checkbox-style column picker.
pub fn render_picker(
    area: Rect,
    buf: &mut Buffer,
    title: &str,
    items: &[String],
    checked: &[bool],
    cursor: usize,
) {
    let rows: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mark = if checked.get(i).copied().unwrap_or(false) {
                "[x]"
            } else {
                "[ ]"
            };
            format!(" {mark} {label} ")
        })
        .collect();
    render_menu(area, buf, title, &rows, cursor);
}
