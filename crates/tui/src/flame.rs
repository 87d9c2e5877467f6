//! Interactive terminal flame graph.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Block;
use tracedash_core::format::to_fixed;
use tracedash_core::load::TraceDocument;
use tracedash_core::model::IntervalUnit;
use tracedash_core::views::flame_graph::{
    FlameGraph, FlameGraphProps, ROW_HEIGHT, SPAN_HEIGHT, SpanEventHandler,
    render_flame_graph, tooltip_text, x_to_pct,
};
use tracedash_protocol::{ThemeMode, ThemeToken, Viewport};

use crate::renderer::{CellMapping, paint_commands, theme_to_color};
use crate::terminal::TerminalGuard;

/// Hover and selection ids, owned here and fed back into every render.
#[derive(Debug, Default)]
struct Selection {
    hovered: String,
    selected: String,
}

impl SpanEventHandler for Selection {
    fn on_span_hover(&mut self, id: &str) {
        self.hovered = id.to_string();
    }

    fn on_span_select(&mut self, id: &str) {
        tracing::debug!(span = id, "span selected");
        self.selected = id.to_string();
    }
}

/// Percent-of-spread and pixel coordinates of the centre of a terminal cell
/// inside the graph area.
fn cell_to_graph(viewport: &Viewport, col: u16, row: u16, scroll_rows: u16) -> (f64, f64) {
    let x_pct = x_to_pct(viewport, f64::from(col) + 0.5);
    let y_px = f64::from(row + scroll_rows) * ROW_HEIGHT + SPAN_HEIGHT / 2.0;
    (x_pct, y_px)
}

fn describe(doc: &TraceDocument, unit: &IntervalUnit, id: &str) -> Option<String> {
    doc.tree
        .find(id)
        .map(|node| tooltip_text(node, unit).replace('\n', "  "))
}

pub fn run(doc: &TraceDocument, unit: &IntervalUnit, theme: ThemeMode) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let terminal = guard.terminal();

    let mut graph = FlameGraph::new();
    let mut selection = Selection::default();
    let mut scroll_rows: u16 = 0;

    loop {
        let props = FlameGraphProps {
            tree: Some(&doc.tree),
            meta: Some(&doc.meta),
            hovered_span_id: &selection.hovered,
            selected_span_id: &selection.selected,
            interval_unit: unit,
            theme,
        };
        let frame = graph.render(&props);
        let size = terminal.size()?;
        let viewport = Viewport::sized(f64::from(size.width), frame.height);

        terminal.draw(|f| {
            let area = f.area();
            let graph_area = Rect::new(0, 1, area.width, area.height.saturating_sub(2));

            let header = format!(
                " tracedash: {} | {} spans | {} {} | click select | ↑↓ scroll | c clear | q quit ",
                doc.tree.name,
                doc.meta.total_spans,
                to_fixed(unit.resolve(doc.meta.spread), 2),
                unit.name,
            );
            f.render_widget(
                Block::default()
                    .title(header)
                    .style(Style::default().fg(Color::White).bg(Color::DarkGray)),
                Rect::new(0, 0, area.width, 1),
            );

            f.render_widget(
                Block::default()
                    .style(Style::default().bg(theme_to_color(ThemeToken::Background, theme))),
                graph_area,
            );
            let cmds = render_flame_graph(&frame, &viewport);
            paint_commands(
                f.buffer_mut(),
                graph_area,
                &cmds,
                CellMapping {
                    x_per_col: 1.0,
                    y_per_row: ROW_HEIGHT,
                    scroll_rows,
                },
                theme,
            );

            let status = describe(doc, unit, &selection.hovered)
                .map(|s| format!(" hover: {s}"))
                .or_else(|| {
                    describe(doc, unit, &selection.selected).map(|s| format!(" selected: {s}"))
                })
                .unwrap_or_default();
            f.render_widget(
                Block::default()
                    .title(status)
                    .style(Style::default().fg(Color::White).bg(Color::DarkGray)),
                Rect::new(0, area.height.saturating_sub(1), area.width, 1),
            );
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') => selection.selected.clear(),
                KeyCode::Up => scroll_rows = scroll_rows.saturating_sub(1),
                KeyCode::Down => {
                    scroll_rows = (scroll_rows + 1).min(doc.meta.levels.saturating_sub(1) as u16);
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                // Line 0 is the header.
                let Some(row) = mouse.row.checked_sub(1) else {
                    graph.pointer_left(&mut selection);
                    continue;
                };
                let (x_pct, y_px) = cell_to_graph(&viewport, mouse.column, row, scroll_rows);
                match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        graph.pointer_moved(&frame, x_pct, y_px, &mut selection);
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        graph.click(&frame, x_pct, y_px, &mut selection);
                    }
                    MouseEventKind::ScrollDown => {
                        scroll_rows =
                            (scroll_rows + 1).min(doc.meta.levels.saturating_sub(1) as u16);
                    }
                    MouseEventKind::ScrollUp => scroll_rows = scroll_rows.saturating_sub(1),
                    _ => {}
                }
            }
            Event::FocusLost => graph.pointer_left(&mut selection),
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_centre_maps_into_span_row() {
        let viewport = Viewport::sized(100.0, 45.0);
        let (x_pct, y_px) = cell_to_graph(&viewport, 49, 1, 0);
        assert_eq!(x_pct, 49.5);
        assert_eq!(y_px, 20.0);

        let (_, y_px) = cell_to_graph(&viewport, 0, 0, 2);
        assert_eq!(y_px, 35.0);
    }

    #[test]
    fn selection_tracks_events() {
        let mut selection = Selection::default();
        selection.on_span_hover("a");
        selection.on_span_select("b");
        selection.on_span_hover("");
        assert_eq!(selection.hovered, "");
        assert_eq!(selection.selected, "b");
    }
}
