//! Interactive "Top Endpoints" table.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Block;
use tracedash_core::model::GlobalTime;
use tracedash_core::navigation::HistoryNavigator;
use tracedash_core::views::endpoints_table::{
    self, EndpointColumn, EndpointsTable, ROW_HEIGHT, SortOrder, TableSort,
    render_endpoints_table, scroll_to_row,
};
use tracedash_protocol::{ThemeMode, ThemeToken, Viewport};

use crate::renderer::{CellMapping, paint_commands, theme_to_color};
use crate::terminal::TerminalGuard;

/// Terminal columns per table x unit. Table commands are laid out in
/// pixels; one column stands for this many.
const PX_PER_COL: f64 = 8.0;

/// Sort, cursor and body scroll state of the table.
#[derive(Debug, Default)]
struct TableState {
    sort: Option<TableSort>,
    cursor: usize,
    /// Pixels of body scrolled past the header.
    scroll_y: f64,
}

impl TableState {
    /// Sort by `column`; a second press on the same column flips the order.
    fn press_sort(&mut self, column: EndpointColumn) {
        self.sort = Some(match self.sort {
            Some(current) if current.column == column => TableSort {
                column,
                order: current.order.toggled(),
            },
            _ => TableSort {
                column,
                order: SortOrder::Ascend,
            },
        });
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Scroll just enough to keep the cursor row on screen.
    fn keep_cursor_visible(&mut self, viewport_height: f64) {
        self.scroll_y = scroll_to_row(self.scroll_y, self.cursor, viewport_height);
    }

    /// Viewport of the given pixel size, scrolled to the current offset.
    fn viewport(&self, width: f64, height: f64) -> Viewport {
        Viewport {
            y: self.scroll_y,
            ..Viewport::sized(width, height)
        }
    }

    fn current_name(&self, table: &EndpointsTable) -> Option<String> {
        table
            .sorted_rows(self.sort)
            .get(self.cursor)
            .map(|row| row.name.to_string())
    }
}

fn sort_key(c: char) -> Option<EndpointColumn> {
    match c {
        '1' => Some(EndpointColumn::P50),
        '2' => Some(EndpointColumn::P95),
        '3' => Some(EndpointColumn::P99),
        '4' => Some(EndpointColumn::NumCalls),
        _ => None,
    }
}

pub fn run(
    table: &EndpointsTable,
    service_name: &str,
    time: &GlobalTime,
    theme: ThemeMode,
) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let terminal = guard.terminal();

    let mut state = TableState::default();
    let mut navigator = HistoryNavigator::new();
    let len = table.rows().len();

    loop {
        let size = terminal.size()?;
        let height = f64::from(size.height.saturating_sub(1)) * ROW_HEIGHT;
        state.keep_cursor_visible(height);
        let viewport = state.viewport(f64::from(size.width) * PX_PER_COL, height);
        let cmds = render_endpoints_table(table, &viewport, state.sort, Some(state.cursor));

        terminal.draw(|f| {
            let area = f.area();
            let table_area = Rect::new(0, 0, area.width, area.height.saturating_sub(1));
            f.render_widget(
                Block::default()
                    .style(Style::default().bg(theme_to_color(ThemeToken::Background, theme))),
                table_area,
            );
            paint_commands(
                f.buffer_mut(),
                table_area,
                &cmds,
                CellMapping {
                    x_per_col: PX_PER_COL,
                    y_per_row: ROW_HEIGHT,
                    scroll_rows: 0,
                },
                theme,
            );

            let status = match navigator.current() {
                Some(url) => format!(" {url}"),
                None => " 1-4 sort | ↑↓ move | enter open | q quit ".to_string(),
            };
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
        let open = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(c) => {
                    if let Some(column) = sort_key(c) {
                        state.press_sort(column);
                    }
                    false
                }
                KeyCode::Up => {
                    state.move_cursor(-1, len);
                    false
                }
                KeyCode::Down => {
                    state.move_cursor(1, len);
                    false
                }
                KeyCode::Enter => true,
                _ => false,
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let y_px = f64::from(mouse.row) * ROW_HEIGHT;
                match endpoints_table::body_row_at(table, y_px, state.scroll_y) {
                    Some(index) => {
                        state.cursor = index;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };

        if open && let Some(name) = state.current_name(table) {
            table.on_name_click(&name, service_name, time, &mut navigator);
        }
    }

    // The screen is gone once the guard drops; keep the last link visible.
    drop(guard);
    if let Some(url) = navigator.current() {
        tracing::info!(url, "last opened link");
    }
    Ok(())
}
