use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracedash_protocol::{
    Paint, Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken, Viewport,
};

use crate::format::to_fixed;
use crate::model::{EndpointRow, GlobalTime};
use crate::navigation::{Navigator, endpoint_deep_link};

pub const TABLE_TITLE: &str = "Top Endpoints";

/// Every line of the table (title, header, body rows) is one row tall, so
/// cell-based renderers can map `y / ROW_HEIGHT` to a terminal line.
pub const ROW_HEIGHT: f64 = 24.0;
const TITLE_ROW_HEIGHT: f64 = ROW_HEIGHT;
const HEADER_ROW_HEIGHT: f64 = ROW_HEIGHT;
/// Top of the first body row; title and header stay pinned above it.
const BODY_TOP: f64 = TITLE_ROW_HEIGHT + HEADER_ROW_HEIGHT;
const TEXT_BASELINE: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointColumn {
    Name,
    P50,
    P95,
    P99,
    NumCalls,
}

impl EndpointColumn {
    pub const ALL: [EndpointColumn; 5] = [
        EndpointColumn::Name,
        EndpointColumn::P50,
        EndpointColumn::P95,
        EndpointColumn::P99,
        EndpointColumn::NumCalls,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::P50 => "P50  (in ms)",
            Self::P95 => "P95  (in ms)",
            Self::P99 => "P99  (in ms)",
            Self::NumCalls => "Number of Calls",
        }
    }

    /// Field name in the API payload.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::P50 => "p50",
            Self::P95 => "p95",
            Self::P99 => "p99",
            Self::NumCalls => "numCalls",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn is_sortable(self) -> bool {
        !matches!(self, Self::Name)
    }

    /// Numeric ascending comparator; `None` for columns without a sorter.
    fn compare(self, a: &EndpointRow, b: &EndpointRow) -> Option<Ordering> {
        match self {
            Self::Name => None,
            Self::P50 => Some(a.p50.total_cmp(&b.p50)),
            Self::P95 => Some(a.p95.total_cmp(&b.p95)),
            Self::P99 => Some(a.p99.total_cmp(&b.p99)),
            Self::NumCalls => Some(a.num_calls.cmp(&b.num_calls)),
        }
    }

    /// Fraction of the table width where the column starts.
    fn x_fraction(self) -> f64 {
        match self {
            Self::Name => 0.0,
            Self::P50 => 0.44,
            Self::P95 => 0.57,
            Self::P99 => 0.70,
            Self::NumCalls => 0.83,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    Descend,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascend => Self::Descend,
            Self::Descend => Self::Ascend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSort {
    pub column: EndpointColumn,
    pub order: SortOrder,
}

/// Percentile cell: nanoseconds shown as milliseconds, two decimals.
pub fn format_ms(ns: f64) -> String {
    to_fixed(ns / 1e6, 2)
}

/// Per-endpoint latency table. Pagination is off: every row is shown.
#[derive(Debug, Clone, Default)]
pub struct EndpointsTable {
    rows: Vec<EndpointRow>,
}

impl EndpointsTable {
    pub fn new(rows: Vec<EndpointRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EndpointRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in display order. Stable; unsortable columns keep input order.
    pub fn sorted_rows(&self, sort: Option<TableSort>) -> Vec<&EndpointRow> {
        let mut rows: Vec<&EndpointRow> = self.rows.iter().collect();
        if let Some(TableSort { column, order }) = sort
            && column.is_sortable()
        {
            rows.sort_by(|a, b| {
                let ord = column.compare(a, b).unwrap_or(Ordering::Equal);
                match order {
                    SortOrder::Ascend => ord,
                    SortOrder::Descend => ord.reverse(),
                }
            });
        }
        rows
    }

    pub fn cell_text(row: &EndpointRow, column: EndpointColumn) -> String {
        match column {
            EndpointColumn::Name => row.name.to_string(),
            EndpointColumn::P50 => format_ms(row.p50),
            EndpointColumn::P95 => format_ms(row.p95),
            EndpointColumn::P99 => format_ms(row.p99),
            EndpointColumn::NumCalls => row.num_calls.to_string(),
        }
    }

    /// The "Name" link: jump to the trace explorer filtered to this
    /// operation over the selected range.
    pub fn on_name_click(
        &self,
        operation: &str,
        service_name: &str,
        time: &GlobalTime,
        navigator: &mut impl Navigator,
    ) {
        let url = endpoint_deep_link(service_name, operation, time);
        navigator.push(&url);
    }
}

/// Index (in display order) of the body row at `y_px` when the body is
/// scrolled by `scroll_y` pixels, if any.
pub fn body_row_at(table: &EndpointsTable, y_px: f64, scroll_y: f64) -> Option<usize> {
    let offset = y_px - BODY_TOP;
    if offset < 0.0 {
        return None;
    }
    let index = ((offset + scroll_y) / ROW_HEIGHT) as usize;
    (index < table.rows.len()).then_some(index)
}

/// Body scroll offset that brings row `index` fully into view, moving as
/// little as possible from `scroll_y`.
pub fn scroll_to_row(scroll_y: f64, index: usize, viewport_height: f64) -> f64 {
    let body_height = (viewport_height - BODY_TOP).max(ROW_HEIGHT);
    let top = index as f64 * ROW_HEIGHT;
    if top < scroll_y {
        top
    } else if top + ROW_HEIGHT > scroll_y + body_height {
        top + ROW_HEIGHT - body_height
    } else {
        scroll_y
    }
}

/// Render the table: title, header, then one row per endpoint.
///
/// `viewport.y` scrolls the body; the title and header stay at the top.
/// Rows scrolled under the header or starting below the viewport are not
/// drawn. `cursor` highlights a row (keyboard-driven renderers). The name
/// cell of each row carries the endpoint name as its hit id.
pub fn render_endpoints_table(
    table: &EndpointsTable,
    viewport: &Viewport,
    sort: Option<TableSort>,
    cursor: Option<usize>,
) -> Vec<RenderCommand> {
    let rows = table.sorted_rows(sort);
    let mut commands = Vec::with_capacity(rows.len() * 7 + 10);
    commands.push(RenderCommand::BeginGroup {
        id: "endpoints-table".into(),
        label: Some(TABLE_TITLE.into()),
    });

    commands.push(RenderCommand::DrawText {
        position: Point::new(8.0, TEXT_BASELINE),
        text: TABLE_TITLE.into(),
        color: ThemeToken::TableTitle,
        font_size: 14.0,
        align: TextAlign::Left,
    });

    // Header row
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, TITLE_ROW_HEIGHT, viewport.width, HEADER_ROW_HEIGHT),
        fill: Paint::Token(ThemeToken::TableHeaderBackground),
        border_color: Some(ThemeToken::TableBorder),
        label: None,
        tooltip: None,
        hit_id: None,
    });
    let header_y = TITLE_ROW_HEIGHT + TEXT_BASELINE;
    for column in EndpointColumn::ALL {
        let indicator = match sort {
            Some(s) if s.column == column && column.is_sortable() => match s.order {
                SortOrder::Ascend => " ▲",
                SortOrder::Descend => " ▼",
            },
            _ => "",
        };
        commands.push(RenderCommand::DrawText {
            position: Point::new(column.x_fraction() * viewport.width + 8.0, header_y),
            text: format!("{}{indicator}", column.title()).into(),
            color: if indicator.is_empty() {
                ThemeToken::TextPrimary
            } else {
                ThemeToken::SortIndicator
            },
            font_size: 12.0,
            align: TextAlign::Left,
        });
    }

    for (i, row) in rows.iter().enumerate() {
        let y = BODY_TOP + (i as f64) * ROW_HEIGHT - viewport.y;
        if y < BODY_TOP || y >= viewport.height {
            continue;
        }

        let row_color = if cursor == Some(i) {
            ThemeToken::TableRowCursor
        } else if i % 2 == 0 {
            ThemeToken::TableRowEven
        } else {
            ThemeToken::TableRowOdd
        };
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, y, viewport.width, ROW_HEIGHT),
            fill: Paint::Token(row_color),
            border_color: None,
            label: None,
            tooltip: None,
            hit_id: None,
        });

        // Clickable name cell
        let name_w = EndpointColumn::P50.x_fraction() * viewport.width;
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, y, name_w, ROW_HEIGHT),
            fill: Paint::Token(row_color),
            border_color: None,
            label: None,
            tooltip: Some(row.name.clone()),
            hit_id: Some(row.name.clone()),
        });

        let text_y = y + TEXT_BASELINE;
        for column in EndpointColumn::ALL {
            let (text, color): (SharedStr, _) = match column {
                EndpointColumn::Name => (row.name.clone(), ThemeToken::LinkText),
                EndpointColumn::NumCalls => (
                    EndpointsTable::cell_text(row, column).into(),
                    ThemeToken::TextMuted,
                ),
                _ => (
                    EndpointsTable::cell_text(row, column).into(),
                    ThemeToken::TextSecondary,
                ),
            };
            commands.push(RenderCommand::DrawText {
                position: Point::new(column.x_fraction() * viewport.width + 8.0, text_y),
                text,
                color,
                font_size: 11.0,
                align: TextAlign::Left,
            });
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
