//! Paints `RenderCommand`s into a ratatui buffer, one cell per character.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use tracedash_protocol::{Paint, RenderCommand, TextAlign, ThemeMode, ThemeToken};

pub fn theme_to_color(token: ThemeToken, mode: ThemeMode) -> Color {
    match mode {
        ThemeMode::Dark => match token {
            ThemeToken::FlameNeutral => Color::Gray,
            ThemeToken::SpanBorder | ThemeToken::TableBorder => Color::DarkGray,
            ThemeToken::SpanSelectedBorder => Color::LightBlue,
            ThemeToken::TextPrimary | ThemeToken::TableTitle => Color::White,
            ThemeToken::TextSecondary => Color::Gray,
            ThemeToken::TextMuted => Color::DarkGray,
            ThemeToken::LinkText => Color::LightBlue,
            ThemeToken::SortIndicator => Color::Yellow,
            ThemeToken::Background | ThemeToken::TableRowEven => Color::Black,
            ThemeToken::TableRowOdd => Color::Rgb(20, 20, 20),
            ThemeToken::TableRowCursor => Color::Rgb(38, 50, 56),
            ThemeToken::TableHeaderBackground => Color::DarkGray,
        },
        ThemeMode::Light => match token {
            ThemeToken::FlameNeutral => Color::Gray,
            ThemeToken::SpanBorder | ThemeToken::TableBorder => Color::Gray,
            ThemeToken::SpanSelectedBorder => Color::Blue,
            ThemeToken::TextPrimary | ThemeToken::TableTitle => Color::Black,
            ThemeToken::TextSecondary => Color::DarkGray,
            ThemeToken::TextMuted => Color::Gray,
            ThemeToken::LinkText => Color::Blue,
            ThemeToken::SortIndicator => Color::Rgb(230, 126, 34),
            ThemeToken::Background | ThemeToken::TableRowEven => Color::White,
            ThemeToken::TableRowOdd => Color::Rgb(240, 240, 240),
            ThemeToken::TableRowCursor => Color::Rgb(227, 242, 253),
            ThemeToken::TableHeaderBackground => Color::Rgb(220, 220, 220),
        },
    }
}

fn paint_to_color(paint: Paint, mode: ThemeMode) -> Color {
    match paint {
        Paint::Token(token) => theme_to_color(token, mode),
        Paint::Rgb(c) => {
            let [r, g, b] = c.to_rgb8();
            Color::Rgb(r, g, b)
        }
    }
}

/// Readable text colour on top of a fill.
fn contrast_fg(bg: Color) -> Color {
    match bg {
        Color::Rgb(r, g, b) => {
            let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
            if luma > 140.0 { Color::Black } else { Color::White }
        }
        _ => Color::Black,
    }
}

/// How command coordinates map onto terminal cells.
#[derive(Debug, Clone, Copy)]
pub struct CellMapping {
    /// Command x units per column.
    pub x_per_col: f64,
    /// Command y units per line.
    pub y_per_row: f64,
    /// Lines scrolled off the top.
    pub scroll_rows: u16,
}

impl CellMapping {
    fn cell(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.x_per_col) as u16;
        let row = ((y / self.y_per_row) as u16).checked_sub(self.scroll_rows)?;
        Some((col, row))
    }
}

pub fn paint_commands(
    buf: &mut Buffer,
    area: Rect,
    commands: &[RenderCommand],
    mapping: CellMapping,
    mode: ThemeMode,
) {
    let mut put = |col: u16, row: u16, ch: Option<char>, fg: Option<Color>, bg: Option<Color>| {
        if col >= area.width || row >= area.height {
            return;
        }
        let cell = &mut buf[(area.x + col, area.y + row)];
        if let Some(ch) = ch {
            cell.set_char(ch);
        }
        if let Some(fg) = fg {
            cell.set_fg(fg);
        }
        if let Some(bg) = bg {
            cell.set_bg(bg);
        }
    };

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect, fill, label, ..
            } => {
                let Some((col, row)) = mapping.cell(rect.x, rect.y) else {
                    continue;
                };
                let bg = paint_to_color(*fill, mode);
                let width = ((rect.w / mapping.x_per_col).round() as u16).max(1);
                for i in 0..width {
                    put(col + i, row, Some(' '), None, Some(bg));
                }
                if let Some(label) = label
                    && width > 2
                {
                    let fg = contrast_fg(bg);
                    for (i, ch) in label.chars().take(usize::from(width - 1)).enumerate() {
                        put(col + 1 + i as u16, row, Some(ch), Some(fg), None);
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let Some((col, row)) = mapping.cell(position.x, position.y) else {
                    continue;
                };
                let len = text.chars().count() as u16;
                let start = match align {
                    TextAlign::Left => col,
                    TextAlign::Center => col.saturating_sub(len / 2),
                    TextAlign::Right => col.saturating_sub(len),
                };
                let fg = theme_to_color(*color, mode);
                for (i, ch) in text.chars().enumerate() {
                    put(start + i as u16, row, Some(ch), Some(fg), None);
                }
            }
            RenderCommand::DrawLine { .. }
            | RenderCommand::BeginGroup { .. }
            | RenderCommand::EndGroup => {}
        }
    }
}
