//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use tracedash_protocol::{Paint, RenderCommand, TextAlign, ThemeMode, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, mode: ThemeMode) -> String {
    let mut svg = String::with_capacity(commands.len() * 200);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    ));

    let bg = resolve_token(ThemeToken::Background, mode);
    svg.push_str(&format!(
        r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#,
    ));

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                fill,
                border_color,
                label,
                tooltip,
                ..
            } => {
                let fill = resolve_paint(*fill, mode);
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}""#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
                if let Some(border) = border_color {
                    svg.push_str(&format!(
                        r#" stroke="{}" stroke-width="0.5""#,
                        resolve_token(*border, mode)
                    ));
                }
                svg.push('>');
                if let Some(title) = tooltip.as_ref().or(label.as_ref()) {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(title)));
                }
                svg.push_str("</rect>");

                if let Some(label) = label
                    && rect.w > 30.0
                {
                    let text_color = resolve_token(ThemeToken::TextPrimary, mode);
                    let tx = rect.x + 3.0;
                    let ty = rect.y + rect.h * 0.8;
                    let font = (rect.h * 0.8).min(11.0);
                    let max_chars = (rect.w / (font * 0.6)) as usize;
                    let text = if label.chars().count() > max_chars && max_chars > 2 {
                        let truncated: String = label.chars().take(max_chars - 1).collect();
                        format!("{truncated}…")
                    } else {
                        label.to_string()
                    };
                    svg.push_str(&format!(
                        r#"<text x="{tx}" y="{ty}" fill="{text_color}" font-size="{font}" style="pointer-events:none">{}</text>"#,
                        escape_xml(&text),
                    ));
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let stroke = resolve_token(*color, mode);
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{line_width}"/>"#,
                    from.x, from.y, to.x, to.y,
                ));
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let fill = resolve_token(*color, mode);
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                ));
            }
            RenderCommand::BeginGroup { id, .. } => {
                svg.push_str(&format!(r#"<g id="{}">"#, escape_xml(id)));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn resolve_paint(paint: Paint, mode: ThemeMode) -> String {
    match paint {
        Paint::Token(token) => resolve_token(token, mode).to_string(),
        Paint::Rgb(color) => color.to_hex(),
    }
}

/// Hex value of a token in the given mode.
pub fn resolve_token(token: ThemeToken, mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Dark => match token {
            ThemeToken::FlameNeutral => "#9575cd",
            ThemeToken::SpanBorder | ThemeToken::TableBorder => "#303030",
            ThemeToken::SpanSelectedBorder => "#448aff",
            ThemeToken::TextPrimary | ThemeToken::TableTitle => "#ececec",
            ThemeToken::TextSecondary => "#bdbdbd",
            ThemeToken::TextMuted => "#9e9e9e",
            ThemeToken::LinkText => "#4e74f8",
            ThemeToken::SortIndicator => "#ffd600",
            ThemeToken::Background => "#0b0c0e",
            ThemeToken::TableRowEven => "#141414",
            ThemeToken::TableRowOdd => "#1d1d1d",
            ThemeToken::TableRowCursor => "#263238",
            ThemeToken::TableHeaderBackground => "#262626",
        },
        ThemeMode::Light => match token {
            ThemeToken::FlameNeutral => "#adb5bd",
            ThemeToken::SpanBorder | ThemeToken::TableBorder => "#dee2e6",
            ThemeToken::SpanSelectedBorder => "#1565c0",
            ThemeToken::TextPrimary | ThemeToken::TableTitle => "#1a1a2e",
            ThemeToken::TextSecondary => "#444455",
            ThemeToken::TextMuted => "#666677",
            ThemeToken::LinkText => "#1f4fdb",
            ThemeToken::SortIndicator => "#e67e22",
            ThemeToken::Background | ThemeToken::TableRowEven => "#ffffff",
            ThemeToken::TableRowOdd => "#f8f9fa",
            ThemeToken::TableRowCursor => "#e3f2fd",
            ThemeToken::TableHeaderBackground => "#fafafa",
        },
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
