use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// Fill for a rectangle: either a semantic token resolved by the renderer's
/// theme, or a literal color (service colours come from trace data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Token(ThemeToken),
    Rgb(Color),
}

/// A single, stateless render instruction.
///
/// Views emit a `Vec<RenderCommand>` per render pass. Renderers consume
/// this list sequentially and paint in order, so later commands sit above
/// earlier ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle.
    ///
    /// `tooltip` is shown on hover by renderers that support it. `hit_id`
    /// names the logical element (span id, endpoint name) for hit-testing.
    DrawRect {
        rect: Rect,
        fill: Paint,
        border_color: Option<ThemeToken>,
        label: Option<SharedStr>,
        tooltip: Option<SharedStr>,
        hit_id: Option<SharedStr>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Begin a logical group (the flame graph, the table). Renderers may use
    /// this for layer separation or accessibility.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_command_serializes_literal_paint() {
        let cmd = RenderCommand::DrawRect {
            rect: Rect::new(0.0, 15.0, 120.0, 10.0),
            fill: Paint::Rgb(Color::rgba(1.0, 0.0, 0.0, 1.0)),
            border_color: None,
            label: None,
            tooltip: Some("GET /api\n5.00 ms".into()),
            hit_id: Some("span-1".into()),
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert!(json.contains("\"Rgb\""));
        assert!(json.contains("span-1"));
    }

    #[test]
    fn paint_names_its_variant_on_the_wire() {
        let json = serde_json::to_string(&Paint::Token(ThemeToken::FlameNeutral))
            .unwrap_or_default();
        assert_eq!(json, r#"{"Token":"FlameNeutral"}"#);
        // Only tokens some view paints exist.
        for retired in ["Surface", "Border", "HoverHighlight"] {
            assert!(serde_json::from_str::<ThemeToken>(&format!("\"{retired}\"")).is_err());
        }
    }
}
