use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    /// Fallback for spans whose service colour could not be parsed.
    FlameNeutral,
    SpanBorder,
    SpanSelectedBorder,

    TextPrimary,
    TextSecondary,
    TextMuted,
    LinkText,

    Background,

    // Table
    TableTitle,
    TableRowEven,
    TableRowOdd,
    TableRowCursor,
    TableHeaderBackground,
    TableBorder,
    SortIndicator,
}

/// Light or dark rendering. Also decides whether a selected span is
/// lightened (dark) or darkened (light) relative to its service colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn is_dark(self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}
