pub mod commands;
pub mod shared_str;
pub mod theme;
pub mod types;

pub use commands::{Paint, RenderCommand, TextAlign};
pub use shared_str::SharedStr;
pub use theme::{ThemeMode, ThemeToken};
pub use types::{Color, ColorParseError, Point, Rect, Viewport};
