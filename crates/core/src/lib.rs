pub mod format;
pub mod load;
pub mod model;
pub mod navigation;
pub mod svg;
pub mod views;
