//! Interactive terminal adapters.

pub mod tui;

pub use tui::TuiLoginPrompt;
