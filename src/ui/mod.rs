//! User Interface module
//!
//! Terminal UI using ratatui.

pub mod app;
pub mod widgets;

pub use app::{App, Focus, LoadState, Step, UiEvent};
