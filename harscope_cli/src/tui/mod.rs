//! Terminal UI for browsing a trace

mod app;
mod ui;

pub use app::{Command, TuiApp, TuiEvent};
pub use ui::draw;
