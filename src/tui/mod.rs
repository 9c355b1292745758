pub mod app;
pub mod ui;
pub mod event;

pub use app::{App, ExportKind, InputMode, Screen, StatusMessage};
pub use event::{Event, EventHandler};
