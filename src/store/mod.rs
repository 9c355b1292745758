pub mod play_state;

pub use play_state::{ExportRow, PlayStateStore, StoreChange, StoreListener};
