//! Terminal presentation of the live preview.

mod frame;
mod raw_mode;
mod status_bar;

pub use frame::{surface_size, Cell, CellColor, CellFrame, HALF_BLOCK};
pub use raw_mode::RawModeGuard;
pub use status_bar::StatusBar;
