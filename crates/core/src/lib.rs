pub mod error;
pub mod kind;
pub mod state;
pub mod window;

pub use error::{AvgError, Result};
pub use kind::NumberKind;
pub use state::WindowState;
pub use window::{average, merge_window};
