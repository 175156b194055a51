use crate::window::{average, merge_window};
use serde::{Deserialize, Serialize};

/// The persisted sliding window: the snapshot before the latest merge, the
/// snapshot after it, and the rounded average of the latter.
///
/// Serialized as `{"windowPrevState", "windowCurrState", "numbers", "avg"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredWindow", into = "StoredWindow")]
pub struct WindowState {
    pub previous_window: Vec<i64>,
    pub current_window: Vec<i64>,
    pub average: f64,
}

impl WindowState {
    /// Derive the state that follows merging `incoming` into this one.
    #[must_use]
    pub fn advance(&self, incoming: &[i64], window_size: usize) -> WindowState {
        let current_window = merge_window(&self.current_window, incoming, window_size);
        WindowState {
            previous_window: self.current_window.clone(),
            average: average(&current_window),
            current_window,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.previous_window.is_empty() && self.current_window.is_empty()
    }
}

/// On-disk / on-wire shape. `numbers` mirrors the current window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StoredWindow {
    window_prev_state: Vec<i64>,
    window_curr_state: Vec<i64>,
    numbers: Vec<i64>,
    avg: f64,
}

impl From<StoredWindow> for WindowState {
    fn from(stored: StoredWindow) -> Self {
        // The average is never trusted from storage; it is always a function
        // of the current window.
        let average = average(&stored.window_curr_state);
        Self {
            previous_window: stored.window_prev_state,
            current_window: stored.window_curr_state,
            average,
        }
    }
}

impl From<WindowState> for StoredWindow {
    fn from(state: WindowState) -> Self {
        Self {
            numbers: state.current_window.clone(),
            window_prev_state: state.previous_window,
            window_curr_state: state.current_window,
            avg: state.average,
        }
    }
}
