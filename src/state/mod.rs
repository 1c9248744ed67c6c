//! State management module
//!
//! Timer records, the durable store, and the application state that
//! applies transitions to them.

pub mod app_state;
pub mod store;
pub mod timer;

// Re-export main types
pub use app_state::AppState;
pub use store::TimerStore;
pub use timer::{TimerKey, TimerRecord, TimerStatus, TimerSummary};
