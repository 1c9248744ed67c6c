//! Timerboard - an HTTP server for countdown timers that survive reloads
//!
//! Timers are stored as an absolute start instant plus a millisecond
//! budget; remaining time is derived at read time from those fields, so
//! no background clock ever mutates stored state.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, TimerStore};
pub use utils::signals::shutdown_signal;
