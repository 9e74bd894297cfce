//! Process lifecycle.

pub mod signals;

pub use signals::shutdown_signal;
