//! Pizza Hub Common
//!
//! Utilities shared by every Pizza Hub binary.

pub mod logging;

pub use logging::{init_default_logging, init_logging};
