//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod logger;
pub(crate) mod retry;

// Selective exports - only public utilities
pub use logger::{setup_logger, setup_quiet_logger, RESULT_TARGET};
