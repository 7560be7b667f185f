//! Shared utilities (hex dump rendering, input file loading).

#[cfg(feature = "cli")]
pub mod fs;
pub mod hex;
