//! CLI Interface: terminal output shared by the binaries
//!
//! # Components
//! - `display.rs`: model summary, diagnostics and the result line

pub mod display;

pub use display::Display;
