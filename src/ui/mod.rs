//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting, verbosity, and diagnostics setup
//!
//! # Design
//!
//! All terminal output goes through this module so that stdout carries
//! only the rendered changelog and the quiet/debug flags are honored in
//! one place.

pub mod output;
