//! core
//!
//! Core domain types and configuration for changelog-build.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, Entry, Note, FilenameFormat
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
