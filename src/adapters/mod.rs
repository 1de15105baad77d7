//! Infrastructure adapters. Implement ports.
//!
//! Browser channel, filesystem, terminal UI. Map errors to DomainError.

pub mod browser;
pub mod persistence;
pub mod ui;
