//! wpbulk: bulk messaging over a browser-driven web chat, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
