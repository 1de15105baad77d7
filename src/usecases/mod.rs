//! Application use cases. Orchestrate domain logic via ports.

pub mod dispatch_service;
pub mod session;

pub use dispatch_service::{DispatchConfig, DispatchService, StopSignal};
pub use session::{DispatchSession, EphemeralSession, PersistentSession};
