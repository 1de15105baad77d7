//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod country;
pub mod entities;
pub mod errors;
pub mod normalizer;
pub mod recipients;
pub mod report;

pub use country::{CountryProfile, CountryRegistry, PrefixPattern};
pub use entities::{
    CanonicalNumber, ChannelSession, DeliveryState, NormalizationAttempt, RawRecipientLine,
    Recipient, SessionStrategy,
};
pub use errors::{DomainError, NormalizationError, RegistryError};
pub use normalizer::normalize;
pub use recipients::RecipientListBuilder;
pub use report::{BatchReport, BatchState, EntryStatus, ReportEntry};
