//! Browser channel adapters. Implement ChannelDriver.
//!
//! - `WebDriverChannel`: drives Chrome through a running chromedriver.
//! - `DryRunChannel`: logs instead of sending.

pub mod client;
pub mod driver;
pub mod dry_run;
pub mod mapper;

pub use driver::WebDriverChannel;
pub use dry_run::DryRunChannel;
