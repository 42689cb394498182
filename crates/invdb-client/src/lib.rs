//! Typed HTTP client for the devices REST API.

pub mod client;
pub mod error;
pub(crate) mod retry;

pub use client::DevicesClient;
pub use error::ClientError;
