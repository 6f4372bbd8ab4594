//! Common types, protocol definitions, and errors shared across `mailvault` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
