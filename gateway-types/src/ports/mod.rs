//! Port traits (interfaces for adapters).
//!
//! The service depends on these traits, not on concrete transports.

mod transport;

pub use transport::{Transport, TransportError};
