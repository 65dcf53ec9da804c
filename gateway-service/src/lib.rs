//! # Gateway Service
//!
//! Request building, response hydration, error classification and the
//! orchestrating charge service for the card gateway client.
//!
//! ## Architecture
//!
//! - `request` - Builds the request document for each operation
//! - `hydrate` - Copies response fields into typed results
//! - `classify` - Turns response codes into errors and decides on reversals
//! - `service` - Validates, submits and ties the above together
//!
//! The service is generic over `T: Transport`, allowing different transport
//! implementations to be injected.

pub mod classify;
pub mod hydrate;
pub mod request;
pub mod service;


pub use service::ChargeService;
