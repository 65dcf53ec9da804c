//! # Gateway Types
//!
//! Domain types and port traits for the card gateway client.
//! This crate has no IO dependencies - only data structures, validation
//! rules, and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Cards, cardholders, money, transaction ids and typed results
//! - `document` - Request document tree handed to a transport
//! - `response` - Parsed response tree returned by a transport
//! - `ports/` - The `Transport` trait adapters implement
//! - `dto` - Inputs for the wider gateway operations
//! - `error` - SDK, gateway, issuer and compensation errors

pub mod document;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;
pub mod response;

// Re-export commonly used types
pub use document::Element;
pub use domain::{
    AccountVerify, Acknowledgement, Address, Authorization, CardHolder, CardInput, Charge,
    CreditCard, Currency, DirectMarketData, EncryptionData, ManageTokens, Money, Refund,
    ReportTransactionDetails, ReportTransactionSummary, Reversal, TokenData, TrackData,
    TrackMethod, TransactionDetails, TransactionHeader, TransactionId, TransactionType, Void,
};
pub use dto::*;
pub use error::{
    CardErrorKind, ChargeError, ChargeExceptions, CompensationError, GatewayError,
    GatewayErrorKind, IssuerError, ProtocolError, SdkError, SdkErrorCode, TimeoutSource,
};
pub use ports::{Transport, TransportError};
pub use response::ResponseTree;
