//! Transport port.
//!
//! The service hands a request document to a transport and gets back the
//! parsed response tree. Serialization, credentials and the network belong
//! to the implementation.

use crate::document::Element;
use crate::response::ResponseTree;

/// Failures below the gateway protocol. These are never reclassified.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("SOAP fault: {0}")]
    Fault(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Port trait for sending a request to the gateway.
///
/// Calls block until the response is parsed. Implementations decide whether
/// they are safe to share between threads; the service adds no locking.
pub trait Transport: Send + Sync {
    /// Sends the `Transaction` document and returns the tree below the
    /// response version element (`Header`, `Transaction`).
    fn submit(&self, transaction: &Element) -> Result<ResponseTree, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn submit(&self, transaction: &Element) -> Result<ResponseTree, TransportError> {
        (**self).submit(transaction)
    }
}
