//! Error types for the gateway client.
//!
//! Every error is built once where it is raised and carries the transaction
//! id and the gateway's own response code/text as fields.

use serde::Serialize;
use std::fmt;

use crate::domain::TransactionId;
use crate::ports::TransportError;

/// Reasons a request is rejected locally, before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SdkErrorCode {
    InvalidTransactionId,
    InvalidAmount,
    MissingCurrency,
    InvalidCurrency,
    InvalidStartDate,
    InvalidEndDate,
    InvalidExpiry,
    ReversalErrorAfterGatewayTimeout,
    ReversalErrorAfterIssuerTimeout,
}

impl SdkErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            SdkErrorCode::InvalidTransactionId => "Transaction id must be present and non-zero",
            SdkErrorCode::InvalidAmount => "Amount must be greater than zero",
            SdkErrorCode::MissingCurrency => "Currency is required",
            SdkErrorCode::InvalidCurrency => "The only supported currency is USD",
            SdkErrorCode::InvalidStartDate => "Start date cannot be in the future",
            SdkErrorCode::InvalidEndDate => "End date cannot be in the future",
            SdkErrorCode::InvalidExpiry => "Expiration month must be between 1 and 12",
            SdkErrorCode::ReversalErrorAfterGatewayTimeout => {
                "Error occurred while reversing a charge due to a gateway timeout"
            }
            SdkErrorCode::ReversalErrorAfterIssuerTimeout => {
                "Error occurred while reversing a charge due to an issuer timeout"
            }
        }
    }
}

/// Local input validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", .code.message())]
pub struct SdkError {
    pub code: SdkErrorCode,
}

impl SdkError {
    pub fn new(code: SdkErrorCode) -> Self {
        Self { code }
    }
}

/// Classification of a gateway header response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    AuthenticationError,
    InvalidOriginalTransaction,
    NoOpenBatch,
    InvalidCpcData,
    InvalidCardData,
    InvalidNumber,
    GatewayTimeout,
    UnknownGatewayError,
}

impl GatewayErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "-2" => GatewayErrorKind::AuthenticationError,
            "3" => GatewayErrorKind::InvalidOriginalTransaction,
            "5" => GatewayErrorKind::NoOpenBatch,
            "12" => GatewayErrorKind::InvalidCpcData,
            "13" => GatewayErrorKind::InvalidCardData,
            "14" => GatewayErrorKind::InvalidNumber,
            "30" => GatewayErrorKind::GatewayTimeout,
            _ => GatewayErrorKind::UnknownGatewayError,
        }
    }
}

/// Classification of an issuer (card network) response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardErrorKind {
    CardDeclined,
    ProcessingError,
    InvalidAmount,
    IncorrectNumber,
    ExpiredCard,
    InvalidPin,
    PinRetriesExceeded,
    InvalidExpiry,
    PinVerification,
    IssuerTimeout,
    IncorrectCvc,
    PossibleFraud,
    UnknownIssuerError,
}

impl CardErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "02" | "03" | "04" | "05" | "41" | "43" | "44" | "51" | "56" | "61" | "62" | "63"
            | "65" | "78" => CardErrorKind::CardDeclined,
            "06" | "07" | "12" | "15" | "19" | "52" | "53" | "57" | "58" | "76" | "77" | "96"
            | "EC" => CardErrorKind::ProcessingError,
            "13" => CardErrorKind::InvalidAmount,
            "14" | "89" => CardErrorKind::IncorrectNumber,
            "54" => CardErrorKind::ExpiredCard,
            "55" => CardErrorKind::InvalidPin,
            "75" => CardErrorKind::PinRetriesExceeded,
            "80" => CardErrorKind::InvalidExpiry,
            "86" => CardErrorKind::PinVerification,
            "91" => CardErrorKind::IssuerTimeout,
            "EB" | "N7" => CardErrorKind::IncorrectCvc,
            "FR" => CardErrorKind::PossibleFraud,
            _ => CardErrorKind::UnknownIssuerError,
        }
    }
}

/// The gateway rejected the request (header response code other than "0").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Gateway error {response_code} ({kind:?}): {response_text}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub transaction_id: Option<TransactionId>,
    pub response_code: String,
    pub response_text: String,
}

impl GatewayError {
    pub fn new(
        transaction_id: Option<TransactionId>,
        response_code: impl Into<String>,
        response_text: impl Into<String>,
    ) -> Self {
        let response_code = response_code.into();
        Self {
            kind: GatewayErrorKind::from_code(&response_code),
            transaction_id,
            response_code,
            response_text: response_text.into(),
        }
    }
}

/// The issuer declined or failed to process the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Issuer error {response_code} ({kind:?}): {response_text}")]
pub struct IssuerError {
    pub kind: CardErrorKind,
    pub transaction_id: Option<TransactionId>,
    pub response_code: String,
    pub response_text: String,
}

impl IssuerError {
    pub fn new(
        transaction_id: Option<TransactionId>,
        response_code: impl Into<String>,
        response_text: impl Into<String>,
    ) -> Self {
        let response_code = response_code.into();
        Self {
            kind: CardErrorKind::from_code(&response_code),
            transaction_id,
            response_code,
            response_text: response_text.into(),
        }
    }
}

/// Gateway- and issuer-level problems for the same transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChargeExceptions {
    pub gateway: Option<GatewayError>,
    pub card: Option<IssuerError>,
}

impl ChargeExceptions {
    pub fn is_empty(&self) -> bool {
        self.gateway.is_none() && self.card.is_none()
    }

    /// Converts the bundle into the error a single-transaction call raises.
    ///
    /// Returns `None` for an empty bundle. A bundle with both members is kept
    /// whole as [`ChargeError::Combined`].
    pub fn into_error(self) -> Option<ChargeError> {
        match (self.gateway, self.card) {
            (None, None) => None,
            (Some(gateway), None) => Some(ChargeError::Gateway(gateway)),
            (None, Some(card)) => Some(ChargeError::Issuer(card)),
            (gateway, card) => Some(ChargeError::Combined(ChargeExceptions { gateway, card })),
        }
    }
}

impl fmt::Display for ChargeExceptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.gateway, &self.card) {
            (Some(g), Some(c)) => write!(f, "{}; {}", g, c),
            (Some(g), None) => write!(f, "{}", g),
            (None, Some(c)) => write!(f, "{}", c),
            (None, None) => write!(f, "no errors"),
        }
    }
}

/// Which timeout triggered an automatic reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutSource {
    Gateway,
    Issuer,
}

impl TimeoutSource {
    pub fn sdk_code(&self) -> SdkErrorCode {
        match self {
            TimeoutSource::Gateway => SdkErrorCode::ReversalErrorAfterGatewayTimeout,
            TimeoutSource::Issuer => SdkErrorCode::ReversalErrorAfterIssuerTimeout,
        }
    }
}

/// The reversal issued after a timeout failed.
///
/// Keeps the response code/text of the original timeout alongside the
/// reversal failure.
#[derive(Debug, thiserror::Error)]
#[error("{} (original response {response_code}: {response_text})", .timeout.sdk_code().message())]
pub struct CompensationError {
    pub timeout: TimeoutSource,
    pub transaction_id: Option<TransactionId>,
    pub response_code: String,
    pub response_text: String,
    #[source]
    pub source: Box<ChargeError>,
}

impl CompensationError {
    pub fn code(&self) -> SdkErrorCode {
        self.timeout.sdk_code()
    }
}

/// The response did not have the shape the transport contract promises.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Response is missing required element: {0}")]
    MissingElement(String),
}

/// Every way a gateway operation can fail.
#[derive(Debug, thiserror::Error)]
pub enum ChargeError {
    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Issuer(#[from] IssuerError),

    #[error("{0}")]
    Combined(ChargeExceptions),

    #[error(transparent)]
    Compensation(#[from] CompensationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ChargeError {
    pub fn transaction_id(&self) -> Option<TransactionId> {
        match self {
            ChargeError::Gateway(e) => e.transaction_id,
            ChargeError::Issuer(e) => e.transaction_id,
            ChargeError::Combined(b) => b
                .gateway
                .as_ref()
                .and_then(|g| g.transaction_id)
                .or_else(|| b.card.as_ref().and_then(|c| c.transaction_id)),
            ChargeError::Compensation(e) => e.transaction_id,
            ChargeError::Sdk(_) | ChargeError::Transport(_) | ChargeError::Protocol(_) => None,
        }
    }

    /// The gateway's response code. For a combined error this is the gateway
    /// code; the issuer code stays reachable through the bundle.
    pub fn response_code(&self) -> Option<&str> {
        match self {
            ChargeError::Gateway(e) => Some(&e.response_code),
            ChargeError::Issuer(e) => Some(&e.response_code),
            ChargeError::Combined(b) => b
                .gateway
                .as_ref()
                .map(|g| g.response_code.as_str())
                .or_else(|| b.card.as_ref().map(|c| c.response_code.as_str())),
            ChargeError::Compensation(e) => Some(&e.response_code),
            ChargeError::Sdk(_) | ChargeError::Transport(_) | ChargeError::Protocol(_) => None,
        }
    }

    pub fn response_text(&self) -> Option<&str> {
        match self {
            ChargeError::Gateway(e) => Some(&e.response_text),
            ChargeError::Issuer(e) => Some(&e.response_text),
            ChargeError::Combined(b) => b
                .gateway
                .as_ref()
                .map(|g| g.response_text.as_str())
                .or_else(|| b.card.as_ref().map(|c| c.response_text.as_str())),
            ChargeError::Compensation(e) => Some(&e.response_text),
            ChargeError::Sdk(_) | ChargeError::Transport(_) | ChargeError::Protocol(_) => None,
        }
    }
}
