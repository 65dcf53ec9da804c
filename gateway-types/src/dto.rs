//! Request inputs for the wider gateway operations.
//!
//! Currency is carried as the caller's raw code and validated by the service
//! together with the amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CardHolder, CardInput, DirectMarketData, EncryptionData, TrackData, TransactionDetails,
    TransactionId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Keyed / token operations
// ─────────────────────────────────────────────────────────────────────────────

/// Input for a keyed or tokenized sale or authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub amount: Decimal,
    pub currency: String,
    pub card: CardInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<CardHolder>,
    /// Ask the gateway to return a multi-use token for the card.
    #[serde(default)]
    pub request_multi_use_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<TransactionDetails>,
    /// Soft descriptor shown on the cardholder's statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
}

impl ChargeRequest {
    pub fn new(amount: Decimal, currency: impl Into<String>, card: impl Into<CardInput>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            card: card.into(),
            card_holder: None,
            request_multi_use_token: false,
            details: None,
            descriptor: None,
        }
    }
}

/// Input for a keyed or tokenized account verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub card: CardInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<CardHolder>,
    #[serde(default)]
    pub request_multi_use_token: bool,
}

/// Input for a keyed or tokenized return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub amount: Decimal,
    pub currency: String,
    pub card: CardInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<CardHolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<TransactionDetails>,
}

/// Input for a return against an earlier gateway transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundTransactionRequest {
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: TransactionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<CardHolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<TransactionDetails>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Swiped operations
// ─────────────────────────────────────────────────────────────────────────────

/// Input for a swiped sale or authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeChargeRequest {
    pub amount: Decimal,
    pub currency: String,
    pub track: TrackData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionData>,
    /// Tip included in `amount`. Zero is treated as no gratuity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gratuity: Option<Decimal>,
    #[serde(default)]
    pub allow_partial_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    #[serde(default)]
    pub request_multi_use_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_market_data: Option<DirectMarketData>,
}

impl SwipeChargeRequest {
    pub fn new(amount: Decimal, currency: impl Into<String>, track: TrackData) -> Self {
        Self {
            amount,
            currency: currency.into(),
            track,
            encryption: None,
            gratuity: None,
            allow_partial_auth: false,
            descriptor: None,
            request_multi_use_token: false,
            direct_market_data: None,
        }
    }
}

/// Input for a swiped account verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeVerifyRequest {
    pub track: TrackData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<CardHolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionData>,
    #[serde(default)]
    pub request_multi_use_token: bool,
}
