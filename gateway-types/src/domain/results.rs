//! Typed results hydrated from gateway responses.
//!
//! Results are built once per call from response data and never modified
//! after being handed to the caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::transaction::{TransactionId, TransactionType};
use crate::error::ChargeExceptions;

/// Multi-use token echoed back by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenData {
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub token_value: Option<String>,
}

/// Gateway-level outcome present on every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionHeader {
    pub transaction_id: Option<TransactionId>,
    pub response_code: String,
    pub response_message: Option<String>,
    pub token_data: Option<TokenData>,
}

impl TransactionHeader {
    pub fn is_success(&self) -> bool {
        self.response_code == "0"
    }
}

/// Outcome of an authorization-bearing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authorization {
    pub header: TransactionHeader,
    pub transaction_id: Option<TransactionId>,
    pub authorized_amount: Option<Decimal>,
    pub authorization_code: Option<String>,
    pub avs_result_code: Option<String>,
    pub avs_result_text: Option<String>,
    pub card_type: Option<String>,
    pub cpc_indicator: Option<String>,
    pub cvv_result_code: Option<String>,
    pub cvv_result_text: Option<String>,
    pub reference_number: Option<String>,
    pub response_code: Option<String>,
    pub response_text: Option<String>,
    pub token_data: Option<TokenData>,
}

/// A sale is an authorization captured immediately; the gateway reports the
/// same fields for both.
pub type Charge = Authorization;

/// Account verification reports the authorization fields with a zero amount.
pub type AccountVerify = Authorization;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reversal {
    pub header: TransactionHeader,
    pub transaction_id: Option<TransactionId>,
    pub avs_result_code: Option<String>,
    pub avs_result_text: Option<String>,
    pub cpc_indicator: Option<String>,
    pub cvv_result_code: Option<String>,
    pub cvv_result_text: Option<String>,
    pub reference_number: Option<String>,
    pub response_code: Option<String>,
    pub response_text: Option<String>,
}

/// Result of an operation whose response carries no issuer detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub header: TransactionHeader,
    pub transaction_id: Option<TransactionId>,
    pub response_code: String,
    pub response_text: String,
}

impl Acknowledgement {
    /// Builds the acknowledgement for a header the gateway accepted.
    pub fn accepted(header: TransactionHeader) -> Self {
        Self {
            transaction_id: header.transaction_id,
            header,
            response_code: "00".to_string(),
            response_text: String::new(),
        }
    }
}

pub type Refund = Acknowledgement;
pub type Void = Acknowledgement;
pub type ManageTokens = Acknowledgement;

/// Full detail of a single transaction, as returned by a report lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTransactionDetails {
    pub header: TransactionHeader,
    pub transaction_id: Option<TransactionId>,
    pub original_transaction_id: Option<TransactionId>,
    pub authorized_amount: Option<Decimal>,
    pub authorization_code: Option<String>,
    pub avs_result_code: Option<String>,
    pub avs_result_text: Option<String>,
    pub card_type: Option<String>,
    pub masked_card_number: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub cpc_indicator: Option<String>,
    pub cvv_result_code: Option<String>,
    pub cvv_result_text: Option<String>,
    pub reference_number: Option<String>,
    pub response_code: Option<String>,
    pub response_text: Option<String>,
    pub token_data: Option<TokenData>,
}

/// One line of an activity report.
///
/// A line the gateway or issuer rejected carries its classified errors in
/// `exceptions` instead of failing the whole report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTransactionSummary {
    pub transaction_id: Option<TransactionId>,
    pub original_transaction_id: Option<TransactionId>,
    pub masked_card_number: Option<String>,
    pub response_code: Option<String>,
    pub response_text: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub exceptions: Option<ChargeExceptions>,
}
