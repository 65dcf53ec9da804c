//! Validated monetary value for gateway requests.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SdkError, SdkErrorCode};

/// Currencies accepted by the gateway.
///
/// The gateway settles in a single currency; anything else is rejected
/// locally before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
}

impl Currency {
    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::USD => 2,
        }
    }

    /// Rejects amounts finer than the currency's smallest unit.
    /// Trailing zeros do not count.
    pub fn check_precision(&self, amount: Decimal) -> Result<Decimal, SdkError> {
        if amount.normalize().scale() > self.decimal_places() {
            return Err(SdkError::new(SdkErrorCode::InvalidAmount));
        }
        Ok(amount)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Currency {
    type Err = SdkError;

    /// Parses a currency code, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(SdkError::new(SdkErrorCode::MissingCurrency));
        }
        if code.eq_ignore_ascii_case("usd") {
            Ok(Currency::USD)
        } else {
            Err(SdkError::new(SdkErrorCode::InvalidCurrency))
        }
    }
}

/// A positive amount in a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Validates the amount and currency code.
    ///
    /// The amount is checked first, so a call with both a bad amount and a
    /// bad currency reports the amount.
    pub fn new(amount: Decimal, currency: &str) -> Result<Self, SdkError> {
        let amount = check_amount(amount)?;
        Self::in_currency(amount, currency.parse()?)
    }

    /// Validates an amount in an already known currency.
    pub fn in_currency(amount: Decimal, currency: Currency) -> Result<Self, SdkError> {
        let amount = currency.check_precision(check_amount(amount)?)?;
        Ok(Self { amount, currency })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Amount as sent on the wire, padded to the currency's precision.
    pub fn wire_amount(&self) -> String {
        format_amount(self.amount, self.currency.decimal_places())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.wire_amount(), self.currency)
    }
}

/// Rejects zero and negative amounts.
pub fn check_amount(amount: Decimal) -> Result<Decimal, SdkError> {
    if amount <= Decimal::ZERO {
        return Err(SdkError::new(SdkErrorCode::InvalidAmount));
    }
    Ok(amount)
}

/// Pads to `places` decimals. Callers have already rejected finer amounts,
/// so the value never changes.
pub(crate) fn format_amount(amount: Decimal, places: u32) -> String {
    let mut padded = amount.normalize();
    padded.rescale(places);
    padded.to_string()
}
