//! Card presentment inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A card keyed in by hand, or read from a physical card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvv: Option<String>,
    pub card_present: bool,
    pub reader_present: bool,
}

impl CreditCard {
    pub fn new(number: impl Into<String>, exp_month: u8, exp_year: u16) -> Self {
        Self {
            number: number.into(),
            exp_month,
            exp_year,
            cvv: None,
            card_present: false,
            reader_present: false,
        }
    }

    pub fn with_cvv(mut self, cvv: impl Into<String>) -> Self {
        self.cvv = Some(cvv.into());
        self
    }

    pub fn with_card_present(mut self, present: bool) -> Self {
        self.card_present = present;
        self
    }

    pub fn with_reader_present(mut self, present: bool) -> Self {
        self.reader_present = present;
        self
    }
}

/// Card data for keyed operations.
///
/// Exactly two shapes exist: raw card details, or a token that stands in
/// for a previously captured card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardInput {
    Manual(CreditCard),
    Token(String),
}

impl From<CreditCard> for CardInput {
    fn from(card: CreditCard) -> Self {
        CardInput::Manual(card)
    }
}

impl From<String> for CardInput {
    fn from(token: String) -> Self {
        CardInput::Token(token)
    }
}

impl From<&str> for CardInput {
    fn from(token: &str) -> Self {
        CardInput::Token(token.to_string())
    }
}

/// How track data was captured at the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackMethod {
    Swipe,
    Proximity,
}

impl fmt::Display for TrackMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackMethod::Swipe => write!(f, "swipe"),
            TrackMethod::Proximity => write!(f, "proximity"),
        }
    }
}

/// Raw magnetic-stripe payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackData {
    pub method: TrackMethod,
    pub value: String,
}

impl TrackData {
    pub fn swipe(value: impl Into<String>) -> Self {
        Self {
            method: TrackMethod::Swipe,
            value: value.into(),
        }
    }

    pub fn proximity(value: impl Into<String>) -> Self {
        Self {
            method: TrackMethod::Proximity,
            value: value.into(),
        }
    }
}

/// End-to-end encryption parameters for encrypted track data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionData {
    pub encrypted_track_number: Option<String>,
    pub ksn: Option<String>,
    pub ktb: Option<String>,
    pub version: Option<String>,
}
