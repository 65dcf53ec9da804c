//! Cardholder and transaction annotation data.

use serde::{Deserialize, Deserializer, Serialize};

/// Billing address used for AVS checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "strip_whitespace")]
    street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Creates an address. All whitespace is removed from the street line.
    pub fn new(street: &str) -> Self {
        Self {
            street: Some(without_whitespace(street)),
            ..Self::default()
        }
    }

    pub fn street(&self) -> Option<&str> {
        self.street.as_deref()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

fn without_whitespace(value: &str) -> String {
    value.split_whitespace().collect()
}

fn strip_whitespace<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| without_whitespace(&s)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHolder {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
}

/// Free-form fields echoed back in reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub memo: Option<String>,
    pub invoice_number: Option<String>,
    pub customer_id: Option<String>,
}

/// Mail/telephone order shipping data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMarketData {
    pub invoice_number: String,
    pub ship_month: u8,
    pub ship_day: u8,
}
