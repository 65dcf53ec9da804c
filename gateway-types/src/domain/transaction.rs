//! Gateway transaction identity and operation kinds.

use serde::{Deserialize, Serialize};

/// Identifier the gateway assigns to every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Zero is never issued by the gateway.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for TransactionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// The kind of gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Authorize,
    Capture,
    Charge,
    Refund,
    Reverse,
    Verify,
    List,
    Get,
    Void,
    ManageTokens,
    CpcEdit,
}

impl TransactionType {
    const ALL: [TransactionType; 11] = [
        TransactionType::Authorize,
        TransactionType::Capture,
        TransactionType::Charge,
        TransactionType::Refund,
        TransactionType::Reverse,
        TransactionType::Verify,
        TransactionType::List,
        TransactionType::Get,
        TransactionType::Void,
        TransactionType::ManageTokens,
        TransactionType::CpcEdit,
    ];

    /// Element name the gateway uses for this operation, both in requests
    /// and in the `ServiceName` field of reports.
    pub fn service_name(&self) -> &'static str {
        match self {
            TransactionType::Authorize => "CreditAuth",
            TransactionType::Capture => "CreditAddToBatch",
            TransactionType::Charge => "CreditSale",
            TransactionType::Refund => "CreditReturn",
            TransactionType::Reverse => "CreditReversal",
            TransactionType::Verify => "CreditAccountVerify",
            TransactionType::List => "ReportActivity",
            TransactionType::Get => "ReportTxnDetail",
            TransactionType::Void => "CreditVoid",
            TransactionType::ManageTokens => "ManageTokens",
            TransactionType::CpcEdit => "CreditCPCEdit",
        }
    }

    pub fn from_service_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.service_name() == name)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.service_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_round_trip() {
        for t in TransactionType::ALL {
            assert_eq!(TransactionType::from_service_name(t.service_name()), Some(t));
        }
        assert_eq!(TransactionType::from_service_name("GiftCardSale"), None);
    }

    #[test]
    fn test_transaction_id_parsing() {
        let id: TransactionId = " 1234567 ".parse().unwrap();
        assert_eq!(id.value(), 1234567);
        assert!(id.is_valid());
        assert!(!TransactionId::new(0).is_valid());
        assert!("abc".parse::<TransactionId>().is_err());
    }
}
