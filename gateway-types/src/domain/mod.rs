//! Domain models for the gateway client.

pub mod card;
pub mod cardholder;
pub mod money;
pub mod results;
pub mod transaction;

pub use card::{CardInput, CreditCard, EncryptionData, TrackData, TrackMethod};
pub use cardholder::{Address, CardHolder, DirectMarketData, TransactionDetails};
pub use money::{Currency, Money};
pub use results::{
    AccountVerify, Acknowledgement, Authorization, Charge, ManageTokens, Refund,
    ReportTransactionDetails, ReportTransactionSummary, Reversal, TokenData, TransactionHeader,
    Void,
};
pub use transaction::{TransactionId, TransactionType};
