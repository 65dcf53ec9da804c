//! Request document builder.
//!
//! Pure functions from validated inputs to the `Transaction` document the
//! gateway expects. Optional blocks appear only when the caller supplied
//! them with at least one non-empty field.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use gateway_types::{
    CardHolder, CardInput, ChargeRequest, CreditCard, DirectMarketData, Element, EncryptionData,
    Money, RefundRequest, RefundTransactionRequest, SwipeChargeRequest, SwipeVerifyRequest,
    TrackData, TransactionDetails, TransactionId, TransactionType, VerifyRequest,
};

fn flag(value: bool) -> &'static str {
    if value { "Y" } else { "N" }
}

fn wrap(operation: TransactionType, body: Element) -> Element {
    debug_assert_eq!(body.name(), operation.service_name());
    Element::new("Transaction").child(body)
}

fn operation(operation: TransactionType) -> Element {
    Element::new(operation.service_name())
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared blocks
// ─────────────────────────────────────────────────────────────────────────────

/// The card block for keyed operations.
///
/// Manual cards become `ManualEntry`; every other card value is sent as a
/// token.
pub fn card_block(card: &CardInput) -> Element {
    match card {
        CardInput::Manual(card) => manual_entry(card),
        CardInput::Token(token) => Element::new("TokenData").text_child("TokenValue", token),
    }
}

fn manual_entry(card: &CreditCard) -> Element {
    Element::new("ManualEntry")
        .text_child("CardNbr", &card.number)
        .text_child("ExpMonth", format!("{:02}", card.exp_month))
        .text_child("ExpYear", card.exp_year.to_string())
        .text_child_opt("CVV2", card.cvv.as_deref())
        .text_child("CardPresent", flag(card.card_present))
        .text_child("ReaderPresent", flag(card.reader_present))
}

fn keyed_card_data(card: &CardInput, token_request: Option<bool>) -> Element {
    let data = Element::new("CardData").child(card_block(card));
    match token_request {
        Some(requested) => data.text_child("TokenRequest", flag(requested)),
        None => data,
    }
}

fn track_card_data(
    track: &TrackData,
    encryption: Option<&EncryptionData>,
    token_request: bool,
) -> Element {
    Element::new("CardData")
        .child(
            Element::leaf("TrackData", &track.value)
                .with_attribute("method", track.method.to_string()),
        )
        .child_opt(encryption.map(encryption_data))
        .text_child("TokenRequest", flag(token_request))
}

fn encryption_data(data: &EncryptionData) -> Element {
    Element::new("EncryptionData")
        .text_child_opt("EncryptedTrackNumber", data.encrypted_track_number.as_deref())
        .text_child_opt("KSN", data.ksn.as_deref())
        .text_child_opt("KTB", data.ktb.as_deref())
        .text_child_opt("Version", data.version.as_deref())
}

fn card_holder_data(holder: &CardHolder) -> Element {
    let address = holder.address.as_ref();
    Element::new("CardHolderData")
        .text_child_opt("CardHolderFirstName", holder.first_name.as_deref())
        .text_child_opt("CardHolderLastName", holder.last_name.as_deref())
        .text_child_opt("CardHolderEmail", holder.email.as_deref())
        .text_child_opt("CardHolderPhone", holder.phone.as_deref())
        .text_child_opt("CardHolderAddr", address.and_then(|a| a.street()))
        .text_child_opt("CardHolderCity", address.and_then(|a| a.city.as_deref()))
        .text_child_opt("CardHolderState", address.and_then(|a| a.state.as_deref()))
        .text_child_opt("CardHolderZip", address.and_then(|a| a.zip.as_deref()))
}

fn additional_txn_fields(details: &TransactionDetails) -> Element {
    Element::new("AdditionalTxnFields")
        .text_child_opt("Description", details.memo.as_deref())
        .text_child_opt("InvoiceNbr", details.invoice_number.as_deref())
        .text_child_opt("CustomerID", details.customer_id.as_deref())
}

fn direct_market_data(data: &DirectMarketData) -> Element {
    Element::new("DirectMktData")
        .text_child_opt("DirectMktInvoideNbr", Some(&data.invoice_number))
        .text_child("DirectMktShipMonth", data.ship_month.to_string())
        .text_child("DirectMktShipDay", data.ship_day.to_string())
}

fn gratuity(amount: Option<Decimal>) -> Option<Element> {
    amount
        .filter(|g| !g.is_zero())
        .map(|g| Element::leaf("GratuityAmtInfo", g.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────────────

/// `CreditSale` or `CreditAuth` for keyed or tokenized cards.
pub fn keyed_authorization(kind: TransactionType, req: &ChargeRequest, money: &Money) -> Element {
    let block1 = Element::new("Block1")
        .text_child("AllowDup", "Y")
        .text_child("Amt", money.wire_amount())
        .child_opt(req.card_holder.as_ref().map(card_holder_data))
        .child_opt(req.details.as_ref().map(additional_txn_fields))
        .text_child_opt("TxnDescriptor", req.descriptor.as_deref())
        .child(keyed_card_data(&req.card, Some(req.request_multi_use_token)));

    wrap(kind, operation(kind).child(block1))
}

/// `CreditSale` or `CreditAuth` for swiped cards.
pub fn swipe_authorization(
    kind: TransactionType,
    req: &SwipeChargeRequest,
    money: &Money,
) -> Element {
    let block1 = Element::new("Block1")
        .text_child("AllowDup", "Y")
        .text_child("Amt", money.wire_amount())
        .child_opt(gratuity(req.gratuity))
        .text_child_opt("TxnDescriptor", req.descriptor.as_deref())
        .text_child("AllowPartialAuth", flag(req.allow_partial_auth))
        .child(track_card_data(
            &req.track,
            req.encryption.as_ref(),
            req.request_multi_use_token,
        ))
        .child_opt(req.direct_market_data.as_ref().map(direct_market_data));

    wrap(kind, operation(kind).child(block1))
}

pub fn verify(req: &VerifyRequest) -> Element {
    let block1 = Element::new("Block1")
        .child_opt(req.card_holder.as_ref().map(card_holder_data))
        .child(keyed_card_data(&req.card, Some(req.request_multi_use_token)));

    wrap(
        TransactionType::Verify,
        operation(TransactionType::Verify).child(block1),
    )
}

pub fn verify_swipe(req: &SwipeVerifyRequest) -> Element {
    let block1 = Element::new("Block1")
        .child_opt(req.card_holder.as_ref().map(card_holder_data))
        .child(track_card_data(
            &req.track,
            req.encryption.as_ref(),
            req.request_multi_use_token,
        ));

    wrap(
        TransactionType::Verify,
        operation(TransactionType::Verify).child(block1),
    )
}

/// `CreditAddToBatch`. Without an amount the authorized amount is captured.
pub fn capture(transaction_id: TransactionId, amount: Option<&Money>) -> Element {
    let body = operation(TransactionType::Capture)
        .text_child("GatewayTxnId", transaction_id.to_string())
        .text_child_opt("Amt", amount.map(Money::wire_amount));

    wrap(TransactionType::Capture, body)
}

/// `CreditReversal` identified by the card used.
pub fn reverse(card: &CardInput, money: &Money, details: Option<&TransactionDetails>) -> Element {
    let block1 = Element::new("Block1")
        .text_child("Amt", money.wire_amount())
        .child_opt(details.map(additional_txn_fields))
        .child(keyed_card_data(card, None));

    wrap(
        TransactionType::Reverse,
        operation(TransactionType::Reverse).child(block1),
    )
}

/// `CreditReversal` identified by the original gateway transaction.
pub fn reverse_transaction(
    transaction_id: TransactionId,
    money: &Money,
    details: Option<&TransactionDetails>,
) -> Element {
    let block1 = Element::new("Block1")
        .text_child("Amt", money.wire_amount())
        .text_child("GatewayTxnId", transaction_id.to_string())
        .child_opt(details.map(additional_txn_fields));

    wrap(
        TransactionType::Reverse,
        operation(TransactionType::Reverse).child(block1),
    )
}

pub fn refund(req: &RefundRequest, money: &Money) -> Element {
    let block1 = Element::new("Block1")
        .text_child("AllowDup", "Y")
        .text_child("Amt", money.wire_amount())
        .child_opt(req.card_holder.as_ref().map(card_holder_data))
        .child_opt(req.details.as_ref().map(additional_txn_fields))
        .child(keyed_card_data(&req.card, None));

    wrap(
        TransactionType::Refund,
        operation(TransactionType::Refund).child(block1),
    )
}

pub fn refund_transaction(req: &RefundTransactionRequest, money: &Money) -> Element {
    let block1 = Element::new("Block1")
        .text_child("AllowDup", "Y")
        .text_child("Amt", money.wire_amount())
        .text_child("GatewayTxnId", req.transaction_id.to_string())
        .child_opt(req.card_holder.as_ref().map(card_holder_data))
        .child_opt(req.details.as_ref().map(additional_txn_fields));

    wrap(
        TransactionType::Refund,
        operation(TransactionType::Refund).child(block1),
    )
}

pub fn void(transaction_id: TransactionId) -> Element {
    wrap(
        TransactionType::Void,
        operation(TransactionType::Void).text_child("GatewayTxnId", transaction_id.to_string()),
    )
}

/// `ManageTokens` setting a new expiry on a stored token.
pub fn update_token_expiration(token: &str, exp_month: u8, exp_year: u16) -> Element {
    let attribute = |name: &str, value: String| {
        Element::new("Attribute")
            .text_child("Name", name)
            .text_child("Value", value)
    };

    let body = operation(TransactionType::ManageTokens)
        .text_child("TokenValue", token)
        .child(
            Element::new("TokenActions").child(
                Element::new("Set")
                    .child(attribute("ExpMonth", format!("{:02}", exp_month)))
                    .child(attribute("ExpYear", exp_year.to_string())),
            ),
        );

    wrap(TransactionType::ManageTokens, body)
}

pub fn transaction_detail(transaction_id: TransactionId) -> Element {
    wrap(
        TransactionType::Get,
        operation(TransactionType::Get).text_child("TxnId", transaction_id.to_string()),
    )
}

pub fn activity_report(start: DateTime<Utc>, end: DateTime<Utc>) -> Element {
    let body = operation(TransactionType::List)
        .text_child(
            "RptStartUtcDT",
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
        .text_child("RptEndUtcDT", end.to_rfc3339_opts(SecondsFormat::Secs, true));

    wrap(TransactionType::List, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gateway_types::Address;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, "USD").unwrap()
    }

    fn visa() -> CreditCard {
        CreditCard::new("4012002000060016", 5, 2027)
            .with_cvv("123")
            .with_card_present(true)
    }

    #[test]
    fn test_manual_card_emits_manual_entry() {
        let req = ChargeRequest::new(dec!(10), "usd", visa());

        let doc = keyed_authorization(TransactionType::Charge, &req, &usd(req.amount));

        let card_data = doc.find_path(&["CreditSale", "Block1", "CardData"]).unwrap();
        assert!(card_data.find("TokenData").is_none());
        let entry = card_data.find("ManualEntry").unwrap();
        assert_eq!(entry.text_at(&["CardNbr"]), Some("4012002000060016"));
        assert_eq!(entry.text_at(&["ExpMonth"]), Some("05"));
        assert_eq!(entry.text_at(&["ExpYear"]), Some("2027"));
        assert_eq!(entry.text_at(&["CVV2"]), Some("123"));
        assert_eq!(entry.text_at(&["CardPresent"]), Some("Y"));
        assert_eq!(entry.text_at(&["ReaderPresent"]), Some("N"));
        assert_eq!(card_data.text_at(&["TokenRequest"]), Some("N"));
    }

    #[test]
    fn test_token_round_trips_through_card_block() {
        let token = "supt_8FgR2hd1xlWsQZ8U";

        let block = card_block(&CardInput::from(token));

        assert_eq!(block.name(), "TokenData");
        assert_eq!(block.text_at(&["TokenValue"]), Some(token));
        assert!(block.find("ManualEntry").is_none());
    }

    #[test]
    fn test_charge_block_shape() {
        let mut req = ChargeRequest::new(dec!(10), "USD", "tok");
        req.request_multi_use_token = true;
        req.descriptor = Some("ACME*WIDGETS".into());

        let doc = keyed_authorization(TransactionType::Authorize, &req, &usd(req.amount));

        let block1 = doc.find_path(&["CreditAuth", "Block1"]).unwrap();
        assert_eq!(block1.text_at(&["AllowDup"]), Some("Y"));
        assert_eq!(block1.text_at(&["Amt"]), Some("10.00"));
        assert_eq!(block1.text_at(&["TxnDescriptor"]), Some("ACME*WIDGETS"));
        assert_eq!(block1.text_at(&["CardData", "TokenRequest"]), Some("Y"));
        assert!(block1.find("CardHolderData").is_none());
        assert!(block1.find("AdditionalTxnFields").is_none());
    }

    #[test]
    fn test_empty_optional_blocks_are_not_emitted() {
        let mut req = ChargeRequest::new(dec!(1), "USD", "tok");
        req.card_holder = Some(CardHolder::default());
        req.details = Some(TransactionDetails {
            memo: Some(String::new()),
            ..TransactionDetails::default()
        });
        req.descriptor = Some(String::new());

        let doc = keyed_authorization(TransactionType::Charge, &req, &usd(req.amount));

        let block1 = doc.find_path(&["CreditSale", "Block1"]).unwrap();
        let names: Vec<&str> = block1.children().iter().map(Element::name).collect();
        assert_eq!(names, ["AllowDup", "Amt", "CardData"]);
    }

    #[test]
    fn test_card_holder_and_details_are_emitted() {
        let mut req = ChargeRequest::new(dec!(1), "USD", "tok");
        req.card_holder = Some(CardHolder {
            first_name: Some("Bill".into()),
            last_name: Some("Johnson".into()),
            address: Some(Address::new("One Heartland Way").with_zip("47130")),
            ..CardHolder::default()
        });
        req.details = Some(TransactionDetails {
            invoice_number: Some("INV-9".into()),
            ..TransactionDetails::default()
        });

        let doc = keyed_authorization(TransactionType::Charge, &req, &usd(req.amount));

        let holder = doc.find_path(&["CreditSale", "Block1", "CardHolderData"]).unwrap();
        assert_eq!(holder.text_at(&["CardHolderFirstName"]), Some("Bill"));
        assert_eq!(holder.text_at(&["CardHolderAddr"]), Some("OneHeartlandWay"));
        assert_eq!(holder.text_at(&["CardHolderZip"]), Some("47130"));
        assert!(holder.find("CardHolderEmail").is_none());

        let fields = doc
            .find_path(&["CreditSale", "Block1", "AdditionalTxnFields"])
            .unwrap();
        assert_eq!(fields.children().len(), 1);
        assert_eq!(fields.text_at(&["InvoiceNbr"]), Some("INV-9"));
    }

    #[test]
    fn test_swipe_block_shape() {
        let mut req = SwipeChargeRequest::new(dec!(20), "USD", TrackData::swipe("%B4012?;4012=?"));
        req.gratuity = Some(dec!(2.5));
        req.allow_partial_auth = true;
        req.encryption = Some(EncryptionData {
            version: Some("01".into()),
            ..EncryptionData::default()
        });
        req.direct_market_data = Some(DirectMarketData {
            invoice_number: "123".into(),
            ship_month: 12,
            ship_day: 1,
        });

        let doc = swipe_authorization(TransactionType::Charge, &req, &usd(req.amount));

        let block1 = doc.find_path(&["CreditSale", "Block1"]).unwrap();
        assert_eq!(block1.text_at(&["GratuityAmtInfo"]), Some("2.5"));
        assert_eq!(block1.text_at(&["AllowPartialAuth"]), Some("Y"));
        let track = block1.find_path(&["CardData", "TrackData"]).unwrap();
        assert_eq!(track.attribute("method"), Some("swipe"));
        assert_eq!(track.text(), Some("%B4012?;4012=?"));
        let encryption = block1.find_path(&["CardData", "EncryptionData"]).unwrap();
        assert_eq!(encryption.children().len(), 1);
        assert_eq!(encryption.text_at(&["Version"]), Some("01"));
        assert_eq!(
            block1.text_at(&["DirectMktData", "DirectMktInvoideNbr"]),
            Some("123")
        );
    }

    #[test]
    fn test_zero_gratuity_is_omitted() {
        let mut req = SwipeChargeRequest::new(dec!(20), "USD", TrackData::proximity("track"));
        req.gratuity = Some(dec!(0));

        let doc = swipe_authorization(TransactionType::Authorize, &req, &usd(req.amount));

        let block1 = doc.find_path(&["CreditAuth", "Block1"]).unwrap();
        assert!(block1.find("GratuityAmtInfo").is_none());
        assert_eq!(block1.text_at(&["AllowPartialAuth"]), Some("N"));
        assert_eq!(
            block1
                .find_path(&["CardData", "TrackData"])
                .and_then(|t| t.attribute("method")),
            Some("proximity")
        );
    }

    #[test]
    fn test_reversal_and_refund_have_no_token_request() {
        let money = usd(dec!(5));

        let reversal = reverse(&CardInput::from("tok"), &money, None);
        let refund_doc = refund(
            &RefundRequest {
                amount: dec!(5),
                currency: "USD".into(),
                card: visa().into(),
                card_holder: None,
                details: None,
            },
            &money,
        );

        let card_data = reversal
            .find_path(&["CreditReversal", "Block1", "CardData"])
            .unwrap();
        assert!(card_data.find("TokenRequest").is_none());
        let card_data = refund_doc
            .find_path(&["CreditReturn", "Block1", "CardData"])
            .unwrap();
        assert!(card_data.find("ManualEntry").is_some());
        assert!(card_data.find("TokenRequest").is_none());
    }

    #[test]
    fn test_transaction_id_operations() {
        let id = TransactionId::new(1020);

        let doc = reverse_transaction(id, &usd(dec!(3)), None);
        assert_eq!(
            doc.text_at(&["CreditReversal", "Block1", "GatewayTxnId"]),
            Some("1020")
        );
        assert_eq!(void(id).text_at(&["CreditVoid", "GatewayTxnId"]), Some("1020"));
        assert_eq!(
            transaction_detail(id).text_at(&["ReportTxnDetail", "TxnId"]),
            Some("1020")
        );

        let batch = capture(id, None);
        assert_eq!(batch.text_at(&["CreditAddToBatch", "GatewayTxnId"]), Some("1020"));
        assert!(batch.find_path(&["CreditAddToBatch", "Amt"]).is_none());
        let batch = capture(id, Some(&usd(dec!(7.25))));
        assert_eq!(batch.text_at(&["CreditAddToBatch", "Amt"]), Some("7.25"));
        let batch = capture(id, Some(&usd(dec!(8))));
        assert_eq!(batch.text_at(&["CreditAddToBatch", "Amt"]), Some("8.00"));
    }

    #[test]
    fn test_token_expiration_pads_month() {
        let doc = update_token_expiration("tok", 3, 2030);

        let set = doc
            .find_path(&["ManageTokens", "TokenActions", "Set"])
            .unwrap();
        let values: Vec<(&str, &str)> = set
            .children()
            .iter()
            .map(|a| (a.text_at(&["Name"]).unwrap(), a.text_at(&["Value"]).unwrap()))
            .collect();
        assert_eq!(values, [("ExpMonth", "03"), ("ExpYear", "2030")]);
        assert_eq!(doc.text_at(&["ManageTokens", "TokenValue"]), Some("tok"));
    }

    #[test]
    fn test_activity_report_dates_are_utc() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();

        let doc = activity_report(start, end);

        assert_eq!(
            doc.text_at(&["ReportActivity", "RptStartUtcDT"]),
            Some("2026-01-01T00:00:00Z")
        );
        assert_eq!(
            doc.text_at(&["ReportActivity", "RptEndUtcDT"]),
            Some("2026-01-31T23:59:59Z")
        );
    }
}
