//! Response hydration.
//!
//! Copies fields out of the parsed response tree into typed results. Nothing
//! is computed here; classification happens in [`crate::classify`].

use chrono::{DateTime, NaiveDateTime, Utc};

use gateway_types::{
    Acknowledgement, Authorization, ChargeExceptions, ProtocolError, ReportTransactionDetails,
    ReportTransactionSummary, ResponseTree, Reversal, TokenData, TransactionHeader,
    TransactionType,
};

/// Reads the `Header` block every response must carry.
pub fn header(response: &ResponseTree) -> Result<TransactionHeader, ProtocolError> {
    let header = response
        .get("Header")
        .ok_or_else(|| ProtocolError::MissingElement("Header".into()))?;
    let response_code = header
        .string("GatewayRspCode")
        .ok_or_else(|| ProtocolError::MissingElement("Header.GatewayRspCode".into()))?;

    Ok(TransactionHeader {
        transaction_id: header.parsed("GatewayTxnId"),
        response_code,
        response_message: header.string("GatewayRspMsg"),
        token_data: header.get("TokenData").map(|t| TokenData {
            response_code: t.string("TokenRspCode"),
            response_message: t.string("TokenRspMsg"),
            token_value: t.string("TokenValue"),
        }),
    })
}

/// The operation's block under `Transaction`, if the gateway sent one.
pub fn detail(response: &ResponseTree, kind: TransactionType) -> Option<&ResponseTree> {
    response.path(&["Transaction", kind.service_name()])
}

/// Issuer response code and text of a detail block.
pub fn issuer_response(detail: Option<&ResponseTree>) -> Option<(&str, &str)> {
    let detail = detail?;
    let code = detail.text("RspCode")?;
    Some((code, detail.text("RspText").unwrap_or_default()))
}

/// Charge, authorization and account verification results.
pub fn authorization(header: TransactionHeader, detail: Option<&ResponseTree>) -> Authorization {
    let empty = ResponseTree::default();
    let d = detail.unwrap_or(&empty);

    Authorization {
        transaction_id: header.transaction_id,
        token_data: header.token_data.clone(),
        header,
        authorized_amount: d.parsed("AuthAmt"),
        authorization_code: d.string("AuthCode"),
        avs_result_code: d.string("AVSRsltCode"),
        avs_result_text: d.string("AVSRsltText"),
        card_type: d.string("CardType"),
        cpc_indicator: d.string("CPCInd"),
        cvv_result_code: d.string("CVVRsltCode"),
        cvv_result_text: d.string("CVVRsltText"),
        reference_number: d.string("RefNbr"),
        response_code: d.string("RspCode"),
        response_text: d.string("RspText"),
    }
}

pub fn reversal(header: TransactionHeader, detail: Option<&ResponseTree>) -> Reversal {
    let empty = ResponseTree::default();
    let d = detail.unwrap_or(&empty);

    Reversal {
        transaction_id: header.transaction_id,
        header,
        avs_result_code: d.string("AVSRsltCode"),
        avs_result_text: d.string("AVSRsltText"),
        cpc_indicator: d.string("CPCInd"),
        cvv_result_code: d.string("CVVRsltCode"),
        cvv_result_text: d.string("CVVRsltText"),
        reference_number: d.string("RefNbr"),
        response_code: d.string("RspCode"),
        response_text: d.string("RspText"),
    }
}

pub fn acknowledgement(header: TransactionHeader) -> Acknowledgement {
    Acknowledgement::accepted(header)
}

/// The `Data` block of a transaction detail report.
pub fn report_data(detail: Option<&ResponseTree>) -> Option<&ResponseTree> {
    detail.and_then(|d| d.get("Data"))
}

pub fn transaction_detail(
    header: TransactionHeader,
    detail: Option<&ResponseTree>,
) -> ReportTransactionDetails {
    let empty = ResponseTree::default();
    let d = detail.unwrap_or(&empty);
    let data = d.get("Data").unwrap_or(&empty);

    ReportTransactionDetails {
        header,
        transaction_id: d.parsed("GatewayTxnId"),
        original_transaction_id: d.parsed("OriginalGatewayTxnId"),
        authorized_amount: data.parsed("AuthAmt"),
        authorization_code: data.string("AuthCode"),
        avs_result_code: data.string("AVSRsltCode"),
        avs_result_text: data.string("AVSRsltText"),
        card_type: data.string("CardType"),
        masked_card_number: data.string("MaskedCardNbr"),
        transaction_type: d
            .text("ServiceName")
            .and_then(TransactionType::from_service_name),
        transaction_date: d.text("RspUtcDT").and_then(parse_utc),
        cpc_indicator: data.string("CPCInd"),
        cvv_result_code: data.string("CVVRsltCode"),
        cvv_result_text: data.string("CVVRsltText"),
        reference_number: data.string("RefNbr"),
        response_code: data.string("RspCode"),
        response_text: data.string("RspText"),
        token_data: data.string("TokenizationMsg").map(|msg| TokenData {
            response_message: Some(msg),
            ..TokenData::default()
        }),
    }
}

/// Line items of an activity report. A count of "0" yields no lines, even
/// if a `Details` element is present.
pub fn activity_lines(response: &ResponseTree) -> Vec<&ResponseTree> {
    let Some(report) = detail(response, TransactionType::List) else {
        return Vec::new();
    };
    if report.path(&["Header", "TxnCnt"]).and_then(ResponseTree::as_text) == Some("0") {
        return Vec::new();
    }
    report.get("Details").map(ResponseTree::items).unwrap_or_default()
}

pub fn summary(line: &ResponseTree, exceptions: Option<ChargeExceptions>) -> ReportTransactionSummary {
    ReportTransactionSummary {
        transaction_id: line.parsed("GatewayTxnId"),
        original_transaction_id: line.parsed("OriginalGatewayTxnId"),
        masked_card_number: line.string("MaskedCardNbr"),
        response_code: line.string("IssuerRspCode"),
        response_text: line.string("IssuerRspText"),
        transaction_type: line
            .text("ServiceName")
            .and_then(TransactionType::from_service_name),
        exceptions,
    }
}

/// Gateway timestamps come with or without an offset; bare ones are UTC.
fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_types::TransactionId;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> ResponseTree {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_header_is_a_protocol_error() {
        let err = header(&tree(json!({ "Transaction": {} }))).unwrap_err();
        assert_eq!(err, ProtocolError::MissingElement("Header".into()));

        let err = header(&tree(json!({ "Header": { "GatewayTxnId": "1" } }))).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MissingElement("Header.GatewayRspCode".into())
        );
    }

    #[test]
    fn test_header_with_token_data() {
        let h = header(&tree(json!({
            "Header": {
                "GatewayTxnId": "1034",
                "GatewayRspCode": "0",
                "GatewayRspMsg": "Success",
                "TokenData": { "TokenRspCode": "0", "TokenRspMsg": "Success", "TokenValue": "supt_abc" }
            }
        })))
        .unwrap();

        assert_eq!(h.transaction_id, Some(TransactionId::new(1034)));
        assert!(h.is_success());
        assert_eq!(
            h.token_data.unwrap().token_value.as_deref(),
            Some("supt_abc")
        );
    }

    #[test]
    fn test_authorization_fields_are_copied() {
        let response = tree(json!({
            "Header": { "GatewayTxnId": "77", "GatewayRspCode": "0" },
            "Transaction": { "CreditSale": {
                "AuthAmt": "10.00", "AuthCode": "43557A", "AVSRsltCode": "0",
                "AVSRsltText": "AVS Not Requested.", "CardType": "Visa", "CPCInd": "B",
                "CVVRsltCode": "M", "CVVRsltText": "Match.", "RefNbr": "512313",
                "RspCode": "00", "RspText": "APPROVAL"
            }}
        }));

        let result = authorization(
            header(&response).unwrap(),
            detail(&response, TransactionType::Charge),
        );

        assert_eq!(result.transaction_id, Some(TransactionId::new(77)));
        assert_eq!(result.authorized_amount, Some(dec!(10.00)));
        assert_eq!(result.authorization_code.as_deref(), Some("43557A"));
        assert_eq!(result.cvv_result_text.as_deref(), Some("Match."));
        assert_eq!(result.response_code.as_deref(), Some("00"));
        assert!(result.token_data.is_none());
    }

    #[test]
    fn test_missing_detail_fields_are_not_errors() {
        let response = tree(json!({ "Header": { "GatewayRspCode": "0" } }));

        let result = reversal(header(&response).unwrap(), None);

        assert!(result.transaction_id.is_none());
        assert!(result.response_code.is_none());
    }

    #[test]
    fn test_transaction_detail_report() {
        let response = tree(json!({
            "Header": { "GatewayTxnId": "900", "GatewayRspCode": "0" },
            "Transaction": { "ReportTxnDetail": {
                "GatewayTxnId": "555",
                "OriginalGatewayTxnId": "0",
                "ServiceName": "CreditSale",
                "RspUtcDT": "2026-03-05T15:12:40.467",
                "Data": {
                    "AuthAmt": "15.25", "MaskedCardNbr": "401200******0016",
                    "RspCode": "00", "RspText": "APPROVAL", "TokenizationMsg": "Success"
                }
            }}
        }));

        let result = transaction_detail(
            header(&response).unwrap(),
            detail(&response, TransactionType::Get),
        );

        assert_eq!(result.transaction_id, Some(TransactionId::new(555)));
        assert_eq!(result.transaction_type, Some(TransactionType::Charge));
        assert_eq!(result.authorized_amount, Some(dec!(15.25)));
        assert_eq!(
            result.transaction_date.unwrap().to_rfc3339(),
            "2026-03-05T15:12:40.467+00:00"
        );
        assert_eq!(
            result.token_data.unwrap().response_message.as_deref(),
            Some("Success")
        );
    }

    #[test]
    fn test_zero_count_report_has_no_lines() {
        let response = tree(json!({
            "Header": { "GatewayRspCode": "0" },
            "Transaction": { "ReportActivity": {
                "Header": { "TxnCnt": "0" },
                "Details": { "GatewayTxnId": "1" }
            }}
        }));

        assert!(activity_lines(&response).is_empty());
    }

    #[test]
    fn test_summary_maps_service_name() {
        let line = tree(json!({
            "GatewayTxnId": "12",
            "ServiceName": "CreditVoid",
            "IssuerRspCode": "00",
            "IssuerRspText": "APPROVAL"
        }));

        let s = summary(&line, None);

        assert_eq!(s.transaction_type, Some(TransactionType::Void));
        assert_eq!(s.response_text.as_deref(), Some("APPROVAL"));
        assert!(s.exceptions.is_none());
    }
}
