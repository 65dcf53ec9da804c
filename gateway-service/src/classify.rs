//! Response code classification.
//!
//! Decides, from the gateway header code and the issuer detail code, whether
//! a call succeeded, which errors it carries, and whether an authorization
//! must be reversed before the error is raised.

use gateway_types::{
    ChargeError, ChargeExceptions, CompensationError, GatewayError, IssuerError, ResponseTree,
    TimeoutSource, TransactionHeader, TransactionId,
};

/// Header code of an accepted request.
pub const GATEWAY_SUCCESS: &str = "0";

/// Issuer codes that count as approved. Both forms are sent by the gateway.
pub const ISSUER_SUCCESS: &[&str] = &["0", "00"];

/// Account verification also treats "85" (no reason to decline) as approved.
pub const VERIFY_SUCCESS: &[&str] = &["0", "00", "85"];

const GATEWAY_TIMEOUT: &str = "30";
const ISSUER_TIMEOUT: &str = "91";

pub fn gateway_error(header: &TransactionHeader) -> Option<GatewayError> {
    (header.response_code != GATEWAY_SUCCESS).then(|| {
        GatewayError::new(
            header.transaction_id,
            &header.response_code,
            header.response_message.as_deref().unwrap_or_default(),
        )
    })
}

/// Builds an issuer error unless `code` is one of `accepted`.
pub fn issuer_error(
    transaction_id: Option<TransactionId>,
    issuer: Option<(&str, &str)>,
    accepted: &[&str],
) -> Option<IssuerError> {
    let (code, text) = issuer?;
    (!accepted.contains(&code)).then(|| IssuerError::new(transaction_id, code, text))
}

/// Evaluates both levels independently. An absent issuer code is a success.
pub fn exceptions(
    header: &TransactionHeader,
    issuer: Option<(&str, &str)>,
    accepted: &[&str],
) -> ChargeExceptions {
    ChargeExceptions {
        gateway: gateway_error(header),
        card: issuer_error(header.transaction_id, issuer, accepted),
    }
}

/// Raises for a single-transaction operation.
pub fn check(
    header: &TransactionHeader,
    issuer: Option<(&str, &str)>,
    accepted: &[&str],
) -> Result<(), ChargeError> {
    match exceptions(header, issuer, accepted).into_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Classifies one line of an activity report. Lines never raise.
pub fn line_exceptions(line: &ResponseTree) -> Option<ChargeExceptions> {
    let transaction_id = line.parsed("GatewayTxnId");

    let gateway = line
        .text("GatewayRspCode")
        .filter(|code| *code != GATEWAY_SUCCESS)
        .map(|code| {
            GatewayError::new(
                transaction_id,
                code,
                line.text("GatewayRspMsg").unwrap_or_default(),
            )
        });
    let issuer = line
        .text("IssuerRspCode")
        .map(|code| (code, line.text("IssuerRspText").unwrap_or_default()));
    let bundle = ChargeExceptions {
        gateway,
        card: issuer_error(transaction_id, issuer, ISSUER_SUCCESS),
    };

    (!bundle.is_empty()).then_some(bundle)
}

/// What to do with the response to a sale or authorization.
#[derive(Debug)]
pub enum Verdict {
    Approved,
    Rejected(ChargeError),
    /// A timeout left the transaction in an unknown state. It must be
    /// reversed before `error` is raised.
    ReverseThenRaise {
        timeout: TimeoutSource,
        response_code: String,
        response_text: String,
        error: ChargeError,
    },
}

/// Classifies a sale or authorization, applying the timeout reversal policy.
///
/// A gateway timeout takes precedence over an issuer timeout; either way at
/// most one reversal is requested.
pub fn authorization_verdict(header: &TransactionHeader, issuer: Option<(&str, &str)>) -> Verdict {
    let bundle = exceptions(header, issuer, ISSUER_SUCCESS);

    let timeout = if header.response_code == GATEWAY_TIMEOUT {
        Some((
            TimeoutSource::Gateway,
            header.response_code.clone(),
            header.response_message.clone().unwrap_or_default(),
        ))
    } else {
        issuer
            .filter(|(code, _)| *code == ISSUER_TIMEOUT)
            .map(|(code, text)| (TimeoutSource::Issuer, code.to_string(), text.to_string()))
    };

    match (bundle.into_error(), timeout) {
        (None, _) => Verdict::Approved,
        (Some(error), None) => Verdict::Rejected(error),
        (Some(error), Some((timeout, response_code, response_text))) => {
            Verdict::ReverseThenRaise {
                timeout,
                response_code,
                response_text,
                error,
            }
        }
    }
}

/// Wraps a failed reversal, keeping the original timeout's codes.
pub fn compensation_failed(
    timeout: TimeoutSource,
    transaction_id: Option<TransactionId>,
    response_code: String,
    response_text: String,
    failure: ChargeError,
) -> ChargeError {
    ChargeError::Compensation(CompensationError {
        timeout,
        transaction_id,
        response_code,
        response_text,
        source: Box::new(failure),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_types::{CardErrorKind, GatewayErrorKind, SdkErrorCode};
    use serde_json::json;

    fn header(code: &str) -> TransactionHeader {
        TransactionHeader {
            transaction_id: Some(TransactionId::new(10)),
            response_code: code.to_string(),
            response_message: Some(format!("message {code}")),
            token_data: None,
        }
    }

    #[test]
    fn test_both_zero_and_double_zero_are_success() {
        assert!(check(&header("0"), Some(("00", "APPROVAL")), ISSUER_SUCCESS).is_ok());
        assert!(check(&header("0"), Some(("0", "APPROVAL")), ISSUER_SUCCESS).is_ok());
        assert!(check(&header("0"), None, ISSUER_SUCCESS).is_ok());
    }

    #[test]
    fn test_issuer_decline() {
        let err = check(&header("0"), Some(("51", "DECLINE")), ISSUER_SUCCESS).unwrap_err();

        match err {
            ChargeError::Issuer(e) => {
                assert_eq!(e.kind, CardErrorKind::CardDeclined);
                assert_eq!(e.response_code, "51");
                assert_eq!(e.response_text, "DECLINE");
                assert_eq!(e.transaction_id, Some(TransactionId::new(10)));
            }
            other => panic!("expected issuer error, got {other:?}"),
        }
    }

    #[test]
    fn test_gateway_and_issuer_combine() {
        let err = check(&header("5"), Some(("05", "DECLINE")), ISSUER_SUCCESS).unwrap_err();

        let ChargeError::Combined(bundle) = err else {
            panic!("expected combined error");
        };
        assert_eq!(bundle.gateway.unwrap().kind, GatewayErrorKind::NoOpenBatch);
        assert_eq!(bundle.card.unwrap().response_code, "05");
    }

    #[test]
    fn test_verify_accepts_85() {
        assert!(check(&header("0"), Some(("85", "CARD OK")), VERIFY_SUCCESS).is_ok());
        assert!(check(&header("0"), Some(("85", "CARD OK")), ISSUER_SUCCESS).is_err());
        assert!(check(&header("0"), Some(("05", "DECLINE")), VERIFY_SUCCESS).is_err());
    }

    #[test]
    fn test_gateway_timeout_requests_reversal() {
        let verdict = authorization_verdict(&header("30"), None);

        match verdict {
            Verdict::ReverseThenRaise {
                timeout,
                response_code,
                error,
                ..
            } => {
                assert_eq!(timeout, TimeoutSource::Gateway);
                assert_eq!(response_code, "30");
                assert!(matches!(error, ChargeError::Gateway(_)));
            }
            other => panic!("expected reversal, got {other:?}"),
        }
    }

    #[test]
    fn test_issuer_timeout_requests_reversal() {
        let verdict = authorization_verdict(&header("0"), Some(("91", "ISSUER TIMEOUT")));

        match verdict {
            Verdict::ReverseThenRaise {
                timeout,
                response_text,
                error,
                ..
            } => {
                assert_eq!(timeout, TimeoutSource::Issuer);
                assert_eq!(response_text, "ISSUER TIMEOUT");
                assert!(matches!(error, ChargeError::Issuer(ref e) if e.kind == CardErrorKind::IssuerTimeout));
            }
            other => panic!("expected reversal, got {other:?}"),
        }
    }

    #[test]
    fn test_other_failures_do_not_reverse() {
        assert!(matches!(
            authorization_verdict(&header("0"), Some(("05", "DECLINE"))),
            Verdict::Rejected(ChargeError::Issuer(_))
        ));
        assert!(matches!(
            authorization_verdict(&header("0"), Some(("00", "APPROVAL"))),
            Verdict::Approved
        ));
    }

    #[test]
    fn test_compensation_failure_keeps_codes() {
        let err = compensation_failed(
            TimeoutSource::Gateway,
            Some(TransactionId::new(3)),
            "30".into(),
            "Gateway timeout".into(),
            ChargeError::Gateway(GatewayError::new(None, "1", "System error")),
        );

        let ChargeError::Compensation(ref inner) = err else {
            panic!("expected compensation error");
        };
        assert_eq!(inner.code(), SdkErrorCode::ReversalErrorAfterGatewayTimeout);
        assert_eq!(err.response_code(), Some("30"));
        assert_eq!(err.transaction_id(), Some(TransactionId::new(3)));
    }

    #[test]
    fn test_report_lines() {
        let good: ResponseTree = serde_json::from_value(json!({
            "GatewayTxnId": "1", "GatewayRspCode": "0", "IssuerRspCode": "00"
        }))
        .unwrap();
        let bad: ResponseTree = serde_json::from_value(json!({
            "GatewayTxnId": "2", "GatewayRspCode": "0",
            "IssuerRspCode": "54", "IssuerRspText": "EXPIRED CARD"
        }))
        .unwrap();

        assert!(line_exceptions(&good).is_none());
        let bundle = line_exceptions(&bad).unwrap();
        assert!(bundle.gateway.is_none());
        let card = bundle.card.unwrap();
        assert_eq!(card.kind, CardErrorKind::ExpiredCard);
        assert_eq!(card.transaction_id, Some(TransactionId::new(2)));
    }
}
