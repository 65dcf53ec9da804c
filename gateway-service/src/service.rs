//! Charge Service
//!
//! Orchestrates gateway operations through the transport port: validate,
//! build the request, submit, classify, hydrate.
//! Contains NO transport logic - the adapter is injected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use gateway_types::{
    AccountVerify, Acknowledgement, Authorization, CardInput, Charge, ChargeError,
    ChargeExceptions, ChargeRequest, Currency, Element, GatewayError, ManageTokens, Money,
    ProtocolError, Refund, RefundRequest, RefundTransactionRequest, ReportTransactionDetails,
    ReportTransactionSummary, ResponseTree, Reversal, SdkError, SdkErrorCode, SwipeChargeRequest,
    SwipeVerifyRequest, TransactionDetails, TransactionId, TransactionType, Transport,
    VerifyRequest, Void,
};

use crate::classify::{self, ISSUER_SUCCESS, VERIFY_SUCCESS, Verdict};
use crate::hydrate;
use crate::request;

/// Client-side service for card gateway operations.
///
/// Generic over `T: Transport` - the adapter is injected at compile time.
/// Every call is a blocking round trip; the service keeps no state between
/// calls.
pub struct ChargeService<T: Transport> {
    transport: T,
}

impl<T: Transport> ChargeService<T> {
    /// Creates a new charge service over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reporting
    // ─────────────────────────────────────────────────────────────────────────────

    /// Fetches the full detail of one transaction.
    #[instrument(skip(self), fields(transaction_id = %transaction_id))]
    pub fn get(
        &self,
        transaction_id: TransactionId,
    ) -> Result<ReportTransactionDetails, ChargeError> {
        check_transaction_id(transaction_id)?;

        let response = self.submit(
            TransactionType::Get,
            &request::transaction_detail(transaction_id),
        )?;
        let header = hydrate::header(&response)?;
        let detail = hydrate::detail(&response, TransactionType::Get);

        let exceptions = ChargeExceptions {
            gateway: classify::gateway_error(&header),
            card: classify::issuer_error(
                Some(transaction_id),
                hydrate::issuer_response(hydrate::report_data(detail)),
                ISSUER_SUCCESS,
            ),
        };
        if let Some(err) = exceptions.into_error() {
            return Err(err);
        }

        Ok(hydrate::transaction_detail(header, detail))
    }

    /// Lists activity between two past instants, optionally for one kind of
    /// operation.
    ///
    /// Lines the gateway or issuer rejected are returned with their errors
    /// attached; only a failure of the report itself is raised.
    #[instrument(skip(self))]
    pub fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        filter_by: Option<TransactionType>,
    ) -> Result<Vec<ReportTransactionSummary>, ChargeError> {
        let now = Utc::now();
        if start > now {
            return Err(SdkError::new(SdkErrorCode::InvalidStartDate).into());
        }
        if end > now {
            return Err(SdkError::new(SdkErrorCode::InvalidEndDate).into());
        }

        let response = self.submit(
            TransactionType::List,
            &request::activity_report(start, end),
        )?;
        let header = hydrate::header(&response)?;
        if let Some(err) = classify::gateway_error(&header) {
            return Err(err.into());
        }

        let summaries: Vec<ReportTransactionSummary> = hydrate::activity_lines(&response)
            .into_iter()
            .filter(|line| match filter_by {
                Some(kind) => line.text("ServiceName") == Some(kind.service_name()),
                None => true,
            })
            .map(|line| hydrate::summary(line, classify::line_exceptions(line)))
            .collect();

        debug!(count = summaries.len(), "activity report hydrated");
        Ok(summaries)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Sales and authorizations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Charges a keyed card or a token.
    #[instrument(skip(self, req), fields(amount = %req.amount))]
    pub fn charge(&self, req: &ChargeRequest) -> Result<Charge, ChargeError> {
        let money = Money::new(req.amount, &req.currency)?;
        let doc = request::keyed_authorization(TransactionType::Charge, req, &money);
        self.submit_authorization(TransactionType::Charge, &doc, &money)
    }

    /// Charges swiped track data.
    #[instrument(skip(self, req), fields(amount = %req.amount))]
    pub fn charge_swipe(&self, req: &SwipeChargeRequest) -> Result<Charge, ChargeError> {
        let money = Money::new(req.amount, &req.currency)?;
        let doc = request::swipe_authorization(TransactionType::Charge, req, &money);
        self.submit_authorization(TransactionType::Charge, &doc, &money)
    }

    /// Authorizes a keyed card or a token without capturing it.
    #[instrument(skip(self, req), fields(amount = %req.amount))]
    pub fn authorize(&self, req: &ChargeRequest) -> Result<Authorization, ChargeError> {
        let money = Money::new(req.amount, &req.currency)?;
        let doc = request::keyed_authorization(TransactionType::Authorize, req, &money);
        self.submit_authorization(TransactionType::Authorize, &doc, &money)
    }

    /// Authorizes swiped track data without capturing it.
    #[instrument(skip(self, req), fields(amount = %req.amount))]
    pub fn authorize_swipe(&self, req: &SwipeChargeRequest) -> Result<Authorization, ChargeError> {
        let money = Money::new(req.amount, &req.currency)?;
        let doc = request::swipe_authorization(TransactionType::Authorize, req, &money);
        self.submit_authorization(TransactionType::Authorize, &doc, &money)
    }

    /// Adds an authorization to the open batch, then returns its detail.
    ///
    /// Without an amount the full authorized amount is captured.
    #[instrument(skip(self), fields(transaction_id = %transaction_id))]
    pub fn capture(
        &self,
        transaction_id: TransactionId,
        amount: Option<Decimal>,
    ) -> Result<ReportTransactionDetails, ChargeError> {
        check_transaction_id(transaction_id)?;
        let amount = amount
            .map(|a| Money::in_currency(a, Currency::USD))
            .transpose()?;

        let response = self.submit(
            TransactionType::Capture,
            &request::capture(transaction_id, amount.as_ref()),
        )?;
        let header = hydrate::header(&response)?;
        if !header.is_success() {
            return Err(GatewayError::new(
                Some(transaction_id),
                header.response_code,
                header.response_message.unwrap_or_default(),
            )
            .into());
        }

        self.get(transaction_id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────────

    /// Verifies a keyed card or a token without moving funds.
    #[instrument(skip(self, req))]
    pub fn verify(&self, req: &VerifyRequest) -> Result<AccountVerify, ChargeError> {
        self.submit_verify(&request::verify(req))
    }

    /// Verifies swiped track data without moving funds.
    #[instrument(skip(self, req))]
    pub fn verify_swipe(&self, req: &SwipeVerifyRequest) -> Result<AccountVerify, ChargeError> {
        self.submit_verify(&request::verify_swipe(req))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reversals, refunds and voids
    // ─────────────────────────────────────────────────────────────────────────────

    /// Reverses an authorization identified by the card used.
    #[instrument(skip(self, card, details), fields(amount = %amount))]
    pub fn reverse(
        &self,
        card: &CardInput,
        amount: Decimal,
        currency: &str,
        details: Option<&TransactionDetails>,
    ) -> Result<Reversal, ChargeError> {
        let money = Money::new(amount, currency)?;
        self.submit_reverse(&request::reverse(card, &money, details))
    }

    /// Reverses an authorization identified by its gateway transaction id.
    #[instrument(skip(self, details), fields(transaction_id = %transaction_id, amount = %amount))]
    pub fn reverse_transaction(
        &self,
        transaction_id: TransactionId,
        amount: Decimal,
        currency: &str,
        details: Option<&TransactionDetails>,
    ) -> Result<Reversal, ChargeError> {
        let money = Money::new(amount, currency)?;
        check_transaction_id(transaction_id)?;
        self.submit_reverse(&request::reverse_transaction(transaction_id, &money, details))
    }

    /// Returns funds to a keyed card or a token.
    #[instrument(skip(self, req), fields(amount = %req.amount))]
    pub fn refund(&self, req: &RefundRequest) -> Result<Refund, ChargeError> {
        let money = Money::new(req.amount, &req.currency)?;
        self.submit_acknowledged(TransactionType::Refund, &request::refund(req, &money))
    }

    /// Returns funds against an earlier gateway transaction.
    #[instrument(skip(self, req), fields(transaction_id = %req.transaction_id, amount = %req.amount))]
    pub fn refund_transaction(&self, req: &RefundTransactionRequest) -> Result<Refund, ChargeError> {
        let money = Money::new(req.amount, &req.currency)?;
        check_transaction_id(req.transaction_id)?;
        self.submit_acknowledged(
            TransactionType::Refund,
            &request::refund_transaction(req, &money),
        )
    }

    /// Removes a transaction from the open batch.
    #[instrument(skip(self), fields(transaction_id = %transaction_id))]
    pub fn void(&self, transaction_id: TransactionId) -> Result<Void, ChargeError> {
        check_transaction_id(transaction_id)?;
        self.submit_acknowledged(TransactionType::Void, &request::void(transaction_id))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────────

    /// Sets a new expiry date on a stored multi-use token.
    #[instrument(skip(self, token))]
    pub fn update_token_expiration(
        &self,
        token: &str,
        exp_month: u8,
        exp_year: u16,
    ) -> Result<ManageTokens, ChargeError> {
        if !(1..=12).contains(&exp_month) {
            return Err(SdkError::new(SdkErrorCode::InvalidExpiry).into());
        }
        self.submit_acknowledged(
            TransactionType::ManageTokens,
            &request::update_token_expiration(token, exp_month, exp_year),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────────

    fn submit(&self, kind: TransactionType, doc: &Element) -> Result<ResponseTree, ChargeError> {
        debug!(operation = %kind, "submitting gateway request");
        Ok(self.transport.submit(doc)?)
    }

    /// Submits a sale or authorization and applies the timeout policy.
    fn submit_authorization(
        &self,
        kind: TransactionType,
        doc: &Element,
        money: &Money,
    ) -> Result<Authorization, ChargeError> {
        let response = self.submit(kind, doc)?;
        let header = hydrate::header(&response)?;
        let detail = hydrate::detail(&response, kind);

        match classify::authorization_verdict(&header, hydrate::issuer_response(detail)) {
            Verdict::Approved => Ok(hydrate::authorization(header, detail)),
            Verdict::Rejected(err) => Err(err),
            Verdict::ReverseThenRaise {
                timeout,
                response_code,
                response_text,
                error,
            } => {
                warn!(
                    operation = %kind,
                    ?timeout,
                    response_code = %response_code,
                    "timeout reported, reversing transaction"
                );
                match self.reverse_after_timeout(header.transaction_id, money) {
                    Ok(_) => Err(error),
                    Err(failure) => {
                        warn!(error = %failure, "reversal after timeout failed");
                        Err(classify::compensation_failed(
                            timeout,
                            header.transaction_id,
                            response_code,
                            response_text,
                            failure,
                        ))
                    }
                }
            }
        }
    }

    fn reverse_after_timeout(
        &self,
        transaction_id: Option<TransactionId>,
        money: &Money,
    ) -> Result<Reversal, ChargeError> {
        let transaction_id = transaction_id
            .ok_or_else(|| ProtocolError::MissingElement("Header.GatewayTxnId".into()))?;
        self.reverse_transaction(
            transaction_id,
            money.amount(),
            &money.currency().to_string(),
            None,
        )
    }

    fn submit_verify(&self, doc: &Element) -> Result<AccountVerify, ChargeError> {
        let response = self.submit(TransactionType::Verify, doc)?;
        let header = hydrate::header(&response)?;
        let detail = hydrate::detail(&response, TransactionType::Verify);

        classify::check(&header, hydrate::issuer_response(detail), VERIFY_SUCCESS)?;
        Ok(hydrate::authorization(header, detail))
    }

    fn submit_reverse(&self, doc: &Element) -> Result<Reversal, ChargeError> {
        let response = self.submit(TransactionType::Reverse, doc)?;
        let header = hydrate::header(&response)?;
        let detail = hydrate::detail(&response, TransactionType::Reverse);

        classify::check(&header, hydrate::issuer_response(detail), ISSUER_SUCCESS)?;
        Ok(hydrate::reversal(header, detail))
    }

    /// Refunds, voids and token updates carry no issuer detail.
    fn submit_acknowledged(
        &self,
        kind: TransactionType,
        doc: &Element,
    ) -> Result<Acknowledgement, ChargeError> {
        let response = self.submit(kind, doc)?;
        let header = hydrate::header(&response)?;

        classify::check(&header, None, ISSUER_SUCCESS)?;
        Ok(hydrate::acknowledgement(header))
    }
}

fn check_transaction_id(transaction_id: TransactionId) -> Result<(), SdkError> {
    if transaction_id.is_valid() {
        Ok(())
    } else {
        Err(SdkError::new(SdkErrorCode::InvalidTransactionId))
    }
}
