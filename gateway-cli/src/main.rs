//! Gateway CLI
//!
//! Command-line front end for the card gateway. Results are printed as JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gateway_client::{GatewayConfig, SoapTransport};
use gateway_service::ChargeService;
use gateway_types::{
    CardInput, ChargeRequest, CreditCard, RefundTransactionRequest, SwipeChargeRequest,
    TrackData, TransactionDetails, TransactionId, TransactionType, VerifyRequest,
};

#[derive(Parser)]
#[command(name = "gateway")]
#[command(author, version, about = "Card gateway CLI client", long_about = None)]
struct Cli {
    /// Overrides the endpoint derived from the credentials
    #[arg(long, env = "GATEWAY_SERVICE_URL")]
    service_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full detail of a transaction
    Get { id: TransactionId },
    /// List activity in a time range (defaults to the last 24 hours)
    List {
        /// Start of the range, RFC 3339
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// End of the range, RFC 3339
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        /// Only show one kind of operation
        #[arg(long, value_enum)]
        filter: Option<Operation>,
    },
    /// Authorize and capture a payment
    Charge(PaymentArgs),
    /// Authorize a payment without capturing it
    Authorize(PaymentArgs),
    /// Charge swiped or tapped track data
    Swipe {
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Raw track data
        #[arg(long)]
        track: String,
        /// Track data was read contactless
        #[arg(long)]
        proximity: bool,
        #[arg(long)]
        allow_partial_auth: bool,
        /// Authorize only
        #[arg(long)]
        auth_only: bool,
    },
    /// Add an authorization to the open batch
    Capture {
        id: TransactionId,
        /// Defaults to the authorized amount
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Verify a card without charging it
    Verify {
        #[command(flatten)]
        card: CardArgs,
        #[arg(long)]
        request_token: bool,
    },
    /// Reverse an authorization
    Reverse {
        id: TransactionId,
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Refund a settled transaction
    Refund {
        id: TransactionId,
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Void a transaction in the open batch
    Void { id: TransactionId },
    /// Set a new expiry date on a multi-use token
    UpdateTokenExpiration {
        #[arg(long)]
        token: String,
        #[arg(long)]
        exp_month: u8,
        #[arg(long)]
        exp_year: u16,
    },
}

#[derive(Args)]
struct CardArgs {
    /// Multi-use token instead of a card number
    #[arg(long, conflicts_with = "number")]
    token: Option<String>,
    #[arg(long, requires_all = ["exp_month", "exp_year"])]
    number: Option<String>,
    #[arg(long)]
    exp_month: Option<u8>,
    #[arg(long)]
    exp_year: Option<u16>,
    #[arg(long)]
    cvv: Option<String>,
}

impl CardArgs {
    fn into_card(self) -> Result<CardInput> {
        if let Some(token) = self.token {
            return Ok(CardInput::Token(token));
        }
        let number = self.number.context("either --token or --number is required")?;
        let (Some(month), Some(year)) = (self.exp_month, self.exp_year) else {
            anyhow::bail!("--exp-month and --exp-year are required with --number");
        };
        let mut card = CreditCard::new(number, month, year);
        if let Some(cvv) = self.cvv {
            card = card.with_cvv(cvv);
        }
        Ok(card.into())
    }
}

#[derive(Args)]
struct PaymentArgs {
    #[arg(long)]
    amount: Decimal,
    #[arg(long, default_value = "USD")]
    currency: String,
    #[command(flatten)]
    card: CardArgs,
    /// Ask the gateway for a multi-use token
    #[arg(long)]
    request_token: bool,
    #[arg(long)]
    invoice: Option<String>,
    #[arg(long)]
    memo: Option<String>,
    /// Soft descriptor shown on the statement
    #[arg(long)]
    descriptor: Option<String>,
}

impl PaymentArgs {
    fn into_request(self) -> Result<ChargeRequest> {
        let mut req = ChargeRequest::new(self.amount, self.currency, self.card.into_card()?);
        req.request_multi_use_token = self.request_token;
        req.descriptor = self.descriptor;
        if self.invoice.is_some() || self.memo.is_some() {
            req.details = Some(TransactionDetails {
                memo: self.memo,
                invoice_number: self.invoice,
                customer_id: None,
            });
        }
        Ok(req)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Operation {
    Authorize,
    Capture,
    Charge,
    Refund,
    Reverse,
    Verify,
    Void,
}

impl From<Operation> for TransactionType {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Authorize => TransactionType::Authorize,
            Operation::Capture => TransactionType::Capture,
            Operation::Charge => TransactionType::Charge,
            Operation::Refund => TransactionType::Refund,
            Operation::Reverse => TransactionType::Reverse,
            Operation::Verify => TransactionType::Verify,
            Operation::Void => TransactionType::Void,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,gateway_service=info,gateway_client=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = GatewayConfig::from_env().context("loading gateway configuration")?;
    if cli.service_url.is_some() {
        config.service_url = cli.service_url;
    }
    let service = ChargeService::new(SoapTransport::new(config)?);
    tracing::debug!(url = service.transport().url(), "gateway client ready");

    match cli.command {
        Commands::Get { id } => print(&service.get(id)?)?,

        Commands::List { start, end, filter } => {
            let end = end.unwrap_or_else(Utc::now);
            let start = start.unwrap_or(end - Duration::days(1));
            print(&service.list(start, end, filter.map(Into::into))?)?;
        }

        Commands::Charge(args) => print(&service.charge(&args.into_request()?)?)?,

        Commands::Authorize(args) => print(&service.authorize(&args.into_request()?)?)?,

        Commands::Swipe {
            amount,
            currency,
            track,
            proximity,
            allow_partial_auth,
            auth_only,
        } => {
            let track = if proximity {
                TrackData::proximity(track)
            } else {
                TrackData::swipe(track)
            };
            let mut req = SwipeChargeRequest::new(amount, currency, track);
            req.allow_partial_auth = allow_partial_auth;
            if auth_only {
                print(&service.authorize_swipe(&req)?)?;
            } else {
                print(&service.charge_swipe(&req)?)?;
            }
        }

        Commands::Capture { id, amount } => print(&service.capture(id, amount)?)?,

        Commands::Verify {
            card,
            request_token,
        } => {
            let req = VerifyRequest {
                card: card.into_card()?,
                card_holder: None,
                request_multi_use_token: request_token,
            };
            print(&service.verify(&req)?)?;
        }

        Commands::Reverse {
            id,
            amount,
            currency,
        } => print(&service.reverse_transaction(id, amount, &currency, None)?)?,

        Commands::Refund {
            id,
            amount,
            currency,
        } => {
            let req = RefundTransactionRequest {
                amount,
                currency,
                transaction_id: id,
                card_holder: None,
                details: None,
            };
            print(&service.refund_transaction(&req)?)?;
        }

        Commands::Void { id } => print(&service.void(id)?)?,

        Commands::UpdateTokenExpiration {
            token,
            exp_month,
            exp_year,
        } => print(&service.update_token_expiration(&token, exp_month, exp_year)?)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_token_payment() {
        let cli = Cli::try_parse_from([
            "gateway", "charge", "--amount", "10.50", "--token", "supt_abc", "--invoice", "INV-1",
        ])
        .unwrap();

        let Commands::Charge(args) = cli.command else {
            panic!("expected charge");
        };
        let req = args.into_request().unwrap();
        assert_eq!(req.amount, Decimal::new(1050, 2));
        assert!(matches!(req.card, CardInput::Token(ref t) if t == "supt_abc"));
        assert_eq!(req.details.unwrap().invoice_number.as_deref(), Some("INV-1"));
    }

    #[test]
    fn test_keyed_card_requires_expiry() {
        assert!(
            Cli::try_parse_from(["gateway", "verify", "--number", "4012002000060016"]).is_err()
        );

        let cli = Cli::try_parse_from([
            "gateway",
            "verify",
            "--number",
            "4012002000060016",
            "--exp-month",
            "12",
            "--exp-year",
            "2027",
        ])
        .unwrap();
        let Commands::Verify { card, .. } = cli.command else {
            panic!("expected verify");
        };
        assert!(matches!(card.into_card().unwrap(), CardInput::Manual(_)));
    }

    #[test]
    fn test_missing_card_is_an_error() {
        let cli = Cli::try_parse_from(["gateway", "authorize", "--amount", "5"]).unwrap();
        let Commands::Authorize(args) = cli.command else {
            panic!("expected authorize");
        };
        assert!(args.into_request().is_err());
    }
}
