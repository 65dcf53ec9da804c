//! # Gateway Client
//!
//! Blocking SOAP transport for the card gateway. Implements the
//! [`Transport`] port so it can be injected into `ChargeService`.

pub mod config;
pub mod soap;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use gateway_types::{Element, ResponseTree, Transport, TransportError};

pub use config::{ConfigError, Credentials, GatewayConfig};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("SOAP fault: {0}")]
    Fault(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, body } => TransportError::Status { status, body },
            ClientError::Fault(reason) => TransportError::Fault(reason),
            ClientError::Xml(reason) => TransportError::Decode(reason),
            other => TransportError::Connection(other.to_string()),
        }
    }
}

/// SOAP-over-HTTP transport.
pub struct SoapTransport {
    config: GatewayConfig,
    url: String,
    http: Client,
}

impl SoapTransport {
    /// Creates a transport posting to the configured endpoint.
    pub fn new(config: GatewayConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            url: config.service_url().to_string(),
            config,
            http,
        })
    }

    /// Loads the configuration from the environment and creates a transport.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self, transaction), fields(url = %self.url))]
    fn post(&self, transaction: &Element) -> Result<ResponseTree, ClientError> {
        let body = soap::envelope(&self.config, transaction)?;

        let resp = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()?;
        let status = resp.status();
        let text = resp.text()?;
        debug!(status = status.as_u16(), bytes = text.len(), "gateway responded");

        if status.is_success() {
            return soap::parse_response(&text);
        }
        // Faults arrive with a 500 status and a SOAP body.
        match soap::parse_response(&text) {
            Err(ClientError::Fault(reason)) => Err(ClientError::Fault(reason)),
            _ => Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            }),
        }
    }
}

impl Transport for SoapTransport {
    fn submit(&self, transaction: &Element) -> Result<ResponseTree, TransportError> {
        Ok(self.post(transaction)?)
    }
}
