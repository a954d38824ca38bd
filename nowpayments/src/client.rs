//! Async client for the gateway REST API.
//!
//! Every call maps to one entry of the [`endpoints`](crate::endpoints) table and returns the
//! response body as an untyped [`Value`]. Status handling is uniform:
//!
//! - `401` becomes [`Error::Authentication`]
//! - any other `4xx`/`5xx` becomes [`Error::Api`] carrying the gateway's `message`
//! - transport failures become [`Error::Request`]

use reqwest::{RequestBuilder, StatusCode, header::HeaderMap};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::{
    config::Config,
    endpoints::{self, Endpoint},
    errors::{Error, Result},
    ipn::IpnVerifier,
    models::{AuthRequest, CreateInvoiceRequest, CreatePaymentRequest, CreatePayoutRequest, ListPaymentsQuery},
    types::CallbackUrlType,
    utils::format_decimal,
};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Gateway API client.
///
/// Cheap to clone: clones share one connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    ipn_callback_url: Option<Url>,
    verifier: Option<IpnVerifier>,
}

impl Client {
    /// Create a client from validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let base_url = config.effective_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("nowpayments-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let verifier = config.ipn_secret_key.map(IpnVerifier::new).transpose()?;

        tracing::debug!(
            base_url = %base_url,
            ipn_verification = verifier.is_some(),
            "Created NOWPayments client"
        );

        Ok(Self {
            http,
            api_key: config.api_key,
            base_url,
            ipn_callback_url: config.ipn_callback_url,
            verifier,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Verifier for the configured IPN secret, if any
    pub fn ipn_verifier(&self) -> Option<&IpnVerifier> {
        self.verifier.as_ref()
    }

    // ------------------------------------------------------------------------
    // Status and information
    // ------------------------------------------------------------------------

    /// API availability
    pub async fn status(&self) -> Result<Value> {
        self.get(&endpoints::STATUS, &[], &[]).await
    }

    /// Available cryptocurrencies, optionally only those usable for fixed-rate exchanges
    pub async fn get_currencies(&self, fixed_rate: bool) -> Result<Value> {
        self.get(&endpoints::CURRENCIES, &[], &[("fixed_rate", Some(fixed_rate.to_string()))])
            .await
    }

    /// Currencies enabled in the merchant's account settings
    pub async fn get_available_currencies(&self) -> Result<Value> {
        self.get(&endpoints::AVAILABLE_CURRENCIES, &[], &[]).await
    }

    /// Estimated amount of `currency_to` for `amount` of `currency_from`
    pub async fn get_estimate(&self, amount: Decimal, currency_from: impl AsRef<str>, currency_to: impl AsRef<str>) -> Result<Value> {
        let query = [
            ("amount", Some(format_decimal(amount))),
            ("currency_from", Some(currency_from.as_ref().to_string())),
            ("currency_to", Some(currency_to.as_ref().to_string())),
        ];
        self.get(&endpoints::ESTIMATE, &[], &query).await
    }

    /// Minimum payment amount for a currency pair
    pub async fn get_minimum_payment_amount(&self, currency_from: impl AsRef<str>, currency_to: impl AsRef<str>) -> Result<Value> {
        let query = [
            ("currency_from", Some(currency_from.as_ref().to_string())),
            ("currency_to", Some(currency_to.as_ref().to_string())),
        ];
        self.get(&endpoints::MINIMUM_AMOUNT, &[], &query).await
    }

    // ------------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------------

    /// Exchange account credentials for a short-lived bearer token (needed for payouts).
    ///
    /// The token is returned, not stored.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Value> {
        self.post(&endpoints::AUTHENTICATE, &AuthRequest { email, password }, None).await
    }

    // ------------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------------

    /// Create a payment. Uses the configured IPN callback URL if the request has none.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] if `ipn_callback_url` is set both as a field and in `extra`.
    pub async fn create_payment(&self, mut request: CreatePaymentRequest) -> Result<Value> {
        self.default_callback_url(&mut request.ipn_callback_url, &request.extra)?;
        self.post(&endpoints::CREATE_PAYMENT, &request, None).await
    }

    pub async fn get_payment_status(&self, payment_id: &str) -> Result<Value> {
        self.get(&endpoints::GET_PAYMENT, &[payment_id], &[]).await
    }

    /// Page through payments, filtered by date range
    pub async fn list_payments(&self, query: &ListPaymentsQuery) -> Result<Value> {
        self.get(&endpoints::GET_PAYMENTS, &[], &query.to_query()).await
    }

    // ------------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------------

    /// Create a hosted invoice. Same callback URL rules as [`Client::create_payment`].
    pub async fn create_invoice(&self, mut request: CreateInvoiceRequest) -> Result<Value> {
        self.default_callback_url(&mut request.ipn_callback_url, &request.extra)?;
        self.post(&endpoints::CREATE_INVOICE, &request, None).await
    }

    pub async fn get_invoice(&self, invoice_id: &str) -> Result<Value> {
        self.get(&endpoints::GET_INVOICE, &[invoice_id], &[]).await
    }

    /// Fill `field` from configuration unless the request already names a callback URL
    fn default_callback_url(&self, field: &mut Option<Url>, extra: &Map<String, Value>) -> Result<()> {
        let key = CallbackUrlType::IpnCallbackUrl.as_str();
        match (field.is_some(), extra.contains_key(key)) {
            (true, true) => Err(Error::InvalidRequest(format!("{key} is set both as a field and in extra"))),
            (false, false) => {
                *field = self.ipn_callback_url.clone();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Payouts and balance
    // ------------------------------------------------------------------------

    /// Create a payout batch. `bearer_token` comes from [`Client::authenticate`].
    pub async fn create_payout(&self, request: &CreatePayoutRequest, bearer_token: &str) -> Result<Value> {
        if request.withdrawals.is_empty() {
            return Err(Error::InvalidRequest("payout must contain at least one withdrawal".to_string()));
        }
        self.post(&endpoints::CREATE_PAYOUT, request, Some(bearer_token)).await
    }

    pub async fn get_payout(&self, payout_id: &str) -> Result<Value> {
        self.get(&endpoints::GET_PAYOUT, &[payout_id], &[]).await
    }

    pub async fn get_balance(&self) -> Result<Value> {
        self.get(&endpoints::GET_BALANCE, &[], &[]).await
    }

    // ------------------------------------------------------------------------
    // IPN
    // ------------------------------------------------------------------------

    /// Verify an IPN callback with the configured secret.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the client was built without `ipn_secret_key`.
    pub fn verify_ipn_signature(&self, signature: &str, payload: &Value) -> Result<bool> {
        Ok(self.require_verifier()?.verify(signature, payload))
    }

    /// Verify a raw IPN delivery using its `x-nowpayments-sig` header.
    pub fn verify_ipn_request(&self, headers: &HeaderMap, body: &str) -> Result<bool> {
        Ok(self.require_verifier()?.verify_headers(headers, body))
    }

    fn require_verifier(&self) -> Result<&IpnVerifier> {
        self.verifier.as_ref().ok_or_else(|| {
            tracing::error!("IPN verification requested but no IPN secret key is configured");
            Error::configuration("IPN secret key is not set")
        })
    }

    // ------------------------------------------------------------------------
    // Request execution
    // ------------------------------------------------------------------------

    async fn get(&self, endpoint: &Endpoint, params: &[&str], query: &[(&str, Option<String>)]) -> Result<Value> {
        let url = endpoint.url(&self.base_url, params, query)?;
        let request = self
            .http
            .request(endpoint.method.clone(), url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.execute(endpoint, request).await
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: &Endpoint, body: &B, bearer_token: Option<&str>) -> Result<Value> {
        let url = endpoint.url(&self.base_url, &[], &[])?;
        let mut request = self.http.request(endpoint.method.clone(), url).json(body);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }
        self.execute(endpoint, request).await
    }

    #[tracing::instrument(skip(self, endpoint, request), fields(method = %endpoint.method, path = endpoint.path))]
    async fn execute(&self, endpoint: &Endpoint, request: RequestBuilder) -> Result<Value> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "NOWPayments request failed");
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), response_len = body.len(), "NOWPayments request completed");

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("NOWPayments rejected the API key");
            return Err(Error::Authentication("API key is invalid or missing".to_string()));
        }

        if status.is_client_error() || status.is_server_error() {
            let message = error_message(&body);
            tracing::warn!(status = status.as_u16(), message = %message, "NOWPayments returned an error");
            return Err(Error::Api { status, message, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("ipn_callback_url", &self.ipn_callback_url.as_ref().map(Url::as_str))
            .field("ipn_verification", &self.verifier.is_some())
            .finish_non_exhaustive()
    }
}

/// Human-readable message from an error response body.
///
/// JSON bodies yield their `message` field (or "Unknown error"); other bodies are used verbatim.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.to_string(),
    }
}
