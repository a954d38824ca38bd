//! # nowpayments: client library for the NOWPayments crypto payment gateway
//!
//! The crate has two halves:
//!
//! - an async [`Client`] for the gateway's REST API (payments, invoices, payouts, estimates)
//! - IPN (Instant Payment Notification) verification in [`ipn`], which authenticates the
//!   webhooks the gateway sends when a payment changes status
//!
//! ## Verifying IPN callbacks
//!
//! The gateway signs each notification with HMAC-SHA512 over the canonical JSON form of the body
//! (keys sorted at every level, no whitespace) and sends the lowercase hex digest in the
//! `x-nowpayments-sig` header. Accept a delivery only when verification returns `true`:
//!
//! ```
//! use nowpayments::ipn::IpnVerifier;
//! use serde_json::json;
//!
//! # fn main() -> nowpayments::Result<()> {
//! let verifier = IpnVerifier::new("your-ipn-secret")?;
//!
//! let payload = json!({"payment_id": 5077125051u64, "payment_status": "finished"});
//! let signature = verifier.sign(&payload).unwrap();
//!
//! assert!(verifier.verify(&signature, &payload));
//! assert!(!verifier.verify(&signature, &json!({"payment_id": 5077125051u64, "payment_status": "failed"})));
//! # Ok(())
//! # }
//! ```
//!
//! A verifier cannot be created without a secret, and [`Client::verify_ipn_signature`] fails with
//! [`Error::Configuration`] when no secret is configured, so a misconfigured receiver rejects
//! everything instead of silently accepting forged notifications.
//!
//! ## Calling the API
//!
//! ```no_run
//! use nowpayments::{Client, Config, CreatePaymentRequest, CurrencyCoin, FiatCurrency};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> nowpayments::Result<()> {
//! let config = Config::new("your-api-key").with_sandbox(true);
//! let client = Client::new(config)?;
//!
//! let payment = client
//!     .create_payment(
//!         CreatePaymentRequest::builder()
//!             .price_amount(Decimal::from(100))
//!             .price_currency(FiatCurrency::Usd)
//!             .pay_currency(CurrencyCoin::Btc)
//!             .order_id("test-order-123")
//!             .build(),
//!     )
//!     .await?;
//!
//! println!("pay to {}", payment["pay_address"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for loading settings from YAML and `NOWPAYMENTS_` environment
//! variables.
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber. Secrets, API keys and
//! computed signatures are never logged.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod ipn;
pub mod models;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test;

pub use client::Client;
pub use config::Config;
pub use errors::{Error, Result};
pub use ipn::{Canonicalization, IpnVerifier, SIGNATURE_HEADER, verify_signature};
pub use models::{CreateInvoiceRequest, CreatePaymentRequest, CreatePayoutRequest, ListPaymentsQuery, Withdrawal};
pub use types::{CallbackUrlType, CurrencyCoin, FiatCurrency, InvoiceStatus, PaymentStatus};
pub use utils::format_decimal;
