//! Request bodies and query parameters for gateway operations.
//!
//! Responses are returned as untyped [`serde_json::Value`]s; only what the client sends is modeled.
//! Every request carries an `extra` map that is flattened into the body, for gateway fields not
//! listed here.

use bon::Builder;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// Body for `POST /payment`
#[derive(Debug, Clone, Serialize, Builder)]
pub struct CreatePaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub price_amount: Decimal,
    #[builder(into)]
    pub price_currency: String,
    /// Crypto the customer pays with; omitted from the body when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub pay_currency: Option<String>,
    /// Falls back to the client's configured callback URL when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub order_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fixed_rate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fee_paid_by_user: Option<bool>,
    #[serde(flatten)]
    #[builder(default)]
    pub extra: Map<String, Value>,
}

/// Body for `POST /invoice`
#[derive(Debug, Clone, Serialize, Builder)]
pub struct CreateInvoiceRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub price_amount: Decimal,
    #[builder(into)]
    pub price_currency: String,
    /// Internal order reference; omitted from the body when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub order_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub pay_currency: Option<String>,
    /// Falls back to the client's configured callback URL when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fixed_rate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fee_paid_by_user: Option<bool>,
    #[serde(flatten)]
    #[builder(default)]
    pub extra: Map<String, Value>,
}

/// One transfer inside a payout batch
#[derive(Debug, Clone, Serialize, Builder)]
pub struct Withdrawal {
    #[builder(into)]
    pub address: String,
    #[builder(into)]
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Memo / destination tag for currencies that need one
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub extra_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<Url>,
}

/// Body for `POST /payout`
#[derive(Debug, Clone, Serialize, Builder)]
pub struct CreatePayoutRequest {
    pub withdrawals: Vec<Withdrawal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<Url>,
    #[serde(flatten)]
    #[builder(default)]
    pub extra: Map<String, Value>,
}

/// Filters for `GET /payment`
#[derive(Debug, Clone, Default, Builder)]
pub struct ListPaymentsQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    #[builder(into)]
    pub sort_by: Option<String>,
    #[builder(into)]
    pub order_by: Option<String>,
    /// Lower bound, `YYYY-MM-DD` or full ISO-8601
    #[builder(into)]
    pub date_from: Option<String>,
    #[builder(into)]
    pub date_to: Option<String>,
}

impl ListPaymentsQuery {
    /// Query pairs using the gateway's camelCase parameter names
    pub fn to_query(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("limit", self.limit.map(|v| v.to_string())),
            ("page", self.page.map(|v| v.to_string())),
            ("sortBy", self.sort_by.clone()),
            ("orderBy", self.order_by.clone()),
            ("dateFrom", self.date_from.clone()),
            ("dateTo", self.date_to.clone()),
        ]
    }
}

/// Body for `POST /auth`
#[derive(Clone, Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for AuthRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrencyCoin, FiatCurrency};
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_payment_body_omits_unset_fields() {
        let request = CreatePaymentRequest::builder()
            .price_amount(Decimal::from(100))
            .price_currency(FiatCurrency::Usd)
            .build();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"price_amount": 100.0, "price_currency": "usd"})
        );
    }

    #[test]
    fn test_payment_body_with_optional_and_extra_fields() {
        let mut extra = Map::new();
        extra.insert("payout_currency".to_string(), json!("usdt"));

        let request = CreatePaymentRequest::builder()
            .price_amount(Decimal::from_str("49.50").unwrap())
            .price_currency("usd")
            .pay_currency(CurrencyCoin::Btc)
            .order_id("test-order-123")
            .order_description("Test payment")
            .success_url(Url::parse("https://example.com/success").unwrap())
            .is_fixed_rate(true)
            .extra(extra)
            .build();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "price_amount": 49.5,
                "price_currency": "usd",
                "pay_currency": "btc",
                "order_id": "test-order-123",
                "order_description": "Test payment",
                "success_url": "https://example.com/success",
                "is_fixed_rate": true,
                "payout_currency": "usdt"
            })
        );
    }

    #[test]
    fn test_invoice_order_id_only_when_set() {
        let request = CreateInvoiceRequest::builder()
            .price_amount(Decimal::from(10))
            .price_currency("eur")
            .build();
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("order_id").is_none());

        let request = CreateInvoiceRequest::builder()
            .price_amount(Decimal::from(10))
            .price_currency("eur")
            .order_id("inv-1")
            .build();
        assert_eq!(serde_json::to_value(&request).unwrap()["order_id"], "inv-1");
    }

    #[test]
    fn test_payout_body() {
        let request = CreatePayoutRequest::builder()
            .withdrawals(vec![
                Withdrawal::builder()
                    .address("TEmGwPeRTPiLFLVfBxXkSP91yc5GMNQhfS")
                    .currency(CurrencyCoin::Usdt)
                    .amount(Decimal::from_str("200.5").unwrap())
                    .build(),
            ])
            .build();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"withdrawals": [{"address": "TEmGwPeRTPiLFLVfBxXkSP91yc5GMNQhfS", "currency": "usdt", "amount": 200.5}]})
        );
    }

    #[test]
    fn test_list_payments_query() {
        let query = ListPaymentsQuery::builder()
            .limit(10)
            .date_from("2023-01-01")
            .date_to("2023-12-31")
            .build();
        let pairs = query.to_query();
        assert_eq!(pairs[0], ("limit", Some("10".to_string())));
        assert_eq!(pairs[1], ("page", None));
        assert_eq!(pairs[4], ("dateFrom", Some("2023-01-01".to_string())));
    }

    #[test]
    fn test_auth_request_debug_redacts_password() {
        let request = AuthRequest {
            email: "merchant@example.com",
            password: "hunter2",
        };
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("hunter2"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"email": "merchant@example.com", "password": "hunter2"})
        );
    }
}
