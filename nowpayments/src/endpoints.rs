//! Gateway endpoint table.
//!
//! Paths are relative to the API base URL (which already contains the `/v1` prefix). A `{}`
//! segment is a path parameter filled in by [`Endpoint::url`].

use reqwest::Method;
use url::{Url, form_urlencoded};

use crate::errors::{Error, Result};

/// Production API base URL
pub const BASE_URL: &str = "https://api.nowpayments.io/v1";
/// Sandbox API base URL
pub const SANDBOX_URL: &str = "https://api-sandbox.nowpayments.io/v1";

/// One remote operation: HTTP method plus path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
}

// Status and information
pub const STATUS: Endpoint = Endpoint::get("/status");
pub const CURRENCIES: Endpoint = Endpoint::get("/currencies");
pub const ESTIMATE: Endpoint = Endpoint::get("/estimate");
pub const MINIMUM_AMOUNT: Endpoint = Endpoint::get("/min-amount");
pub const AVAILABLE_CURRENCIES: Endpoint = Endpoint::get("/merchant/coins");

// Authentication
pub const AUTHENTICATE: Endpoint = Endpoint::post("/auth");

// Payments
pub const CREATE_PAYMENT: Endpoint = Endpoint::post("/payment");
pub const GET_PAYMENT: Endpoint = Endpoint::get("/payment/{}");
/// Filtered with `limit`, `page`, `sortBy`, `orderBy`, `dateFrom`, `dateTo`
pub const GET_PAYMENTS: Endpoint = Endpoint::get("/payment");

// Invoices
pub const CREATE_INVOICE: Endpoint = Endpoint::post("/invoice");
pub const GET_INVOICE: Endpoint = Endpoint::get("/invoice/{}");

// Payouts
pub const CREATE_PAYOUT: Endpoint = Endpoint::post("/payout");
pub const GET_PAYOUT: Endpoint = Endpoint::get("/payout/{}");

// Balance
pub const GET_BALANCE: Endpoint = Endpoint::get("/balance");

impl Endpoint {
    const fn get(path: &'static str) -> Self {
        Self { method: Method::GET, path }
    }

    const fn post(path: &'static str) -> Self {
        Self { method: Method::POST, path }
    }

    /// Number of `{}` parameters in the path template
    pub fn param_count(&self) -> usize {
        self.path.split('/').filter(|segment| *segment == "{}").count()
    }

    /// Build the full request URL.
    ///
    /// Path parameters are percent-encoded as single segments. Query pairs with a `None` value
    /// are left out entirely.
    pub fn url(&self, base: &Url, params: &[&str], query: &[(&str, Option<String>)]) -> Result<Url> {
        if params.len() != self.param_count() {
            return Err(Error::InvalidRequest(format!(
                "{} expects {} path parameter(s), got {}",
                self.path,
                self.param_count(),
                params.len()
            )));
        }
        if let Some(empty) = params.iter().position(|p| p.is_empty()) {
            return Err(Error::InvalidRequest(format!("path parameter {} for {} is empty", empty, self.path)));
        }

        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::configuration(format!("API base URL cannot have a path: {base}")))?;
            segments.pop_if_empty();

            let mut params = params.iter();
            for segment in self.path.split('/').filter(|s| !s.is_empty()) {
                match segment {
                    "{}" => {
                        if let Some(param) = params.next() {
                            segments.push(param);
                        }
                    }
                    literal => {
                        segments.push(literal);
                    }
                }
            }
        }

        let query = query_string(query);
        url.set_query(if query.is_empty() { None } else { Some(&query) });

        Ok(url)
    }
}

/// URL-encoded query string (without leading `?`), skipping pairs whose value is `None`.
pub fn query_string(params: &[(&str, Option<String>)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if let Some(value) = value {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}
