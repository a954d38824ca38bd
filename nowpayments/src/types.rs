//! Gateway enumerations.
//!
//! Each enum serializes to the lowercase string the gateway uses on the wire, and implements
//! [`Display`](std::fmt::Display) / [`FromStr`](std::str::FromStr) with the same spelling so
//! values can be compared against fields pulled out of untyped JSON responses:
//!
//! ```
//! use nowpayments::PaymentStatus;
//!
//! let status: PaymentStatus = "partially_paid".parse().unwrap();
//! assert_eq!(status, PaymentStatus::PartiallyPaid);
//! assert!(!status.is_final());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements `as_str`, `Display` and `FromStr` from one wire-name table.
macro_rules! wire_enum {
    ($name:ident, $label:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// All variants in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(format!("Unknown {}: {}", $label, s)),
                }
            }
        }
    };
}

/// Payment status values returned by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Waiting,
    Confirming,
    Confirmed,
    Sending,
    PartiallyPaid,
    Finished,
    Failed,
    Refunded,
    Expired,
}

wire_enum!(PaymentStatus, "payment status", {
    Waiting => "waiting",
    Confirming => "confirming",
    Confirmed => "confirmed",
    Sending => "sending",
    PartiallyPaid => "partially_paid",
    Finished => "finished",
    Failed => "failed",
    Refunded => "refunded",
    Expired => "expired",
});

impl PaymentStatus {
    /// Whether no further status change is expected for the payment
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Refunded | Self::Expired)
    }
}

/// Invoice status values returned by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    New,
    Pending,
    Confirmed,
    Expired,
    Failed,
    Paid,
}

wire_enum!(InvoiceStatus, "invoice status", {
    New => "new",
    Pending => "pending",
    Confirmed => "confirmed",
    Expired => "expired",
    Failed => "failed",
    Paid => "paid",
});

/// Cryptocurrency tickers accepted as `pay_currency`.
///
/// The gateway supports many more; any ticker can still be passed as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCoin {
    Btc,
    Eth,
    Ltc,
    Xrp,
    Doge,
    Bch,
    Usdt,
    Usdc,
}

wire_enum!(CurrencyCoin, "currency", {
    Btc => "btc",
    Eth => "eth",
    Ltc => "ltc",
    Xrp => "xrp",
    Doge => "doge",
    Bch => "bch",
    Usdt => "usdt",
    Usdc => "usdc",
});

/// Common fiat codes for `price_currency`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiatCurrency {
    Usd,
    Eur,
    Gbp,
}

wire_enum!(FiatCurrency, "fiat currency", {
    Usd => "usd",
    Eur => "eur",
    Gbp => "gbp",
});

/// Redirect/callback URL fields accepted on payment and invoice creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackUrlType {
    SuccessUrl,
    CancelUrl,
    IpnCallbackUrl,
}

wire_enum!(CallbackUrlType, "callback URL type", {
    SuccessUrl => "success_url",
    CancelUrl => "cancel_url",
    IpnCallbackUrl => "ipn_callback_url",
});

impl From<CurrencyCoin> for String {
    fn from(coin: CurrencyCoin) -> Self {
        coin.as_str().to_string()
    }
}

impl From<FiatCurrency> for String {
    fn from(fiat: FiatCurrency) -> Self {
        fiat.as_str().to_string()
    }
}
