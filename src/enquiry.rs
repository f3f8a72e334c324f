//! New sales order (enquiry) form.
//!
//! Mirrors the "Create Sales Order" screen: every required field is checked
//! locally, then the eight catalog kits are written out as
//! `kit{i}_name` / `kit{i}_qty` columns together with `total_kits`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::kits::MAX_KIT_SLOTS;
use crate::models::Order;

/// Kit names for slots 1..=8 of every new enquiry.
pub const KIT_CATALOG: [&str; MAX_KIT_SLOTS] = [
    "2P×3, 10°, 6.2 FT",
    "2P×3, 10°, 8.2 FT",
    "2P×5, 10°, 6.2 FT",
    "2P×5, 10°, 8.2 FT",
    "2P×3, 15°, 6.2 FT",
    "2P×3, 15°, 8.2 FT",
    "2P×5, 15°, 6.2 FT",
    "2P×5, 15°, 8.2 FT",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentReceived {
    Yes,
    No,
    Partial,
}

impl fmt::Display for PaymentReceived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Partial => "Partial",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentReceived {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "partial" => Ok(Self::Partial),
            other => Err(AppError::validation(format!(
                "Payment received must be Yes, No or Partial (got {other:?})"
            ))),
        }
    }
}

/// Whether the customer accepts partial deliveries.
pub fn parse_yes_no(raw: &str) -> AppResult<String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" => Ok("Yes".into()),
        "no" => Ok("No".into()),
        other => Err(AppError::validation(format!(
            "Partial delivery allowed must be Yes or No (got {other:?})"
        ))),
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnquiryForm {
    pub customer_name: String,
    pub delivery_address: String,
    pub billing_address: String,
    /// `YYYY-MM-DD`
    pub po_date: String,
    pub payment_received: Option<PaymentReceived>,
    pub payment_percentage: Option<String>,
    /// Quantity per catalog slot, index 0 is slot 1.
    pub quantities: [i64; MAX_KIT_SLOTS],
    /// `YYYY-MM-DD`
    pub delivery_date: String,
    /// `Yes` / `No`
    pub partial_delivery_allowed: String,
    pub remarks: String,
}

impl EnquiryForm {
    pub fn total_kits(&self) -> i64 {
        self.quantities
            .iter()
            .filter(|q| **q > 0)
            .fold(0i64, |acc, q| acc.saturating_add(*q))
    }

    pub fn validate(&self) -> AppResult<()> {
        let required = [
            &self.customer_name,
            &self.delivery_address,
            &self.billing_address,
            &self.po_date,
            &self.delivery_date,
            &self.partial_delivery_allowed,
        ];
        if required.iter().any(|f| f.trim().is_empty()) || self.payment_received.is_none() {
            return Err(AppError::validation("Please fill in all required fields."));
        }

        if self.payment_received == Some(PaymentReceived::Partial)
            && self
                .payment_percentage
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
        {
            return Err(AppError::validation("Please enter payment percentage."));
        }

        if self.quantities.iter().all(|q| *q <= 0) {
            return Err(AppError::validation(
                "Please enter at least one kit quantity.",
            ));
        }

        for (label, date) in [("PO date", &self.po_date), ("Delivery date", &self.delivery_date)] {
            if NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).is_err() {
                return Err(AppError::validation(format!(
                    "{label} must be in YYYY-MM-DD format."
                )));
            }
        }
        Ok(())
    }

    /// Validate and build the POST body for `enquiry/`.
    pub fn to_payload(&self) -> AppResult<Value> {
        self.validate()?;

        let mut body = Map::new();
        let mut put = |k: &str, v: String| {
            body.insert(k.to_string(), Value::String(v));
        };
        put("client_name", self.customer_name.trim().to_string());
        put("delivery_address", self.delivery_address.trim().to_string());
        put("billing_address", self.billing_address.trim().to_string());
        put("po_date_str", self.po_date.trim().to_string());
        put(
            "payment_received",
            self.payment_received
                .map(|p| p.to_string())
                .unwrap_or_default(),
        );
        put(
            "payment_percentage",
            self.payment_percentage
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .to_string(),
        );
        for (idx, name) in KIT_CATALOG.iter().enumerate() {
            let slot = idx + 1;
            let qty = self.quantities[idx].max(0);
            put(&format!("kit{slot}_name"), (*name).to_string());
            put(&format!("kit{slot}_qty"), qty.to_string());
        }
        put("total_kits", self.total_kits().to_string());
        put("delivery_date_str", self.delivery_date.trim().to_string());
        put(
            "partial_delivery_allowed",
            self.partial_delivery_allowed.trim().to_string(),
        );
        put("remarks", self.remarks.trim().to_string());
        Ok(Value::Object(body))
    }
}

/// Unique, non-empty client names across existing enquiries, sorted.
pub fn existing_clients(orders: &[Order]) -> Vec<String> {
    let mut names: Vec<String> = orders
        .iter()
        .filter_map(|o| o.client_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    names
}
