//! Confirmed order tracking: search, status fields, payment labels.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;
use crate::models::Order;

/// Order columns that can be changed from the tracking list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusField {
    ProductionStatus,
    DispatchStatus,
    ProductionUnit,
}

impl StatusField {
    pub const ALL: [StatusField; 3] = [
        Self::ProductionStatus,
        Self::DispatchStatus,
        Self::ProductionUnit,
    ];

    /// Backend column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::ProductionStatus => "production_status",
            Self::DispatchStatus => "dispatch_status",
            Self::ProductionUnit => "production_unit",
        }
    }

    pub fn options(self) -> &'static [&'static str] {
        match self {
            Self::ProductionStatus => &[
                "Pending",
                "In Production",
                "Quality Check",
                "Completed",
                "On Hold",
            ],
            Self::DispatchStatus => &[
                "Not Dispatched",
                "Partially Dispatched",
                "Dispatched",
                "Delivered",
            ],
            Self::ProductionUnit => &["Unit 1", "Unit 2", "Unit 3", "Outsourced"],
        }
    }

    /// Canonical spelling of `value`, matched case-insensitively.
    pub fn validate(self, value: &str) -> Result<&'static str, AppError> {
        let wanted = value.trim();
        self.options()
            .iter()
            .find(|opt| opt.eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Invalid {}: {wanted:?}. Expected one of: {}",
                    self.column(),
                    self.options().join(", ")
                ))
            })
    }

    pub fn current(self, order: &Order) -> Option<&str> {
        match self {
            Self::ProductionStatus => order.production_status.as_deref(),
            Self::DispatchStatus => order.dispatch_status.as_deref(),
            Self::ProductionUnit => order.production_unit.as_deref(),
        }
    }
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for StatusField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|f| f.column() == key)
            .ok_or_else(|| AppError::validation(format!("Unknown status field: {s}")))
    }
}

/// Orders whose client name or project id contains `query`
/// (case-insensitive). A blank query matches everything.
pub fn search<'a>(orders: &'a [Order], query: &str) -> Vec<&'a Order> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return orders.iter().collect();
    }
    orders
        .iter()
        .filter(|o| {
            let hit = |field: &Option<String>| {
                field
                    .as_deref()
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            };
            hit(&o.client_name) || hit(&o.project_id)
        })
        .collect()
}

/// Badge text for the payment column.
pub fn payment_label(received: Option<&str>, percentage: Option<&str>) -> String {
    let received = received.unwrap_or("").trim();
    match received.to_ascii_lowercase().as_str() {
        "yes" => "Paid".to_string(),
        "no" => "Unpaid".to_string(),
        "partial" => format!("{}% Paid", percentage.unwrap_or("0").trim()),
        _ => received.to_string(),
    }
}
