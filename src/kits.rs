//! Kit dispatch reconciliation.
//!
//! An order carries up to eight kit slots (`kit1_name`/`kit1_qty` ...
//! `kit8_name`/`kit8_qty`). Only slots with a quantity count as ordered kits.
//! Each kit dispatch lot records how many units of every ordered kit left the
//! factory in one shipment, in `kit{n}_dispatched` where `n` is the kit's
//! 1-based position among the ordered kits, not its slot on the order.
//!
//! **Rules:**
//! - dispatched per kit is the sum over all lots, in any order
//! - pending per kit is `max(ordered - dispatched, 0)`
//! - a proposed quantity is clamped to `[0, pending]`
//! - a lot whose clamped total is zero is rejected before any request

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::data_helpers::{format_stamp, number_of, value_i64, value_str};
use crate::error::{AppError, AppResult};
use crate::models::{KitDispatchLot, NewKitDispatchLot, Order};

/// Number of kit slots an order can carry.
pub const MAX_KIT_SLOTS: usize = 8;

pub const EMPTY_LOT_MESSAGE: &str = "Enter at least one quantity";

/// A kit the order asked for. `slot` is the 1-based `kit{slot}_*` index on
/// the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderedKit {
    pub slot: usize,
    pub name: String,
    pub qty: i64,
}

/// Ordered versus shipped for one kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitSummary {
    /// Slot on the order, as the user refers to it.
    pub slot: usize,
    /// Lot column (`kit{column}_dispatched`).
    pub column: usize,
    pub name: String,
    pub qty: i64,
    pub dispatched: i64,
    pub pending: i64,
}

// ---------------------------------------------------------------------------
// Field mapping
// ---------------------------------------------------------------------------

/// Older backend versions wrote the kit columns under different names. The
/// canonical `kit{i}_name` / `kit{i}_qty` pair comes first in both lists.
fn name_keys(slot: usize) -> [String; 6] {
    [
        format!("kit{slot}_name"),
        format!("kit_{slot}_name"),
        format!("kit{slot}Name"),
        format!("kit_{slot}_Name"),
        format!("product{slot}_name"),
        format!("item{slot}_name"),
    ]
}

fn qty_keys(slot: usize) -> [String; 8] {
    [
        format!("kit{slot}_qty"),
        format!("kit{slot}_quantity"),
        format!("kit_{slot}_qty"),
        format!("kit{slot}Qty"),
        format!("kit_{slot}_quantity"),
        format!("product{slot}_qty"),
        format!("item{slot}_qty"),
        format!("kit{slot}_quan"),
    ]
}

fn lookup_str(order: &Value, keys: &[String]) -> Option<String> {
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    value_str(order, &refs)
}

fn lookup_i64(order: &Value, keys: &[String]) -> Option<i64> {
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    value_i64(order, &refs)
}

/// Kits ordered on `order`, in slot order.
///
/// Only slots with a name and a positive quantity are returned. Orders that
/// predate the slot columns fall back to a `kits` array, and as a last resort
/// to a single synthetic kit sized by `total_kits`.
pub fn ordered_kits(order: &Order) -> Vec<OrderedKit> {
    ordered_kits_from_value(&order.raw())
}

pub fn ordered_kits_from_value(order: &Value) -> Vec<OrderedKit> {
    let mut kits: Vec<OrderedKit> = (1..=MAX_KIT_SLOTS)
        .filter_map(|slot| {
            let name = lookup_str(order, &name_keys(slot))?;
            let qty = lookup_i64(order, &qty_keys(slot)).unwrap_or(0);
            (qty > 0).then_some(OrderedKit { slot, name, qty })
        })
        .collect();

    if kits.is_empty() {
        if let Some(array) = order.get("kits").and_then(Value::as_array) {
            for entry in array {
                let name = value_str(entry, &["name", "kit_name", "product_name", "item_name"]);
                let qty = value_i64(entry, &["quantity", "qty", "amount"]).unwrap_or(0);
                if let Some(name) = name {
                    if qty > 0 && kits.len() < MAX_KIT_SLOTS {
                        kits.push(OrderedKit {
                            slot: kits.len() + 1,
                            name,
                            qty,
                        });
                    }
                }
            }
        }
    }

    if kits.is_empty() {
        let total = order.get("total_kits").and_then(number_of).unwrap_or(0);
        if total > 0 {
            let client = value_str(order, &["client_name"]).unwrap_or_else(|| "Order".into());
            kits.push(OrderedKit {
                slot: 1,
                name: format!("Total Kits ({client})"),
                qty: total,
            });
        }
    }

    kits
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Dispatched and pending quantities for every ordered kit.
pub fn reconcile(kits: &[OrderedKit], lots: &[KitDispatchLot]) -> Vec<KitSummary> {
    kits.iter()
        .enumerate()
        .map(|(idx, kit)| {
            let column = idx + 1;
            let dispatched = lots
                .iter()
                .fold(0i64, |acc, lot| acc.saturating_add(lot.dispatched(column)));
            KitSummary {
                slot: kit.slot,
                column,
                name: kit.name.clone(),
                qty: kit.qty,
                dispatched,
                pending: (kit.qty - dispatched).max(0),
            }
        })
        .collect()
}

/// Clamp a user-entered quantity into `[0, pending]`.
pub fn clamp_quantity(input: i64, pending: i64) -> i64 {
    input.clamp(0, pending.max(0))
}

pub fn total_ordered(summary: &[KitSummary]) -> i64 {
    saturating_total(summary.iter().map(|k| k.qty))
}

/// Sum that stops at `i64::MAX` instead of wrapping.
pub fn saturating_total(values: impl IntoIterator<Item = i64>) -> i64 {
    values.into_iter().fold(0i64, i64::saturating_add)
}

/// Share of all ordered kits a lot represents, e.g. `"33.33"`.
pub fn lot_share_percent(lot_sum: i64, total_ordered: i64) -> String {
    if total_ordered <= 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", lot_sum as f64 / total_ordered as f64 * 100.0)
}

/// Map `(slot, qty)` pairs onto the summary's index order.
pub fn inputs_for_slots(summary: &[KitSummary], pairs: &[(usize, i64)]) -> AppResult<Vec<i64>> {
    let mut inputs = vec![0; summary.len()];
    for (slot, qty) in pairs {
        let idx = summary
            .iter()
            .position(|k| k.slot == *slot)
            .ok_or_else(|| AppError::validation(format!("Kit {slot} is not part of this order")))?;
        inputs[idx] = *qty;
    }
    Ok(inputs)
}

/// Validate a proposed lot and build the record to persist.
///
/// `inputs` is index-aligned with `summary`; missing entries count as zero.
pub fn prepare_lot<Tz: TimeZone>(
    sr: &str,
    summary: &[KitSummary],
    inputs: &[i64],
    now: &DateTime<Tz>,
) -> AppResult<NewKitDispatchLot>
where
    Tz::Offset: std::fmt::Display,
{
    let sr = sr.trim();
    if sr.is_empty() {
        return Err(AppError::validation("Order has no SR reference"));
    }

    let dispatched: Vec<(usize, i64)> = summary
        .iter()
        .enumerate()
        .map(|(idx, kit)| {
            let raw = inputs.get(idx).copied().unwrap_or(0);
            (kit.column, clamp_quantity(raw, kit.pending))
        })
        .collect();

    let sum = saturating_total(dispatched.iter().map(|(_, qty)| *qty));
    if sum <= 0 {
        return Err(AppError::validation(EMPTY_LOT_MESSAGE));
    }

    Ok(NewKitDispatchLot {
        sr: sr.to_string(),
        sum,
        delivery_date: format_stamp(now),
        dispatched,
    })
}
