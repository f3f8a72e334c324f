use chrono::Local;
use serde_json::Value;
use tracing::{info, warn};

use super::{failure, require, Alert};
use crate::api::ApiClient;
use crate::kits::{self, EMPTY_LOT_MESSAGE};
use crate::models::{KitDispatchLot, Order};

const SAVE_FAILED: &str = "Failed to save lot. Please try again.";

fn lot_row(lot: &KitDispatchLot, total_ordered: i64) -> Value {
    serde_json::json!({
        "id": lot.id,
        "sum": lot.sum,
        "delivery_date": lot.delivery_date,
        "share_percent": kits::lot_share_percent(lot.sum, total_ordered),
    })
}

/// Ordered, dispatched and pending quantities for every kit on `order`,
/// plus the lots shipped so far.
pub async fn load_kits(client: &ApiClient, order: &Order) -> Result<Value, Alert> {
    let sr = require(order.sr.as_deref(), "SR")?;
    let lots = client
        .kit_dispatch_lots(&sr)
        .await
        .map_err(|e| failure("load_kits", "Failed to load kit dispatch data.", e))?;

    let summary = kits::reconcile(&kits::ordered_kits(order), &lots);
    let total_ordered = kits::total_ordered(&summary);
    let total_dispatched = kits::saturating_total(summary.iter().map(|k| k.dispatched));
    let total_pending = kits::saturating_total(summary.iter().map(|k| k.pending));

    Ok(serde_json::json!({
        "sr": sr,
        "order": order.label(),
        "kits": summary,
        "lots": lots.iter().map(|l| lot_row(l, total_ordered)).collect::<Vec<_>>(),
        "total_ordered": total_ordered,
        "total_dispatched": total_dispatched,
        "total_pending": total_pending,
    }))
}

/// Record a kit dispatch lot. `inputs` are `(slot, quantity)` pairs; each
/// quantity is clamped to what is still pending for that slot.
pub async fn save_lot(
    client: &ApiClient,
    order: &Order,
    inputs: &[(usize, i64)],
) -> Result<Value, Alert> {
    let sr = require(order.sr.as_deref(), "SR")?;
    if kits::saturating_total(inputs.iter().map(|(_, qty)| (*qty).max(0))) <= 0 {
        return Err(Alert::invalid(EMPTY_LOT_MESSAGE));
    }

    // Pending comes from a fresh read, not from the caller.
    let lots = client
        .kit_dispatch_lots(&sr)
        .await
        .map_err(|e| failure("save_lot", SAVE_FAILED, e))?;
    let summary = kits::reconcile(&kits::ordered_kits(order), &lots);
    let aligned = kits::inputs_for_slots(&summary, inputs)
        .map_err(|e| failure("save_lot", SAVE_FAILED, e))?;
    let lot = kits::prepare_lot(&sr, &summary, &aligned, &Local::now())
        .map_err(|e| failure("save_lot", SAVE_FAILED, e))?;

    client
        .create_kit_dispatch_lot(&lot)
        .await
        .map_err(|e| failure("save_lot", SAVE_FAILED, e))?;
    info!(sr = %sr, sum = lot.sum, "kit dispatch lot saved");

    // The lot is stored; a failed refresh must not report the save as failed.
    let mut reply = match load_kits(client, order).await {
        Ok(reply) => reply,
        Err(alert) => {
            warn!(sr = %sr, error = %alert, "kit summary refresh failed after save");
            serde_json::json!({ "sr": sr, "order": order.label() })
        }
    };
    if let Some(obj) = reply.as_object_mut() {
        obj.insert("success".into(), Value::Bool(true));
        obj.insert("message".into(), Value::from("Lot saved successfully!"));
        obj.insert("saved_sum".into(), Value::from(lot.sum));
    }
    Ok(reply)
}
