use chrono::Local;
use serde_json::Value;
use tracing::info;

use super::{failure, require, Alert};
use crate::api::ApiClient;
use crate::dispatch;

/// Percentage lots for an order, deleted ones included, with the share still
/// counting towards 100%.
pub async fn list_lots(client: &ApiClient, sr: &str) -> Result<Value, Alert> {
    let sr = require(Some(sr), "SR")?;
    let lots = client
        .dispatch_lots(&sr)
        .await
        .map_err(|e| failure("list_lots", "Failed to load dispatch lots.", e))?;
    let total = dispatch::active_total(&lots);
    Ok(serde_json::json!({
        "sr": sr,
        "lots": lots,
        "active_total": total,
        "remaining": dispatch::MAX_TOTAL_PERCENT as f64 - total,
    }))
}

pub async fn add_lot(client: &ApiClient, sr: &str, percentage: &str) -> Result<Value, Alert> {
    let sr = require(Some(sr), "SR")?;
    let pct = dispatch::parse_percentage(percentage).map_err(|e| Alert::invalid(e.to_string()))?;

    let existing = client
        .dispatch_lots(&sr)
        .await
        .map_err(|e| failure("add_lot", "Failed to add lot", e))?;
    let lot = dispatch::prepare_lot(&sr, &existing, pct, &Local::now())
        .map_err(|e| failure("add_lot", "Failed to add lot", e))?;

    let created = client
        .create_dispatch_lot(&lot)
        .await
        .map_err(|e| failure("add_lot", "Failed to add lot", e))?;
    info!(sr = %sr, lot_number = lot.lot_number, percentage = pct, "dispatch lot added");

    Ok(serde_json::json!({
        "success": true,
        "message": "Lot added successfully!",
        "lot": created,
    }))
}

/// Soft-delete a lot; its number stays taken.
pub async fn delete_lot(client: &ApiClient, lot_id: &str) -> Result<Value, Alert> {
    let id = require(Some(lot_id), "lot id")?;
    client
        .soft_delete_dispatch_lot(&id)
        .await
        .map_err(|e| failure("delete_lot", "Failed to delete lot", e))?;
    info!(lot_id = %id, "dispatch lot deleted");
    Ok(serde_json::json!({ "success": true, "message": "Lot deleted successfully!" }))
}
