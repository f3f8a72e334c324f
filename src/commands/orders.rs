use serde_json::Value;
use tracing::info;

use super::{failure, require, Alert};
use crate::api::ApiClient;
use crate::models::Order;
use crate::orders::{self, StatusField};

fn order_row(order: &Order) -> Value {
    let mut row = order.raw();
    if let Some(obj) = row.as_object_mut() {
        obj.insert(
            "payment_label".into(),
            Value::String(orders::payment_label(
                order.payment_received.as_deref(),
                order.payment_percentage.as_deref(),
            )),
        );
    }
    row
}

/// Confirmed orders, optionally narrowed by client name or project id.
pub async fn list_orders(client: &ApiClient, query: Option<&str>) -> Result<Value, Alert> {
    let all = client
        .list_enquiries()
        .await
        .map_err(|e| failure("list_orders", "Failed to fetch orders. Please try again.", e))?;
    let hits = orders::search(&all, query.unwrap_or(""));
    let rows: Vec<Value> = hits.into_iter().map(order_row).collect();
    Ok(serde_json::json!({ "count": rows.len(), "orders": rows }))
}

pub async fn get_order(client: &ApiClient, order_id: &str) -> Result<Order, Alert> {
    let id = require(Some(order_id), "order id")?;
    client
        .get_enquiry(&id)
        .await
        .map_err(|e| failure("get_order", "Failed to load the order.", e))
}

/// Change one status column of an order.
pub async fn update_status(
    client: &ApiClient,
    order_id: &str,
    field: StatusField,
    value: &str,
) -> Result<Value, Alert> {
    let id = require(Some(order_id), "order id")?;
    let value = field.validate(value).map_err(|e| Alert::invalid(e.to_string()))?;

    let patch = serde_json::json!({ field.column(): value });
    let updated = client
        .patch_enquiry(&id, &patch)
        .await
        .map_err(|e| failure("update_status", "Failed to update status. Please try again.", e))?;

    info!(order_id = %id, field = %field, value, "order status updated");
    Ok(serde_json::json!({
        "success": true,
        "message": "Status updated successfully!",
        "order": updated,
    }))
}
