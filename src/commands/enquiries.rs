use serde_json::Value;
use tracing::{info, warn};

use super::{failure, Alert};
use crate::api::ApiClient;
use crate::enquiry::{self, EnquiryForm};
use crate::error::AppError;

pub async fn create_enquiry(client: &ApiClient, form: &EnquiryForm) -> Result<Value, Alert> {
    let payload = form
        .to_payload()
        .map_err(|e| match e {
            AppError::Validation(message) => Alert::error(message),
            other => failure("create_enquiry", "Failed to create sales order. Please try again.", other),
        })?;

    match client.create_enquiry(&payload).await {
        Ok(created) => {
            info!(
                client = %form.customer_name,
                total_kits = form.total_kits(),
                "sales order created"
            );
            Ok(serde_json::json!({
                "success": true,
                "message": "Sales Order Created Successfully!",
                "enquiry": created,
            }))
        }
        // The backend explains rejected forms; show its message.
        Err(AppError::Http { message, status }) if status < 500 => {
            warn!(status, %message, "sales order rejected");
            Err(Alert::error(message))
        }
        Err(e) => Err(failure(
            "create_enquiry",
            "Failed to create sales order. Please try again.",
            e,
        )),
    }
}

/// Client names for the "existing customer" picker.
pub async fn existing_clients(client: &ApiClient) -> Result<Value, Alert> {
    let orders = client
        .list_enquiries()
        .await
        .map_err(|e| failure("existing_clients", "Failed to load existing clients.", e))?;
    Ok(serde_json::json!({ "clients": enquiry::existing_clients(&orders) }))
}
