use serde_json::Value;
use tracing::info;

use super::{failure, require, Alert};
use crate::api::ApiClient;
use crate::documents::{self, DocumentKind};

pub async fn list_documents(client: &ApiClient, kind: DocumentKind, sr: &str) -> Result<Value, Alert> {
    let sr = require(Some(sr), "SR")?;
    let docs = client
        .documents(kind, &sr)
        .await
        .map_err(|e| failure("list_documents", "Failed to load documents.", e))?;
    let docs = documents::active(docs);
    Ok(serde_json::json!({
        "title": kind.title(),
        "sr": sr,
        "count": docs.len(),
        "documents": docs,
    }))
}

pub async fn delete_document(client: &ApiClient, kind: DocumentKind, doc_id: &str) -> Result<Value, Alert> {
    let id = require(Some(doc_id), "document id")?;
    client
        .soft_delete_document(kind, &id)
        .await
        .map_err(|e| failure("delete_document", "Failed to delete document.", e))?;
    info!(%kind, doc_id = %id, "document deleted");
    Ok(serde_json::json!({ "success": true, "message": "Document deleted successfully!" }))
}
