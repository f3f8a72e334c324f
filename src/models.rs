//! Wire types for the sales backend.
//!
//! The backend is loose about types: ids and quantities arrive either as JSON
//! numbers or as strings, and orders carry more fields than we model. Every
//! record keeps its unknown fields in `extra` so nothing is lost on a
//! read-modify-write.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::data_helpers::{float_of, number_of};

/// Marker the backend uses for soft-deleted rows.
pub const DELETED_YES: &str = "Yes";
pub const DELETED_NO: &str = "No";

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(number_of).unwrap_or(0))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(float_of).unwrap_or(0.0))
}

/// A sales order (the backend calls it an enquiry).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sr: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub production_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dispatch_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub production_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_received: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_percentage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_kits: Option<String>,
    /// Kit columns, addresses, dates and anything else the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// The order as a flat JSON object, typed fields included.
    pub fn raw(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(self.extra.clone()))
    }

    /// Display label: project id, falling back to the serial reference.
    pub fn label(&self) -> &str {
        self.project_id
            .as_deref()
            .or(self.sr.as_deref())
            .unwrap_or("-")
    }
}

/// One kit-based partial shipment, as stored by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KitDispatchLot {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sr: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub sum: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery_date: Option<String>,
    /// `kit{n}_dispatched` columns.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KitDispatchLot {
    /// Quantity shipped in lot column `column` (1-based position among the
    /// order's ordered kits).
    pub fn dispatched(&self, column: usize) -> i64 {
        self.extra
            .get(&dispatched_key(column))
            .and_then(number_of)
            .unwrap_or(0)
            .max(0)
    }
}

pub fn dispatched_key(column: usize) -> String {
    format!("kit{column}_dispatched")
}

/// A new kit dispatch lot ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKitDispatchLot {
    pub sr: String,
    pub sum: i64,
    pub delivery_date: String,
    /// `(column, quantity)` for every reconciled kit, zero quantities included.
    pub dispatched: Vec<(usize, i64)>,
}

impl NewKitDispatchLot {
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("sr".into(), Value::String(self.sr.clone()));
        body.insert("sum".into(), Value::from(self.sum));
        body.insert(
            "delivery_date".into(),
            Value::String(self.delivery_date.clone()),
        );
        for (column, qty) in &self.dispatched {
            body.insert(dispatched_key(*column), Value::from(*qty));
        }
        Value::Object(body)
    }
}

/// A percentage-based dispatch lot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchLot {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sr: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub lot_number: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percentage: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deleted: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lot_date_str: Option<String>,
}

impl DispatchLot {
    pub fn is_deleted(&self) -> bool {
        self.deleted.as_deref() == Some(DELETED_YES)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDispatchLot {
    pub sr: String,
    pub lot_number: i64,
    pub percentage: i64,
    pub deleted: String,
    pub lot_date_str: String,
}

/// An uploaded QC or dispatch document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sr: Option<String>,
    #[serde(default, alias = "document_name", deserialize_with = "lenient_string")]
    pub file_name: Option<String>,
    #[serde(default, alias = "file_url", deserialize_with = "lenient_string")]
    pub file: Option<String>,
    #[serde(default, alias = "upload_date", deserialize_with = "lenient_string")]
    pub uploaded_at_str: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deleted: Option<String>,
}

impl Document {
    pub fn is_deleted(&self) -> bool {
        self.deleted.as_deref() == Some(DELETED_YES)
    }
}

/// Body used to soft-delete lots and documents.
pub fn soft_delete_patch() -> Value {
    serde_json::json!({ "deleted": DELETED_YES })
}
