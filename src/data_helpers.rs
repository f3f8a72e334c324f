use chrono::{DateTime, TimeZone};
use serde_json::Value;

/// First non-empty trimmed string found under any of `keys`.
pub(crate) fn value_str(v: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = v.get(*key).and_then(|x| x.as_str()) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// First truthy number found under any of `keys`.
///
/// The backend stores most quantities as strings (`"12"`), so numeric strings
/// are accepted as well. Zero, blank and unparseable values are skipped so the
/// next key gets a chance.
pub(crate) fn value_i64(v: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(n) = v.get(*key).and_then(number_of) {
            if n != 0 {
                return Some(n);
            }
        }
    }
    None
}

/// Integer value of a JSON number or numeric string; decimals are truncated.
pub(crate) fn number_of(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Value of a JSON number or numeric string, decimals kept.
pub(crate) fn float_of(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// `DD/MM/YY HH:MM`, the stamp the backend stores for lots and uploads.
pub fn format_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d/%m/%y %H:%M").to_string()
}
