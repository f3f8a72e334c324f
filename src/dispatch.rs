//! Percentage-based dispatch lots.
//!
//! A shipment may be split across lots, each carrying a share of the order in
//! percent. Soft-deleted lots (`deleted = "Yes"`) stay in the history and keep
//! their lot number, but no longer count towards the 100% ceiling.

use chrono::{DateTime, TimeZone};

use crate::data_helpers::format_stamp;
use crate::error::{AppError, AppResult};
use crate::models::{DispatchLot, NewDispatchLot, DELETED_NO};

pub const MAX_TOTAL_PERCENT: i64 = 100;

/// Stored shares may carry decimals; totals within this of 100 still fit.
const CEILING_TOLERANCE: f64 = 0.001;

/// Validate a user-entered percentage. Accepts whole numbers 1..=100.
pub fn parse_percentage(raw: &str) -> AppResult<i64> {
    let pct = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation("Enter 1-100"))?;
    validate_percentage(pct)?;
    Ok(pct)
}

pub fn validate_percentage(pct: i64) -> AppResult<()> {
    if !(1..=MAX_TOTAL_PERCENT).contains(&pct) {
        return Err(AppError::validation("Enter 1-100"));
    }
    Ok(())
}

/// Sum of percentages over lots that are not soft-deleted.
pub fn active_total(lots: &[DispatchLot]) -> f64 {
    lots.iter()
        .filter(|l| !l.is_deleted())
        .map(|l| l.percentage)
        .sum()
}

/// Percent share rounded to two decimals, without trailing zeros.
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

/// Lot numbers are never reused: deleted lots still hold theirs.
pub fn next_lot_number(lots: &[DispatchLot]) -> i64 {
    lots.len() as i64 + 1
}

/// Check a proposed lot against the existing history and build the record.
pub fn prepare_lot<Tz: TimeZone>(
    sr: &str,
    existing: &[DispatchLot],
    pct: i64,
    now: &DateTime<Tz>,
) -> AppResult<NewDispatchLot>
where
    Tz::Offset: std::fmt::Display,
{
    let sr = sr.trim();
    if sr.is_empty() {
        return Err(AppError::validation("Order has no SR reference"));
    }
    validate_percentage(pct)?;

    let total = active_total(existing);
    if total + pct as f64 > MAX_TOTAL_PERCENT as f64 + CEILING_TOLERANCE {
        return Err(AppError::validation(format!(
            "Total cannot exceed 100%. Current: {}%",
            format_percent(total)
        )));
    }

    Ok(NewDispatchLot {
        sr: sr.to_string(),
        lot_number: next_lot_number(existing),
        percentage: pct,
        deleted: DELETED_NO.to_string(),
        lot_date_str: format_stamp(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lot(number: i64, pct: f64, deleted: &str) -> DispatchLot {
        DispatchLot {
            id: Some(number.to_string()),
            sr: Some("SR-1".into()),
            lot_number: number,
            percentage: pct,
            deleted: Some(deleted.into()),
            lot_date_str: None,
        }
    }

    #[test]
    fn over_hundred_is_rejected_with_current_total() {
        let existing = vec![lot(1, 50.0, "No"), lot(2, 20.0, "No")];
        let now = Utc::now();

        let err = prepare_lot("SR-1", &existing, 40, &now).expect_err("would exceed 100");
        assert_eq!(err.to_string(), "Total cannot exceed 100%. Current: 70%");

        let ok = prepare_lot("SR-1", &existing, 30, &now).expect("fills to exactly 100");
        assert_eq!(ok.percentage, 30);
        assert_eq!(ok.lot_number, 3);
        assert_eq!(ok.deleted, "No");
        assert_eq!(active_total(&existing) + ok.percentage as f64, 100.0);
    }

    #[test]
    fn deleted_lots_free_their_share_but_keep_their_number() {
        let existing = vec![lot(1, 60.0, "Yes"), lot(2, 30.0, "No")];
        assert_eq!(active_total(&existing), 30.0);
        assert_eq!(next_lot_number(&existing), 3);

        let now = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 0).unwrap();
        let ok = prepare_lot("SR-1", &existing, 70, &now).expect("deleted lot does not count");
        assert_eq!(ok.lot_number, 3);
        assert_eq!(ok.lot_date_str, "31/01/25 23:59");
    }

    #[test]
    fn decimal_shares_count_in_full() {
        let now = Utc::now();
        let existing = vec![lot(1, 33.5, "No"), lot(2, 37.0, "No")];
        assert_eq!(active_total(&existing), 70.5);

        let err = prepare_lot("SR-1", &existing, 30, &now).expect_err("70.5 + 30 exceeds 100");
        assert_eq!(err.to_string(), "Total cannot exceed 100%. Current: 70.5%");

        let existing = vec![lot(1, 50.0005, "No")];
        prepare_lot("SR-1", &existing, 50, &now).expect("within tolerance of 100");

        assert_eq!(format_percent(70.0), "70");
        assert_eq!(format_percent(12.345), "12.35");
    }

    #[test]
    fn percentage_bounds() {
        assert!(parse_percentage("0").is_err());
        assert!(parse_percentage("101").is_err());
        assert!(parse_percentage("abc").is_err());
        assert!(parse_percentage("12.5").is_err());
        assert_eq!(parse_percentage(" 100 ").expect("upper bound"), 100);
        assert_eq!(parse_percentage("1").expect("lower bound"), 1);

        let err = prepare_lot("SR-1", &[], 0, &Utc::now()).expect_err("zero pct");
        assert_eq!(err.to_string(), "Enter 1-100");
    }

    #[test]
    fn first_lot_starts_at_one() {
        let ok = prepare_lot("SR-2", &[], 100, &Utc::now()).expect("single full lot");
        assert_eq!(ok.lot_number, 1);
        assert_eq!(ok.sr, "SR-2");
    }
}
