//! Validation and normalization of panel button-grid slot payloads.
//!
//! The UI always submits the complete desired grid for one panel, so the save
//! path validates the whole array up front, normalizes each slot, and hands
//! the result to the storage layer for a wholesale replace. Validation
//! failures reject the entire payload; normalization never rejects, it
//! defaults.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("slots must be an array")]
    NotAnArray,
    #[error("slot {index} must be an object")]
    NotAnObject { index: usize },
    #[error("slot {index}: {field} must be a non-negative integer")]
    BadIndex { index: usize, field: &'static str },
}

/// One normalized grid cell, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSlot {
    pub row_index: i32,
    pub col_index: i32,
    pub row_span: i32,
    pub col_span: i32,
    pub item_id: Option<i64>,
    pub label_override: Option<String>,
    pub sort_order: i32,
}

/// Validates and normalizes a raw `slots` JSON value.
///
/// Rules:
/// - the value must be an array (possibly empty);
/// - every element needs non-negative integer `rowIndex` and `colIndex`;
/// - `rowSpan`/`colSpan` default to 1 when missing or non-positive;
/// - `itemId` is an integer or null (numeric strings are accepted);
/// - `labelOverride` is trimmed, blank becomes null;
/// - `sortOrder` defaults to 0.
///
/// # Errors
///
/// Returns [`LayoutError`] when the payload shape is invalid. Nothing is
/// partially accepted.
pub fn normalize_slots(raw: &Value) -> Result<Vec<NormalizedSlot>, LayoutError> {
    let items = raw.as_array().ok_or(LayoutError::NotAnArray)?;

    let mut slots = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or(LayoutError::NotAnObject { index })?;

        let row_index = required_index(obj.get("rowIndex"), index, "rowIndex")?;
        let col_index = required_index(obj.get("colIndex"), index, "colIndex")?;

        slots.push(NormalizedSlot {
            row_index,
            col_index,
            row_span: span_or_default(obj.get("rowSpan")),
            col_span: span_or_default(obj.get("colSpan")),
            item_id: coerce_i64(obj.get("itemId")),
            label_override: obj
                .get("labelOverride")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned),
            sort_order: coerce_i64(obj.get("sortOrder"))
                .and_then(|v| i32::try_from(v).ok())
                .unwrap_or(0),
        });
    }

    Ok(slots)
}

fn required_index(
    value: Option<&Value>,
    index: usize,
    field: &'static str,
) -> Result<i32, LayoutError> {
    value
        .and_then(Value::as_i64)
        .filter(|v| *v >= 0)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(LayoutError::BadIndex { index, field })
}

fn span_or_default(value: Option<&Value>) -> i32 {
    coerce_i64(value)
        .filter(|v| *v >= 1)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(1)
}

/// Reads a JSON value as an integer, also accepting integer strings the way
/// the form layer sometimes sends them.
fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_array() {
        assert_eq!(
            normalize_slots(&json!({"not": "an array"})),
            Err(LayoutError::NotAnArray)
        );
    }

    #[test]
    fn accepts_empty_array() {
        assert_eq!(normalize_slots(&json!([])), Ok(vec![]));
    }

    #[test]
    fn rejects_missing_row_index() {
        let err = normalize_slots(&json!([{"colIndex": 0}])).unwrap_err();
        assert_eq!(
            err,
            LayoutError::BadIndex {
                index: 0,
                field: "rowIndex"
            }
        );
    }

    #[test]
    fn rejects_negative_col_index() {
        let err = normalize_slots(&json!([{"rowIndex": 0, "colIndex": -1}])).unwrap_err();
        assert_eq!(
            err,
            LayoutError::BadIndex {
                index: 0,
                field: "colIndex"
            }
        );
    }

    #[test]
    fn rejects_non_object_slot() {
        let err = normalize_slots(&json!([42])).unwrap_err();
        assert_eq!(err, LayoutError::NotAnObject { index: 0 });
    }

    #[test]
    fn defaults_spans_and_sort_order() {
        let slots = normalize_slots(&json!([{"rowIndex": 1, "colIndex": 2}])).unwrap();
        assert_eq!(slots[0].row_span, 1);
        assert_eq!(slots[0].col_span, 1);
        assert_eq!(slots[0].sort_order, 0);
        assert_eq!(slots[0].item_id, None);
        assert_eq!(slots[0].label_override, None);
    }

    #[test]
    fn non_positive_span_becomes_one() {
        let slots =
            normalize_slots(&json!([{"rowIndex": 0, "colIndex": 0, "rowSpan": 0, "colSpan": -3}]))
                .unwrap();
        assert_eq!(slots[0].row_span, 1);
        assert_eq!(slots[0].col_span, 1);
    }

    #[test]
    fn keeps_explicit_spans() {
        let slots =
            normalize_slots(&json!([{"rowIndex": 0, "colIndex": 0, "rowSpan": 2, "colSpan": 3}]))
                .unwrap();
        assert_eq!(slots[0].row_span, 2);
        assert_eq!(slots[0].col_span, 3);
    }

    #[test]
    fn item_id_accepts_integer_or_numeric_string() {
        let slots = normalize_slots(&json!([
            {"rowIndex": 0, "colIndex": 0, "itemId": 7},
            {"rowIndex": 0, "colIndex": 1, "itemId": "9"},
            {"rowIndex": 0, "colIndex": 2, "itemId": null},
        ]))
        .unwrap();
        assert_eq!(slots[0].item_id, Some(7));
        assert_eq!(slots[1].item_id, Some(9));
        assert_eq!(slots[2].item_id, None);
    }

    #[test]
    fn blank_label_override_becomes_null() {
        let slots = normalize_slots(&json!([
            {"rowIndex": 0, "colIndex": 0, "labelOverride": "   "},
            {"rowIndex": 0, "colIndex": 1, "labelOverride": "  Lg Pie  "},
        ]))
        .unwrap();
        assert_eq!(slots[0].label_override, None);
        assert_eq!(slots[1].label_override, Some("Lg Pie".to_string()));
    }
}
