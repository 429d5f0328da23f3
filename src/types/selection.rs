use serde::{Serialize, Serializer};

use super::CellValue;

/// Body cell address in the table's column index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellTarget {
    pub row: usize,
    pub col: usize,
}

impl CellTarget {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Value reported for a clicked cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SelectionValue {
    Number(f64),
    Text(String),
}

impl From<&CellValue> for SelectionValue {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Number(n) => Self::Number(*n),
            CellValue::Text(s) => Self::Text(s.clone()),
            CellValue::Empty => Self::Text(String::new()),
        }
    }
}

/// The one live selection, reported to the host after a click.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEvent {
    pub row_index: usize,
    pub header: String,
    pub cell_value: SelectionValue,
    /// Component instance key, echoed back so the host can route the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// What the host sees as the component's value: `null` until the first
/// click, then the latest selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ComponentValue {
    #[default]
    NoSelection,
    Selected(SelectionEvent),
}

impl ComponentValue {
    pub fn selection(&self) -> Option<&SelectionEvent> {
        match self {
            Self::NoSelection => None,
            Self::Selected(event) => Some(event),
        }
    }
}

impl Serialize for ComponentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NoSelection => serializer.serialize_none(),
            Self::Selected(event) => event.serialize(serializer),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = SelectionEvent {
            row_index: 2,
            header: "Margin %".to_string(),
            cell_value: SelectionValue::Number(83.5),
            key: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"rowIndex":2,"header":"Margin %","cellValue":83.5}"#);
    }

    #[test]
    fn test_no_selection_is_null() {
        let json = serde_json::to_string(&ComponentValue::NoSelection).unwrap();
        assert_eq!(json, "null");

        let event = SelectionEvent {
            row_index: 0,
            header: String::new(),
            cell_value: SelectionValue::Text(String::new()),
            key: Some("test".to_string()),
        };
        let json = serde_json::to_string(&ComponentValue::Selected(event)).unwrap();
        assert_eq!(json, r#"{"rowIndex":0,"header":"","cellValue":"","key":"test"}"#);
    }
}
