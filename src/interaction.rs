//! Hover and click handling over a rendered table.
//!
//! Cells are addressed by `(row, col)` in the table's column index space,
//! the same indices the HTML carries in `data-row`/`data-col`. The state
//! machine is small: any cell can be hovered, at most one cell is selected,
//! and a new click replaces the selection.

use tracing::trace;

use crate::render::{RenderedTable, Tooltip};
use crate::types::{CellTarget, SelectionEvent, SelectionValue};

/// Map a click on `target` to the event reported to the host.
///
/// Hidden columns and targets outside the table resolve to `None`.
pub fn resolve_click(table: &RenderedTable, target: CellTarget) -> Option<SelectionEvent> {
    if table.is_hidden(target.col) {
        return None;
    }
    let cell = table.cell(target.row, target.col)?;
    Some(SelectionEvent {
        row_index: target.row,
        header: table.header(target.col)?.to_string(),
        cell_value: SelectionValue::from(&cell.value),
        key: None,
    })
}

/// What a cell is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Idle,
    Hover,
    Selected,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    hovered: Option<CellTarget>,
    selected: Option<CellTarget>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moved onto `target`. Returns the cell's tooltip, if any.
    pub fn pointer_enter<'a>(&mut self, table: &'a RenderedTable, target: CellTarget) -> Option<&'a Tooltip> {
        let cell = table.cell(target.row, target.col)?;
        self.hovered = Some(target);
        cell.overlay.as_ref()?.tooltip()
    }

    pub fn pointer_leave(&mut self, target: CellTarget) {
        if self.hovered == Some(target) {
            self.hovered = None;
        }
    }

    /// Select `target`, replacing any earlier selection. Clicks that don't
    /// resolve leave the current selection alone.
    pub fn click(&mut self, table: &RenderedTable, target: CellTarget) -> Option<SelectionEvent> {
        let event = resolve_click(table, target)?;
        if let Some(previous) = self.selected.replace(target) {
            trace!(row = previous.row, col = previous.col, "selection replaced");
        }
        Some(event)
    }

    pub fn selected(&self) -> Option<CellTarget> {
        self.selected
    }

    pub fn hovered(&self) -> Option<CellTarget> {
        self.hovered
    }

    pub fn cell_state(&self, target: CellTarget) -> CellState {
        if self.selected == Some(target) {
            CellState::Selected
        } else if self.hovered == Some(target) {
            CellState::Hover
        } else {
            CellState::Idle
        }
    }

    /// Call after a re-render: drops the hover and drops the selection if it
    /// no longer resolves against `table`.
    pub fn retain_valid(&mut self, table: &RenderedTable) {
        self.hovered = None;
        if let Some(selected) = self.selected {
            if resolve_click(table, selected).is_none() {
                trace!(row = selected.row, col = selected.col, "selection dropped after re-render");
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::render::render_table;
    use crate::types::{CellEntry, CellValue, ColumnHeader, RenderConfig, Row, TableSnapshot};

    fn rendered(hidden: &[usize]) -> RenderedTable {
        let table = TableSnapshot {
            columns: vec![ColumnHeader::flat("Revenue"), ColumnHeader::flat("Note")],
            rows: vec![
                Row {
                    index: CellValue::Text("North".into()),
                    cells: vec![CellEntry::new(12.5), CellEntry::new("ok")],
                },
                Row {
                    index: CellValue::Text("South".into()),
                    cells: vec![CellEntry::new(-3.0), CellEntry::new(CellValue::Empty)],
                },
            ],
        };
        let config = RenderConfig {
            idx_col_name: "Region".into(),
            hidden_columns: hidden.iter().copied().collect(),
            ..RenderConfig::default()
        };
        render_table(&table, &config)
    }

    #[test]
    fn test_resolve_numeric_cell() {
        let event = resolve_click(&rendered(&[]), CellTarget::new(1, 1)).unwrap();
        assert_eq!(event.row_index, 1);
        assert_eq!(event.header, "Revenue");
        assert_eq!(event.cell_value, SelectionValue::Number(-3.0));
    }

    #[test]
    fn test_resolve_index_column() {
        let event = resolve_click(&rendered(&[]), CellTarget::new(0, 0)).unwrap();
        assert_eq!(event.header, "Region");
        assert_eq!(event.cell_value, SelectionValue::Text("North".into()));
    }

    #[test]
    fn test_empty_cell_reports_empty_text() {
        let event = resolve_click(&rendered(&[]), CellTarget::new(1, 2)).unwrap();
        assert_eq!(event.cell_value, SelectionValue::Text(String::new()));
    }

    #[test]
    fn test_hidden_and_out_of_bounds_are_not_targets() {
        let table = rendered(&[2]);
        assert!(resolve_click(&table, CellTarget::new(0, 2)).is_none());
        assert!(resolve_click(&table, CellTarget::new(5, 1)).is_none());
        assert!(resolve_click(&table, CellTarget::new(0, 9)).is_none());
    }

    #[test]
    fn test_hover_cycle() {
        let table = rendered(&[]);
        let mut state = InteractionState::new();
        let target = CellTarget::new(0, 1);
        assert!(state.pointer_enter(&table, target).is_none());
        assert_eq!(state.cell_state(target), CellState::Hover);
        state.pointer_leave(target);
        assert_eq!(state.cell_state(target), CellState::Idle);
    }

    #[test]
    fn test_click_replaces_selection() {
        let table = rendered(&[]);
        let mut state = InteractionState::new();
        state.click(&table, CellTarget::new(0, 1)).unwrap();
        state.click(&table, CellTarget::new(1, 2)).unwrap();
        assert_eq!(state.selected(), Some(CellTarget::new(1, 2)));
        assert_eq!(state.cell_state(CellTarget::new(0, 1)), CellState::Idle);
    }

    #[test]
    fn test_retain_valid_drops_stale_selection() {
        let mut state = InteractionState::new();
        state.click(&rendered(&[]), CellTarget::new(1, 2)).unwrap();
        state.retain_valid(&rendered(&[2]));
        assert_eq!(state.selected(), None);
    }
}
