//! Click and hover handlers for `ClickTable`.
//!
//! Listeners sit on the container and resolve the cell under the pointer
//! from its `data-row`/`data-col` attributes, so re-rendering the table
//! never requires re-wiring events.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, MouseEvent};

use super::{ClickTable, SharedState};
use crate::types::CellTarget;

/// Class marking the selected cell.
const SELECTED_CLASS: &str = "selected";

/// Gap between the tooltip and the top of the hovered cell, in px.
const TOOLTIP_OFFSET: f64 = 5.0;

/// Body cell under the event, with its address.
fn target_cell(event: &MouseEvent) -> Option<(Element, CellTarget)> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    let cell = element.closest("[data-row][data-col]").ok()??;
    let row = cell.get_attribute("data-row")?.parse().ok()?;
    let col = cell.get_attribute("data-col")?.parse().ok()?;
    Some((cell, CellTarget::new(row, col)))
}

impl ClickTable {
    pub(crate) fn internal_click(state: &Rc<RefCell<SharedState>>, container: &HtmlElement, event: &MouseEvent) {
        let Some((cell, target)) = target_cell(event) else {
            return;
        };

        let (selected, pending, callback) = {
            let mut s = state.borrow_mut();
            let selected = match s.bridge.click(target) {
                Ok(event) => event.is_some(),
                Err(e) => {
                    web_sys::console::warn_1(&JsValue::from_str(&format!(
                        "clicktable: selection not sent: {e}"
                    )));
                    false
                }
            };
            let (pending, callback) = s.drain();
            (selected, pending, callback)
        };

        if selected {
            if let Ok(Some(previous)) = container.query_selector(&format!(".{SELECTED_CLASS}")) {
                previous.class_list().remove_1(SELECTED_CLASS).ok();
            }
            cell.class_list().add_1(SELECTED_CLASS).ok();
        }
        Self::deliver(container, pending, callback);
    }

    /// Re-apply the selection highlight after the table markup was replaced.
    pub(crate) fn mark_selected(container: &HtmlElement, target: CellTarget) {
        let selector = format!("[data-row=\"{}\"][data-col=\"{}\"]", target.row, target.col);
        if let Ok(Some(cell)) = container.query_selector(&selector) {
            cell.class_list().add_1(SELECTED_CLASS).ok();
        }
    }

    pub(crate) fn internal_mouse_over(
        state: &Rc<RefCell<SharedState>>,
        tooltip: Option<&HtmlElement>,
        event: &MouseEvent,
    ) {
        let Some((cell, target)) = target_cell(event) else {
            return;
        };
        let text = state.borrow_mut().bridge.hover(target);
        let (Some(tooltip), Some(text)) = (tooltip, text) else {
            return;
        };

        let rect = cell.get_bounding_client_rect();
        let (scroll_x, scroll_y) = web_sys::window()
            .map(|w| (w.scroll_x().unwrap_or(0.0), w.scroll_y().unwrap_or(0.0)))
            .unwrap_or((0.0, 0.0));
        let left = rect.left() + scroll_x + rect.width() / 2.0;
        let top = rect.top() + scroll_y - TOOLTIP_OFFSET;

        tooltip.set_text_content(Some(&text));
        let style = tooltip.style();
        style.set_property("left", &format!("{left}px")).ok();
        style.set_property("top", &format!("{top}px")).ok();
        style.set_property("transform", "translate(-50%, -100%)").ok();
        style.set_property("display", "block").ok();
    }

    pub(crate) fn internal_mouse_out(
        state: &Rc<RefCell<SharedState>>,
        tooltip: Option<&HtmlElement>,
        event: &MouseEvent,
    ) {
        if let Some((_, target)) = target_cell(event) {
            state.borrow_mut().bridge.leave(target);
        }
        if let Some(tooltip) = tooltip {
            tooltip.style().set_property("display", "none").ok();
        }
    }
}
