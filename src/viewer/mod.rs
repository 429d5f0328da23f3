//! `ClickTable` - the WASM-exported viewer that mounts a rendered table
//! into a host element.
//!
//! This module provides the `ClickTable` struct that handles:
//! - Rendering table snapshots and configs into the container
//! - Forwarding the host theme as CSS custom properties
//! - Hover tooltips and click selection through `data-row`/`data-col`
//! - Reporting the component value to a JavaScript callback
//!
//! Event handlers are registered on the container when the viewer is
//! created, so no manual JavaScript wiring is needed.

mod events;

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, MouseEvent};

use crate::bridge::{HostBridge, HostMessage, HostTransport, Theme};
use crate::render::{palette, BASE_STYLES};
use crate::types::TableSnapshot;

/// Serialize to plain JS objects (not `Map`s), as the host expects JSON.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Class of the floating tooltip element.
const TOOLTIP_CLASS: &str = "clicktable-tooltip";

/// Queues outgoing messages while the shared state is borrowed; they are
/// delivered to the DOM and the JS callback once the borrow is released.
#[derive(Default)]
pub(crate) struct QueuedTransport {
    pending: Vec<HostMessage>,
}

impl HostTransport for QueuedTransport {
    fn send(&mut self, message: HostMessage) -> crate::error::Result<()> {
        self.pending.push(message);
        Ok(())
    }
}

pub(crate) struct SharedState {
    pub(crate) bridge: HostBridge<QueuedTransport>,
    pub(crate) on_change: Option<Function>,
}

impl SharedState {
    /// Messages queued since the last drain, plus the callback to notify.
    pub(crate) fn drain(&mut self) -> (Vec<HostMessage>, Option<Function>) {
        let pending = std::mem::take(&mut self.bridge.transport_mut().pending);
        (pending, self.on_change.clone())
    }
}

/// The table viewer exported to JavaScript
#[wasm_bindgen]
pub struct ClickTable {
    state: Rc<RefCell<SharedState>>,
    container: HtmlElement,
    #[allow(dead_code)] // Removed from the DOM only with the container
    tooltip: Option<HtmlElement>,
    #[allow(dead_code)]
    closures: Vec<Closure<dyn FnMut(MouseEvent)>>,
}

#[wasm_bindgen]
impl ClickTable {
    /// Create a viewer rendering into `container`.
    ///
    /// `key` identifies this table instance and is echoed back in every
    /// selection event.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, key: Option<String>) -> Result<ClickTable, JsValue> {
        console_error_panic_hook::set_once();

        let state = Rc::new(RefCell::new(SharedState {
            bridge: HostBridge::new(QueuedTransport::default(), key),
            on_change: None,
        }));

        let tooltip = Self::create_tooltip();
        let mut closures: Vec<Closure<dyn FnMut(MouseEvent)>> = Vec::new();

        // Click (selection)
        {
            let state = Rc::clone(&state);
            let container_ref = container.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                Self::internal_click(&state, &container_ref, &event);
            }) as Box<dyn FnMut(MouseEvent)>);
            container
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        // Mouse over (hover + tooltip)
        {
            let state = Rc::clone(&state);
            let tooltip = tooltip.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                Self::internal_mouse_over(&state, tooltip.as_ref(), &event);
            }) as Box<dyn FnMut(MouseEvent)>);
            container
                .add_event_listener_with_callback("mouseover", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        // Mouse out
        {
            let state = Rc::clone(&state);
            let tooltip = tooltip.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                Self::internal_mouse_out(&state, tooltip.as_ref(), &event);
            }) as Box<dyn FnMut(MouseEvent)>);
            container
                .add_event_listener_with_callback("mouseout", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        Ok(ClickTable {
            state,
            container,
            tooltip,
            closures,
        })
    }

    /// Set the callback invoked with the component value (`null` or a
    /// selection event object) after every click.
    #[wasm_bindgen]
    pub fn set_on_change(&mut self, callback: Option<Function>) {
        self.state.borrow_mut().on_change = callback;
    }

    /// Set the host theme (`{ primaryColor, secondaryBackgroundColor }`).
    /// Takes effect on the next `update`.
    #[wasm_bindgen]
    pub fn set_theme(&mut self, theme: JsValue) -> Result<(), JsValue> {
        let theme: Theme = serde_wasm_bindgen::from_value(theme)?;
        self.state.borrow_mut().bridge.set_theme(theme);
        Ok(())
    }

    /// Render `table` with `config` into the container.
    ///
    /// # Errors
    /// Returns an error string if the table or config is invalid; the
    /// previous render stays on screen.
    #[wasm_bindgen]
    pub fn update(&mut self, table: JsValue, config: JsValue) -> Result<(), JsValue> {
        let table: TableSnapshot = serde_wasm_bindgen::from_value(table)?;
        let config: serde_json::Value = serde_wasm_bindgen::from_value(config)?;

        let (result, selected, pending, callback) = {
            let mut s = self.state.borrow_mut();
            let result = s.bridge.update(&table, &config).map(|_| ());
            let selected = s.bridge.interaction().selected();
            let (pending, callback) = s.drain();
            (result, selected, pending, callback)
        };
        Self::deliver(&self.container, pending, callback);
        if let Some(target) = selected {
            Self::mark_selected(&self.container, target);
        }
        result.map_err(JsValue::from)
    }

    /// Current component value: `null` before the first click, then the
    /// latest selection event.
    #[wasm_bindgen]
    pub fn selection(&self) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        to_js(s.bridge.component_value())
    }
}

impl ClickTable {
    fn create_tooltip() -> Option<HtmlElement> {
        let document = web_sys::window()?.document()?;
        let tooltip = document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        tooltip.set_class_name(TOOLTIP_CLASS);
        let style = tooltip.style();
        style.set_property("position", "absolute").ok();
        style.set_property("display", "none").ok();
        style.set_property("background-color", palette::TOOLTIP_BG).ok();
        style.set_property("color", palette::TEXT).ok();
        style.set_property("white-space", "pre").ok();
        style.set_property("padding", "4px 8px").ok();
        style.set_property("border-radius", "4px").ok();
        style.set_property("font-size", "12px").ok();
        style.set_property("pointer-events", "none").ok();
        style.set_property("z-index", "1000").ok();
        document.body()?.append_child(&tooltip).ok()?;
        Some(tooltip)
    }

    /// Apply queued messages to the DOM and notify the callback. Runs with
    /// no borrow held, so the callback may call back into the viewer.
    pub(crate) fn deliver(container: &HtmlElement, pending: Vec<HostMessage>, callback: Option<Function>) {
        for message in pending {
            match message {
                HostMessage::Render { html, css_vars, .. } => {
                    container.set_inner_html(&format!("<style>{BASE_STYLES}</style>{html}"));
                    let style = container.style();
                    for (name, value) in &css_vars {
                        style.set_property(name, value).ok();
                    }
                }
                HostMessage::ComponentValue { value } => {
                    let Some(callback) = &callback else { continue };
                    if let Ok(js_value) = to_js(&value) {
                        let _ = callback.call1(&JsValue::NULL, &js_value);
                    }
                }
                HostMessage::Rejected { error, .. } => {
                    web_sys::console::warn_1(&JsValue::from_str(&format!(
                        "clicktable: config rejected: {error}"
                    )));
                }
            }
        }
    }
}
