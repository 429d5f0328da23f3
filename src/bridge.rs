//! Host bridge: the protocol between a host application and a rendered
//! table.
//!
//! The host pushes a table snapshot plus a raw config; the bridge validates,
//! renders and sends the HTML back. Clicks travel the other way as a
//! serialized [`ComponentValue`]. Messages leave through a [`HostTransport`],
//! so the same bridge drives the wasm viewer, the CLI and the tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{self, RawConfig};
use crate::error::{ClickTableError, Result};
use crate::interaction::{resolve_click, InteractionState};
use crate::render::{adjust_color, palette, render_table, RenderedTable};
use crate::types::{CellTarget, ComponentValue, SelectionEvent, TableSnapshot};

/// Host colors forwarded to the table as CSS custom properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_background_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#ff4b4b".to_string(),
            secondary_background_color: "#f0f2f6".to_string(),
        }
    }
}

impl Theme {
    /// Custom properties for this theme, with `max_height` passed through
    /// unchanged. The border is the header background darkened by 5%; bar
    /// fills are fixed.
    pub fn css_variables(&self, max_height: &str) -> Vec<(&'static str, String)> {
        vec![
            ("--header-bg-color", self.secondary_background_color.clone()),
            ("--max-height", max_height.to_string()),
            ("--hover-color", self.primary_color.clone()),
            ("--border-color", adjust_color(&self.secondary_background_color, -5.0)),
            ("--pos-color", palette::POSITIVE_FILL.to_string()),
            ("--neg-color", palette::NEGATIVE_FILL.to_string()),
        ]
    }
}

/// Messages sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Freshly rendered table.
    #[serde(rename_all = "camelCase")]
    Render {
        html: String,
        max_height: String,
        css_vars: BTreeMap<String, String>,
    },
    /// New component value after a click.
    ComponentValue { value: serde_json::Value },
    /// The config was rejected; `config` echoes what the host sent.
    Rejected {
        error: String,
        config: serde_json::Value,
    },
}

/// Outbound channel to the host.
pub trait HostTransport {
    /// Deliver one message.
    ///
    /// # Errors
    /// Returns [`ClickTableError::Transport`] if the host can't be reached.
    fn send(&mut self, message: HostMessage) -> Result<()>;
}

/// Collects messages in memory.
impl HostTransport for Vec<HostMessage> {
    fn send(&mut self, message: HostMessage) -> Result<()> {
        self.push(message);
        Ok(())
    }
}

pub struct HostBridge<T: HostTransport> {
    transport: T,
    key: Option<String>,
    theme: Theme,
    rendered: Option<RenderedTable>,
    interaction: InteractionState,
    value: ComponentValue,
}

impl<T: HostTransport> HostBridge<T> {
    /// `key` identifies this component instance and is echoed in every
    /// selection event.
    pub fn new(transport: T, key: Option<String>) -> Self {
        Self {
            transport,
            key,
            theme: Theme::default(),
            rendered: None,
            interaction: InteractionState::new(),
            value: ComponentValue::NoSelection,
        }
    }

    /// Theme used from the next render on.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Validate `raw_config` against `table`, render and send the result.
    ///
    /// Every update is a full re-render. A rejected config is reported to
    /// the host (with the config echoed back) and the previous render stays
    /// in place.
    ///
    /// # Errors
    /// Returns the table, JSON or config error that stopped the render, or
    /// a transport error if the host couldn't be reached.
    pub fn update(&mut self, table: &TableSnapshot, raw_config: &serde_json::Value) -> Result<&RenderedTable> {
        table.validate()?;

        let parsed = serde_json::from_value::<RawConfig>(raw_config.clone())
            .map_err(ClickTableError::from)
            .and_then(|raw| config::parse(&raw, table.column_count()).map_err(ClickTableError::from));
        let config = match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "config rejected");
                self.transport.send(HostMessage::Rejected {
                    error: e.to_string(),
                    config: raw_config.clone(),
                })?;
                return Err(e);
            }
        };

        let rendered = render_table(table, &config);
        self.interaction.retain_valid(&rendered);

        let css_vars = self
            .theme
            .css_variables(&config.max_height)
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.transport.send(HostMessage::Render {
            html: rendered.to_html(),
            max_height: config.max_height.clone(),
            css_vars,
        })?;
        debug!(rows = table.row_count(), columns = table.column_count(), "table sent to host");

        // The interaction state owns the selection; the host's copy follows it.
        let current = self
            .interaction
            .selected()
            .and_then(|target| resolve_click(&rendered, target))
            .map_or(ComponentValue::NoSelection, |event| self.keyed(event));
        if current != self.value {
            debug!(selected = current.selection().is_some(), "selection changed by re-render");
            self.send_value(current)?;
        }

        Ok(self.rendered.insert(rendered))
    }

    /// Handle a click. Clicks that don't resolve to a cell send nothing.
    ///
    /// # Errors
    /// Returns a JSON or transport error if the selection couldn't be sent.
    pub fn click(&mut self, target: CellTarget) -> Result<Option<SelectionEvent>> {
        let Some(rendered) = &self.rendered else {
            return Ok(None);
        };
        let Some(event) = self.interaction.click(rendered, target) else {
            return Ok(None);
        };
        let value = self.keyed(event);
        let event = value.selection().cloned();
        self.send_value(value)?;
        Ok(event)
    }

    fn keyed(&self, mut event: SelectionEvent) -> ComponentValue {
        event.key.clone_from(&self.key);
        ComponentValue::Selected(event)
    }

    fn send_value(&mut self, value: ComponentValue) -> Result<()> {
        self.transport.send(HostMessage::ComponentValue {
            value: serde_json::to_value(&value)?,
        })?;
        self.value = value;
        Ok(())
    }

    /// Tooltip text for the cell under the pointer.
    pub fn hover(&mut self, target: CellTarget) -> Option<String> {
        let rendered = self.rendered.as_ref()?;
        self.interaction.pointer_enter(rendered, target).map(|t| t.text())
    }

    pub fn leave(&mut self, target: CellTarget) {
        self.interaction.pointer_leave(target);
    }

    pub fn component_value(&self) -> &ComponentValue {
        &self.value
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn rendered(&self) -> Option<&RenderedTable> {
        self.rendered.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
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

    #[test]
    fn test_theme_variables() {
        let theme = Theme {
            primary_color: "#FF0000".into(),
            secondary_background_color: "#F0F2F6".into(),
        };
        let vars = theme.css_variables("500px");
        assert_eq!(
            vars,
            vec![
                ("--header-bg-color", "#F0F2F6".to_string()),
                ("--max-height", "500px".to_string()),
                ("--hover-color", "#FF0000".to_string()),
                ("--border-color", "#e4e6ea".to_string()),
                ("--pos-color", "#4ade80".to_string()),
                ("--neg-color", "#f87171".to_string()),
            ]
        );
    }

    #[test]
    fn test_theme_deserializes_camel_case() {
        let theme: Theme = serde_json::from_str(r##"{"primaryColor":"#00f"}"##).unwrap();
        assert_eq!(theme.primary_color, "#00f");
        assert_eq!(theme.secondary_background_color, "#f0f2f6");
    }

    #[test]
    fn test_click_before_render_sends_nothing() {
        let mut bridge = HostBridge::new(Vec::new(), None);
        assert!(bridge.click(CellTarget::new(0, 0)).unwrap().is_none());
        assert!(bridge.transport().is_empty());
        assert_eq!(bridge.component_value(), &ComponentValue::NoSelection);
    }
}
