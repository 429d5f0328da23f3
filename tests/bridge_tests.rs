//! Host protocol: what the bridge sends for renders, rejections and clicks.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod fixtures;

use clicktable::error::Result;
use clicktable::types::{CellTarget, ComponentValue};
use clicktable::{ClickTableError, ConfigError, HostBridge, HostMessage, HostTransport, Theme};
use fixtures::{col, sample_config, sample_table};
use serde_json::json;

fn bridge() -> HostBridge<Vec<HostMessage>> {
    HostBridge::new(Vec::new(), Some("sales".to_string()))
}

#[test]
fn test_update_sends_render_with_max_height_and_theme() {
    let mut bridge = bridge();
    bridge.set_theme(Theme {
        primary_color: "#FF0000".into(),
        secondary_background_color: "#F0F2F6".into(),
    });
    bridge.update(&sample_table(), &sample_config()).unwrap();

    let [HostMessage::Render { html, max_height, css_vars }] = bridge.transport().as_slice() else {
        panic!("expected a single render, got {:?}", bridge.transport());
    };
    assert_eq!(max_height, "500px");
    assert_eq!(css_vars["--max-height"], "500px");
    assert_eq!(css_vars["--hover-color"], "#FF0000");
    assert_eq!(css_vars["--border-color"], "#e4e6ea");
    assert!(html.starts_with("<div class=\"clicktable-container\">"));
    assert_eq!(*bridge.component_value(), ComponentValue::NoSelection);
}

#[test]
fn test_rejected_config_echoes_config_and_keeps_previous_render() {
    let mut bridge = bridge();
    bridge.update(&sample_table(), &sample_config()).unwrap();

    let bad = json!({ "data_bar_columns": [{ "col_idx": 40, "min": 0, "max": 1 }] });
    let err = bridge.update(&sample_table(), &bad).unwrap_err();
    assert!(matches!(
        err,
        ClickTableError::Config(ConfigError::InvalidColumnIndex { index: 40, .. })
    ));

    match bridge.transport().last().unwrap() {
        HostMessage::Rejected { error, config } => {
            assert!(error.contains("column 40"));
            assert_eq!(config, &bad);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(bridge.rendered().is_some());
}

#[test]
fn test_malformed_config_is_rejected() {
    let mut bridge = bridge();
    let bad = json!({ "david_hum_columns": [{ "col_idx": 1, "min": 0, "max": 1 }] });
    assert!(matches!(
        bridge.update(&sample_table(), &bad),
        Err(ClickTableError::Json(_))
    ));
    assert!(matches!(bridge.transport()[0], HostMessage::Rejected { .. }));
    assert!(bridge.rendered().is_none());
}

#[test]
fn test_click_sends_component_value() {
    let mut bridge = bridge();
    bridge.update(&sample_table(), &sample_config()).unwrap();

    let event = bridge.click(CellTarget::new(0, col::MARGIN)).unwrap().unwrap();
    assert_eq!(event.key.as_deref(), Some("sales"));

    let HostMessage::ComponentValue { value } = bridge.transport().last().unwrap() else {
        panic!("expected component value");
    };
    assert_eq!(
        value,
        &json!({ "rowIndex": 0, "header": "Margin %", "cellValue": 83.5, "key": "sales" })
    );
    assert_eq!(bridge.component_value().selection(), Some(&event));
}

#[test]
fn test_click_before_render_or_on_hidden_cell_sends_nothing() {
    let mut bridge = bridge();
    assert!(bridge.click(CellTarget::new(0, 1)).unwrap().is_none());

    bridge.update(&sample_table(), &sample_config()).unwrap();
    assert!(bridge.click(CellTarget::new(0, col::LT_LOW)).unwrap().is_none());
    assert_eq!(bridge.transport().len(), 1);
}

#[test]
fn test_render_carries_hidden_styles_and_bar_colors() {
    let mut bridge = bridge();
    bridge.update(&sample_table(), &sample_config()).unwrap();

    let HostMessage::Render { html, css_vars, .. } = &bridge.transport()[0] else {
        panic!("expected render");
    };
    assert!(html.contains(&format!("data-col=\"{}\" style=\"display:none\"", col::REVENUE_TARGET)));
    assert_eq!(css_vars["--pos-color"], "#4ade80");
    assert_eq!(css_vars["--neg-color"], "#f87171");
}

#[test]
fn test_rerender_without_selected_row_clears_component_value() {
    let mut bridge = bridge();
    bridge.update(&sample_table(), &sample_config()).unwrap();
    bridge.click(CellTarget::new(5, col::MARGIN)).unwrap().unwrap();

    let mut shorter = sample_table();
    shorter.rows.truncate(2);
    bridge.update(&shorter, &sample_config()).unwrap();

    assert_eq!(*bridge.component_value(), ComponentValue::NoSelection);
    assert_eq!(bridge.interaction().selected(), None);
    let HostMessage::ComponentValue { value } = bridge.transport().last().unwrap() else {
        panic!("expected the cleared value to be sent");
    };
    assert!(value.is_null());
}

#[test]
fn test_rerender_keeping_selection_sends_only_render() {
    let mut bridge = bridge();
    bridge.update(&sample_table(), &sample_config()).unwrap();
    let event = bridge.click(CellTarget::new(0, col::MARGIN)).unwrap().unwrap();
    let sent = bridge.transport().len();

    bridge.update(&sample_table(), &sample_config()).unwrap();

    assert_eq!(bridge.transport().len(), sent + 1);
    assert!(matches!(bridge.transport().last(), Some(HostMessage::Render { .. })));
    assert_eq!(bridge.component_value().selection(), Some(&event));
}

#[test]
fn test_hover_returns_tooltip_text() {
    let mut bridge = bridge();
    bridge.update(&sample_table(), &sample_config()).unwrap();
    assert_eq!(
        bridge.hover(CellTarget::new(0, col::MARGIN)).as_deref(),
        Some("Margin %: 83.5\nMargin % Target: 90")
    );
    assert!(bridge.hover(CellTarget::new(0, col::GROWTH)).is_none());
}

#[test]
fn test_messages_serialize_with_type_tag() {
    let message = HostMessage::ComponentValue {
        value: serde_json::to_value(ComponentValue::NoSelection).unwrap(),
    };
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({ "type": "componentValue", "value": null })
    );

    let mut bridge = bridge();
    bridge.update(&sample_table(), &sample_config()).unwrap();
    let render = serde_json::to_value(&bridge.transport()[0]).unwrap();
    assert_eq!(render["type"], "render");
    assert_eq!(render["maxHeight"], "500px");
    assert!(render["cssVars"]["--header-bg-color"].is_string());
}

struct Unreachable;

impl HostTransport for Unreachable {
    fn send(&mut self, _message: HostMessage) -> Result<()> {
        Err(ClickTableError::Transport("host went away".into()))
    }
}

#[test]
fn test_transport_failure_surfaces_from_update() {
    let mut bridge = HostBridge::new(Unreachable, None);
    assert!(matches!(
        bridge.update(&sample_table(), &sample_config()),
        Err(ClickTableError::Transport(_))
    ));
}
