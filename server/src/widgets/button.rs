use log::warn;
use serde_json::json;

use tether_shared::{
    AttributeKind, AttributeSpec, Listener, Schema, TypeKey, ValidationError, Value, WidgetId,
    WidgetLookup,
};

use super::{description_attributes, dom_attributes, models};
use crate::{events::WidgetEvent, WidgetError, WidgetManager};

/// Fired when a button is clicked, locally or by the peer
pub const CLICK_EVENT: &str = "click";

const BUTTON_STYLES: &[&str] = &["primary", "success", "info", "warning", "danger", ""];

pub(super) fn schemas() -> Vec<Schema> {
    vec![button_style(), button()]
}

fn button_style() -> Schema {
    let optional = |name: &'static str, kind: AttributeKind| {
        AttributeSpec::synced(name, kind, Value::Null).nullable()
    };
    Schema::builder(TypeKey::controls(models::BUTTON_STYLE))
        .view(TypeKey::controls("ButtonStyleView"))
        .attribute(optional("bold", AttributeKind::Bool))
        .attribute(optional("button_color", AttributeKind::Color))
        .attribute(optional("font_family", AttributeKind::Str))
        .attribute(AttributeSpec::synced("font_size", AttributeKind::Str, ""))
        .attribute(optional("italic", AttributeKind::Bool))
        .attribute(AttributeSpec::synced("text_color", AttributeKind::Str, ""))
        .attribute(optional("underline", AttributeKind::Bool))
        .build()
}

fn button() -> Schema {
    Schema::builder(TypeKey::controls(models::BUTTON))
        .view(TypeKey::controls("ButtonView"))
        .attributes(dom_attributes())
        .attributes(description_attributes())
        .attribute(AttributeSpec::synced("disabled", AttributeKind::Bool, false))
        .attribute(AttributeSpec::synced("icon", AttributeKind::Str, "").validator(strip_icon_prefix))
        .attribute(AttributeSpec::synced(
            "button_style",
            AttributeKind::Enum(BUTTON_STYLES),
            "",
        ))
        .attribute(AttributeSpec::synced("style", AttributeKind::WidgetRef, Value::Null).nullable())
        .child("style", TypeKey::controls(models::BUTTON_STYLE))
        .event(CLICK_EVENT)
        .build()
}

/// Icon names used to carry a `fa-` prefix; it is no longer needed
fn strip_icon_prefix(
    _: &dyn WidgetLookup,
    _: &'static str,
    value: Value,
) -> Result<Value, ValidationError> {
    let stripped = value
        .as_str()
        .filter(|icon| icon.contains("fa-"))
        .map(|icon| icon.replace("fa-", ""));
    match stripped {
        Some(icon) => {
            warn!("Icon names no longer need 'fa-', use the class names themselves (for example 'gear spin' instead of 'fa-gear fa-spin')");
            Ok(Value::Str(icon))
        }
        None => Ok(value),
    }
}

impl WidgetManager {
    /// Triggers a click, calling every click listener of the button
    pub fn click(&mut self, id: &WidgetId) -> Result<(), WidgetError> {
        self.expect_model(id, &[models::BUTTON])?;
        self.fire_event(id, CLICK_EVENT, json!({ "event": CLICK_EVENT }))
    }

    pub fn on_click(
        &mut self,
        id: &WidgetId,
        listener: &Listener<WidgetEvent>,
        remove: bool,
    ) -> Result<(), WidgetError> {
        self.expect_model(id, &[models::BUTTON])?;
        self.on_event(id, CLICK_EVENT, listener, remove)
    }
}
