use tether_shared::{AttributeKind, AttributeSpec, Schema, TypeKey};

use super::{description_attributes, dom_attributes, models};

pub(super) fn schemas() -> Vec<Schema> {
    vec![Schema::builder(TypeKey::controls(models::COLOR_PICKER))
        .view(TypeKey::controls("ColorPickerView"))
        .attributes(dom_attributes())
        .attributes(description_attributes())
        .attribute(AttributeSpec::synced("value", AttributeKind::Color, "black"))
        .attribute(AttributeSpec::synced("concise", AttributeKind::Bool, false))
        .attribute(AttributeSpec::synced("disabled", AttributeKind::Bool, false))
        .build()]
}
