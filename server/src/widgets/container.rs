use tether_shared::{
    AttributeKind, AttributeSpec, Schema, TypeKey, ValidationError, Value, WidgetId, WidgetLookup,
};

use super::{dom_attributes, models, STYLES};
use crate::{WidgetError, WidgetManager};

const BOXES: [(&str, &str); 4] = [
    (models::BOX, "BoxView"),
    (models::HBOX, "HBoxView"),
    (models::VBOX, "VBoxView"),
    (models::GRID_BOX, "GridBoxView"),
];

pub(super) fn schemas() -> Vec<Schema> {
    BOXES
        .iter()
        .map(|(model, view)| {
            Schema::builder(TypeKey::controls(*model))
                .view(TypeKey::controls(*view))
                .attributes(dom_attributes())
                .attribute(
                    AttributeSpec::synced("children", AttributeKind::WidgetRefs, Value::Tuple(Vec::new()))
                        .validator(drop_closed_children),
                )
                .attribute(AttributeSpec::synced("box_style", AttributeKind::Enum(STYLES), ""))
                .build()
        })
        .collect()
}

/// Children that are not open are left out silently
fn drop_closed_children(
    lookup: &dyn WidgetLookup,
    _: &'static str,
    value: Value,
) -> Result<Value, ValidationError> {
    match value {
        Value::Tuple(children) => Ok(Value::Tuple(
            children
                .into_iter()
                .filter(|child| child.as_widget().is_some_and(|id| lookup.is_live(id)))
                .collect(),
        )),
        other => Ok(other),
    }
}

impl WidgetManager {
    /// Current children of a container, in order
    pub fn children(&self, id: &WidgetId) -> Result<Vec<WidgetId>, WidgetError> {
        let models: Vec<&str> = BOXES.iter().map(|(model, _)| *model).collect();
        self.expect_model(id, &models)?;
        Ok(self
            .get(id, "children")?
            .referenced_widgets()
            .into_iter()
            .cloned()
            .collect())
    }
}
