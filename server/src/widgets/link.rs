use tether_shared::{
    validate_endpoint, AttributeKind, AttributeSpec, Endpoint, InitState, LinkDirection, Schema,
    TypeKey, ValidationError, Value, WidgetId,
};

use super::models;
use crate::{WidgetError, WidgetManager};

pub(super) fn schemas() -> Vec<Schema> {
    [models::LINK, models::DIRECTIONAL_LINK]
        .into_iter()
        .map(|model| {
            Schema::builder(TypeKey::controls(model))
                .attribute(endpoint("source"))
                .attribute(endpoint("target"))
                .initializer(require_endpoints)
                .build()
        })
        .collect()
}

fn endpoint(name: &'static str) -> AttributeSpec {
    AttributeSpec::synced(name, AttributeKind::Endpoint, Value::Null)
        .read_only()
        .validator(validate_endpoint)
}

fn require_endpoints(init: &mut InitState) -> Result<(), ValidationError> {
    for name in ["source", "target"] {
        if !init.is_explicit(name) {
            return Err(ValidationError::Configuration {
                reason: format!("a link needs a `{}` endpoint", name),
            });
        }
    }
    Ok(())
}

impl WidgetManager {
    /// Links two attributes both ways. The peer keeps them equal.
    pub fn jslink(&mut self, source: Endpoint, target: Endpoint) -> Result<WidgetId, WidgetError> {
        self.link(source, target, LinkDirection::Bidirectional)
    }

    /// Links `source` to `target` one way
    pub fn jsdlink(&mut self, source: Endpoint, target: Endpoint) -> Result<WidgetId, WidgetError> {
        self.link(source, target, LinkDirection::Directional)
    }

    pub fn link(
        &mut self,
        source: Endpoint,
        target: Endpoint,
        direction: LinkDirection,
    ) -> Result<WidgetId, WidgetError> {
        self.create(
            &TypeKey::controls(direction.model_name()),
            [("source", source.to_value()), ("target", target.to_value())],
        )
    }

    /// Closes a link. Linked values are left as they are; unlinking twice is
    /// harmless.
    pub fn unlink(&mut self, link: &WidgetId) -> Result<(), WidgetError> {
        self.expect_model(link, &[models::LINK, models::DIRECTIONAL_LINK])?;
        self.close(link)
    }
}
