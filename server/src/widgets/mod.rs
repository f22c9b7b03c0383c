//! The built-in widget catalogue: numeric inputs, sliders and progress bars,
//! range sliders, buttons, containers, color pickers and links.

use tether_shared::{
    AttributeKind, AttributeSpec, RegistryError, RegistryPlugin, Schema, TypeRegistry, Value,
};

mod button;
mod color;
mod container;
mod link;
mod numeric;

/// Exported model names, all in the controls module
pub mod models {
    pub const INT_TEXT: &str = "IntTextModel";
    pub const FLOAT_TEXT: &str = "FloatTextModel";
    pub const BOUNDED_INT_TEXT: &str = "BoundedIntTextModel";
    pub const BOUNDED_FLOAT_TEXT: &str = "BoundedFloatTextModel";
    pub const INT_SLIDER: &str = "IntSliderModel";
    pub const FLOAT_SLIDER: &str = "FloatSliderModel";
    pub const INT_PROGRESS: &str = "IntProgressModel";
    pub const FLOAT_PROGRESS: &str = "FloatProgressModel";
    pub const INT_RANGE_SLIDER: &str = "IntRangeSliderModel";
    pub const FLOAT_RANGE_SLIDER: &str = "FloatRangeSliderModel";
    pub const BUTTON: &str = "ButtonModel";
    pub const BUTTON_STYLE: &str = "ButtonStyleModel";
    pub const BOX: &str = "BoxModel";
    pub const HBOX: &str = "HBoxModel";
    pub const VBOX: &str = "VBoxModel";
    pub const GRID_BOX: &str = "GridBoxModel";
    pub const COLOR_PICKER: &str = "ColorPickerModel";
    pub use tether_shared::constants::{DIRECTIONAL_LINK_MODEL as DIRECTIONAL_LINK, LINK_MODEL as LINK};
}

pub use button::CLICK_EVENT;

/// Registers every built-in widget type
pub struct BuiltinWidgetsPlugin;

impl RegistryPlugin for BuiltinWidgetsPlugin {
    fn build(&self, registry: &TypeRegistry) -> Result<(), RegistryError> {
        let schemas = numeric::schemas()
            .into_iter()
            .chain(button::schemas())
            .chain(container::schemas())
            .chain(color::schemas())
            .chain(link::schemas());
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(())
    }
}

pub fn register_builtin_types(registry: &TypeRegistry) -> Result<(), RegistryError> {
    registry.add_plugin(BuiltinWidgetsPlugin).map(|_| ())
}

/// Attributes every visible widget carries
fn dom_attributes() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::synced("_dom_classes", AttributeKind::Any, Value::Tuple(Vec::new())),
        AttributeSpec::synced("tabbable", AttributeKind::Bool, Value::Null).nullable(),
        AttributeSpec::synced("tooltip", AttributeKind::Str, Value::Null).nullable(),
    ]
}

fn description_attributes() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::synced("description", AttributeKind::Str, ""),
        AttributeSpec::synced("description_allow_html", AttributeKind::Bool, false),
    ]
}

const ORIENTATIONS: &[&str] = &["horizontal", "vertical"];
const STYLES: &[&str] = &["success", "info", "warning", "danger", ""];
