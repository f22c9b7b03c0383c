use tether_shared::{
    init_interval, init_scalar, reconcile_interval, reconcile_scalar, AttributeKind, AttributeSpec,
    Schema, SchemaBuilder, TypeKey, Value,
};

use super::{description_attributes, dom_attributes, models, ORIENTATIONS, STYLES};

pub(super) fn schemas() -> Vec<Schema> {
    vec![
        int_text(),
        float_text(),
        bounded_int(models::BOUNDED_INT_TEXT, "IntTextView", text_attributes()),
        bounded_float(models::BOUNDED_FLOAT_TEXT, "FloatTextView", text_attributes()),
        bounded_int(models::INT_SLIDER, "IntSliderView", slider_attributes("d")),
        bounded_float(models::FLOAT_SLIDER, "FloatSliderView", slider_attributes(".2f")),
        bounded_int(models::INT_PROGRESS, "ProgressView", progress_attributes()),
        bounded_float(models::FLOAT_PROGRESS, "ProgressView", progress_attributes()),
        int_range_slider(),
        float_range_slider(),
    ]
}

fn base(model: &str, view: &str) -> SchemaBuilder {
    Schema::builder(TypeKey::controls(model))
        .view(TypeKey::controls(view))
        .attributes(dom_attributes())
        .attributes(description_attributes())
        .attribute(AttributeSpec::synced("disabled", AttributeKind::Bool, false))
}

fn text_attributes() -> Vec<AttributeSpec> {
    vec![AttributeSpec::synced("continuous_update", AttributeKind::Bool, false)]
}

fn slider_attributes(readout_format: &'static str) -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::synced("orientation", AttributeKind::Enum(ORIENTATIONS), "horizontal"),
        AttributeSpec::synced("readout", AttributeKind::Bool, true),
        AttributeSpec::synced("readout_format", AttributeKind::Str, readout_format),
        AttributeSpec::synced("continuous_update", AttributeKind::Bool, true),
    ]
}

fn progress_attributes() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::synced("orientation", AttributeKind::Enum(ORIENTATIONS), "horizontal"),
        AttributeSpec::synced("bar_style", AttributeKind::Enum(STYLES), "").nullable(),
    ]
}

fn int_text() -> Schema {
    base(models::INT_TEXT, "IntTextView")
        .attribute(AttributeSpec::synced("value", AttributeKind::Int, 0))
        .attribute(AttributeSpec::synced("step", AttributeKind::Int, 1))
        .attributes(text_attributes())
        .build()
}

fn float_text() -> Schema {
    base(models::FLOAT_TEXT, "FloatTextView")
        .attribute(AttributeSpec::synced("value", AttributeKind::Float, 0.0))
        .attribute(AttributeSpec::synced("step", AttributeKind::Float, Value::Null).nullable())
        .attributes(text_attributes())
        .build()
}

fn bounded_int(model: &str, view: &str, extra: Vec<AttributeSpec>) -> Schema {
    base(model, view)
        .attribute(AttributeSpec::synced("value", AttributeKind::Int, 0))
        .attribute(AttributeSpec::synced("min", AttributeKind::Int, 0))
        .attribute(AttributeSpec::synced("max", AttributeKind::Int, 100))
        .attribute(AttributeSpec::synced("step", AttributeKind::Int, 1))
        .attributes(extra)
        .reconciler(reconcile_scalar::<i64>)
        .initializer(init_scalar::<i64>)
        .build()
}

fn bounded_float(model: &str, view: &str, extra: Vec<AttributeSpec>) -> Schema {
    base(model, view)
        .attribute(AttributeSpec::synced("value", AttributeKind::Float, 0.0))
        .attribute(AttributeSpec::synced("min", AttributeKind::Float, 0.0))
        .attribute(AttributeSpec::synced("max", AttributeKind::Float, 100.0))
        .attribute(AttributeSpec::synced("step", AttributeKind::Float, 0.1))
        .attributes(extra)
        .reconciler(reconcile_scalar::<f64>)
        .initializer(init_scalar::<f64>)
        .build()
}

fn int_range_slider() -> Schema {
    base(models::INT_RANGE_SLIDER, "IntRangeSliderView")
        .attribute(AttributeSpec::synced("value", AttributeKind::IntPair, (25, 75)))
        .attribute(AttributeSpec::local("lower", AttributeKind::Int, 25))
        .attribute(AttributeSpec::local("upper", AttributeKind::Int, 75))
        .attribute(AttributeSpec::synced("min", AttributeKind::Int, 0))
        .attribute(AttributeSpec::synced("max", AttributeKind::Int, 100))
        .attribute(AttributeSpec::synced("step", AttributeKind::Int, 1))
        .attributes(slider_attributes("d"))
        .reconciler(reconcile_interval::<i64>)
        .initializer(init_interval::<i64>)
        .build()
}

fn float_range_slider() -> Schema {
    base(models::FLOAT_RANGE_SLIDER, "FloatRangeSliderView")
        .attribute(AttributeSpec::synced("value", AttributeKind::FloatPair, (25.0, 75.0)))
        .attribute(AttributeSpec::local("lower", AttributeKind::Float, 25.0))
        .attribute(AttributeSpec::local("upper", AttributeKind::Float, 75.0))
        .attribute(AttributeSpec::synced("min", AttributeKind::Float, 0.0))
        .attribute(AttributeSpec::synced("max", AttributeKind::Float, 100.0))
        .attribute(AttributeSpec::synced("step", AttributeKind::Float, 0.1))
        .attributes(slider_attributes(".2f"))
        .reconciler(reconcile_interval::<f64>)
        .initializer(init_interval::<f64>)
        .build()
}
