use crate::WidgetId;

/// Read-only view of the widgets a receiver currently knows about. Used to
/// resolve references and validate link endpoints.
pub trait WidgetLookup {
    /// Whether the widget exists and is Open
    fn is_live(&self, id: &WidgetId) -> bool;

    /// Sync flag of `attribute` on the widget, `None` if the widget or the
    /// attribute is unknown
    fn attribute_synced(&self, id: &WidgetId, attribute: &str) -> Option<bool>;
}

/// A lookup that knows no widgets
pub struct NoWidgets;

impl WidgetLookup for NoWidgets {
    fn is_live(&self, _: &WidgetId) -> bool {
        false
    }

    fn attribute_synced(&self, _: &WidgetId, _: &str) -> Option<bool> {
        None
    }
}
