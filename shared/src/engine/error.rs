use thiserror::Error;

use crate::WidgetId;

/// Errors raised while validating and reconciling attribute writes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Conflicting or incomplete constructor arguments
    #[error("Invalid widget configuration: {reason}")]
    Configuration {
        reason: String,
    },

    /// A write would leave min/max (or lower/upper) out of order
    #[error("Invalid bounds while setting `{attribute}`: {reason}")]
    InvalidBounds {
        attribute: &'static str,
        reason: String,
    },

    /// A link endpoint names an attribute that does not exist or is not synchronized
    #[error("Cannot link to `{attribute}` of widget {widget}: {reason}")]
    InvalidAttribute {
        widget: WidgetId,
        attribute: String,
        reason: &'static str,
    },

    /// A value could not be coerced into the attribute's kind
    #[error("Attribute `{attribute}` expects {expected}, got {found}")]
    TypeMismatch {
        attribute: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A value has the right kind but is not acceptable
    #[error("Invalid value for `{attribute}`: {reason}")]
    InvalidValue {
        attribute: &'static str,
        reason: String,
    },

    /// The schema has no attribute with this name
    #[error("Unknown attribute `{attribute}`")]
    UnknownAttribute {
        attribute: String,
    },

    /// The attribute is fixed at construction
    #[error("Attribute `{attribute}` is read-only")]
    ReadOnly {
        attribute: &'static str,
    },
}
