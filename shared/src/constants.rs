// Module identity

pub const BASE_MODULE: &str = "@jupyter-widgets/base";
pub const BASE_MODULE_VERSION: &str = "2.0.0";
pub const CONTROLS_MODULE: &str = "@jupyter-widgets/controls";
pub const CONTROLS_MODULE_VERSION: &str = "2.0.0";

/// Version of the sync protocol advertised in the open handshake
pub const PROTOCOL_VERSION: &str = "2.1.0";

/// Tag prepended to a widget id when a reference to it is serialized
pub const MODEL_REF_PREFIX: &str = "IPY_MODEL_";

// Identity attributes every schema carries

pub const MODEL_MODULE_ATTR: &str = "_model_module";
pub const MODEL_MODULE_VERSION_ATTR: &str = "_model_module_version";
pub const MODEL_NAME_ATTR: &str = "_model_name";
pub const VIEW_MODULE_ATTR: &str = "_view_module";
pub const VIEW_MODULE_VERSION_ATTR: &str = "_view_module_version";
pub const VIEW_NAME_ATTR: &str = "_view_name";

// Link models

pub const LINK_MODEL: &str = "LinkModel";
pub const DIRECTIONAL_LINK_MODEL: &str = "DirectionalLinkModel";
