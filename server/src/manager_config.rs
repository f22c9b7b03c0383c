use std::default::Default;

use tether_shared::constants::PROTOCOL_VERSION;

/// Contains Config properties which will be used by the WidgetManager
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// After applying an inbound update, send back every received synchronized
    /// attribute with its final value, not just the ones validation altered
    pub echo_updates: bool,
    /// Evaluate links on the backend after each committed change. Meant for
    /// headless use, when no remote peer runs the links.
    pub evaluate_links_locally: bool,
    /// Protocol version advertised in the open handshake
    pub protocol_version: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            echo_updates: false,
            evaluate_links_locally: false,
            protocol_version: PROTOCOL_VERSION.to_string(),
        }
    }
}
