//! Session-level transport settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings applied once when the shared transport session is built.
///
/// These are defaults for the whole session. Individual requests cannot
/// override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Total time allowed for a request, `None` for no limit.
    pub timeout: Option<Duration>,

    /// Time allowed to establish a connection, `None` for no limit.
    pub connect_timeout: Option<Duration>,

    /// Redirects the session follows before handing back the 3xx response.
    pub max_redirects: usize,

    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            max_redirects: 10,
            user_agent: concat!("rest-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
