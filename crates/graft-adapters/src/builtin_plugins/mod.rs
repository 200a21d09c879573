//! Plugins that ship with Graft.
//!
//! Each plugin lives in its own module and exposes `ID` and `plugin()`.
//! [`all`] is the single entry point used by the registry.

pub mod data_fetching;
pub mod http_client;

use graft_core::domain::{DomainError, PluginDescriptor};

/// Every built-in plugin, sorted by id.
pub fn all() -> Result<Vec<PluginDescriptor>, DomainError> {
    let mut plugins = vec![data_fetching::plugin()?, http_client::plugin()?];
    plugins.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(plugins)
}
