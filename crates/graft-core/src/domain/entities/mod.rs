pub mod common;
pub mod config_context;
pub mod file_tree;
pub mod plugin;

pub use crate::domain::DomainError;
pub use config_context::ConfigContext;
pub use file_tree::FileTree;
pub use plugin::PluginDescriptor;
