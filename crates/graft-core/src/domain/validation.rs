use crate::domain::{
    entities::{ConfigContext, PluginDescriptor},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_context(ctx: &ConfigContext) -> Result<(), DomainError> {
        ctx.validate()
    }

    pub fn validate_plugin(plugin: &PluginDescriptor) -> Result<(), DomainError> {
        plugin.validate()
    }

    /// Resolve every requested plugin against `available`, in request order.
    ///
    /// Fails on the first unknown id, or on a plugin that does not support
    /// the context's project kind.
    pub fn resolve_selection(
        ctx: &ConfigContext,
        available: &[PluginDescriptor],
    ) -> Result<Vec<PluginDescriptor>, DomainError> {
        ctx.validate()?;

        ctx.active_plugins()
            .iter()
            .map(|id| {
                let plugin = available.iter().find(|p| &p.id == id).ok_or_else(|| {
                    DomainError::UnknownPlugin {
                        plugin: id.to_string(),
                        available: available.iter().map(|p| p.id.to_string()).collect(),
                    }
                })?;

                if !plugin.supports(ctx.project_kind()) {
                    return Err(DomainError::UnsupportedProjectKind {
                        plugin: id.to_string(),
                        kind: ctx.project_kind().to_string(),
                        supported: plugin.supported_kinds.iter().map(ToString::to_string).collect(),
                    });
                }

                Ok(plugin.clone())
            })
            .collect()
    }
}
