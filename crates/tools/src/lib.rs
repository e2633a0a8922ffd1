//! Built-in tool implementations for Coscribe.
//!
//! The catalog is deliberately small: one research tool the model can call
//! when an answer needs current facts or sources. The registry keeps the
//! door open for more.

use std::sync::Arc;

use coscribe_core::tool::ToolRegistry;
use coscribe_document::DocumentHandle;
use tracing::{info, warn};

pub mod research;

pub use research::{ResearchBackend, ResearchTool, SONAR_MODELS, SonarClient, is_known_model};

/// Create the default tool registry from config.
///
/// The research tool is registered only when it is enabled and a usable
/// backend can be built; otherwise the model sees an empty catalog and the
/// dispatch loop degrades to plain chat.
pub fn default_registry(
    config: &coscribe_config::AppConfig,
    document: DocumentHandle,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    if config.research.enabled {
        match SonarClient::from_config(&config.research) {
            Ok(backend) => {
                registry.register(Box::new(ResearchTool::new(Arc::new(backend), document)));
                info!(model = %config.research.model, "Research tool enabled");
            }
            Err(e) => {
                warn!(error = %e, "Research tool disabled");
            }
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_with_key_has_research() {
        let mut config = coscribe_config::AppConfig::default();
        config.research.api_key = Some("pplx-test".into());

        let registry = default_registry(&config, DocumentHandle::new());
        assert!(registry.get("research").is_some());
    }

    #[test]
    fn registry_without_key_is_empty() {
        let config = coscribe_config::AppConfig::default();
        let registry = default_registry(&config, DocumentHandle::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_disabled_is_empty() {
        let mut config = coscribe_config::AppConfig::default();
        config.research.enabled = false;
        config.research.api_key = Some("pplx-test".into());

        let registry = default_registry(&config, DocumentHandle::new());
        assert!(registry.is_empty());
    }
}
