use std::sync::Arc;

use common::{
    artifacts::ArtifactLocator, error::AppError, storage::store::StorageManager,
    utils::config::AppConfig,
};
use retrieval_pipeline::{
    AnswerOrchestrator, AzureCompletionService, CompletionService, CompletionSettings,
    ContextLimits,
};
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub storage: StorageManager,
    pub locator: ArtifactLocator,
    pub orchestrator: Arc<AnswerOrchestrator>,
}

impl ApiState {
    /// Build state with the Azure completion client when it is configured.
    /// A missing configuration only disables chat; everything else still works.
    pub fn new(config: &AppConfig, storage: StorageManager) -> Result<Self, AppError> {
        let completion: Option<Arc<dyn CompletionService>> =
            match CompletionSettings::from_config(config) {
                Ok(settings) => {
                    info!(deployment = %settings.deployment, "Completion service configured");
                    Some(Arc::new(AzureCompletionService::new(settings)?))
                }
                Err(e) => {
                    warn!("Chat disabled: {e}");
                    None
                }
            };

        Ok(Self::with_completion(config, storage, completion))
    }

    pub fn with_completion(
        config: &AppConfig,
        storage: StorageManager,
        completion: Option<Arc<dyn CompletionService>>,
    ) -> Self {
        let locator = ArtifactLocator::new(storage.clone());
        let orchestrator = Arc::new(AnswerOrchestrator::new(
            locator.clone(),
            completion,
            ContextLimits::with_max_chars(config.context_max_chars),
        ));

        Self {
            config: config.clone(),
            storage,
            locator,
            orchestrator,
        }
    }
}
