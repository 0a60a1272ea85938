//! Wiring from configuration to a ready help desk.

use crate::adapters::dataset::CsvFaqStore;
use crate::adapters::llm::OllamaGenerator;
use crate::config::TomlConfig;
use crate::core::desk::HelpDesk;
use crate::domain::ports::Generator;
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn build_desk(config: &TomlConfig) -> Result<HelpDesk> {
    let paths: Vec<PathBuf> = config.dataset_paths().into_iter().map(PathBuf::from).collect();
    tracing::info!("📁 Dataset files: {:?}", paths);
    let store = Arc::new(CsvFaqStore::new(paths));

    let generator: Option<Arc<dyn Generator>> = if config.generator_enabled() {
        let settings = config.generator_settings();
        tracing::info!(
            "🤖 Language-model fallback: {} (model: {})",
            settings.endpoint,
            settings.model
        );
        Some(Arc::new(OllamaGenerator::new(settings)?) as Arc<dyn Generator>)
    } else {
        tracing::info!("🤖 Language-model fallback disabled");
        None
    };

    HelpDesk::open(store, generator, config.desk_settings()).await
}
