pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::dataset::CsvFaqStore;
pub use adapters::http::AppState;
pub use adapters::llm::{GeneratorSettings, OllamaGenerator};
pub use core::desk::{DeskSettings, HelpDesk};
pub use domain::model::{Domain, FaqEntry, Reply};
pub use utils::error::{HelpDeskError, Result};
